//! Per-field kinds, shapes and conversions for each route.

use super::{Chain, Conversion, Fragment, Kind, Layer, Route, Shape, reshape, setup_var};
use crate::{config::Paths, proto::rules};
use quote::quote;
use tripod_schema::{naming, prelude::*};

/// Function-name prefix for a field's enum conversions.
#[must_use]
pub fn enum_prefix(node: &str, field: &Field) -> String {
    format!("{}_{}", naming::snake(node), naming::snake(field.name()))
}

/// Element kind of a field in one layer.
#[must_use]
pub fn kind(node: &str, field: &Field, layer: Layer, paths: &Paths) -> Kind {
    match layer {
        Layer::Storage => storage_kind(node, field),
        Layer::Domain => domain_kind(node, field),
        Layer::Wire => wire_kind(node, field, paths),
    }
}

fn element(field: &Field) -> Primitive {
    if field.is_list() {
        field.item().unwrap_or(Primitive::Text)
    } else {
        field.primitive()
    }
}

fn local_enum(node: &str, field: &Field, layer: Layer) -> Kind {
    Kind::LocalEnum {
        layer,
        prefix: enum_prefix(node, field),
    }
}

fn storage_kind(node: &str, field: &Field) -> Kind {
    if field.is_local_enum() {
        return local_enum(node, field, Layer::Storage);
    }
    if field.is_external_enum() {
        let ty = field.storage_type();
        return Kind::External(quote!(#ty));
    }
    if field.primitive() == Primitive::Json {
        let ty = field.storage_type();
        return Kind::Json(quote!(#ty));
    }

    primitive_kind(element(field))
}

fn domain_kind(node: &str, field: &Field) -> Kind {
    if field.is_local_enum() {
        return local_enum(node, field, Layer::Domain);
    }
    if field.has_explicit_biz_type() {
        let ty = field.biz_type();
        let ty = if field.is_list() {
            super::kind::element_type(ty).unwrap_or(ty)
        } else {
            ty
        };

        return match Kind::classify(ty) {
            // an explicit type spelled like the storage Json type stays Json
            Kind::Other(ts) if field.primitive() == Primitive::Json => Kind::Json(ts),
            kind => kind,
        };
    }
    if element(field) == Primitive::Uuid {
        return Kind::String;
    }

    storage_kind(node, field)
}

fn wire_kind(node: &str, field: &Field, paths: &Paths) -> Kind {
    let proto = field.proto_type();
    if field.is_local_enum() {
        return local_enum(node, field, Layer::Wire);
    }
    if let Some(kind) = Kind::from_proto(proto) {
        return kind;
    }

    let wire = &paths.wire;
    let name = naming::ident(&naming::pascal(proto.rsplit('.').next().unwrap_or(proto)));
    Kind::Other(quote!(#wire::#name))
}

fn primitive_kind(primitive: Primitive) -> Kind {
    match primitive {
        Primitive::Bool => Kind::Bool,
        Primitive::Bytes => Kind::Bytes,
        Primitive::Float32 => Kind::F32,
        Primitive::Float64 => Kind::F64,
        Primitive::Int | Primitive::Int64 => Kind::I64,
        Primitive::Int32 => Kind::I32,
        Primitive::Timestamp => Kind::DateTime,
        Primitive::Uint64 => Kind::U64,
        Primitive::Uuid => Kind::Uuid,
        Primitive::Json => Kind::Json(quote!(::serde_json::Value)),
        Primitive::Enum | Primitive::List | Primitive::Text => Kind::String,
    }
}

#[must_use]
pub fn storage_shape(field: &Field) -> Shape {
    if field.is_list() {
        Shape::Repeated
    } else if field.is_nillable() {
        Shape::Optional
    } else {
        Shape::Plain
    }
}

/// Lists stay plain vectors even when a direction asks for a pointer.
#[must_use]
pub fn domain_shape(field: &Field) -> Shape {
    if field.is_list() {
        Shape::Repeated
    } else if field.is_domain_pointer() {
        Shape::Optional
    } else {
        Shape::Plain
    }
}

/// Message-typed wire fields are always optional, as prost renders them.
#[must_use]
pub fn wire_shape(field: &Field, direction: Direction) -> Shape {
    if field.is_list() {
        return Shape::Repeated;
    }

    let message_typed = !field.is_local_enum() && !rules::is_scalar(field.proto_type());
    if message_typed || field.strategy(direction).proto == FieldProto::Optional {
        Shape::Optional
    } else {
        Shape::Plain
    }
}

/// Name a field carries in a layer.
#[must_use]
pub fn member_name(field: &Field, layer: Layer) -> &str {
    match layer {
        Layer::Storage => field.name(),
        Layer::Domain => field.biz_name(),
        Layer::Wire => field.proto_name(),
    }
}

///
/// FieldConverter
///

pub struct FieldConverter<'a> {
    node: &'a str,
    paths: &'a Paths,
}

impl<'a> FieldConverter<'a> {
    #[must_use]
    pub const fn new(node: &'a str, paths: &'a Paths) -> Self {
        Self { node, paths }
    }

    /// Conversion of one field along a route, or `None` when the target
    /// struct has no member for it.
    #[must_use]
    pub fn fragment(&self, field: &Field, route: Route) -> Option<Fragment> {
        let (_, to) = route.layers();
        let member = member_name(field, to).to_string();

        let present = match route {
            Route::StorageToDomain | Route::WireToDomain => field.has_domain_member(),
            Route::DomainToStorage => field.has_domain_member() && !field.is_virtual(),
            Route::DomainToWire => field.on_wire(Direction::Out),
        };
        if !present {
            return None;
        }

        let sourced = match route {
            Route::StorageToDomain => !field.is_virtual(),
            Route::DomainToStorage => true,
            Route::DomainToWire => !field.strategy(Direction::Out).biz.is_excluded(),
            Route::WireToDomain => {
                let strategy = field.strategy(Direction::In);
                !strategy.proto.is_excluded() && !strategy.biz.is_excluded()
            }
        };

        let conversion = if sourced {
            self.convert(field, route)
        } else {
            Conversion::default_value()
        };

        Some(Fragment {
            member,
            route,
            conversion,
        })
    }

    fn convert(&self, field: &Field, route: Route) -> Conversion {
        let (from, to) = route.layers();
        let chain = Chain::between(
            &kind(self.node, field, from, self.paths),
            &kind(self.node, field, to, self.paths),
        );

        let source_name = naming::ident(member_name(field, from));
        let source = quote!(src.#source_name);
        let label = member_name(field, from);
        let var = setup_var(member_name(field, to));

        reshape(
            &source,
            layer_shape(field, from, route),
            layer_shape(field, to, route),
            &chain,
            label,
            &var,
        )
    }
}

fn layer_shape(field: &Field, layer: Layer, route: Route) -> Shape {
    match layer {
        Layer::Storage => storage_shape(field),
        Layer::Domain => domain_shape(field),
        Layer::Wire if route == Route::WireToDomain => wire_shape(field, Direction::In),
        Layer::Wire => wire_shape(field, Direction::Out),
    }
}
