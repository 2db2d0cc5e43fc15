use crate::{
    annotation::{self, Annotation},
    naming::{self, ident},
    node::{EnumKind, EnumValue},
    prelude::*,
    raw::RawField,
    strategy::RawStrategy,
};
use std::collections::BTreeMap;
use syn::parse_quote;

pub(super) fn adapt_field(
    node: &str,
    raw: &RawField,
    is_id: bool,
    errs: &mut ErrorTree,
) -> Option<Field> {
    if !naming::is_ident(&raw.name) {
        err!(errs, "field name '{}' is not a valid identifier", raw.name);
        return None;
    }

    let annotation = annotation::decode(&raw.annotations);
    let ann = annotation.clone().unwrap_or_default();

    let strategy_in = resolve_strategy(Direction::In, raw, ann.field_in_strategy.as_ref(), errs);
    let strategy_out =
        resolve_strategy(Direction::Out, raw, ann.field_out_strategy.as_ref(), errs);

    let enum_kind = resolve_enum(node, raw, &ann, errs);
    let storage_type = storage_type(node, raw, enum_kind.as_ref(), errs);
    let biz_type = biz_type(raw, enum_kind.as_ref(), storage_type.as_ref(), &ann, errs);
    let (proto_type, proto_type_explicit) = proto_type(raw, enum_kind.as_ref(), &ann);
    check_enum_overrides(raw, enum_kind.as_ref(), &ann, errs);

    let (Some(storage_type), Some((biz_type, biz_type_explicit))) = (storage_type, biz_type) else {
        return None;
    };
    if !errs.is_empty() {
        return None;
    }

    Some(Field {
        name: raw.name.clone(),
        primitive: raw.primitive,
        item: raw.item.or_else(|| (raw.primitive == Primitive::List).then_some(Primitive::Text)),
        optional: raw.optional,
        nillable: raw.nillable,
        sensitive: raw.sensitive,
        is_virtual: ann.is_virtual,
        is_id,
        comment: raw.comment.clone(),
        strategy_in,
        strategy_out,
        biz_name: ann
            .biz_name
            .clone()
            .unwrap_or_else(|| naming::snake(&raw.name)),
        proto_name: ann
            .proto_name
            .clone()
            .unwrap_or_else(|| naming::snake(&raw.name)),
        biz_type,
        biz_type_explicit,
        proto_type,
        proto_type_explicit,
        storage_type,
        enum_kind,
        tag: ann.proto_field_id,
        validation: ann.proto_validation.clone(),
        annotation,
    })
}

// explicit annotation first, then the sensitive/optional defaults
fn resolve_strategy(
    direction: Direction,
    raw: &RawField,
    explicit: Option<&RawStrategy>,
    errs: &mut ErrorTree,
) -> FieldStrategy {
    let default = FieldStrategy::default_for(direction, raw.sensitive, raw.optional);

    match explicit.map(RawStrategy::resolve::<FieldProto, FieldBiz>) {
        None => default,
        Some(Ok(partial)) => partial.resolve(default),
        Some(Err(e)) => {
            err!(
                errs,
                "invalid {direction} strategy for field '{}': {e}",
                raw.name
            );
            default
        }
    }
}

fn resolve_enum(
    node: &str,
    raw: &RawField,
    ann: &Annotation,
    errs: &mut ErrorTree,
) -> Option<EnumKind> {
    if raw.primitive != Primitive::Enum {
        return None;
    }
    if let Some(path) = &raw.enum_type {
        return parse_type(path, "enum_type", errs).map(|ty| EnumKind::External { ty });
    }
    if raw.enum_values.is_empty() {
        err!(errs, "enum field '{}' declares no literals", raw.name);
        return None;
    }

    let mut variants = BTreeMap::new();
    for literal in &raw.enum_values {
        let variant = naming::pascal(literal);
        if !naming::is_ident(&variant) {
            err!(
                errs,
                "enum literal '{literal}' of field '{}' does not form a valid variant name",
                raw.name
            );
        } else if let Some(previous) = variants.insert(variant, literal) {
            err!(
                errs,
                "enum literals '{previous}' and '{literal}' of field '{}' share a variant name",
                raw.name
            );
        }
    }

    Some(EnumKind::Local {
        type_name: format!("{node}{}", naming::pascal(&raw.name)),
        literals: raw.enum_values.clone(),
        values: enum_values(node, raw, ann.enum_values.as_ref(), errs),
    })
}

// declaration-order indices unless an explicit map is supplied
fn enum_values(
    node: &str,
    raw: &RawField,
    explicit: Option<&BTreeMap<String, i32>>,
    errs: &mut ErrorTree,
) -> Vec<EnumValue> {
    let Some(map) = explicit else {
        return raw
            .enum_values
            .iter()
            .zip(0_i32..)
            .map(|(literal, number)| EnumValue {
                literal: literal.clone(),
                number,
            })
            .collect();
    };

    for literal in map.keys() {
        if !raw.enum_values.contains(literal) {
            tracing::warn!(
                node,
                field = %raw.name,
                literal = %literal,
                "explicit enum number names an undeclared literal; ignored"
            );
        }
    }

    let mut seen = BTreeMap::new();
    let mut values = Vec::new();
    for literal in &raw.enum_values {
        let Some(&number) = map.get(literal) else {
            tracing::warn!(
                node,
                field = %raw.name,
                literal = %literal,
                "declared enum literal has no explicit number; skipped"
            );
            continue;
        };
        if let Some(previous) = seen.insert(number, literal) {
            err!(
                errs,
                "enum literals '{previous}' and '{literal}' of field '{}' share number {number}",
                raw.name
            );
        }
        values.push(EnumValue {
            literal: literal.clone(),
            number,
        });
    }

    values
}

fn storage_type(
    node: &str,
    raw: &RawField,
    kind: Option<&EnumKind>,
    errs: &mut ErrorTree,
) -> Option<syn::Type> {
    match raw.primitive {
        Primitive::Enum => match kind? {
            EnumKind::Local { .. } => {
                let module = ident(&naming::snake(node));
                let name = ident(&naming::pascal(&raw.name));
                Some(parse_quote!(#module::#name))
            }
            EnumKind::External { ty } => Some(ty.clone()),
        },
        Primitive::List if raw.nillable => {
            err!(errs, "list field '{}' cannot be nillable", raw.name);
            None
        }
        Primitive::List => {
            let item = raw.item.unwrap_or(Primitive::Text);
            let Some(inner) = item.as_type().filter(|_| item.is_scalar()) else {
                err!(
                    errs,
                    "list field '{}' has non-scalar element type {item}",
                    raw.name
                );
                return None;
            };
            Some(parse_quote!(::std::vec::Vec<#inner>))
        }
        Primitive::Json => match &raw.rust_type {
            Some(text) => parse_type(text, "rust_type", errs),
            None => Some(parse_quote!(::serde_json::Value)),
        },
        primitive => {
            let ty = primitive.as_type()?;
            Some(parse_quote!(#ty))
        }
    }
}

// explicit type, then enum and UUID defaults, then the storage type
fn biz_type(
    raw: &RawField,
    kind: Option<&EnumKind>,
    storage: Option<&syn::Type>,
    ann: &Annotation,
    errs: &mut ErrorTree,
) -> Option<(syn::Type, bool)> {
    if let Some(text) = &ann.biz_type {
        return parse_type(text, "biz_type", errs).map(|ty| (ty, true));
    }

    let ty = match (raw.primitive, kind) {
        (Primitive::Enum, Some(EnumKind::Local { type_name, .. })) => {
            let name = ident(type_name);
            parse_quote!(#name)
        }
        (Primitive::Uuid, _) => parse_quote!(::std::string::String),
        (Primitive::List, _) if raw.item == Some(Primitive::Uuid) => {
            parse_quote!(::std::vec::Vec<::std::string::String>)
        }
        _ => storage?.clone(),
    };

    Some((ty, false))
}

// a generated enum keeps its generated types in every layer
fn check_enum_overrides(
    raw: &RawField,
    kind: Option<&EnumKind>,
    ann: &Annotation,
    errs: &mut ErrorTree,
) {
    let Some(EnumKind::Local { type_name, .. }) = kind else {
        return;
    };

    for (what, value) in [("biz_type", &ann.biz_type), ("proto_type", &ann.proto_type)] {
        if let Some(value) = value.as_deref().filter(|v| *v != type_name.as_str()) {
            err!(
                errs,
                "enum field '{}' cannot override its {what} with '{value}'; its type is the generated enum {type_name}",
                raw.name
            );
        }
    }
}

fn proto_type(raw: &RawField, kind: Option<&EnumKind>, ann: &Annotation) -> (String, bool) {
    if let Some(explicit) = &ann.proto_type {
        return (explicit.clone(), true);
    }

    let name = match kind {
        Some(EnumKind::Local { type_name, .. }) => type_name.as_str(),
        Some(EnumKind::External { .. }) => "string",
        None if raw.primitive == Primitive::List => raw
            .item
            .unwrap_or(Primitive::Text)
            .proto_type()
            .unwrap_or("string"),
        None => raw.primitive.proto_type().unwrap_or("string"),
    };

    (name.to_string(), false)
}

fn parse_type(text: &str, what: &str, errs: &mut ErrorTree) -> Option<syn::Type> {
    match syn::parse_str::<syn::Type>(text) {
        Ok(ty) => Some(ty),
        Err(e) => {
            err!(errs, "{what} '{text}' is not a valid Rust type: {e}");
            None
        }
    }
}
