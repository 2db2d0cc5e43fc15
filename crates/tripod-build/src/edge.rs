//! Edge representation: the wire field and the domain conversions for each
//! of the nine proto/biz combinations, per direction.

use crate::{
    Error,
    config::Paths,
    convert::{
        Chain, Conversion, Fragment, Layer, Operand, Route, Shape, field, reshape, setup_var,
    },
};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use tripod_schema::{naming, node::message_name, prelude::*};

///
/// WireEdge
/// how an edge appears in one message
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WireEdge {
    pub ty: String,
    pub repeated: bool,
    pub optional: bool,
}

/// Wire field of an edge, `None` when the direction excludes it.
#[must_use]
pub fn wire_edge(edge: &Edge, direction: Direction) -> Option<WireEdge> {
    let many = edge.cardinality().is_many();

    match edge.strategy(direction).proto {
        EdgeProto::Message => Some(WireEdge {
            ty: message_name(edge.target(), direction),
            repeated: many,
            optional: false,
        }),
        EdgeProto::Id => Some(WireEdge {
            ty: edge.target_key().proto_type().to_string(),
            repeated: many,
            optional: !many,
        }),
        EdgeProto::Excluded => None,
    }
}

/// Domain members an edge produces, input direction first, deduplicated.
#[must_use]
pub fn domain_members(edge: &Edge) -> Vec<(&str, EdgeBiz)> {
    let mut members: Vec<(&str, EdgeBiz)> = Vec::with_capacity(2);

    for direction in Direction::ALL {
        let biz = edge.strategy(direction).biz;
        let name = edge.biz_name(direction);
        if biz.is_excluded() || members.iter().any(|(n, _)| *n == name) {
            continue;
        }
        members.push((name, biz));
    }

    members
}

///
/// EdgeResolver
///

pub struct EdgeResolver<'a> {
    graph: &'a Graph,
    paths: &'a Paths,
}

impl<'a> EdgeResolver<'a> {
    #[must_use]
    pub const fn new(graph: &'a Graph, paths: &'a Paths) -> Self {
        Self { graph, paths }
    }

    /// Fragments an edge contributes to a mapper. Storage writes never
    /// touch edges; loaded edges are read-only.
    pub fn fragments(&self, node: &Node, edge: &Edge, route: Route) -> Result<Vec<Fragment>, Error> {
        let fragments = match route {
            Route::StorageToDomain => self.storage_to_domain(node, edge)?,
            Route::DomainToStorage => Vec::new(),
            Route::DomainToWire => self.domain_to_wire(edge).into_iter().collect(),
            Route::WireToDomain => self.wire_to_domain(edge).into_iter().collect(),
        };

        Ok(fragments)
    }

    fn id_kind(&self, edge: &Edge, layer: Layer) -> crate::convert::Kind {
        let key = edge.target_key();
        field::kind(key.node(), key.id(), layer, self.paths)
    }

    fn domain_to_wire(&self, edge: &Edge) -> Option<Fragment> {
        let wire = wire_edge(edge, Direction::Out)?;
        let strategy = edge.strategy(Direction::Out);
        let member = edge.proto_name(Direction::Out).to_string();
        let label = edge.biz_name(Direction::Out);
        let source_ident = naming::ident(label);
        let source = quote!(src.#source_ident);
        let var = setup_var(&member);
        let many = wire.repeated;

        let conversion = match (strategy.proto, strategy.biz) {
            (EdgeProto::Message, EdgeBiz::Pointer) => {
                let mapper = Route::DomainToWire.fn_ident(&naming::snake(edge.target()));
                nested(&source, many, &quote!(#mapper), Nest::Unboxed, label, &var)
            }
            (EdgeProto::Id, EdgeBiz::Pointer) => {
                let chain = Chain::between(
                    &self.id_kind(edge, Layer::Domain),
                    &self.id_kind(edge, Layer::Wire),
                );
                let id = naming::ident(edge.target_key().biz_name());
                let t = format_ident!("t");
                let body = chain.render(Operand::Place(quote!(#t.#id)), label);
                project(&source, many, &t, &body, chain.is_fallible(), &var)
            }
            (EdgeProto::Id, EdgeBiz::IdOnly) => {
                let chain = Chain::between(
                    &self.id_kind(edge, Layer::Domain),
                    &self.id_kind(edge, Layer::Wire),
                );
                let shape = container(many);
                reshape(&source, shape, shape, &chain, label, &var)
            }
            // excluded domain side, or the rejected id-only/message pair
            _ => Conversion::default_value(),
        };

        Some(Fragment {
            member,
            route: Route::DomainToWire,
            conversion,
        })
    }

    fn wire_to_domain(&self, edge: &Edge) -> Option<Fragment> {
        let strategy = edge.strategy(Direction::In);
        if strategy.biz.is_excluded() {
            return None;
        }

        let member = edge.biz_name(Direction::In).to_string();
        let label = edge.proto_name(Direction::In);
        let source_ident = naming::ident(label);
        let source = quote!(src.#source_ident);
        let var = setup_var(&member);
        let many = edge.cardinality().is_many();

        // wire ids are validated against the storage type on the way in
        let id_chain = || {
            Chain::between(
                &self.id_kind(edge, Layer::Wire),
                &self.id_kind(edge, Layer::Storage),
            )
            .then(
                &self.id_kind(edge, Layer::Storage),
                &self.id_kind(edge, Layer::Domain),
            )
        };

        let conversion = match (strategy.proto, strategy.biz) {
            (EdgeProto::Message, EdgeBiz::Pointer) => {
                let mapper = Route::WireToDomain.fn_ident(&naming::snake(edge.target()));
                nested(&source, many, &quote!(#mapper), Nest::Boxed, label, &var)
            }
            (EdgeProto::Id, EdgeBiz::Pointer) => {
                let chain = id_chain();
                let v = format_ident!("v");
                let id = chain.render(Operand::Ref(v.clone()), label);
                let stub = self.stub(edge, &id, many);
                project(&source, many, &v, &stub, chain.is_fallible(), &var)
            }
            (EdgeProto::Id, EdgeBiz::IdOnly) => {
                let shape = container(many);
                reshape(&source, shape, shape, &id_chain(), label, &var)
            }
            _ => Conversion::default_value(),
        };

        Some(Fragment {
            member,
            route: Route::WireToDomain,
            conversion,
        })
    }

    fn storage_to_domain(&self, node: &Node, edge: &Edge) -> Result<Vec<Fragment>, Error> {
        let members = domain_members(edge);
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let target_stored = self.graph.get(edge.target()).is_some_and(Node::has_storage);
        if !target_stored {
            return Err(Error::Codegen {
                node: node.name().to_string(),
                message: format!(
                    "edge '{}' is loaded from storage but '{}' has no storage representation",
                    edge.name(),
                    edge.target()
                ),
            });
        }

        let edge_ident = naming::ident(edge.name());
        let source = quote!(src.edges.#edge_ident);
        let label = edge.name();
        let many = edge.cardinality().is_many();

        let fragments = members
            .into_iter()
            .map(|(name, biz)| {
                let var = setup_var(name);
                let conversion = match biz {
                    EdgeBiz::Pointer => {
                        let mapper =
                            Route::StorageToDomain.fn_ident(&naming::snake(edge.target()));
                        nested(&source, many, &quote!(#mapper), Nest::Reboxed, label, &var)
                    }
                    EdgeBiz::IdOnly => {
                        let chain = Chain::between(
                            &self.id_kind(edge, Layer::Storage),
                            &self.id_kind(edge, Layer::Domain),
                        );
                        let id = naming::ident(edge.target_key().id().name());
                        let t = format_ident!("t");
                        let body = chain.render(Operand::Place(quote!(#t.#id)), label);
                        project(&source, many, &t, &body, chain.is_fallible(), &var)
                    }
                    EdgeBiz::Excluded => Conversion::default_value(),
                };

                Fragment {
                    member: name.to_string(),
                    route: Route::StorageToDomain,
                    conversion,
                }
            })
            .collect();

        Ok(fragments)
    }

    /// Domain object holding only the identifier; the rest is defaulted.
    fn stub(&self, edge: &Edge, id: &TokenStream, many: bool) -> TokenStream {
        let domain = &self.paths.domain;
        let target = naming::ident(edge.target());
        let id_member = naming::ident(edge.target_key().biz_name());
        let value = quote! {
            #domain::#target {
                #id_member: #id,
                ..::std::default::Default::default()
            }
        };

        if many {
            value
        } else {
            quote!(::std::boxed::Box::new(#value))
        }
    }
}

const fn container(many: bool) -> Shape {
    if many { Shape::Repeated } else { Shape::Optional }
}

///
/// Nest
/// how a unique nested value is held on each side of a mapper call
///

#[derive(Clone, Copy)]
enum Nest {
    /// boxed source, plain target (domain to wire)
    Unboxed,
    /// plain source, boxed target (wire to domain)
    Boxed,
    /// boxed on both sides (loaded storage edges)
    Reboxed,
}

// Nested mapper call over a loaded or nested edge.
fn nested(
    source: &TokenStream,
    many: bool,
    mapper: &TokenStream,
    nest: Nest,
    label: &str,
    var: &Ident,
) -> Conversion {
    let expr = if many {
        quote! {
            #source
                .iter()
                .map(#mapper)
                .collect::<::std::result::Result<::std::vec::Vec<_>, _>>()
                .map_err(|e| e.within(#label))?
        }
    } else {
        let (access, map) = match nest {
            Nest::Unboxed => (quote!(as_deref), quote!(#mapper)),
            Nest::Boxed => (
                quote!(as_ref),
                quote!(|t| #mapper(t).map(::std::boxed::Box::new)),
            ),
            Nest::Reboxed => (
                quote!(as_deref),
                quote!(|t| #mapper(t).map(::std::boxed::Box::new)),
            ),
        };
        quote! {
            #source
                .#access()
                .map(#map)
                .transpose()
                .map_err(|e| e.within(#label))?
        }
    };

    Conversion::TwoPhase {
        setup: quote!(let #var = #expr;),
        usage: quote!(#var),
    }
}

// Map each element of an edge container through `body`, which reads the
// element through `binding`.
fn project(
    source: &TokenStream,
    many: bool,
    binding: &Ident,
    body: &TokenStream,
    fallible: bool,
    var: &Ident,
) -> Conversion {
    let closure = if fallible {
        quote!(|#binding| -> ::std::result::Result<_, ConvertError> { Ok(#body) })
    } else {
        quote!(|#binding| #body)
    };

    let expr = match (many, fallible) {
        (true, true) => quote! {
            #source
                .iter()
                .map(#closure)
                .collect::<::std::result::Result<::std::vec::Vec<_>, _>>()?
        },
        (true, false) => quote!(#source.iter().map(#closure).collect()),
        (false, true) => quote!(#source.as_ref().map(#closure).transpose()?),
        (false, false) => quote!(#source.as_ref().map(#closure)),
    };

    if fallible {
        Conversion::TwoPhase {
            setup: quote!(let #var = #expr;),
            usage: quote!(#var),
        }
    } else {
        Conversion::Expr(expr)
    }
}
