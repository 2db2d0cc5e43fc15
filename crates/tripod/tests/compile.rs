//! Generated domain models and mappers compile against storage and wire
//! types shaped the way a storage layer and prost would shape them.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::path::PathBuf;
use tripod::{
    prelude::*,
    schema::{adapt, naming},
};

const FIXTURE: &str = include_str!("fixtures/graph.json");

// external enum referenced by the coverage graph
fn external_types() -> TokenStream {
    quote! {
        pub mod types {
            #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
            pub enum Kind {
                #[default]
                Basic,
                Premium,
            }

            impl ::std::fmt::Display for Kind {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    f.write_str(match self {
                        Self::Basic => "basic",
                        Self::Premium => "premium",
                    })
                }
            }

            impl ::std::str::FromStr for Kind {
                type Err = ::std::string::String;

                fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                    match s {
                        "basic" => Ok(Self::Basic),
                        "premium" => Ok(Self::Premium),
                        _ => Err(format!("unknown kind '{s}'")),
                    }
                }
            }
        }
    }
}

// storage rows: one struct per stored node, loaded edges under `edges`
fn storage_types(graph: &Graph) -> TokenStream {
    let mut tokens = quote!();

    for node in graph.nodes().iter().filter(|n| n.has_storage()) {
        let name = naming::ident(node.name());
        let edges_name = format_ident!("{}Edges", node.name());

        let fields = node.all_fields().filter(|f| !f.is_virtual()).map(|field| {
            let member = naming::ident(field.name());
            let ty = field.storage_type();
            if field.is_nillable() {
                quote!(pub #member: ::std::option::Option<#ty>,)
            } else {
                quote!(pub #member: #ty,)
            }
        });

        let edges = node
            .edges()
            .iter()
            .filter(|e| graph.get(e.target()).is_some_and(Node::has_storage))
            .map(|edge| {
                let member = naming::ident(edge.name());
                let target = naming::ident(edge.target());
                if edge.cardinality().is_many() {
                    quote!(pub #member: ::std::vec::Vec<#target>,)
                } else {
                    quote!(pub #member: ::std::option::Option<::std::boxed::Box<#target>>,)
                }
            });

        let enums = node.enum_fields().filter(|f| f.is_local_enum()).map(|field| {
            let enum_name = naming::ident(&naming::pascal(field.name()));
            let variants = field
                .enum_kind()
                .map(EnumKind::literals)
                .unwrap_or_default()
                .iter()
                .map(|literal| naming::ident(&naming::pascal(literal)));

            quote! {
                #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
                pub enum #enum_name {
                    #[default]
                    #(#variants,)*
                }
            }
        });
        let module = naming::ident(&node.snake_name());

        tokens.extend(quote! {
            #[derive(Clone, Debug, Default)]
            pub struct #name {
                #(#fields)*
                pub edges: #edges_name,
            }

            #[derive(Clone, Debug, Default)]
            pub struct #edges_name {
                #(#edges)*
            }

            pub mod #module {
                #(#enums)*
            }
        });
    }

    quote!(pub mod storage { #tokens })
}

// prost's rendering of a wire field
fn wire_field_type(file: &ProtoFile, field: &PbField) -> TokenStream {
    let (element, message) = match field.ty.as_str() {
        "bool" => (quote!(bool), false),
        "bytes" => (quote!(::std::vec::Vec<u8>), false),
        "double" => (quote!(f64), false),
        "float" => (quote!(f32), false),
        "int32" | "sint32" | "sfixed32" => (quote!(i32), false),
        "int64" | "sint64" | "sfixed64" => (quote!(i64), false),
        "uint32" | "fixed32" => (quote!(u32), false),
        "uint64" | "fixed64" => (quote!(u64), false),
        "string" => (quote!(::std::string::String), false),
        PROTO_TIMESTAMP => (quote!(::prost_types::Timestamp), true),
        ty if file.enumeration(ty).is_some() => (quote!(i32), false),
        ty => {
            let ty = naming::ident(ty);
            (quote!(#ty), true)
        }
    };

    if field.repeated {
        quote!(::std::vec::Vec<#element>)
    } else if message || field.optional {
        quote!(::std::option::Option<#element>)
    } else {
        element
    }
}

fn wire_types(files: &[ProtoFile]) -> TokenStream {
    let messages = files.iter().flat_map(|file| {
        file.messages().map(move |message| {
            let name = naming::ident(&message.name);
            let fields = message.fields.iter().map(|field| {
                let member = naming::ident(&field.name);
                let ty = wire_field_type(file, field);
                quote!(pub #member: #ty,)
            });

            quote! {
                #[derive(Clone, Debug, Default, PartialEq)]
                pub struct #name {
                    #(#fields)*
                }
            }
        })
    });

    quote!(pub mod wire { #(#messages)* })
}

// render one compilable crate root and hand back its path
fn write_crate(name: &str, raw: &RawGraph) -> PathBuf {
    let graph = match adapt(raw) {
        Ok(graph) => graph,
        Err(e) => panic!("{name} failed to adapt:\n{e}"),
    };
    let generation = match generate(raw, &Config::default()) {
        Ok(generation) => generation,
        Err(e) => panic!("{name} failed to generate:\n{e}"),
    };

    let types = external_types();
    let storage = storage_types(&graph);
    let wire = wire_types(&generation.files);
    let domain = generation.domain_tokens();
    let conversions = &generation.conversions;

    let tokens = quote! {
        #![allow(dead_code)]

        #types
        #storage
        #wire

        pub mod domain {
            #domain
        }

        pub mod convert {
            #conversions
        }

        fn main() {}
    };

    let file: syn::File = syn::parse2(tokens).expect("generated tokens should be valid Rust");
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(format!("{name}.rs"));
    std::fs::write(&path, prettyplease::unparse(&file)).expect("write generated crate");

    path
}

// every legal input/output pairing, once unique and once many
fn edge_matrix() -> RawGraph {
    let letters = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
    let strategies: Vec<_> = EdgeStrategy::all().collect();
    let mut hub = RawNode::new("Hub", RawField::new("id", Primitive::Uuid));

    for (i, input) in strategies.iter().enumerate() {
        for (j, output) in strategies.iter().enumerate() {
            if input.is_conflicting() || output.is_conflicting() {
                continue;
            }
            let annotation = Annotation::new().with_edge_strategies(*input, *output);
            let suffix = format!("{}_{}", letters[i], letters[j]);

            hub = hub
                .edge(
                    RawEdge::new(format!("one_{suffix}"), "User")
                        .unique()
                        .annotate(annotation.clone()),
                )
                .edge(RawEdge::new(format!("many_{suffix}"), "User").annotate(annotation));
        }
    }

    RawGraph::new()
        .node(
            RawNode::new("User", RawField::new("id", Primitive::Uuid))
                .field(RawField::new("name", Primitive::Text))
                .field(RawField::enumeration("status", ["active", "banned"])),
        )
        .node(hub)
}

fn scalar_matrix() -> RawGraph {
    RawGraph::new().node(
        RawNode::new("Account", RawField::new("id", Primitive::Int))
            .field(RawField::new("kind", Primitive::Enum).external("crate::types::Kind"))
            .field(
                RawField::new("seen_at", Primitive::Timestamp)
                    .annotate(Annotation::new().with_biz_type("::std::string::String")),
            )
            .field(
                RawField::new("born_at", Primitive::Timestamp)
                    .annotate(Annotation::new().with_biz_type("i64")),
            )
            .field(RawField::new("closed_at", Primitive::Timestamp).optional().nillable())
            .field(RawField::new("data", Primitive::Json))
            .field(RawField::list("owners", Primitive::Uuid))
            .field(RawField::new("referrer", Primitive::Uuid).nillable())
            .field(RawField::new("score", Primitive::Float32))
            .field(RawField::new("visits", Primitive::Uint64).optional())
            .field(RawField::enumeration("tier", ["free", "pro", "legacy"]).annotate(
                Annotation::new().with_enum_values([("free", 1), ("pro", 2)]),
            )),
    )
}

#[test]
fn generated_code_compiles() {
    let fixture = RawGraph::from_json(FIXTURE).expect("fixture json");

    let cases = trybuild::TestCases::new();
    cases.pass(write_crate("fixture", &fixture));
    cases.pass(write_crate("edge_matrix", &edge_matrix()));
    cases.pass(write_crate("scalar_matrix", &scalar_matrix()));
}
