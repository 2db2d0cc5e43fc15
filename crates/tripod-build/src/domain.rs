//! Domain struct and enum definitions.

use crate::{config::Paths, edge::domain_members};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use tripod_schema::{naming, prelude::*};

///
/// DomainModel
///

#[derive(Clone, Debug)]
pub struct DomainModel {
    pub name: String,
    pub comment: Option<String>,
    pub fields: Vec<DomainField>,
    pub enums: Vec<DomainEnum>,
}

///
/// DomainField
///
/// `ty` is the member type without the `Option` that `pointer` adds.
///

#[derive(Clone, Debug)]
pub struct DomainField {
    pub name: String,
    pub ty: TokenStream,
    pub pointer: bool,
    pub member: Member,
}

///
/// Member
/// what a domain field is sourced from
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Member {
    Field,
    Edge(EdgeBiz),
}

///
/// DomainEnum
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DomainEnum {
    pub name: String,
    pub variants: Vec<String>,
}

impl DomainModel {
    #[must_use]
    pub fn new(node: &Node, paths: &Paths) -> Self {
        let mut fields: Vec<DomainField> = node
            .all_fields()
            .filter(|field| field.has_domain_member())
            .map(|field| {
                let ty = field.biz_type();
                DomainField {
                    name: field.biz_name().to_string(),
                    ty: quote!(#ty),
                    pointer: field.is_domain_pointer() && !field.is_list(),
                    member: Member::Field,
                }
            })
            .collect();

        for edge in node.edges() {
            fields.extend(edge_fields(edge, paths));
        }

        let enums = node
            .all_fields()
            .filter_map(|field| match field.enum_kind() {
                Some(EnumKind::Local {
                    type_name, literals, ..
                }) => Some(DomainEnum {
                    name: type_name.clone(),
                    variants: literals.iter().map(|l| naming::pascal(l)).collect(),
                }),
                _ => None,
            })
            .collect();

        Self {
            name: node.name().to_string(),
            comment: node.comment().map(str::to_string),
            fields,
            enums,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&DomainField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn edge_fields(edge: &Edge, paths: &Paths) -> Vec<DomainField> {
    let domain = &paths.domain;
    let many = edge.cardinality().is_many();
    let target = naming::ident(edge.target());

    let id_ty = edge.target_key().id().biz_type();

    domain_members(edge)
        .into_iter()
        .map(|(name, biz)| {
            let element = match biz {
                EdgeBiz::IdOnly => quote!(#id_ty),
                _ => quote!(#domain::#target),
            };
            let ty = match (many, biz) {
                (true, _) => quote!(::std::vec::Vec<#element>),
                (false, EdgeBiz::IdOnly) => element,
                (false, _) => quote!(::std::boxed::Box<#element>),
            };

            DomainField {
                name: name.to_string(),
                ty,
                pointer: !many,
                member: Member::Edge(biz),
            }
        })
        .collect()
}

impl ToTokens for DomainField {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let name = naming::ident(&self.name);
        let ty = &self.ty;

        tokens.extend(if self.pointer {
            quote!(pub #name: ::std::option::Option<#ty>,)
        } else {
            quote!(pub #name: #ty,)
        });
    }
}

impl ToTokens for DomainEnum {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let name = naming::ident(&self.name);
        let variants = self.variants.iter().enumerate().map(|(i, v)| {
            let v = naming::ident(v);
            if i == 0 {
                quote!(#[default] #v)
            } else {
                quote!(#v)
            }
        });

        tokens.extend(quote! {
            #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
            pub enum #name {
                #(#variants,)*
            }
        });
    }
}

impl ToTokens for DomainModel {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let name = naming::ident(&self.name);
        let fields = &self.fields;
        let enums = &self.enums;
        let doc = self.comment.as_deref().map(|c| quote!(#[doc = #c]));

        tokens.extend(quote! {
            #(#enums)*

            #doc
            #[derive(Clone, Debug, Default)]
            pub struct #name {
                #(#fields)*
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripod_schema::{
        adapt,
        annotation::Annotation,
        raw::{RawEdge, RawField, RawGraph, RawNode},
    };

    fn model(raw: &RawGraph, node: &str) -> DomainModel {
        let graph = adapt(raw).expect("graph");
        let paths = crate::config::Config::default().paths().expect("paths");

        DomainModel::new(graph.get(node).expect("node"), &paths)
    }

    fn graph() -> RawGraph {
        RawGraph::new()
            .node(
                RawNode::new("User", RawField::new("id", Primitive::Uuid))
                    .field(RawField::new("nickname", Primitive::Text).optional())
                    .field(RawField::list("tags", Primitive::Text).optional())
                    .field(RawField::enumeration("status", ["active", "banned"])),
            )
            .node(
                RawNode::new("Post", RawField::new("id", Primitive::Uuid))
                    .edge(
                        RawEdge::new("author", "User").unique().annotate(
                            Annotation::new().with_edge_strategies(
                                EdgeStrategy::new(EdgeProto::Id, EdgeBiz::IdOnly),
                                EdgeStrategy::new(EdgeProto::Message, EdgeBiz::Pointer),
                            ),
                        ),
                    )
                    .edge(RawEdge::new("readers", "User")),
            )
    }

    #[test]
    fn optional_scalars_become_options_but_lists_do_not() {
        let user = model(&graph(), "User");

        assert!(user.field("nickname").is_some_and(|f| f.pointer));
        assert!(user.field("tags").is_some_and(|f| !f.pointer));
        assert!(user.field("id").is_some_and(|f| !f.pointer));
    }

    #[test]
    fn enums_default_to_the_first_literal() {
        let user = model(&graph(), "User");
        assert_eq!(
            user.enums,
            [DomainEnum {
                name: "UserStatus".to_string(),
                variants: vec!["Active".to_string(), "Banned".to_string()],
            }]
        );

        let out = user.to_token_stream().to_string();
        assert!(out.contains("# [default] Active , Banned"));
        assert!(out.contains("pub status : UserStatus"));
    }

    #[test]
    fn edges_expand_per_domain_member() {
        let post = model(&graph(), "Post");

        let author_id = post.field("author_id").expect("id member");
        assert_eq!(author_id.member, Member::Edge(EdgeBiz::IdOnly));
        assert!(author_id.pointer);

        let author = post.field("author").expect("pointer member");
        assert_eq!(
            author.ty.to_string(),
            ":: std :: boxed :: Box < crate :: domain :: User >"
        );

        let readers = post.field("readers").expect("readers");
        assert!(!readers.pointer);
        assert_eq!(
            readers.ty.to_string(),
            ":: std :: vec :: Vec < crate :: domain :: User >"
        );
    }

    #[test]
    fn structs_derive_default() {
        let out = model(&graph(), "Post").to_token_stream().to_string();

        assert!(out.contains("# [derive (Clone , Debug , Default)] pub struct Post"));
        assert!(out.contains(
            "pub author_id : :: std :: option :: Option < :: std :: string :: String >"
        ));
    }
}
