use super::{Fragment, Route, enums::enum_fns, field::FieldConverter, support};
use crate::{Error, config::Paths, edge::EdgeResolver};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use tracing::debug;
use tripod_schema::{naming, prelude::*};

///
/// NodeMappers
/// the four mapper functions of one node, plus its enum conversions
///

pub struct NodeMappers<'a> {
    graph: &'a Graph,
    node: &'a Node,
    paths: &'a Paths,
}

impl<'a> NodeMappers<'a> {
    #[must_use]
    pub const fn new(graph: &'a Graph, node: &'a Node, paths: &'a Paths) -> Self {
        Self { graph, node, paths }
    }

    /// Routes this node gets a mapper for.
    pub fn routes(&self) -> impl Iterator<Item = Route> + '_ {
        Route::ALL
            .into_iter()
            .filter(|route| self.node.has_storage() || !route.touches_storage())
    }

    /// Member conversions along one route: identifier and fields first,
    /// then edges, in declaration order.
    pub fn fragments(&self, route: Route) -> Result<Vec<Fragment>, Error> {
        let fields = FieldConverter::new(self.node.name(), self.paths);
        let edges = EdgeResolver::new(self.graph, self.paths);

        let mut fragments: Vec<Fragment> = self
            .node
            .all_fields()
            .filter_map(|field| fields.fragment(field, route))
            .collect();

        for edge in self.node.edges() {
            fragments.extend(edges.fragments(self.node, edge, route)?);
        }

        Ok(fragments)
    }

    pub fn mapper(&self, route: Route) -> Result<TokenStream, Error> {
        let fragments = self.fragments(route)?;
        let name = route.fn_ident(&self.node.snake_name());
        let (from, to) = self.types(route);

        debug!(
            node = self.node.name(),
            mapper = %name,
            members = fragments.len(),
            "synthesized mapper"
        );

        let setups = fragments.iter().filter_map(|f| f.conversion.setup());
        let members = fragments.iter().map(|f| naming::ident(&f.member));
        let usages = fragments.iter().map(|f| f.conversion.usage());

        Ok(quote! {
            #[allow(clippy::needless_update, clippy::clone_on_copy, unused_variables)]
            pub fn #name(src: &#from) -> ::std::result::Result<#to, ConvertError> {
                #(#setups)*

                Ok(#to {
                    #( #members: #usages, )*
                    ..::std::default::Default::default()
                })
            }
        })
    }

    fn types(&self, route: Route) -> (TokenStream, TokenStream) {
        let Paths {
            storage,
            domain,
            wire,
        } = self.paths;
        let node = naming::ident(self.node.name());
        let input = format_ident!("{}", self.node.message_name(Direction::In));

        let storage = quote!(#storage::#node);
        let domain = quote!(#domain::#node);

        match route {
            Route::StorageToDomain => (storage, domain),
            Route::DomainToStorage => (domain, storage),
            Route::DomainToWire => (domain, quote!(#wire::#node)),
            Route::WireToDomain => (quote!(#wire::#input), domain),
        }
    }

    pub fn generate(&self) -> Result<TokenStream, Error> {
        let mut tokens = quote!();

        for field in self.node.all_fields() {
            tokens.extend(enum_fns(self.node, field, self.paths));
        }
        for route in self.routes() {
            tokens.extend(self.mapper(route)?);
        }

        Ok(tokens)
    }
}

/// The shared error type followed by every node's conversions.
pub fn conversions(graph: &Graph, paths: &Paths) -> Result<TokenStream, Error> {
    let mut tokens = support();

    for node in graph.nodes() {
        tokens.extend(NodeMappers::new(graph, node, paths).generate()?);
    }

    Ok(tokens)
}
