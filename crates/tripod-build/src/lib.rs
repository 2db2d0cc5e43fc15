//! Descriptor, domain model and conversion synthesis over an adapted graph.

pub mod config;
pub mod convert;
pub mod domain;
pub mod edge;
pub mod proto;

pub use config::{Config, ConfigError, Mode, Paths, Validator};

use convert::mapper;
use domain::DomainModel;
use proc_macro2::TokenStream;
use proto::{ProtoBuilder, ProtoFile};
use quote::quote;
use thiserror::Error as ThisError;
use tracing::{debug, info_span};
use tripod_schema::node::Graph;

///
/// Error
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum Error {
    #[error("cannot generate '{node}': {message}")]
    Codegen { node: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] tripod_schema::Error),
}

///
/// Generation
/// everything one run produces
///

#[derive(Clone, Debug)]
pub struct Generation {
    pub files: Vec<ProtoFile>,
    pub domain: Vec<DomainModel>,
    pub conversions: TokenStream,
}

impl Generation {
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&ProtoFile> {
        self.files.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn domain_model(&self, name: &str) -> Option<&DomainModel> {
        self.domain.iter().find(|m| m.name == name)
    }

    /// Domain structs and enums as one token stream.
    #[must_use]
    pub fn domain_tokens(&self) -> TokenStream {
        let models = &self.domain;

        quote!(#(#models)*)
    }
}

// generate
/// Build every output for an adapted graph.
pub fn generate(graph: &Graph, config: &Config) -> Result<Generation, Error> {
    Builder::new(graph, config)?.generate()
}

///
/// Builder
///

pub struct Builder<'a> {
    graph: &'a Graph,
    config: &'a Config,
    paths: Paths,
}

impl<'a> Builder<'a> {
    /// Fails on an invalid config before anything is built.
    pub fn new(graph: &'a Graph, config: &'a Config) -> Result<Self, Error> {
        config.validate()?;
        let paths = config.paths()?;

        Ok(Self {
            graph,
            config,
            paths,
        })
    }

    pub fn generate(&self) -> Result<Generation, Error> {
        let files = {
            let _span = info_span!("proto").entered();
            ProtoBuilder::new(self.graph, self.config).build()?
        };

        let domain: Vec<_> = {
            let _span = info_span!("domain").entered();
            self.graph
                .nodes()
                .iter()
                .map(|node| DomainModel::new(node, &self.paths))
                .collect()
        };

        let conversions = {
            let _span = info_span!("conversions").entered();
            mapper::conversions(self.graph, &self.paths)?
        };

        debug!(
            files = files.len(),
            models = domain.len(),
            "generation complete"
        );

        Ok(Generation {
            files,
            domain,
            conversions,
        })
    }
}
