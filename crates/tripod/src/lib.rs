//! ## Crate layout
//! - `schema`: raw graph input, annotations, strategies and the adapted graph.
//! - `build`: wire descriptors, domain models and conversion synthesis.
//!
//! [`generate`] runs the whole pipeline: raw graph → adapted graph →
//! descriptors, domain structs and mapper functions.

pub use tripod_build as build;
pub use tripod_schema as schema;

pub use tripod_build::{Config, Error, Generation};

use tracing::info;
use tripod_schema::raw::RawGraph;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{Config, Error, Generation, generate, generate_json};
    pub use tripod_build::{
        Mode, Validator,
        domain::DomainModel,
        proto::{PbElement, PbEnum, PbField, PbMessage, ProtoFile},
    };
    pub use tripod_schema::{
        annotation::Annotation,
        prelude::*,
        raw::{RawEdge, RawField, RawGraph, RawNode},
    };
}

// generate
/// Adapt and validate a raw graph, then build every output.
pub fn generate(raw: &RawGraph, config: &Config) -> Result<Generation, Error> {
    info!(nodes = raw.nodes.len(), package = %config.package, "generation started");

    let graph = tripod_schema::adapt(raw).map_err(tripod_schema::Error::from)?;
    let generation = tripod_build::generate(&graph, config)?;

    info!(
        files = generation.files.len(),
        models = generation.domain.len(),
        "generation finished"
    );

    Ok(generation)
}

/// [`generate`] over a graph serialized as JSON.
pub fn generate_json(json: &str, config: &Config) -> Result<Generation, Error> {
    let raw = RawGraph::from_json(json).map_err(tripod_schema::Error::from)?;

    generate(&raw, config)
}

/// Descriptors as JSON for an external renderer.
pub fn descriptors_json(generation: &Generation) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&generation.files)
}
