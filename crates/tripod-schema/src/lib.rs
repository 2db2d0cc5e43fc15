//! Typed schema IR for tripod: raw graph input, annotation decoding,
//! per-direction strategies and graph validation.

pub mod adapt;
pub mod annotation;
pub mod error;
pub mod naming;
pub mod node;
pub mod raw;
pub mod strategy;
pub mod types;
pub mod validate;

use std::ops::RangeInclusive;

/// Fully-qualified wire type of timestamp fields.
pub const PROTO_TIMESTAMP: &str = "google.protobuf.Timestamp";

/// Suffix of the wire-to-domain (Input) message name.
pub const INPUT_SUFFIX: &str = "Input";

/// Field numbers reserved by the protobuf implementation.
pub const RESERVED_TAGS: RangeInclusive<u32> = 19_000..=19_999;

/// Largest legal protobuf field number.
pub const MAX_TAG: u32 = 536_870_911;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use adapt::{AdaptError, adapt};

use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        INPUT_SUFFIX, MAX_TAG, PROTO_TIMESTAMP, RESERVED_TAGS, err,
        error::ErrorTree,
        node::*,
        strategy::{
            Component, Direction, EdgeBiz, EdgeProto, EdgeStrategy, FieldBiz, FieldProto,
            FieldStrategy, Strategy,
        },
        types::{Cardinality, Primitive},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Adapt(#[from] AdaptError),

    #[error(transparent)]
    Strategy(#[from] strategy::StrategyError),

    #[error("invalid raw graph: {0}")]
    RawGraph(#[from] serde_json::Error),
}
