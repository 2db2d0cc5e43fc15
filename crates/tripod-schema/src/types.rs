use crate::prelude::*;
use derive_more::{Display, FromStr};
use proc_macro2::TokenStream;
use quote::quote;

///
/// Cardinality
///

#[derive(
    Clone, Copy, Default, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
pub enum Cardinality {
    #[default]
    One,
    Many,
}

impl Cardinality {
    #[must_use]
    pub const fn from_unique(unique: bool) -> Self {
        if unique { Self::One } else { Self::Many }
    }

    #[must_use]
    pub const fn is_many(self) -> bool {
        matches!(self, Self::Many)
    }
}

///
/// Primitive
/// semantic storage type of a field
///

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum Primitive {
    Bool,
    Bytes,
    Enum,
    Float32,
    Float64,
    Int,
    Int32,
    Int64,
    Json,
    List,
    Text,
    Timestamp,
    Uint64,
    Uuid,
}

impl Primitive {
    #[must_use]
    pub const fn supports_copy(self) -> bool {
        !matches!(
            self,
            Self::Bytes | Self::Enum | Self::Json | Self::List | Self::Text
        )
    }

    #[must_use]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::Int | Self::Int32 | Self::Int64 | Self::Uint64)
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_int() || self.is_float()
    }

    // valid as a list element
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::Enum | Self::Json | Self::List)
    }

    /// Storage-side Rust type for self-describing primitives.
    /// Enum and List need field context and return `None`.
    #[must_use]
    pub fn as_type(self) -> Option<TokenStream> {
        let ty = match self {
            Self::Bool => quote!(bool),
            Self::Bytes => quote!(::std::vec::Vec<u8>),
            Self::Float32 => quote!(f32),
            Self::Float64 => quote!(f64),
            Self::Int | Self::Int64 => quote!(i64),
            Self::Int32 => quote!(i32),
            Self::Json => quote!(::serde_json::Value),
            Self::Text => quote!(::std::string::String),
            Self::Timestamp => quote!(::chrono::DateTime<::chrono::Utc>),
            Self::Uint64 => quote!(u64),
            Self::Uuid => quote!(::uuid::Uuid),
            Self::Enum | Self::List => return None,
        };

        Some(ty)
    }

    /// Default wire (proto) scalar type name.
    #[must_use]
    pub const fn proto_type(self) -> Option<&'static str> {
        let name = match self {
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Int | Self::Int64 => "int64",
            Self::Int32 => "int32",
            Self::Json | Self::Text | Self::Uuid => "string",
            Self::Timestamp => PROTO_TIMESTAMP,
            Self::Uint64 => "uint64",
            Self::Enum | Self::List => return None,
        };

        Some(name)
    }
}
