//! Value kinds and the step chains that move a value between them.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

///
/// Layer
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Layer {
    Storage,
    Domain,
    Wire,
}

impl Layer {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Domain => "domain",
            Self::Wire => "wire",
        }
    }
}

///
/// Kind
/// what a single (element) value is, as far as conversion cares
///

#[derive(Clone, Debug)]
pub enum Kind {
    Bool,
    Bytes,
    DateTime,
    F32,
    F64,
    I32,
    I64,
    Json(TokenStream),
    String,
    Timestamp,
    U32,
    U64,
    Uuid,

    /// Externally defined enum; text on the wire.
    External(TokenStream),

    /// Synthesized enum; `prefix` names its conversion functions.
    LocalEnum { layer: Layer, prefix: String },

    /// Anything else; reached through `Into`.
    Other(TokenStream),
}

impl Kind {
    /// Classify a Rust type by its last path segment.
    #[must_use]
    pub fn classify(ty: &syn::Type) -> Self {
        let syn::Type::Path(path) = ty else {
            return Self::Other(quote!(#ty));
        };
        let Some(last) = path.path.segments.last() else {
            return Self::Other(quote!(#ty));
        };
        let in_serde_json = path.path.segments.iter().any(|s| s.ident == "serde_json");

        match last.ident.to_string().as_str() {
            "bool" => Self::Bool,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "String" => Self::String,
            "Uuid" => Self::Uuid,
            "DateTime" => Self::DateTime,
            "Timestamp" => Self::Timestamp,
            "Value" if in_serde_json => Self::Json(quote!(#ty)),
            "Vec" if element_type(ty).is_some_and(is_u8) => Self::Bytes,
            _ => Self::Other(quote!(#ty)),
        }
    }

    /// Wire kind of a proto type name.
    #[must_use]
    pub fn from_proto(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "bytes" => Self::Bytes,
            "double" => Self::F64,
            "float" => Self::F32,
            "int32" | "sint32" | "sfixed32" => Self::I32,
            "int64" | "sint64" | "sfixed64" => Self::I64,
            "uint32" | "fixed32" => Self::U32,
            "uint64" | "fixed64" => Self::U64,
            "string" => Self::String,
            "google.protobuf.Timestamp" => Self::Timestamp,
            _ => return None,
        };

        Some(kind)
    }

    #[must_use]
    pub const fn is_copy(&self) -> bool {
        match self {
            Self::Bool
            | Self::DateTime
            | Self::F32
            | Self::F64
            | Self::I32
            | Self::I64
            | Self::U32
            | Self::U64
            | Self::Uuid => true,
            Self::LocalEnum { layer, .. } => !matches!(layer, Layer::Storage),
            _ => false,
        }
    }

    const fn is_int(&self) -> bool {
        matches!(self, Self::I32 | Self::I64 | Self::U32 | Self::U64)
    }

    const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Json(a), Self::Json(b))
            | (Self::External(a), Self::External(b))
            | (Self::Other(a), Self::Other(b)) => a.to_string() == b.to_string(),
            (
                Self::LocalEnum { layer: a, prefix: p },
                Self::LocalEnum { layer: b, prefix: q },
            ) => a == b && p == q,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    fn primitive_tokens(&self) -> Option<TokenStream> {
        let ty = match self {
            Self::F32 => quote!(f32),
            Self::F64 => quote!(f64),
            Self::I32 => quote!(i32),
            Self::I64 => quote!(i64),
            Self::U32 => quote!(u32),
            Self::U64 => quote!(u64),
            _ => return None,
        };

        Some(ty)
    }
}

/// `T` of a `Vec<T>`.
#[must_use]
pub fn element_type(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != "Vec" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };

    args.args.iter().find_map(|arg| match arg {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

fn is_u8(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(p) if p.path.is_ident("u8"))
}

// lossless numeric widening
fn widens(from: &Kind, to: &Kind) -> bool {
    matches!(
        (from, to),
        (Kind::I32, Kind::I64 | Kind::F64)
            | (Kind::U32, Kind::I64 | Kind::U64 | Kind::F64)
            | (Kind::F32, Kind::F64)
    )
}

///
/// Step
/// one conversion hop
///

#[derive(Clone, Debug)]
pub enum Step {
    From(TokenStream),
    TryFrom(TokenStream),
    Cast(TokenStream),
    ToString,
    Parse(TokenStream),
    ParseUuid,
    ToRfc3339,
    ParseRfc3339,
    UnixSeconds,
    FromUnix,
    ToTimestamp,
    FromTimestamp,
    TimestampFromUnix,
    TimestampSeconds,
    JsonEncode,
    JsonDecode(TokenStream),
    EnumFn { name: Ident, by_ref: bool },
    Into,
}

impl Step {
    /// The step can fail at runtime and needs a setup statement.
    #[must_use]
    pub const fn is_fallible(&self) -> bool {
        matches!(
            self,
            Self::TryFrom(_)
                | Self::Parse(_)
                | Self::ParseUuid
                | Self::ParseRfc3339
                | Self::FromUnix
                | Self::FromTimestamp
                | Self::JsonEncode
                | Self::JsonDecode(_)
        )
    }

    /// Parses text; an empty string can stand for "absent".
    #[must_use]
    pub const fn parses_text(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::ParseUuid | Self::ParseRfc3339 | Self::JsonDecode(_)
        )
    }

    fn render(&self, input: &Operand, copy: bool) -> TokenStream {
        match self {
            Self::From(ty) => {
                let v = input.owned(copy);
                quote!(#ty::from(#v))
            }
            Self::TryFrom(ty) => {
                let v = input.owned(copy);
                quote!(#ty::try_from(#v))
            }
            Self::Cast(ty) => {
                let v = input.owned(copy);
                quote!((#v) as #ty)
            }
            Self::ToString => {
                let v = input.receiver();
                quote!(#v.to_string())
            }
            Self::Parse(ty) => {
                let v = input.receiver();
                quote!(#v.parse::<#ty>())
            }
            Self::ParseUuid => {
                let v = input.borrowed();
                quote!(::uuid::Uuid::parse_str(#v))
            }
            Self::ToRfc3339 => {
                let v = input.receiver();
                quote!(#v.to_rfc3339())
            }
            Self::ParseRfc3339 => {
                let v = input.borrowed();
                quote! {
                    ::chrono::DateTime::<::chrono::FixedOffset>::parse_from_rfc3339(#v)
                        .map(|t| t.with_timezone(&::chrono::Utc))
                }
            }
            Self::UnixSeconds => {
                let v = input.receiver();
                quote!(#v.timestamp())
            }
            Self::FromUnix => {
                let v = input.owned(copy);
                quote! {
                    ::chrono::DateTime::<::chrono::Utc>::from_timestamp(#v, 0)
                        .ok_or("unix timestamp out of range")
                }
            }
            Self::ToTimestamp => {
                let v = input.owned(copy);
                quote!(::prost_types::Timestamp::from(::std::time::SystemTime::from(#v)))
            }
            Self::FromTimestamp => {
                let v = input.owned(copy);
                quote! {
                    ::std::time::SystemTime::try_from(#v)
                        .map(::chrono::DateTime::<::chrono::Utc>::from)
                }
            }
            Self::TimestampFromUnix => {
                let v = input.owned(copy);
                quote!(::prost_types::Timestamp { seconds: #v, nanos: 0 })
            }
            Self::TimestampSeconds => {
                let v = input.receiver();
                quote!(#v.seconds)
            }
            Self::JsonEncode => {
                let v = input.borrowed();
                quote!(::serde_json::to_string(#v))
            }
            Self::JsonDecode(ty) => {
                let v = input.borrowed();
                quote!(::serde_json::from_str::<#ty>(#v))
            }
            Self::EnumFn { name, by_ref } => {
                let v = if *by_ref {
                    input.borrowed()
                } else {
                    input.owned(copy)
                };
                quote!(#name(#v))
            }
            Self::Into => {
                let v = input.owned(copy);
                quote!(::std::convert::Into::into(#v))
            }
        }
    }
}

///
/// Operand
/// how the value entering a step is reachable
///

#[derive(Clone, Debug)]
pub enum Operand {
    /// A place expression such as `src.name`.
    Place(TokenStream),

    /// A reference binding such as a closure argument.
    Ref(Ident),

    /// A temporary produced by a previous step.
    Owned(TokenStream),
}

impl Operand {
    #[must_use]
    pub fn owned(&self, copy: bool) -> TokenStream {
        match self {
            Self::Place(ts) if copy => quote!(#ts),
            Self::Place(ts) => quote!(#ts.clone()),
            Self::Ref(v) if copy => quote!(*#v),
            Self::Ref(v) => quote!(#v.clone()),
            Self::Owned(ts) => quote!(#ts),
        }
    }

    #[must_use]
    pub fn borrowed(&self) -> TokenStream {
        match self {
            Self::Place(ts) => quote!(&#ts),
            Self::Ref(v) => quote!(#v),
            Self::Owned(ts) => quote!(&(#ts)),
        }
    }

    #[must_use]
    pub fn receiver(&self) -> TokenStream {
        match self {
            Self::Place(ts) => quote!(#ts),
            Self::Ref(v) => quote!(#v),
            Self::Owned(ts) => quote!((#ts)),
        }
    }
}

///
/// Chain
/// the steps between two kinds, remembering each hop's input kind
///

#[derive(Clone, Debug)]
pub struct Chain {
    source: Kind,
    links: Vec<(Step, Kind)>,
}

impl Chain {
    #[must_use]
    pub fn between(from: &Kind, to: &Kind) -> Self {
        let links = plan(from, to)
            .into_iter()
            .map(|step| (step, from.clone()))
            .collect();

        Self {
            source: from.clone(),
            links,
        }
    }

    /// Append the hop from this chain's target to `to`.
    #[must_use]
    pub fn then(mut self, via: &Kind, to: &Kind) -> Self {
        self.links
            .extend(plan(via, to).into_iter().map(|step| (step, via.clone())));
        self
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.links.is_empty()
    }

    #[must_use]
    pub fn is_fallible(&self) -> bool {
        self.links.iter().any(|(step, _)| step.is_fallible())
    }

    #[must_use]
    pub fn starts_with_parse(&self) -> bool {
        self.links.first().is_some_and(|(step, _)| step.parses_text())
    }

    #[must_use]
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.links.iter().map(|(step, _)| step)
    }

    /// Render the chain; fallible hops propagate with `?`, so the result
    /// only belongs in a setup statement or a `Result`-returning closure.
    #[must_use]
    pub fn render(&self, input: Operand, label: &str) -> TokenStream {
        if self.links.is_empty() {
            return input.owned(self.source.is_copy());
        }

        let mut operand = input;
        for (step, kind) in &self.links {
            let mut ts = step.render(&operand, kind.is_copy());
            if step.is_fallible() {
                ts = quote!(#ts.map_err(|e| ConvertError::field(#label, e))?);
            }
            operand = Operand::Owned(ts);
        }

        operand.owned(false)
    }
}

// single-hop plan; unknown pairs fall back to `Into`
fn plan(from: &Kind, to: &Kind) -> Vec<Step> {
    use Kind as K;

    if from.same(to) {
        return Vec::new();
    }

    let step = match (from, to) {
        (K::LocalEnum { layer: a, prefix }, K::LocalEnum { layer: b, .. }) => Step::EnumFn {
            name: format_ident!("{prefix}_{}_to_{}", a.label(), b.label()),
            by_ref: !matches!(a, Layer::Wire),
        },
        (a, b) if widens(a, b) => Step::From(b.primitive_tokens().unwrap_or_default()),
        (a, b) if a.is_int() && b.is_int() => {
            Step::TryFrom(b.primitive_tokens().unwrap_or_default())
        }
        (a, b) if (a.is_int() || a.is_float()) && (b.is_int() || b.is_float()) => {
            Step::Cast(b.primitive_tokens().unwrap_or_default())
        }
        (K::Uuid | K::External(_) | K::Timestamp, K::String) => Step::ToString,
        (K::String, K::Uuid) => Step::ParseUuid,
        (K::String, K::External(ty)) => Step::Parse(ty.clone()),
        (K::DateTime, K::String) => Step::ToRfc3339,
        (K::String, K::DateTime) => Step::ParseRfc3339,
        (K::DateTime, K::I64) => Step::UnixSeconds,
        (K::I64, K::DateTime) => Step::FromUnix,
        (K::DateTime, K::Timestamp) => Step::ToTimestamp,
        (K::Timestamp, K::DateTime) => Step::FromTimestamp,
        (K::I64, K::Timestamp) => Step::TimestampFromUnix,
        (K::Timestamp, K::I64) => Step::TimestampSeconds,
        (K::String, K::Timestamp) => Step::Parse(quote!(::prost_types::Timestamp)),
        (K::Json(_), K::String) => Step::JsonEncode,
        (K::String, K::Json(ty)) => Step::JsonDecode(ty.clone()),
        _ => Step::Into,
    };

    vec![step]
}
