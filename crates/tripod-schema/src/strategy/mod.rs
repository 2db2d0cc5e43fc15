//! Per-direction representation choices for fields and edges.
//!
//! A strategy is a pair of components, one per axis: how the member appears
//! on the wire (proto) and how it appears in the domain model (biz). The
//! typed pair cannot hold two choices on one axis, so the only place that
//! validation happens is where a legacy bitmask enters the system.


use crate::prelude::*;
use derive_more::Display;
use std::fmt;
use thiserror::Error as ThisError;

/// Proto sub-mask of the legacy bit layout.
pub const PROTO_MASK: u32 = 0x00FF;

/// Biz sub-mask of the legacy bit layout.
pub const BIZ_MASK: u32 = 0xFF00;

///
/// StrategyError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StrategyError {
    #[error("{axis} sub-mask {bits:#06x} has more than one representation bit set")]
    MultipleBits { axis: &'static str, bits: u32 },

    #[error("{axis} sub-mask {bits:#06x} does not name a known representation")]
    UnknownBit { axis: &'static str, bits: u32 },

    #[error("unknown {axis} representation '{name}'")]
    UnknownName { axis: &'static str, name: String },

    #[error("strategy bits {bits:#06x} fall outside the proto and biz sub-masks")]
    OutOfRange { bits: u32 },
}

///
/// Direction
/// In = wire to domain (Input message), Out = domain to wire (Output message)
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub const ALL: [Self; 2] = [Self::In, Self::Out];

    #[must_use]
    pub const fn is_in(self) -> bool {
        matches!(self, Self::In)
    }
}

///
/// Component
/// one axis of a strategy
///

pub trait Component: Copy + Eq + fmt::Debug + fmt::Display + Sized + 'static {
    /// Human-readable axis label used in errors.
    const AXIS: &'static str;

    /// Sub-mask this component's bits live in.
    const MASK: u32;

    const VARIANTS: [Self; 3];

    fn bit(self) -> u32;

    /// snake_case name accepted in named strategies
    fn name(self) -> &'static str;

    fn is_excluded(self) -> bool;

    /// Decode this axis from a legacy bitmask; zero means "not set".
    fn from_bits(bits: u32) -> Result<Option<Self>, StrategyError> {
        let masked = bits & Self::MASK;
        if masked == 0 {
            return Ok(None);
        }
        if masked.count_ones() > 1 {
            return Err(StrategyError::MultipleBits {
                axis: Self::AXIS,
                bits: masked,
            });
        }

        Self::VARIANTS
            .into_iter()
            .find(|c| c.bit() == masked)
            .map(Some)
            .ok_or(StrategyError::UnknownBit {
                axis: Self::AXIS,
                bits: masked,
            })
    }

    fn from_name(name: &str) -> Result<Self, StrategyError> {
        let wanted = normalize_name(name);

        Self::VARIANTS
            .into_iter()
            .find(|c| normalize_name(c.name()) == wanted)
            .ok_or_else(|| StrategyError::UnknownName {
                axis: Self::AXIS,
                name: name.to_string(),
            })
    }
}

// "id_only", "IdOnly" and "id-only" are the same name
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! component {
    (
        $(#[$meta:meta])*
        $name:ident, $axis:literal, $mask:expr,
        [$($variant:ident = $bit:expr, $label:literal),+ $(,)?],
        excluded = $excluded:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl Component for $name {
            const AXIS: &'static str = $axis;
            const MASK: u32 = $mask;
            const VARIANTS: [Self; 3] = [$(Self::$variant),+];

            fn bit(self) -> u32 {
                match self {
                    $(Self::$variant => $bit),+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn is_excluded(self) -> bool {
                matches!(self, Self::$excluded)
            }
        }
    };
}

component!(
    /// Wire representation of a field.
    FieldProto, "field proto", PROTO_MASK,
    [Required = 1 << 0, "required", Optional = 1 << 1, "optional", Excluded = 1 << 2, "excluded"],
    excluded = Excluded
);

component!(
    /// Domain representation of a field.
    FieldBiz, "field biz", BIZ_MASK,
    [Value = 1 << 8, "value", Pointer = 1 << 9, "pointer", Excluded = 1 << 10, "excluded"],
    excluded = Excluded
);

component!(
    /// Wire representation of an edge.
    EdgeProto, "edge proto", PROTO_MASK,
    [Message = 1 << 0, "message", Id = 1 << 1, "id", Excluded = 1 << 2, "excluded"],
    excluded = Excluded
);

component!(
    /// Domain representation of an edge.
    EdgeBiz, "edge biz", BIZ_MASK,
    [Pointer = 1 << 8, "pointer", IdOnly = 1 << 9, "id_only", Excluded = 1 << 10, "excluded"],
    excluded = Excluded
);

///
/// Strategy
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Strategy<P, B> {
    pub proto: P,
    pub biz: B,
}

pub type FieldStrategy = Strategy<FieldProto, FieldBiz>;

pub type EdgeStrategy = Strategy<EdgeProto, EdgeBiz>;

impl<P: Component, B: Component> Strategy<P, B> {
    #[must_use]
    pub const fn new(proto: P, biz: B) -> Self {
        Self { proto, biz }
    }

    /// Legacy bitmask form.
    #[must_use]
    pub fn bits(self) -> u32 {
        self.proto.bit() | self.biz.bit()
    }

    /// Every legal combination, proto-major.
    pub fn all() -> impl Iterator<Item = Self> {
        P::VARIANTS
            .into_iter()
            .flat_map(|proto| B::VARIANTS.into_iter().map(move |biz| Self::new(proto, biz)))
    }

    /// Neither the wire nor the domain carries the member.
    #[must_use]
    pub fn is_excluded(self) -> bool {
        self.proto.is_excluded() && self.biz.is_excluded()
    }
}

impl FieldStrategy {
    /// Default resolution when no explicit strategy applies.
    #[must_use]
    pub const fn default_for(direction: Direction, sensitive: bool, optional: bool) -> Self {
        if sensitive {
            return match direction {
                Direction::In => Self::new(FieldProto::Required, FieldBiz::Value),
                Direction::Out => Self::new(FieldProto::Excluded, FieldBiz::Excluded),
            };
        }
        if optional {
            return Self::new(FieldProto::Optional, FieldBiz::Pointer);
        }

        Self::new(FieldProto::Required, FieldBiz::Value)
    }
}

impl EdgeStrategy {
    #[must_use]
    pub const fn default_for(_direction: Direction) -> Self {
        Self::new(EdgeProto::Message, EdgeBiz::Pointer)
    }

    /// A flattened id-only domain field cannot source a nested message.
    #[must_use]
    pub const fn is_conflicting(self) -> bool {
        matches!(self.proto, EdgeProto::Message) && matches!(self.biz, EdgeBiz::IdOnly)
    }
}

impl<P: fmt::Display, B: fmt::Display> fmt::Display for Strategy<P, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.proto, self.biz)
    }
}

///
/// StrategyOverride
/// explicit, possibly partial, strategy from an annotation
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StrategyOverride<P, B> {
    pub proto: Option<P>,
    pub biz: Option<B>,
}

impl<P, B> Default for StrategyOverride<P, B> {
    fn default() -> Self {
        Self {
            proto: None,
            biz: None,
        }
    }
}

impl<P: Component, B: Component> StrategyOverride<P, B> {
    pub fn from_bits(bits: u32) -> Result<Self, StrategyError> {
        let stray = bits & !(P::MASK | B::MASK);
        if stray != 0 {
            return Err(StrategyError::OutOfRange { bits });
        }

        Ok(Self {
            proto: P::from_bits(bits)?,
            biz: B::from_bits(bits)?,
        })
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.proto.is_none() && self.biz.is_none()
    }

    /// Fill unset axes from `default`.
    #[must_use]
    pub fn resolve(self, default: Strategy<P, B>) -> Strategy<P, B> {
        Strategy::new(
            self.proto.unwrap_or(default.proto),
            self.biz.unwrap_or(default.biz),
        )
    }
}

impl<P: Component, B: Component> From<Strategy<P, B>> for StrategyOverride<P, B> {
    fn from(strategy: Strategy<P, B>) -> Self {
        Self {
            proto: Some(strategy.proto),
            biz: Some(strategy.biz),
        }
    }
}

///
/// RawStrategy
/// strategy as it appears in an annotation bag
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawStrategy {
    Bits(u32),
    Named {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proto: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        biz: Option<String>,
    },
}

impl RawStrategy {
    /// Zero bits or an empty named form.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        match self {
            Self::Bits(bits) => *bits == 0,
            Self::Named { proto, biz } => proto.is_none() && biz.is_none(),
        }
    }

    pub fn resolve<P: Component, B: Component>(
        &self,
    ) -> Result<StrategyOverride<P, B>, StrategyError> {
        match self {
            Self::Bits(bits) => StrategyOverride::from_bits(*bits),
            Self::Named { proto, biz } => Ok(StrategyOverride {
                proto: proto.as_deref().map(P::from_name).transpose()?,
                biz: biz.as_deref().map(B::from_name).transpose()?,
            }),
        }
    }
}

impl From<u32> for RawStrategy {
    fn from(bits: u32) -> Self {
        Self::Bits(bits)
    }
}

impl<P: Component, B: Component> From<Strategy<P, B>> for RawStrategy {
    fn from(strategy: Strategy<P, B>) -> Self {
        Self::Named {
            proto: Some(strategy.proto.name().to_string()),
            biz: Some(strategy.biz.name().to_string()),
        }
    }
}

/// Check a legacy field strategy bitmask.
pub fn validate_field_bits(bits: u32) -> Result<(), StrategyError> {
    StrategyOverride::<FieldProto, FieldBiz>::from_bits(bits).map(|_| ())
}

/// Check a legacy edge strategy bitmask.
pub fn validate_edge_bits(bits: u32) -> Result<(), StrategyError> {
    StrategyOverride::<EdgeProto, EdgeBiz>::from_bits(bits).map(|_| ())
}
