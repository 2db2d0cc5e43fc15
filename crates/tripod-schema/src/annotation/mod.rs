//! Typed view of the per-element annotation bag.
//!
//! Decoding is tolerant: unknown keys are ignored and a value of the wrong
//! shape falls back to the default with a warning. Strategy values are kept
//! raw here and resolved (and validated) by the adapter.

#[cfg(test)]
mod tests;

use crate::{prelude::*, raw::AnnotationBag, strategy::RawStrategy};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Bag key holding this crate's annotation, matched case-insensitively.
pub const ANNOTATION_KEY: &str = "tripod";

///
/// Annotation
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Annotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<BTreeMap<String, i32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub biz_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub biz_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proto_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proto_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proto_field_id: Option<u32>,

    #[serde(rename = "virtual", skip_serializing_if = "std::ops::Not::not")]
    pub is_virtual: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proto_validation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_in_strategy: Option<RawStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_out_strategy: Option<RawStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_in_strategy: Option<RawStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_out_strategy: Option<RawStrategy>,
}

impl Annotation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // builders
    //

    #[must_use]
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    #[must_use]
    pub fn with_biz_name(mut self, name: impl Into<String>) -> Self {
        self.biz_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_biz_type(mut self, ty: impl Into<String>) -> Self {
        self.biz_type = Some(ty.into());
        self
    }

    #[must_use]
    pub fn with_proto_name(mut self, name: impl Into<String>) -> Self {
        self.proto_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_proto_type(mut self, ty: impl Into<String>) -> Self {
        self.proto_type = Some(ty.into());
        self
    }

    #[must_use]
    pub const fn with_proto_field_id(mut self, id: u32) -> Self {
        self.proto_field_id = Some(id);
        self
    }

    #[must_use]
    pub const fn virtual_field(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    #[must_use]
    pub fn with_proto_validation(mut self, rule: impl Into<String>) -> Self {
        self.proto_validation = Some(rule.into());
        self
    }

    #[must_use]
    pub fn with_field_strategies(
        mut self,
        input: impl Into<RawStrategy>,
        output: impl Into<RawStrategy>,
    ) -> Self {
        self.field_in_strategy = Some(input.into());
        self.field_out_strategy = Some(output.into());
        self
    }

    #[must_use]
    pub fn with_edge_strategies(
        mut self,
        input: impl Into<RawStrategy>,
        output: impl Into<RawStrategy>,
    ) -> Self {
        self.edge_in_strategy = Some(input.into());
        self.edge_out_strategy = Some(output.into());
        self
    }

    //
    // merge
    //

    /// Field-by-field override: set values in `other` win over `self`.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        fn text(slot: &mut Option<String>, value: Option<String>) {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        }
        fn strategy(slot: &mut Option<RawStrategy>, value: Option<RawStrategy>) {
            if let Some(value) = value.filter(|v| !v.is_unset()) {
                *slot = Some(value);
            }
        }

        if other.enum_values.is_some() {
            self.enum_values = other.enum_values;
        }
        text(&mut self.biz_name, other.biz_name);
        text(&mut self.biz_type, other.biz_type);
        text(&mut self.proto_name, other.proto_name);
        text(&mut self.proto_type, other.proto_type);
        if let Some(id) = other.proto_field_id.filter(|id| *id != 0) {
            self.proto_field_id = Some(id);
        }
        self.is_virtual |= other.is_virtual;
        text(&mut self.proto_validation, other.proto_validation);
        strategy(&mut self.field_in_strategy, other.field_in_strategy);
        strategy(&mut self.field_out_strategy, other.field_out_strategy);
        strategy(&mut self.edge_in_strategy, other.edge_in_strategy);
        strategy(&mut self.edge_out_strategy, other.edge_out_strategy);

        self
    }

    //
    // bag conversion
    //

    /// Bag carrying this annotation under [`ANNOTATION_KEY`].
    #[must_use]
    pub fn into_bag(self) -> AnnotationBag {
        let mut bag = AnnotationBag::new();
        if let Ok(value) = serde_json::to_value(&self) {
            bag.insert(ANNOTATION_KEY.to_string(), value);
        }

        bag
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let reader = Reader { map };

        Self {
            enum_values: reader.enum_values(&["enum_values", "EnumValues"]),
            biz_name: reader.text(&["biz_name", "BizName"]),
            biz_type: reader.text(&["biz_type", "BizType"]),
            proto_name: reader.text(&["proto_name", "ProtoName"]),
            proto_type: reader.text(&["proto_type", "ProtoType"]),
            proto_field_id: reader
                .number(&["field_id", "proto_field_id", "ProtoFieldID"])
                .filter(|id| *id != 0),
            is_virtual: reader.flag(&["virtual", "Virtual"]),
            proto_validation: reader.text(&["proto_validation", "ProtoValidation"]),
            field_in_strategy: reader.strategy(&["field_in_strategy", "FieldInStrategy"]),
            field_out_strategy: reader.strategy(&["field_out_strategy", "FieldOutStrategy"]),
            edge_in_strategy: reader.strategy(&["edge_in_strategy", "EdgeInStrategy"]),
            edge_out_strategy: reader.strategy(&["edge_out_strategy", "EdgeOutStrategy"]),
        }
    }
}

/// Merge annotations in order; later ones override earlier ones.
#[must_use]
pub fn merge<I>(annotations: I) -> Annotation
where
    I: IntoIterator<Item = Annotation>,
{
    annotations
        .into_iter()
        .fold(Annotation::default(), Annotation::merge)
}

/// Decode the annotation from a raw bag; absent when no entry exists.
#[must_use]
pub fn decode(bag: &AnnotationBag) -> Option<Annotation> {
    let (key, value) = bag
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(ANNOTATION_KEY))?;

    match value {
        Value::Object(map) => Some(Annotation::from_map(map)),
        Value::Null => None,
        _ => {
            tracing::warn!(key = %key, "ignoring annotation entry that is not an object");
            None
        }
    }
}

/// Merge `annotation` into whatever the bag already carries.
pub fn attach(bag: &mut AnnotationBag, annotation: Annotation) {
    let merged = match decode(bag) {
        Some(previous) => previous.merge(annotation),
        None => annotation,
    };

    bag.retain(|key, _| !key.eq_ignore_ascii_case(ANNOTATION_KEY));
    bag.extend(merged.into_bag());
}

///
/// Reader
/// lenient key lookup over a decoded annotation object
///

struct Reader<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Reader<'a> {
    // first key that is present and non-null
    fn lookup(&self, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        keys.iter().find_map(|key| match self.map.get(*key) {
            None | Some(Value::Null) => None,
            Some(value) => Some((*key, value)),
        })
    }

    fn text(&self, keys: &[&'static str]) -> Option<String> {
        let (key, value) = self.lookup(keys)?;

        match value {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            _ => skip(key),
        }
    }

    fn flag(&self, keys: &[&'static str]) -> bool {
        match self.lookup(keys) {
            Some((_, Value::Bool(b))) => *b,
            Some((key, _)) => skip(key).unwrap_or(false),
            None => false,
        }
    }

    fn number(&self, keys: &[&'static str]) -> Option<u32> {
        let (key, value) = self.lookup(keys)?;

        as_u32(value).or_else(|| skip(key))
    }

    fn enum_values(&self, keys: &[&'static str]) -> Option<BTreeMap<String, i32>> {
        let (key, value) = self.lookup(keys)?;
        let Value::Object(entries) = value else {
            return skip(key);
        };

        let mut values = BTreeMap::new();
        for (literal, number) in entries {
            match as_i32(number) {
                Some(n) => {
                    values.insert(literal.clone(), n);
                }
                None => {
                    tracing::warn!(key, literal = %literal, "ignoring non-integer enum value");
                }
            }
        }

        Some(values)
    }

    fn strategy(&self, keys: &[&'static str]) -> Option<RawStrategy> {
        let (key, value) = self.lookup(keys)?;

        let strategy = match value {
            Value::Object(parts) => {
                let part = |name: &str| parts.get(name).and_then(Value::as_str).map(str::to_string);
                RawStrategy::Named {
                    proto: part("proto"),
                    biz: part("biz"),
                }
            }
            other => match as_u32(other) {
                Some(bits) => RawStrategy::Bits(bits),
                None => return skip(key),
            },
        };

        Some(strategy).filter(|s| !s.is_unset())
    }
}

fn skip<T>(key: &str) -> Option<T> {
    tracing::warn!(key, "ignoring annotation value of unexpected type");

    None
}

// integers may arrive as JSON floats
fn as_i64(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };

    n.as_i64().or_else(|| {
        let f = n.as_f64()?;
        #[allow(clippy::cast_possible_truncation)]
        let truncated = f as i64;
        #[allow(clippy::cast_precision_loss)]
        let exact = (truncated as f64 - f).abs() < f64::EPSILON;

        exact.then_some(truncated)
    })
}

fn as_u32(value: &Value) -> Option<u32> {
    as_i64(value).and_then(|n| u32::try_from(n).ok())
}

fn as_i32(value: &Value) -> Option<i32> {
    as_i64(value).and_then(|n| i32::try_from(n).ok())
}
