//! Raw graph handed over by the graph supplier.
//!
//! These types carry no resolved information. Annotations stay an opaque
//! string-keyed bag until adaptation decodes them once.

use crate::{
    annotation::{self, Annotation},
    prelude::*,
};
use std::collections::BTreeMap;

/// Opaque per-element configuration bag.
pub type AnnotationBag = BTreeMap<String, serde_json::Value>;

///
/// RawGraph
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

impl RawGraph {
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[must_use]
    pub fn node(mut self, node: RawNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

///
/// RawNode
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawNode {
    pub name: String,
    pub id: RawField,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    // node has no storage table; only domain and wire layers exist
    #[serde(default)]
    pub skip_storage: bool,

    #[serde(default)]
    pub fields: Vec<RawField>,

    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl RawNode {
    #[must_use]
    pub fn new(name: impl Into<String>, id: RawField) -> Self {
        Self {
            name: name.into(),
            id,
            comment: None,
            skip_storage: false,
            fields: Vec::new(),
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: RawField) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn edge(mut self, edge: RawEdge) -> Self {
        self.edges.push(edge);
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub const fn skip_storage(mut self) -> Self {
        self.skip_storage = true;
        self
    }
}

///
/// RawField
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawField {
    pub name: String,
    pub primitive: Primitive,

    // element type of a List
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Primitive>,

    #[serde(default)]
    pub optional: bool,

    // storage holds an Option
    #[serde(default)]
    pub nillable: bool,

    #[serde(default)]
    pub sensitive: bool,

    // declared enum literals, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    // externally defined enum type path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<String>,

    // Rust type backing a Json field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: AnnotationBag,
}

impl RawField {
    #[must_use]
    pub fn new(name: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            name: name.into(),
            primitive,
            item: None,
            optional: false,
            nillable: false,
            sensitive: false,
            enum_values: Vec::new(),
            enum_type: None,
            rust_type: None,
            comment: None,
            annotations: AnnotationBag::new(),
        }
    }

    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut field = Self::new(name, Primitive::Enum);
        field.enum_values = literals.into_iter().map(Into::into).collect();

        field
    }

    #[must_use]
    pub fn list(name: impl Into<String>, item: Primitive) -> Self {
        let mut field = Self::new(name, Primitive::List);
        field.item = Some(item);

        field
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub const fn nillable(mut self) -> Self {
        self.nillable = true;
        self
    }

    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn external(mut self, path: impl Into<String>) -> Self {
        self.enum_type = Some(path.into());
        self
    }

    #[must_use]
    pub fn rust_type(mut self, ty: impl Into<String>) -> Self {
        self.rust_type = Some(ty.into());
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        annotation::attach(&mut self.annotations, annotation);
        self
    }
}

///
/// RawEdge
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawEdge {
    pub name: String,
    pub target: String,

    #[serde(default)]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: AnnotationBag,
}

impl RawEdge {
    #[must_use]
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            unique: false,
            inverse: None,
            comment: None,
            annotations: AnnotationBag::new(),
        }
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn inverse(mut self, edge: impl Into<String>) -> Self {
        self.inverse = Some(edge.into());
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        annotation::attach(&mut self.annotations, annotation);
        self
    }
}
