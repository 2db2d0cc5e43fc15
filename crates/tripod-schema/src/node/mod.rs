mod edge;
mod field;

pub use edge::*;
pub use field::*;

use crate::prelude::*;
use convert_case::{Case, Casing};

///
/// Graph
/// enriched, read-only IR produced by adaptation
///

#[derive(Clone, Debug, Default)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
}

impl Graph {
    /// Nodes sorted by name.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes
            .binary_search_by(|node| node.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.nodes[i])
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

///
/// Node
///

#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) comment: Option<String>,
    pub(crate) skip_storage: bool,
    pub(crate) id: Field,
    pub(crate) fields: Vec<Field>,
    pub(crate) edges: Vec<Edge>,
}

impl Node {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// snake_case form used for function and file names
    #[must_use]
    pub fn snake_name(&self) -> String {
        self.name.to_case(Case::Snake)
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// True when the node has a storage representation.
    #[must_use]
    pub const fn has_storage(&self) -> bool {
        !self.skip_storage
    }

    #[must_use]
    pub const fn id(&self) -> &Field {
        &self.id
    }

    /// Declared fields, identifier excluded.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Identifier first, then declared fields.
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        std::iter::once(&self.id).chain(self.fields.iter())
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.all_fields().find(|f| f.name == name)
    }

    #[must_use]
    pub fn edge(&self, name: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.name == name)
    }

    /// Enum-typed fields, local and external, in declaration order.
    pub fn enum_fields(&self) -> impl Iterator<Item = &Field> {
        self.all_fields().filter(|f| f.enum_kind.is_some())
    }

    /// Wire message names for each direction.
    #[must_use]
    pub fn message_name(&self, direction: Direction) -> String {
        message_name(&self.name, direction)
    }
}

/// Output messages take the node name, Input messages add a suffix.
#[must_use]
pub fn message_name(node: &str, direction: Direction) -> String {
    match direction {
        Direction::In => format!("{node}{INPUT_SUFFIX}"),
        Direction::Out => node.to_string(),
    }
}
