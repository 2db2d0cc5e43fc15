use crate::{annotation::Annotation, prelude::*};

///
/// Edge
///

#[derive(Clone, Debug)]
pub struct Edge {
    pub(crate) name: String,
    pub(crate) target: String,
    pub(crate) cardinality: Cardinality,
    pub(crate) inverse: Option<String>,
    pub(crate) comment: Option<String>,
    pub(crate) annotation: Option<Annotation>,
    pub(crate) strategy_in: EdgeStrategy,
    pub(crate) strategy_out: EdgeStrategy,
    pub(crate) biz_names: [String; 2],
    pub(crate) proto_names: [String; 2],
    pub(crate) target_key: TargetKey,
    pub(crate) tag: Option<u32>,
    pub(crate) validation: Option<String>,
}

const fn slot(direction: Direction) -> usize {
    match direction {
        Direction::In => 0,
        Direction::Out => 1,
    }
}

impl Edge {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target node name; the graph may be cyclic so this is a relation only.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    #[must_use]
    pub const fn is_unique(&self) -> bool {
        !self.cardinality.is_many()
    }

    #[must_use]
    pub fn inverse(&self) -> Option<&str> {
        self.inverse.as_deref()
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[must_use]
    pub const fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    #[must_use]
    pub const fn strategy(&self, direction: Direction) -> EdgeStrategy {
        match direction {
            Direction::In => self.strategy_in,
            Direction::Out => self.strategy_out,
        }
    }

    /// Domain member name under this direction's strategy.
    #[must_use]
    pub fn biz_name(&self, direction: Direction) -> &str {
        &self.biz_names[slot(direction)]
    }

    /// Wire field name under this direction's strategy.
    #[must_use]
    pub fn proto_name(&self, direction: Direction) -> &str {
        &self.proto_names[slot(direction)]
    }

    #[must_use]
    pub const fn target_key(&self) -> &TargetKey {
        &self.target_key
    }

    #[must_use]
    pub const fn tag(&self) -> Option<u32> {
        self.tag
    }

    #[must_use]
    pub fn validation(&self) -> Option<&str> {
        self.validation.as_deref()
    }

    #[must_use]
    pub fn on_wire(&self, direction: Direction) -> bool {
        !self.strategy(direction).proto.is_excluded()
    }
}

///
/// TargetKey
/// identifier of the edge target, copied at adaptation time
///

#[derive(Clone, Debug)]
pub struct TargetKey {
    pub(crate) node: String,
    pub(crate) id: Field,
}

impl TargetKey {
    /// Target node name.
    #[must_use]
    pub fn node(&self) -> &str {
        &self.node
    }

    /// The target's resolved identifier field.
    #[must_use]
    pub const fn id(&self) -> &Field {
        &self.id
    }

    #[must_use]
    pub const fn primitive(&self) -> Primitive {
        self.id.primitive
    }

    #[must_use]
    pub fn biz_name(&self) -> &str {
        &self.id.biz_name
    }

    #[must_use]
    pub fn proto_type(&self) -> &str {
        &self.id.proto_type
    }
}
