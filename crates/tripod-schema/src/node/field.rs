use crate::{annotation::Annotation, prelude::*};
use convert_case::{Case, Casing};

///
/// Field
///

#[derive(Clone, Debug)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) primitive: Primitive,
    pub(crate) item: Option<Primitive>,
    pub(crate) optional: bool,
    pub(crate) nillable: bool,
    pub(crate) sensitive: bool,
    pub(crate) is_virtual: bool,
    pub(crate) is_id: bool,
    pub(crate) comment: Option<String>,
    pub(crate) annotation: Option<Annotation>,
    pub(crate) strategy_in: FieldStrategy,
    pub(crate) strategy_out: FieldStrategy,
    pub(crate) biz_name: String,
    pub(crate) proto_name: String,
    pub(crate) biz_type: syn::Type,
    pub(crate) biz_type_explicit: bool,
    pub(crate) proto_type: String,
    pub(crate) proto_type_explicit: bool,
    pub(crate) storage_type: syn::Type,
    pub(crate) enum_kind: Option<EnumKind>,
    pub(crate) tag: Option<u32>,
    pub(crate) validation: Option<String>,
}

impl Field {
    /// Storage name, as declared.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn primitive(&self) -> Primitive {
        self.primitive
    }

    /// Element primitive of a list field.
    #[must_use]
    pub const fn item(&self) -> Option<Primitive> {
        self.item
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Storage holds an `Option`.
    #[must_use]
    pub const fn is_nillable(&self) -> bool {
        self.nillable
    }

    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Exists in the domain and wire layers only.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    #[must_use]
    pub const fn is_id(&self) -> bool {
        self.is_id
    }

    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self.primitive, Primitive::List)
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Decoded annotation, if the bag carried one.
    #[must_use]
    pub const fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    #[must_use]
    pub const fn strategy(&self, direction: Direction) -> FieldStrategy {
        match direction {
            Direction::In => self.strategy_in,
            Direction::Out => self.strategy_out,
        }
    }

    #[must_use]
    pub fn biz_name(&self) -> &str {
        &self.biz_name
    }

    #[must_use]
    pub fn proto_name(&self) -> &str {
        &self.proto_name
    }

    /// Domain type without the pointer wrapper.
    #[must_use]
    pub const fn biz_type(&self) -> &syn::Type {
        &self.biz_type
    }

    #[must_use]
    pub const fn has_explicit_biz_type(&self) -> bool {
        self.biz_type_explicit
    }

    /// Wire type name; for lists this is the element type.
    #[must_use]
    pub fn proto_type(&self) -> &str {
        &self.proto_type
    }

    #[must_use]
    pub const fn has_explicit_proto_type(&self) -> bool {
        self.proto_type_explicit
    }

    /// Storage type without the nillable wrapper.
    /// Local enums are relative to the storage module.
    #[must_use]
    pub const fn storage_type(&self) -> &syn::Type {
        &self.storage_type
    }

    #[must_use]
    pub const fn enum_kind(&self) -> Option<&EnumKind> {
        self.enum_kind.as_ref()
    }

    #[must_use]
    pub const fn is_local_enum(&self) -> bool {
        matches!(self.enum_kind, Some(EnumKind::Local { .. }))
    }

    #[must_use]
    pub const fn is_external_enum(&self) -> bool {
        matches!(self.enum_kind, Some(EnumKind::External { .. }))
    }

    #[must_use]
    pub const fn tag(&self) -> Option<u32> {
        self.tag
    }

    /// Explicit validation rule text, unnormalized.
    #[must_use]
    pub fn validation(&self) -> Option<&str> {
        self.validation.as_deref()
    }

    /// The field is a UUID, either directly or as a list element.
    #[must_use]
    pub fn is_uuid(&self) -> bool {
        self.primitive == Primitive::Uuid || self.item == Some(Primitive::Uuid)
    }

    /// Either direction keeps a domain representation.
    #[must_use]
    pub fn has_domain_member(&self) -> bool {
        Direction::ALL
            .into_iter()
            .any(|d| !self.strategy(d).biz.is_excluded())
    }

    /// Domain field is an `Option` when either direction asks for a pointer.
    #[must_use]
    pub fn is_domain_pointer(&self) -> bool {
        Direction::ALL
            .into_iter()
            .any(|d| self.strategy(d).biz == FieldBiz::Pointer)
    }

    /// Present in the wire message for this direction.
    #[must_use]
    pub fn on_wire(&self, direction: Direction) -> bool {
        !self.strategy(direction).proto.is_excluded()
    }
}

///
/// EnumKind
///

#[derive(Clone, Debug)]
pub enum EnumKind {
    /// Synthesized as a wire enum named `<Node><Field>`.
    Local {
        type_name: String,
        literals: Vec<String>,
        values: Vec<EnumValue>,
    },

    /// Defined elsewhere; a plain string on the wire.
    External { ty: syn::Type },
}

impl EnumKind {
    /// Every declared literal, numbered or not.
    #[must_use]
    pub fn literals(&self) -> &[String] {
        match self {
            Self::Local { literals, .. } => literals,
            Self::External { .. } => &[],
        }
    }

    /// Literals that appear on the wire, with their numbers.
    #[must_use]
    pub fn values(&self) -> &[EnumValue] {
        match self {
            Self::Local { values, .. } => values,
            Self::External { .. } => &[],
        }
    }
}

///
/// EnumValue
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumValue {
    pub(crate) literal: String,
    pub(crate) number: i32,
}

impl EnumValue {
    #[must_use]
    pub fn literal(&self) -> &str {
        &self.literal
    }

    #[must_use]
    pub const fn number(&self) -> i32 {
        self.number
    }

    /// Rust variant name of the literal.
    #[must_use]
    pub fn variant(&self) -> String {
        self.literal.to_case(Case::UpperCamel)
    }
}
