//! Validation rule bodies for Input message fields.
//!
//! A rule body is the part after the option name, eg. `.string.uuid = true`;
//! the renderer supplies `(buf.validate.field)` or `(validate.rules)`.

use tripod_schema::prelude::*;

pub const ENUM_DEFINED_ONLY: &str = ".enum.defined_only = true";
pub const UUID_STRING: &str = ".string.uuid = true";
pub const UUID_ITEMS: &str = ".repeated.items.string.uuid = true";

/// Rule family a rule body is wrapped with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Family<'a> {
    Scalar(&'a str),
    Enum,
    Timestamp,
    Message,
    Repeated,
}

impl Family<'_> {
    fn label(self) -> &'static str {
        match self {
            Self::Scalar(name) => scalar_label(name),
            Self::Enum => "enum",
            Self::Timestamp => "timestamp",
            Self::Message => "message",
            Self::Repeated => "repeated",
        }
    }
}

// label used by the validator for a scalar wire type
fn scalar_label(name: &str) -> &'static str {
    match name {
        "bool" => "bool",
        "bytes" => "bytes",
        "double" => "double",
        "fixed32" => "fixed32",
        "fixed64" => "fixed64",
        "float" => "float",
        "int32" => "int32",
        "int64" => "int64",
        "sfixed32" => "sfixed32",
        "sfixed64" => "sfixed64",
        "sint32" => "sint32",
        "sint64" => "sint64",
        "uint32" => "uint32",
        "uint64" => "uint64",
        _ => "string",
    }
}

/// Wire scalar type names understood by the validator.
#[must_use]
pub fn is_scalar(name: &str) -> bool {
    matches!(
        name,
        "bool"
            | "bytes"
            | "double"
            | "fixed32"
            | "fixed64"
            | "float"
            | "int32"
            | "int64"
            | "sfixed32"
            | "sfixed64"
            | "sint32"
            | "sint64"
            | "string"
            | "uint32"
            | "uint64"
    )
}

/// Family of a field's wire type.
#[must_use]
pub fn field_family(field: &Field) -> Family<'_> {
    if field.is_list() {
        Family::Repeated
    } else if field.is_local_enum() {
        Family::Enum
    } else {
        type_family(field.proto_type())
    }
}

#[must_use]
pub fn type_family(proto_type: &str) -> Family<'_> {
    if proto_type == PROTO_TIMESTAMP {
        Family::Timestamp
    } else if is_scalar(proto_type) {
        Family::Scalar(proto_type)
    } else {
        Family::Message
    }
}

/// The enum and UUID defaults win over explicit rule text.
#[must_use]
pub fn field_rules(field: &Field) -> String {
    if field.is_local_enum() {
        return ENUM_DEFINED_ONLY.to_string();
    }
    if field.is_uuid() && field.proto_type() == "string" {
        let rule = if field.is_list() { UUID_ITEMS } else { UUID_STRING };
        return rule.to_string();
    }

    field
        .validation()
        .filter(|t| !t.trim().is_empty())
        .map(|text| wrap(text, field_family(field)))
        .unwrap_or_default()
}

/// Rules for an edge carried on the Input message.
#[must_use]
pub fn edge_rules(edge: &Edge, direction: Direction) -> String {
    let proto = edge.strategy(direction).proto;
    let many = edge.cardinality().is_many();

    let key = edge.target_key();
    if proto == EdgeProto::Id && key.primitive() == Primitive::Uuid && key.proto_type() == "string"
    {
        let rule = if many { UUID_ITEMS } else { UUID_STRING };
        return rule.to_string();
    }

    let Some(text) = edge.validation().filter(|t| !t.trim().is_empty()) else {
        return String::new();
    };
    let family = match proto {
        _ if many => Family::Repeated,
        EdgeProto::Id => type_family(key.proto_type()),
        _ => Family::Message,
    };

    wrap(text, family)
}

/// Normalize explicit rule text and wrap it with its family, unless the
/// text is already a qualified body starting with `.`.
#[must_use]
pub fn wrap(text: &str, family: Family) -> String {
    let body = normalize(text);
    if body.starts_with('.') {
        return body;
    }

    format!(".{} = {{ {body} }}", family.label())
}

/// Canonical spacing: `key: value` and `a, b`, outside quoted strings.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut quote: Option<char> = None;
    let mut chars = text.trim().chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(open), _) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == open {
                    quote = None;
                }
            }
            (None, '"' | '\'') => {
                quote = Some(c);
                out.push(c);
            }
            (None, ':' | ',') => {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push(c);
                out.push(' ');
                while chars.peek() == Some(&' ') {
                    chars.next();
                }
            }
            (None, _) => out.push(c),
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_is_canonical() {
        assert_eq!(normalize("min_len:2,max_len :  20"), "min_len: 2, max_len: 20");
        assert_eq!(normalize("min_len: 2"), "min_len: 2");
    }

    #[test]
    fn quoted_text_is_untouched() {
        assert_eq!(
            normalize(r#"pattern:"^[a-z]:x,y$""#),
            r#"pattern: "^[a-z]:x,y$""#
        );
    }

    #[test]
    fn rules_are_wrapped_by_family() {
        assert_eq!(
            wrap("min_len:2", Family::Scalar("string")),
            ".string = { min_len: 2 }"
        );
        assert_eq!(
            wrap("gt:0", Family::Scalar("int64")),
            ".int64 = { gt: 0 }"
        );
        assert_eq!(
            wrap("min_items:1", Family::Repeated),
            ".repeated = { min_items: 1 }"
        );
        assert_eq!(wrap("required:true", Family::Message), ".message = { required: true }");
    }

    #[test]
    fn qualified_rules_pass_through() {
        assert_eq!(
            wrap(".string.email = true", Family::Scalar("string")),
            ".string.email = true"
        );
    }

    #[test]
    fn timestamp_and_custom_types_have_families() {
        assert_eq!(type_family(PROTO_TIMESTAMP), Family::Timestamp);
        assert_eq!(type_family("int32"), Family::Scalar("int32"));
        assert_eq!(type_family("common.Money"), Family::Message);
    }
}
