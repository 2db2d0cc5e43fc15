//! Identifier helpers shared by adaptation, validation and codegen.

use convert_case::{Case, Casing};
use proc_macro2::{Ident, Span};

// cannot be written as raw identifiers
const RESERVED: [&str; 5] = ["_", "crate", "self", "Self", "super"];

/// `[A-Za-z_][A-Za-z0-9_]*`, excluding names that cannot be identifiers at all.
#[must_use]
pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED.contains(&s)
}

/// Rust keyword (strict or reserved) that must be emitted as `r#name`.
#[must_use]
pub fn is_keyword(s: &str) -> bool {
    is_ident(s) && syn::parse_str::<syn::Ident>(s).is_err()
}

/// Identifier for generated code, raw when the name is a keyword.
/// Callers pass names that already satisfy [`is_ident`].
#[must_use]
pub fn ident(s: &str) -> Ident {
    if is_keyword(s) {
        Ident::new_raw(s, Span::call_site())
    } else {
        Ident::new(s, Span::call_site())
    }
}

/// snake_case, leaving names that are already lower snake untouched
#[must_use]
pub fn snake(s: &str) -> String {
    if s
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        s.to_string()
    } else {
        s.to_case(Case::Snake)
    }
}

#[must_use]
pub fn pascal(s: &str) -> String {
    s.to_case(Case::UpperCamel)
}

#[must_use]
pub fn upper_snake(s: &str) -> String {
    s.to_case(Case::UpperSnake)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_checked_lexically() {
        assert!(is_ident("co_authors"));
        assert!(is_ident("_hidden"));
        assert!(!is_ident(""));
        assert!(!is_ident("2fa"));
        assert!(!is_ident("first-name"));
        assert!(!is_ident("self"));
    }

    #[test]
    fn keywords_become_raw_identifiers() {
        assert!(is_keyword("type"));
        assert!(!is_keyword("kind"));
        assert_eq!(ident("type").to_string(), "r#type");
        assert_eq!(ident("kind").to_string(), "kind");
    }

    #[test]
    fn snake_keeps_existing_snake_names() {
        assert_eq!(snake("address2"), "address2");
        assert_eq!(snake("CreatedAt"), "created_at");
        assert_eq!(pascal("co_authors"), "CoAuthors");
        assert_eq!(upper_snake("UserStatus"), "USER_STATUS");
    }
}
