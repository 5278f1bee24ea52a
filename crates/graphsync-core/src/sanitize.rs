//! Structural name sanitization.
//!
//! Labels and relationship types cannot be bound as query parameters, so they
//! are interpolated into query text. Every caller-controlled name must pass
//! through here first: the result only ever contains ASCII alphanumerics and
//! underscores.

use crate::model::{DEFAULT_NODE_LABEL, DEFAULT_RELATION};

/// Whether `c` belongs to the identifier-safe set.
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Restrict `raw` to the identifier-safe set. Spaces and hyphens become
/// underscores, every other disallowed character is removed.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('_'),
            c if is_identifier_char(c) => Some(c),
            _ => None,
        })
        .collect()
}

/// Node label from a record `type`, defaulting to `UnknownNode`.
pub fn node_label(raw: &str) -> String {
    let label = sanitize_identifier(raw);
    if label.is_empty() {
        DEFAULT_NODE_LABEL.to_string()
    } else {
        label
    }
}

/// Relationship type from a relation label: uppercased, `REL_`-prefixed
/// when it would start with a digit, `RELATED_TO` when nothing survives.
pub fn relation_type(raw: &str) -> String {
    let rel = sanitize_identifier(raw).to_ascii_uppercase();
    if rel.is_empty() {
        DEFAULT_RELATION.to_string()
    } else if rel.starts_with(|c: char| c.is_ascii_digit()) {
        format!("REL_{}", rel)
    } else {
        rel
    }
}

/// Accept a property key only if it is entirely identifier-safe.
///
/// Keys are rejected rather than rewritten so two distinct attributes can
/// never collapse onto the same property.
pub fn property_key(raw: &str) -> Option<&str> {
    (!raw.is_empty() && raw.chars().all(is_identifier_char)).then_some(raw)
}

/// Back-tick quote an already sanitized name for interpolation.
pub fn quoted(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("person"), "person");
        assert_eq!(sanitize_identifier("works at"), "works_at");
        assert_eq!(sanitize_identifier("a-b"), "a_b");
        assert_eq!(sanitize_identifier("x`) DETACH DELETE n //"), "x_DETACH_DELETE_n_");
        assert_eq!(sanitize_identifier("Café"), "Caf");
    }

    #[test]
    fn test_node_label_default() {
        assert_eq!(node_label("company"), "company");
        assert_eq!(node_label(""), "UnknownNode");
        assert_eq!(node_label("!!!"), "UnknownNode");
    }

    #[test]
    fn test_relation_type_rules() {
        assert_eq!(relation_type("works_at"), "WORKS_AT");
        assert_eq!(relation_type("Works At"), "WORKS_AT");
        assert_eq!(relation_type("2nd_degree"), "REL_2ND_DEGREE");
        assert_eq!(relation_type(""), "RELATED_TO");
        assert_eq!(relation_type("$$"), "RELATED_TO");
    }

    #[test]
    fn test_property_key_rejects_unsafe() {
        assert_eq!(property_key("name"), Some("name"));
        assert_eq!(property_key("birth_date2"), Some("birth_date2"));
        assert_eq!(property_key("full name"), None);
        assert_eq!(property_key("a.b"), None);
        assert_eq!(property_key(""), None);
    }

    #[test]
    fn test_quoted_escapes_backticks() {
        assert_eq!(quoted("person"), "`person`");
        assert_eq!(quoted("a`b"), "`a``b`");
    }
}
