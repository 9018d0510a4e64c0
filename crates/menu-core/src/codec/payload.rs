//! JSON payload codec.
//!
//! The browser's nested-sortable widget serialises the edited tree into a JSON
//! array of items, each item an object whose `children` array holds its
//! sub-items.  [`decode_payload`] turns that text into a [`MenuTree`], applying
//! the node schema on the way in; [`encode_payload`] is the inverse, used when
//! the tree is sent back to the browser.

use serde_json::error::Category;
use thiserror::Error;

use crate::domain::tree::MenuTree;

/// Errors produced while decoding the browser payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not well-formed JSON.
    #[error("menu payload is not well-formed JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The JSON is well-formed but does not describe a menu tree (e.g. an item
    /// is not an object, a key is repeated, or a field nests an object).
    #[error("menu payload does not describe a menu tree: {0}")]
    Schema(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => DecodeError::Schema(err),
            Category::Syntax | Category::Eof | Category::Io => DecodeError::Malformed(err),
        }
    }
}

/// Decodes the JSON text posted by the browser.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] for invalid JSON and
/// [`DecodeError::Schema`] when the JSON breaks the menu schema.  In both cases
/// the caller must reject the save without touching the stored document.
///
/// # Examples
///
/// ```rust
/// use menu_core::decode_payload;
///
/// let tree = decode_payload(r#"[{"label":"Home","link":"/","children":[]}]"#).unwrap();
/// assert_eq!(tree.len(), 1);
/// assert_eq!(tree.nodes()[0].label(), Some("Home"));
/// ```
pub fn decode_payload(raw: &str) -> Result<MenuTree, DecodeError> {
    Ok(serde_json::from_str(raw)?)
}

/// Encodes a tree as compact JSON in stored key order.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if serialisation fails.
pub fn encode_payload(tree: &MenuTree) -> Result<String, serde_json::Error> {
    serde_json::to_string(tree)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::{FieldValue, MenuNode, Scalar};

    #[test]
    fn test_decode_single_home_node() {
        // Arrange
        let raw = r#"[{"label":"Home","link":"/","children":[]}]"#;

        // Act
        let tree = decode_payload(raw).expect("decode");

        // Assert
        let node = &tree.nodes()[0];
        assert_eq!(node.label(), Some("Home"));
        assert_eq!(node.get_str("link"), Some("/"));
        assert_eq!(node.get("children"), Some(&FieldValue::Children(vec![])));
    }

    #[test]
    fn test_decode_truncated_json_is_malformed() {
        let err = decode_payload(r#"[{"label":"Home""#).expect_err("must fail");
        assert!(matches!(err, DecodeError::Malformed(_)), "{err:?}");
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        let err = decode_payload("not json at all").expect_err("must fail");
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_decode_object_at_top_level_is_schema_error() {
        let err = decode_payload(r#"{"label":"Home"}"#).expect_err("must fail");
        assert!(matches!(err, DecodeError::Schema(_)), "{err:?}");
    }

    #[test]
    fn test_decode_duplicate_key_is_schema_error() {
        let err = decode_payload(r#"[{"label":"a","label":"b"}]"#).expect_err("must fail");
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn test_encode_then_decode_reproduces_order() {
        // Arrange: siblings and keys in a deliberate, non-sorted order
        let tree = MenuTree::from(vec![
            MenuNode::new().with("link", "/z").with("label", "Zed"),
            MenuNode::new()
                .with("label", "Alpha")
                .with("id", 7_i64)
                .with_children(vec![MenuNode::new().with("label", "Child")]),
        ]);

        // Act
        let json = encode_payload(&tree).expect("encode");
        let decoded = decode_payload(&json).expect("decode");

        // Assert
        assert_eq!(decoded, tree);
        assert!(json.starts_with(r#"[{"link":"/z","label":"Zed"}"#), "{json}");
    }

    #[test]
    fn test_decode_keeps_numbers_and_booleans() {
        let tree = decode_payload(r#"[{"id":12,"enabled":false}]"#).expect("decode");
        let node = &tree.nodes()[0];
        assert_eq!(node.get("id"), Some(&FieldValue::Scalar(Scalar::Integer(12))));
        assert_eq!(node.get("enabled"), Some(&FieldValue::Scalar(Scalar::Bool(false))));
    }
}
