//! YAML document codec.
//!
//! The menu is stored as a YAML file that administrators may also edit by
//! hand.  The writer here is hand-rolled so the output is stable and readable:
//!
//! ```yaml
//! -
//!     label: Home
//!     link: /
//!     children: []
//! -
//!     label: Blog
//!     children:
//!         -
//!             label: Archive
//!             link: "/blog/archive: 2024"
//! ```
//!
//! - Indentation is [`INDENT`] (4) spaces per level, with no depth limit.
//! - Each item starts with a lone `-`; its fields follow one level deeper.
//! - Strings are written plain unless a YAML reader could mistake them for
//!   something else, in which case they are double-quoted.
//! - Output is a pure function of the tree: the same tree always yields the
//!   same bytes.
//!
//! Reading goes through `serde_yaml` and the same `Deserialize` impls used for
//! the JSON payload, so both directions enforce one schema.

use std::fmt::Write as _;

use thiserror::Error;

use crate::domain::tree::{FieldValue, MenuNode, MenuTree, Scalar};

/// Spaces per nesting level in the written document.
pub const INDENT: usize = 4;

/// Longest key written in the short `key: value` form.  YAML readers give up
/// on an implicit key after 1024 characters; longer keys are written as
/// explicit `? key` entries.
const MAX_IMPLICIT_KEY_LEN: usize = 1000;

/// Plain scalars that YAML 1.1 or 1.2 readers resolve to something other than
/// a string.  Compared case-insensitively.
const RESERVED_WORDS: [&str; 14] = [
    "null", "~", "true", "false", "yes", "no", "on", "off", "y", "n", ".inf", ".nan", "<<", "=",
];

/// Characters that cannot start a plain scalar.
const INDICATORS: [char; 21] = [
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
    '+', '.',
];

/// Errors produced while reading a YAML menu document.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The document is not YAML, or is YAML that breaks the menu schema.
    #[error("menu document cannot be read back: {0}")]
    Unreadable(#[from] serde_yaml::Error),

    /// The document parses, but into a different tree than the one that was
    /// encoded.
    #[error("menu document does not reproduce the tree it was encoded from")]
    RoundTripMismatch,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Serialises `tree` into the YAML document format described in the module
/// documentation.
///
/// # Examples
///
/// ```rust
/// use menu_core::{encode_document, MenuNode, MenuTree};
///
/// let tree = MenuTree::from(vec![MenuNode::new().with("label", "Home").with("link", "/")]);
/// assert_eq!(encode_document(&tree), "-\n    label: Home\n    link: /\n");
/// ```
pub fn encode_document(tree: &MenuTree) -> String {
    let mut out = String::new();
    if tree.is_empty() {
        out.push_str("[]\n");
    } else {
        write_sequence(&mut out, tree.nodes(), 0);
    }
    out
}

/// Parses a YAML menu document.
///
/// A document that holds nothing but whitespace, comments, or a document
/// marker is an empty menu.
///
/// # Errors
///
/// Returns [`ValidationError::Unreadable`] when the text is not YAML or breaks
/// the menu schema.
pub fn decode_document(text: &str) -> Result<MenuTree, ValidationError> {
    if is_blank_document(text) {
        return Ok(MenuTree::new());
    }
    Ok(serde_yaml::from_str(text)?)
}

/// Checks that `text` parses back into a menu tree.
///
/// This is the pre-commit guard for saves: a document that cannot be read
/// back must never be written.
///
/// # Errors
///
/// Same as [`decode_document`].
pub fn validate_document(text: &str) -> Result<(), ValidationError> {
    decode_document(text).map(|_| ())
}

/// Checks that `text` parses back into exactly `tree`.
///
/// # Errors
///
/// Returns [`ValidationError::Unreadable`] if the text does not parse and
/// [`ValidationError::RoundTripMismatch`] if it parses into a different tree.
pub fn verify_round_trip(tree: &MenuTree, text: &str) -> Result<(), ValidationError> {
    let decoded = decode_document(text)?;
    if decoded == *tree {
        Ok(())
    } else {
        tracing::debug!(
            expected_nodes = tree.node_count(),
            decoded_nodes = decoded.node_count(),
            "menu document round-trip mismatch"
        );
        Err(ValidationError::RoundTripMismatch)
    }
}

// ── Writer ────────────────────────────────────────────────────────────────────

fn write_sequence(out: &mut String, nodes: &[MenuNode], depth: usize) {
    for node in nodes {
        push_indent(out, depth);
        if node.is_empty() {
            out.push_str("- {}\n");
        } else {
            out.push_str("-\n");
            write_mapping(out, node, depth + 1);
        }
    }
}

fn write_mapping(out: &mut String, node: &MenuNode, depth: usize) {
    for (key, value) in node.fields() {
        let key = format_string(key);
        push_indent(out, depth);
        if key.len() > MAX_IMPLICIT_KEY_LEN {
            // `? key` on its own line, then `: value` at the same indent.
            out.push_str("? ");
            out.push_str(&key);
            out.push('\n');
            push_indent(out, depth);
        } else {
            out.push_str(&key);
        }
        out.push(':');
        match value {
            FieldValue::Scalar(scalar) => {
                out.push(' ');
                out.push_str(&format_scalar(scalar));
                out.push('\n');
            }
            FieldValue::Children(children) if children.is_empty() => out.push_str(" []\n"),
            FieldValue::Children(children) => {
                out.push('\n');
                write_sequence(out, children, depth + 1);
            }
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat(' ').take(depth * INDENT));
}

fn format_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(f) => format_float(*f),
        Scalar::String(s) => format_string(s),
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        return ".nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { ".inf" } else { "-.inf" }.to_string();
    }
    // `Display` gives the shortest text that reads back as the same f64, but
    // drops the fraction for whole numbers; keep one so YAML sees a float.
    let text = f.to_string();
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

fn format_string(s: &str) -> String {
    if needs_quotes(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

/// Returns `true` when `s` cannot be written as a plain YAML scalar without
/// changing its meaning.
fn needs_quotes(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };

    if first.is_whitespace() || s.ends_with(char::is_whitespace) {
        return true;
    }
    if first.is_ascii_digit() || INDICATORS.contains(&first) {
        return true;
    }
    if RESERVED_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w)) {
        return true;
    }
    if s.parse::<f64>().is_ok() {
        // Catches "inf", "NaN", "infinity" and friends.
        return true;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return true;
    }
    s.chars().any(needs_escape)
}

/// Characters that may not appear unescaped in a YAML scalar.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{85}' | '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}')
}

/// Writes `s` as a double-quoted YAML scalar.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if needs_escape(c) => {
                let code = c as u32;
                // Writing to a String cannot fail.
                let _ = if code <= 0xFF {
                    write!(out, "\\x{code:02X}")
                } else {
                    write!(out, "\\u{code:04X}")
                };
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn home_tree() -> MenuTree {
        MenuTree::from(vec![MenuNode::new()
            .with("label", "Home")
            .with("link", "/")
            .with_children(vec![])])
    }

    #[test]
    fn test_encode_empty_tree_is_empty_sequence() {
        assert_eq!(encode_document(&MenuTree::new()), "[]\n");
    }

    #[test]
    fn test_encode_uses_four_space_indentation() {
        // Arrange
        let tree = MenuTree::from(vec![MenuNode::new()
            .with("label", "Blog")
            .with_children(vec![MenuNode::new().with("label", "Archive")])]);

        // Act
        let text = encode_document(&tree);

        // Assert
        let expected = "-\n    label: Blog\n    children:\n        -\n            label: Archive\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_encode_empty_children_and_empty_node() {
        let tree = MenuTree::from(vec![MenuNode::new(), home_tree().into_nodes().remove(0)]);
        let text = encode_document(&tree);
        assert_eq!(text, "- {}\n-\n    label: Home\n    link: /\n    children: []\n");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let tree = home_tree();
        assert_eq!(encode_document(&tree), encode_document(&tree));
    }

    #[test]
    fn test_decode_empty_and_comment_only_documents() {
        assert!(decode_document("").expect("empty").is_empty());
        assert!(decode_document("# nothing yet\n---\n").expect("comment").is_empty());
        assert!(decode_document("[]\n").expect("flow").is_empty());
    }

    #[test]
    fn test_decode_hand_written_two_space_document() {
        // Hand-edited files need not follow the writer's layout.
        let text = "- label: Home\n  link: /\n- label: About\n  submenu:\n    - label: Team\n";
        let tree = decode_document(text).expect("decode");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.nodes()[1].children()[0].label(), Some("Team"));
    }

    #[test]
    fn test_decode_rejects_invalid_yaml() {
        let err = decode_document("- label: [unclosed\n").expect_err("must fail");
        assert!(matches!(err, ValidationError::Unreadable(_)));
    }

    #[test]
    fn test_decode_rejects_mapping_at_top_level() {
        assert!(decode_document("main:\n  - label: Home\n").is_err());
    }

    #[test]
    fn test_validate_rejects_document_with_duplicate_keys() {
        let mut node = MenuNode::new();
        node.push_field("label", "one");
        node.push_field("label", "two");
        let text = encode_document(&MenuTree::from(vec![node]));
        assert!(validate_document(&text).is_err());
    }

    #[test]
    fn test_round_trip_home_tree() {
        let tree = home_tree();
        let text = encode_document(&tree);
        assert!(verify_round_trip(&tree, &text).is_ok());
    }

    #[test]
    fn test_verify_round_trip_detects_mismatch() {
        let tree = home_tree();
        let err = verify_round_trip(&tree, "- label: Elsewhere\n").expect_err("must differ");
        assert!(matches!(err, ValidationError::RoundTripMismatch));
    }

    #[test]
    fn test_plain_strings_stay_unquoted() {
        for s in ["Home", "/blog/archive", "Don't panic", "a#b", "Café", "x-y", "https://example.com"] {
            assert!(!needs_quotes(s), "{s:?} should be plain");
        }
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        for s in [
            "", " lead", "trail ", "true", "No", "null", "~", "123", "1.5", "-3", ".inf", "nan",
            "- item", "#hash", "key: value", "comment #x", "ends:", "*alias", "&anchor", "line\nbreak",
            "tab\there", "@at", "`tick", "<<",
        ] {
            assert!(needs_quotes(s), "{s:?} should be quoted");
        }
    }

    #[test]
    fn test_quote_escapes_specials() {
        assert_eq!(quote("say \"hi\"\\"), r#""say \"hi\"\\""#);
        assert_eq!(quote("a\nb\tc"), r#""a\nb\tc""#);
        assert_eq!(quote("\u{7}"), r#""\x07""#);
        assert_eq!(quote("\u{2028}"), r#""\u2028""#);
    }

    #[test]
    fn test_long_key_uses_explicit_form() {
        // Arrange
        let key = "k".repeat(1100);
        let tree = MenuTree::from(vec![MenuNode::new().with(key.as_str(), "v").with("label", "Home")]);

        // Act
        let text = encode_document(&tree);

        // Assert
        assert!(text.starts_with(&format!("-\n    ? {key}\n    : v\n    label: Home\n")), "{text}");
        assert!(verify_round_trip(&tree, &text).is_ok());
    }

    #[test]
    fn test_long_multibyte_key_in_nested_node_round_trips() {
        let key = "\u{e9}".repeat(600);
        let tree = MenuTree::from(vec![MenuNode::new()
            .with(key.as_str(), "parent")
            .with("children", FieldValue::Children(vec![MenuNode::new().with(key.as_str(), 1_i64)]))]);
        let text = encode_document(&tree);
        assert!(verify_round_trip(&tree, &text).is_ok(), "{text}");
    }

    #[test]
    fn test_nan_field_round_trips() {
        let tree = decode_document("- label: Home\n  weight: .nan\n").expect("decode");
        let text = encode_document(&tree);
        assert!(verify_round_trip(&tree, &text).is_ok());
    }

    #[test]
    fn test_format_float_keeps_fraction() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(f64::INFINITY), ".inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-.inf");
        assert_eq!(format_float(f64::NAN), ".nan");
    }
}
