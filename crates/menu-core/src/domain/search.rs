//! Tree search: find menu entries by label or link at any depth.
//!
//! Large menus are tedious to scan by hand in the drag-and-drop editor.
//! [`search`] walks the whole tree in menu order (parents before their
//! children) and returns every node whose searchable fields contain the query,
//! together with the chain of ancestors that leads to it.

use serde::Serialize;

use crate::domain::tree::{FieldValue, MenuNode, MenuTree};

/// Fields whose string values are matched against the query.
pub const SEARCHABLE_FIELDS: [&str; 4] = ["label", "title", "link", "path"];

/// Name used in an ancestor path for a node that has none of the name fields.
const UNNAMED: &str = "(unnamed)";

/// One match returned by [`search`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// The matching node, including its own children.
    pub node: MenuNode,
    /// Display names of the ancestors, outermost first.  Empty for a
    /// top-level node.
    pub path: Vec<String>,
    /// Position of the node: one sibling index per level, outermost first.
    pub indices: Vec<usize>,
}

/// Returns every node whose [`SEARCHABLE_FIELDS`] contain `query`,
/// compared case-insensitively.
///
/// A query that is empty after trimming matches nothing.
///
/// # Examples
///
/// ```rust
/// use menu_core::{search, MenuNode, MenuTree};
///
/// let tree = MenuTree::from(vec![MenuNode::new()
///     .with("label", "Docs")
///     .with_children(vec![MenuNode::new().with("label", "Install guide")])]);
///
/// let hits = search(&tree, "install");
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].path, vec!["Docs".to_string()]);
/// assert_eq!(hits[0].indices, vec![0, 0]);
/// ```
pub fn search(tree: &MenuTree, query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    let mut path = Vec::new();
    let mut indices = Vec::new();
    walk(tree.nodes(), &needle, &mut path, &mut indices, &mut hits);
    hits
}

fn walk(
    nodes: &[MenuNode],
    needle: &str,
    path: &mut Vec<String>,
    indices: &mut Vec<usize>,
    hits: &mut Vec<SearchHit>,
) {
    for (i, node) in nodes.iter().enumerate() {
        indices.push(i);

        if matches(node, needle) {
            hits.push(SearchHit {
                node: node.clone(),
                path: path.clone(),
                indices: indices.clone(),
            });
        }

        let children = node.children();
        if !children.is_empty() {
            path.push(node.display_name().unwrap_or(UNNAMED).to_string());
            walk(children, needle, path, indices, hits);
            path.pop();
        }

        indices.pop();
    }
}

fn matches(node: &MenuNode, needle: &str) -> bool {
    node.fields().any(|(key, value)| {
        SEARCHABLE_FIELDS.contains(&key)
            && matches!(value, FieldValue::Scalar(s) if s
                .as_str()
                .is_some_and(|text| text.to_lowercase().contains(needle)))
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
