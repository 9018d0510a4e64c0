//! Menu tree domain entity.
//!
//! A [`MenuTree`] is the ordered list of top-level menu entries.  Each entry is
//! a [`MenuNode`]: an ordered list of `(key, value)` fields where the value is
//! either a scalar (label, link, icon, CSS class, …) or a nested list of child
//! nodes.
//!
//! The node keeps its fields in a `Vec` rather than a map because key order is
//! part of the data: the YAML file is edited by hand and must not be
//! reshuffled on every save.

use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Field names whose value is a list of child nodes.
///
/// `children` is what the drag-and-drop widget produces; `submenu` is what the
/// host CMS uses in its own menu file.  Whichever key was written is kept.
pub const CHILDREN_KEYS: [&str; 2] = ["children", "submenu"];

/// Returns `true` if `key` may hold a list of child nodes.
pub fn is_children_key(key: &str) -> bool {
    CHILDREN_KEYS.contains(&key)
}

/// A leaf value stored in a menu field.
///
/// Equality treats every NaN as equal to every other NaN, so a tree holding a
/// `.nan` field compares equal to itself after a document round trip.
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Integer(a), Scalar::Integer(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Scalar::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Scalar {
    /// Returns the string content if this scalar is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// The value half of a menu field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A single scalar such as a label or a link.
    Scalar(Scalar),
    /// An ordered list of child nodes.  Only valid under a [`CHILDREN_KEYS`] key.
    Children(Vec<MenuNode>),
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        FieldValue::Scalar(value)
    }
}

macro_rules! field_value_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

field_value_from_scalar!(&str, String, i64, f64, bool);

/// One entry of the menu.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuNode {
    fields: Vec<(String, FieldValue)>,
}

impl MenuNode {
    /// Creates a node with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MenuNode::set`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use menu_core::MenuNode;
    ///
    /// let node = MenuNode::new().with("label", "Home").with("link", "/");
    /// assert_eq!(node.label(), Some("Home"));
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder that sets the `children` field.
    pub fn with_children(self, children: Vec<MenuNode>) -> Self {
        self.with("children", FieldValue::Children(children))
    }

    /// Sets `key` to `value`, replacing the existing value in place (so the
    /// key keeps its position) or appending a new field at the end.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Appends a field without checking for an existing key.
    ///
    /// This can build nodes that break the unique-key rule; such a node is
    /// rejected when its encoded document is validated.
    pub fn push_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Returns the value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the value of `key` if it is a string scalar.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            FieldValue::Scalar(s) => s.as_str(),
            FieldValue::Children(_) => None,
        }
    }

    /// The `label` field.
    pub fn label(&self) -> Option<&str> {
        self.get_str("label")
    }

    /// The best human-readable name for this node: `label`, then `title`,
    /// then `link`, then `path`.
    pub fn display_name(&self) -> Option<&str> {
        ["label", "title", "link", "path"]
            .iter()
            .find_map(|key| self.get_str(key))
    }

    /// The child nodes, taken from the first children field.  Empty when the
    /// node has none.
    pub fn children(&self) -> &[MenuNode] {
        self.fields
            .iter()
            .find_map(|(_, v)| match v {
                FieldValue::Children(c) => Some(c.as_slice()),
                FieldValue::Scalar(_) => None,
            })
            .unwrap_or(&[])
    }

    /// Iterates over the fields in their stored order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when the node has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The full menu: an ordered list of top-level nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
}

impl MenuTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level nodes in menu order.
    pub fn nodes(&self) -> &[MenuNode] {
        &self.nodes
    }

    /// Appends a top-level node.
    pub fn push(&mut self, node: MenuNode) {
        self.nodes.push(node);
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of nodes at every depth.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[MenuNode]) -> usize {
            nodes.iter().map(|n| 1 + count(n.children())).sum()
        }
        count(&self.nodes)
    }

    /// Consumes the tree and returns its top-level nodes.
    pub fn into_nodes(self) -> Vec<MenuNode> {
        self.nodes
    }
}

impl From<Vec<MenuNode>> for MenuTree {
    fn from(nodes: Vec<MenuNode>) -> Self {
        Self { nodes }
    }
}

impl FromIterator<MenuNode> for MenuTree {
    fn from_iter<I: IntoIterator<Item = MenuNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

// ── Serialize ─────────────────────────────────────────────────────────────────
//
// Hand-written so that fields are emitted in stored order regardless of the
// serializer's map implementation.

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Integer(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Scalar(s) => s.serialize(serializer),
            FieldValue::Children(children) => {
                let mut seq = serializer.serialize_seq(Some(children.len()))?;
                for child in children {
                    seq.serialize_element(child)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for MenuNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for MenuTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.nodes.len()))?;
        for node in &self.nodes {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}

// ── Deserialize ───────────────────────────────────────────────────────────────
//
// The schema is enforced here, at the decode boundary:
// - the top level is a sequence (or null, meaning an empty menu);
// - every item is a mapping with unique keys;
// - a sequence value is only accepted under a children key;
// - nested mappings are rejected.

impl<'de> Deserialize<'de> for MenuTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TreeVisitor;

        impl<'de> Visitor<'de> for TreeVisitor {
            type Value = MenuTree;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence of menu items")
            }

            fn visit_unit<E: de::Error>(self) -> Result<MenuTree, E> {
                Ok(MenuTree::new())
            }

            fn visit_none<E: de::Error>(self) -> Result<MenuTree, E> {
                Ok(MenuTree::new())
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<MenuTree, A::Error> {
                let mut nodes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(node) = seq.next_element::<MenuNode>()? {
                    nodes.push(node);
                }
                Ok(MenuTree { nodes })
            }
        }

        deserializer.deserialize_any(TreeVisitor)
    }
}

impl<'de> Deserialize<'de> for MenuNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = MenuNode;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a menu item mapping")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<MenuNode, A::Error> {
                let mut node = MenuNode::new();
                while let Some(key) = map.next_key::<FieldKey>()? {
                    let key = key.0;
                    if node.get(&key).is_some() {
                        return Err(de::Error::custom(format_args!(
                            "duplicate key `{key}` in menu item"
                        )));
                    }
                    let value = map.next_value_seed(FieldSeed { key: &key })?;
                    node.fields.push((key, value));
                }
                Ok(node)
            }
        }

        deserializer.deserialize_any(NodeVisitor)
    }
}

/// A mapping key.  YAML allows non-string scalar keys; they are kept as their
/// textual form.
struct FieldKey(String);

impl<'de> Deserialize<'de> for FieldKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = FieldKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar field name")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldKey, E> {
                Ok(FieldKey(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<FieldKey, E> {
                Ok(FieldKey(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldKey, E> {
                Ok(FieldKey(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldKey, E> {
                Ok(FieldKey(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldKey, E> {
                Ok(FieldKey(v.to_string()))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

/// Decodes one field value, knowing which key it belongs to.
struct FieldSeed<'a> {
    key: &'a str,
}

impl<'de> DeserializeSeed<'de> for FieldSeed<'_> {
    type Value = FieldValue;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<FieldValue, D::Error> {
        deserializer.deserialize_any(FieldVisitor { key: self.key })
    }
}

struct FieldVisitor<'a> {
    key: &'a str,
}

impl<'de> Visitor<'de> for FieldVisitor<'_> {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a scalar or a list of menu items for field `{}`", self.key)
    }

    fn visit_unit<E: de::Error>(self) -> Result<FieldValue, E> {
        Ok(FieldValue::Scalar(Scalar::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<FieldValue, E> {
        Ok(FieldValue::Scalar(Scalar::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<FieldValue, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldValue, E> {
        Ok(FieldValue::Scalar(Scalar::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldValue, E> {
        Ok(FieldValue::Scalar(Scalar::Integer(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldValue, E> {
        i64::try_from(v)
            .map(|i| FieldValue::Scalar(Scalar::Integer(i)))
            .map_err(|_| E::custom(format_args!("integer {v} in field `{}` is out of range", self.key)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldValue, E> {
        Ok(FieldValue::Scalar(Scalar::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldValue, E> {
        Ok(FieldValue::Scalar(Scalar::String(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<FieldValue, E> {
        Ok(FieldValue::Scalar(Scalar::String(v)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FieldValue, A::Error> {
        if !is_children_key(self.key) {
            return Err(de::Error::custom(format_args!(
                "field `{}` holds a list; only {CHILDREN_KEYS:?} may contain nested items",
                self.key
            )));
        }
        let mut children = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(child) = seq.next_element::<MenuNode>()? {
            children.push(child);
        }
        Ok(FieldValue::Children(children))
    }

    fn visit_map<A: MapAccess<'de>>(self, _map: A) -> Result<FieldValue, A::Error> {
        Err(de::Error::custom(format_args!(
            "field `{}` holds a nested mapping, which a menu item cannot contain",
            self.key
        )))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
