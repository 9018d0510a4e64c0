//! Domain entities for the menu editor.
//!
//! This module contains pure data types and logic with no infrastructure
//! dependencies.  Nothing here reads files, opens sockets, or logs.
//!
//! # What lives here?
//!
//! - **`tree`** – [`tree::MenuTree`] and its parts.  The schema rules that
//!   every decoded tree must satisfy (mapping items, unique keys, children only
//!   under `children`/`submenu`) are enforced by the `Deserialize` impls in this
//!   module, so both the JSON and the YAML decoders share one definition.
//!
//! - **`search`** – Locating entries in a large tree by label or link.

/// The ordered menu tree and its typed field values.
pub mod tree;

/// Read-only search across all depths of a tree.
pub mod search;
