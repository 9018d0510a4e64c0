//! # menu-core
//!
//! Shared library for the menu editor containing the menu tree domain types,
//! the codec that moves a tree between its three representations, and the
//! read-only tree search.
//!
//! This crate is used by both the persistence layer (`menu-store`) and the
//! HTTP surface (`menu-editor`).  It has zero dependencies on the file system,
//! sockets, or async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! An administrator edits the site menu in the browser as a drag-and-drop
//! tree.  The same menu exists in three shapes:
//!
//! ```text
//!   browser widget ── JSON text ──▶ MenuTree ──▶ YAML document on disk
//!                  ◀─────────────           ◀──
//! ```
//!
//! - **`domain`** – The typed, ordered tree ([`MenuTree`], [`MenuNode`],
//!   [`FieldValue`]) and the search over it.  Order matters everywhere: the
//!   order of items is the order of the menu on screen, and the order of keys
//!   inside an item is what the administrator sees when editing the YAML by
//!   hand.
//!
//! - **`codec`** – Conversions.  `payload` handles the JSON text posted by the
//!   browser; `document` writes and reads the YAML configuration file
//!   (indented with 4 spaces) and validates it before anything is saved.

pub mod codec;
pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `menu_core::MenuTree` instead of `menu_core::domain::tree::MenuTree`.
pub use codec::document::{
    decode_document, encode_document, validate_document, verify_round_trip, ValidationError,
};
pub use codec::payload::{decode_payload, encode_payload, DecodeError};
pub use domain::search::{search, SearchHit};
pub use domain::tree::{FieldValue, MenuNode, MenuTree, Scalar, CHILDREN_KEYS};
