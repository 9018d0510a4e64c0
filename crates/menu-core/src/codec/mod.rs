//! Codec module: conversions between the menu's text forms and [`crate::MenuTree`].
//!
//! - [`payload`] – JSON text exchanged with the browser widget.
//! - [`document`] – the YAML configuration file, plus the validation that
//!   guards every save.

pub mod document;
pub mod payload;

pub use document::{decode_document, encode_document, validate_document, ValidationError};
pub use payload::{decode_payload, encode_payload, DecodeError};
