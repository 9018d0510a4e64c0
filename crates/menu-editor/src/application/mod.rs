//! Application layer for menu-editor.

pub mod editor_service;

pub use editor_service::{EditorError, EditorService};
