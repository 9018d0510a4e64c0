//! Domain layer for menu-editor.
//!
//! Plain data: what the extension is configured with and what goes over the
//! wire to the editor UI.  Nothing here reads files or talks to the network.

pub mod config;
pub mod messages;

pub use config::{BackupSettings, EditorConfig};
pub use messages::{
    BackupSummary, ErrorResponse, MenuResponse, SaveForm, SavedResponse, SearchQuery,
    SearchResponse,
};
