//! Request and response bodies exchanged with the editor UI.
//!
//! # Protocol overview (for beginners)
//!
//! ```text
//! GET  {base}            → MenuResponse       current tree + settings
//! POST {base}            ← SaveForm           form field `menus` = JSON tree
//!                        → SavedResponse | ErrorResponse
//! GET  {base}/search?q=  → SearchResponse
//! ```
//!
//! The tree itself travels as the same JSON array the browser widget
//! produces, so `menus` in a response can be fed straight back into a save.

use menu_core::{MenuTree, SearchHit};
use menu_store::{BackupOutcome, Revision};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `GET {base}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuResponse {
    pub menus: MenuTree,
    /// Revision of the loaded document; `null` when nothing could be loaded.
    pub revision: Option<Revision>,
    pub fields: Map<String, Value>,
    pub backups_enabled: bool,
    pub permission: String,
}

/// Form body of `POST {base}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SaveForm {
    /// The tree as JSON text.
    #[serde(default)]
    pub menus: String,

    /// Revision the editor loaded.  When present and non-blank the save is
    /// refused if the document changed in the meantime.
    #[serde(default)]
    pub revision: Option<String>,
}

impl SaveForm {
    /// The expected revision, if the client sent a non-blank one.
    pub fn expected_revision(&self) -> Option<Revision> {
        self.revision
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| Revision::from(r.to_string()))
    }
}

/// Body of a successful `POST {base}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedResponse {
    /// Always `"saved"`.
    pub status: &'static str,
    pub revision: Revision,
    pub backup: BackupSummary,
}

/// What the backup step did, in a form the UI can show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BackupSummary {
    Disabled,
    NothingToBackUp,
    Created { file: String },
    Failed { message: String },
}

impl From<&BackupOutcome> for BackupSummary {
    fn from(outcome: &BackupOutcome) -> Self {
        match outcome {
            BackupOutcome::Disabled => BackupSummary::Disabled,
            BackupOutcome::NothingToBackUp => BackupSummary::NothingToBackUp,
            BackupOutcome::Created(record) => BackupSummary::Created {
                // The file name only; server paths stay on the server.
                file: record
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            },
            BackupOutcome::Failed(e) => BackupSummary::Failed {
                message: e.to_string(),
            },
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: &'static str,
    pub kind: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: "error",
            kind,
            message: message.into(),
        }
    }
}

/// Query string of `GET {base}/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Body of `GET {base}/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
