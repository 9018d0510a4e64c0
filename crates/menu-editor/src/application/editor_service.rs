//! The editor use cases.
//!
//! [`EditorService`] is what the HTTP handlers call.  It is synchronous (the
//! store does blocking file I/O), so the server runs it on tokio's blocking
//! pool, and tests can call it directly without a runtime.

use std::sync::Mutex;

use menu_core::{decode_payload, DecodeError};
use menu_store::{ErrorKind, MenuStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{
    BackupSummary, EditorConfig, MenuResponse, SaveForm, SavedResponse, SearchResponse,
};

/// Error type for editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The posted `menus` field is not a valid menu payload.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EditorError {
    /// Short machine-readable name, used as `kind` in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            EditorError::Decode(_) => "decode",
            EditorError::Store(e) => match e.kind() {
                ErrorKind::StorageRead => "read",
                ErrorKind::Validation => "validation",
                ErrorKind::Backup => "backup",
                ErrorKind::StorageWrite => "write",
                ErrorKind::Conflict => "conflict",
            },
        }
    }
}

/// Load, save and search for one configured menu.
#[derive(Debug)]
pub struct EditorService {
    config: EditorConfig,
    store: MenuStore,
    /// Serialises saves within this process.
    save_lock: Mutex<()>,
}

impl EditorService {
    pub fn new(config: EditorConfig) -> Self {
        let store = config.open_store();
        Self {
            config,
            store,
            save_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &MenuStore {
        &self.store
    }

    /// The editor's opening state.
    ///
    /// Never fails: if the document is missing or unreadable the editor
    /// starts from an empty tree and `revision` is `None`.
    pub fn load(&self) -> MenuResponse {
        let (menus, revision) = match self.store.load_snapshot() {
            Ok(snapshot) => (snapshot.tree, Some(snapshot.revision)),
            Err(e) => {
                warn!(error = %e, "could not load menu; starting from an empty tree");
                (Default::default(), None)
            }
        };

        MenuResponse {
            menus,
            revision,
            fields: self.config.fields.clone(),
            backups_enabled: self.config.backups.enabled,
            permission: self.config.permission.clone(),
        }
    }

    /// Decodes and stores a posted tree.
    ///
    /// # Errors
    ///
    /// [`EditorError::Decode`] if `menus` is not a menu payload, otherwise the
    /// store's error.  The stored document is unchanged on every error.
    pub fn save(&self, form: &SaveForm) -> Result<SavedResponse, EditorError> {
        let tree = decode_payload(&form.menus)?;
        let policy = self.config.save_policy();

        // A poisoned lock only means another save panicked; the file on disk
        // is still whole because writes are atomic.
        let _guard = self.save_lock.lock().unwrap_or_else(|e| e.into_inner());

        let report = match form.expected_revision() {
            Some(expected) => self.store.save_if_unchanged(&tree, policy, &expected)?,
            None => self.store.save(&tree, policy)?,
        };
        info!(nodes = tree.node_count(), revision = %report.revision, "menu saved from editor");

        Ok(SavedResponse {
            status: "saved",
            backup: BackupSummary::from(&report.backup),
            revision: report.revision,
        })
    }

    /// Searches the stored menu.  A missing document has no hits.
    ///
    /// # Errors
    ///
    /// The store's read error if the document exists but cannot be loaded.
    pub fn search(&self, query: &str) -> Result<SearchResponse, EditorError> {
        let results = match self.store.search(query) {
            Ok(hits) => hits,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(SearchResponse {
            query: query.to_string(),
            results,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
