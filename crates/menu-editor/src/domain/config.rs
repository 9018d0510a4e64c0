//! Extension configuration.
//!
//! [`EditorConfig`] holds every setting the editor needs.  It is read from a
//! TOML file by [`crate::infrastructure::config_file`]; every key is optional,
//! so an empty file (or no file at all) gives a working editor:
//!
//! ```toml
//! menu_file = "config/menu.yml"
//! backup_dir = "config/backups"   # default: directory of menu_file
//! base_path = "/menu-editor"
//! permission = "files:config"
//!
//! [backups]
//! enabled = false
//! abort_on_failure = false
//!
//! [fields]                          # handed to the editor UI unchanged
//! label = { type = "text", required = true }
//! ```

use std::path::PathBuf;

use menu_store::{BackupFailurePolicy, MenuStore, SavePolicy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// All runtime configuration for the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// The YAML menu document being edited.
    #[serde(default = "default_menu_file")]
    pub menu_file: PathBuf,

    /// Where backups are written.  `None` means next to `menu_file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    /// URL path the editor routes are mounted under.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Permission name required to use the editor.  Reported to the UI; the
    /// host application is responsible for enforcing it.
    #[serde(default = "default_permission")]
    pub permission: String,

    #[serde(default)]
    pub backups: BackupSettings,

    /// Field definitions for the editor form, passed through verbatim.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// The `[backups]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Keep a copy of the previous document on every save.
    #[serde(default)]
    pub enabled: bool,

    /// Refuse to save when the backup cannot be written.
    #[serde(default)]
    pub abort_on_failure: bool,
}

fn default_menu_file() -> PathBuf {
    PathBuf::from("config/menu.yml")
}
fn default_base_path() -> String {
    "/menu-editor".to_string()
}
fn default_permission() -> String {
    "files:config".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            menu_file: default_menu_file(),
            backup_dir: None,
            base_path: default_base_path(),
            permission: default_permission(),
            backups: BackupSettings::default(),
            fields: Map::new(),
        }
    }
}

impl EditorConfig {
    /// The save policy the `[backups]` table describes.
    pub fn save_policy(&self) -> SavePolicy {
        SavePolicy {
            backups_enabled: self.backups.enabled,
            on_backup_failure: if self.backups.abort_on_failure {
                BackupFailurePolicy::Abort
            } else {
                BackupFailurePolicy::Continue
            },
        }
    }

    /// Builds the store for `menu_file`, honouring `backup_dir`.
    pub fn open_store(&self) -> MenuStore {
        let store = MenuStore::new(&self.menu_file);
        match &self.backup_dir {
            Some(dir) => store.with_backup_dir(dir),
            None => store,
        }
    }

    /// `base_path` without trailing slashes (`""` for the site root).
    ///
    /// Returns `None` if the path does not start with `/`.
    pub fn route_prefix(&self) -> Option<&str> {
        let path = self.base_path.trim();
        if !path.starts_with('/') {
            return None;
        }
        Some(path.trim_end_matches('/'))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
