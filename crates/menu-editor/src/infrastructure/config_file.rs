//! TOML configuration loading.
//!
//! The editor is configured with one TOML file (see
//! [`EditorConfig`](crate::domain::EditorConfig) for the keys).  Every key has
//! a default, so the file may be empty, and running without `--config` at all
//! is the same as running with an empty file.
//!
//! Relative paths in the file (`menu_file`, `backup_dir`) are used as written,
//! i.e. relative to the process working directory, which is normally the site
//! root.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::EditorConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `base_path` is not an absolute URL path.
    #[error("base_path must start with '/', got {0:?}")]
    InvalidBasePath(String),
}

/// Parses configuration text.
///
/// # Errors
///
/// [`ConfigError::Parse`] for malformed TOML or mistyped keys and
/// [`ConfigError::InvalidBasePath`] for a relative `base_path`.
pub fn parse_config(text: &str) -> Result<EditorConfig, ConfigError> {
    let config: EditorConfig = toml::from_str(text)?;
    if config.route_prefix().is_none() {
        return Err(ConfigError::InvalidBasePath(config.base_path));
    }
    Ok(config)
}

/// Reads and parses the configuration file at `path`.
///
/// Unlike a missing `--config` flag, a missing file named on the command line
/// is an error: the operator asked for that file.
///
/// # Errors
///
/// [`ConfigError::Io`] if the file cannot be read, otherwise as
/// [`parse_config`].
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text)?;
    tracing::debug!(path = %path.display(), menu_file = %config.menu_file.display(), "config loaded");
    Ok(config)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use menu_store::BackupFailurePolicy;
    use serde_json::json;

    #[test]
    fn test_empty_file_gives_defaults() {
        // Arrange / Act
        let cfg = parse_config("").expect("parse");
        // Assert
        assert_eq!(cfg, EditorConfig::default());
    }

    #[test]
    fn test_full_config_parses() {
        // Arrange
        let text = r#"
menu_file = "site/menu.yml"
backup_dir = "site/backups"
base_path = "/admin/menu"
permission = "menu:edit"

[backups]
enabled = true
abort_on_failure = true

[fields]
label = { type = "text", required = true }
weight = { type = "number" }
"#;

        // Act
        let cfg = parse_config(text).expect("parse");

        // Assert
        assert_eq!(cfg.menu_file, PathBuf::from("site/menu.yml"));
        assert_eq!(cfg.backup_dir, Some(PathBuf::from("site/backups")));
        assert_eq!(cfg.route_prefix(), Some("/admin/menu"));
        assert_eq!(cfg.permission, "menu:edit");
        assert!(cfg.save_policy().backups_enabled);
        assert_eq!(cfg.save_policy().on_backup_failure, BackupFailurePolicy::Abort);
        assert_eq!(cfg.fields["label"], json!({"type": "text", "required": true}));
    }

    #[test]
    fn test_partial_backups_table_keeps_other_defaults() {
        let cfg = parse_config("[backups]\nenabled = true\n").expect("parse");
        assert!(cfg.backups.enabled);
        assert!(!cfg.backups.abort_on_failure);
        assert_eq!(cfg.base_path, "/menu-editor");
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("menu_file = ").expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let err = parse_config("[backups]\nenabled = \"yes\"\n").expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_relative_base_path_is_rejected() {
        let err = parse_config("base_path = \"menu\"\n").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidBasePath(p) if p == "menu"));
    }

    #[test]
    fn test_load_config_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config(&dir.path().join("absent.toml")).expect_err("must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_config_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("menu-editor.toml");
        std::fs::write(&path, "permission = \"menu:edit\"\n").expect("seed");

        let cfg = load_config(&path).expect("load");

        assert_eq!(cfg.permission, "menu:edit");
    }
}
