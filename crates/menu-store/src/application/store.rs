//! The persistence manager.
//!
//! [`MenuStore`] is a handle on one menu document.  It offers the read path
//! used to open the editor and the save path used when the editor posts a new
//! tree.
//!
//! # Save flow
//!
//! ```text
//! MenuTree
//!   → encode_document            (menu-core)
//!   → verify_round_trip          abort: StoreError::Validation, file untouched
//!   → read previous document     abort: StoreError::Read
//!   → revision check (optional)  abort: StoreError::Conflict
//!   → backup (optional)          per BackupFailurePolicy
//!   → atomic_write               abort: StoreError::Write, file untouched
//! ```
//!
//! # Concurrency
//!
//! The store takes no lock.  Two processes saving at once resolve as
//! last-write-wins; a caller that wants to detect this uses
//! [`MenuStore::save_if_unchanged`] with the revision it loaded.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use menu_core::{decode_document, encode_document, search, verify_round_trip, MenuTree, SearchHit, ValidationError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::infrastructure::atomic_write::atomic_write;
use crate::infrastructure::backup::{self, BackupError, BackupRecord};
use crate::infrastructure::clock::{Clock, SystemClock};
use crate::infrastructure::revision::Revision;

/// Name used for backups when the document path has no file name.
const DEFAULT_DOCUMENT_NAME: &str = "menu.yml";

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document could not be read (missing, unreadable, not UTF-8).
    #[error("could not read menu document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document was read but is not a valid menu.
    #[error("menu document {path} is not a valid menu: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// The tree encodes to a document that cannot be read back.  Nothing was written.
    #[error("menu failed validation, nothing was written: {0}")]
    Validation(#[source] ValidationError),

    /// The backup failed and the policy says to abort.  Nothing was written.
    #[error("backup failed, save aborted: {0}")]
    Backup(#[source] BackupError),

    /// The new document could not be written.  The previous document is intact.
    #[error("could not write menu document {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document changed since the caller loaded it.
    #[error("menu document changed since it was loaded (expected revision {expected}, found {actual})")]
    Conflict { expected: Revision, actual: Revision },
}

/// Coarse classification of a [`StoreError`], for callers that map errors to
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StorageRead,
    Validation,
    Backup,
    StorageWrite,
    Conflict,
}

impl StoreError {
    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Read { .. } | StoreError::Corrupt { .. } => ErrorKind::StorageRead,
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::Backup(_) => ErrorKind::Backup,
            StoreError::Write { .. } => ErrorKind::StorageWrite,
            StoreError::Conflict { .. } => ErrorKind::Conflict,
        }
    }

    /// `true` when the error means "there is no document yet".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// What to do when the backup step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackupFailurePolicy {
    /// Log the failure, report it in [`SaveReport::backup`], and save anyway.
    #[default]
    Continue,
    /// Abort the save with [`StoreError::Backup`].
    Abort,
}

/// Options for one save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SavePolicy {
    /// Copy the previous document to a backup record before overwriting it.
    pub backups_enabled: bool,
    pub on_backup_failure: BackupFailurePolicy,
}

impl SavePolicy {
    /// Backups on, failures non-fatal.
    pub fn with_backups() -> Self {
        Self {
            backups_enabled: true,
            on_backup_failure: BackupFailurePolicy::Continue,
        }
    }
}

/// What happened in the backup step of a save.
#[derive(Debug)]
pub enum BackupOutcome {
    /// Backups are off for this save.
    Disabled,
    /// There was no previous document to copy.
    NothingToBackUp,
    Created(BackupRecord),
    /// The backup failed but the save went ahead.
    Failed(BackupError),
}

/// Result of a successful save.
#[derive(Debug)]
pub struct SaveReport {
    pub path: PathBuf,
    /// Revision of the document now on disk.
    pub revision: Revision,
    pub bytes_written: usize,
    pub backup: BackupOutcome,
}

/// A loaded tree together with the revision it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSnapshot {
    pub tree: MenuTree,
    pub revision: Revision,
}

/// Handle on one menu document and its backups.
pub struct MenuStore {
    document_path: PathBuf,
    backup_dir: PathBuf,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for MenuStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuStore")
            .field("document_path", &self.document_path)
            .field("backup_dir", &self.backup_dir)
            .finish_non_exhaustive()
    }
}

impl MenuStore {
    /// Creates a store for `document_path`.  Backups go next to the document
    /// unless [`MenuStore::with_backup_dir`] says otherwise.
    pub fn new(document_path: impl Into<PathBuf>) -> Self {
        let document_path = document_path.into();
        let backup_dir = document_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            document_path,
            backup_dir,
            clock: Box::new(SystemClock),
        }
    }

    /// Sets the directory backups are written to.
    pub fn with_backup_dir(mut self, backup_dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = backup_dir.into();
        self
    }

    /// Replaces the clock used to name backups.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Reads and decodes the current document.
    ///
    /// # Errors
    ///
    /// [`StoreError::Read`] if the file is missing or unreadable,
    /// [`StoreError::Corrupt`] if it does not decode.  The caller decides the
    /// fallback (the editor starts from an empty tree).
    pub fn load_current(&self) -> Result<MenuTree, StoreError> {
        self.load_snapshot().map(|snapshot| snapshot.tree)
    }

    /// Like [`MenuStore::load_current`], also returning the revision.
    ///
    /// # Errors
    ///
    /// Same as [`MenuStore::load_current`].
    pub fn load_snapshot(&self) -> Result<MenuSnapshot, StoreError> {
        let bytes = fs::read(&self.document_path).map_err(|source| self.read_error(source))?;
        let revision = Revision::of(&bytes);
        let text = String::from_utf8(bytes)
            .map_err(|e| self.read_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        let tree = decode_document(&text).map_err(|source| StoreError::Corrupt {
            path: self.document_path.clone(),
            source,
        })?;

        debug!(
            path = %self.document_path.display(),
            nodes = tree.node_count(),
            %revision,
            "menu document loaded"
        );
        Ok(MenuSnapshot { tree, revision })
    }

    /// Revision of the document currently on disk ([`Revision::missing`] if
    /// there is none).
    ///
    /// # Errors
    ///
    /// [`StoreError::Read`] if the file exists but cannot be read.
    pub fn current_revision(&self) -> Result<Revision, StoreError> {
        Ok(self
            .read_existing()?
            .map_or_else(Revision::missing, |bytes| Revision::of(&bytes)))
    }

    /// Validates `tree` and replaces the stored document with it.
    ///
    /// # Errors
    ///
    /// See the module documentation for the failure points.  On every error
    /// the stored document is unchanged.
    pub fn save(&self, tree: &MenuTree, policy: SavePolicy) -> Result<SaveReport, StoreError> {
        self.save_checked(tree, policy, None)
    }

    /// Like [`MenuStore::save`], but refuses with [`StoreError::Conflict`] if
    /// the stored document's revision is not `expected`.
    ///
    /// # Errors
    ///
    /// Same as [`MenuStore::save`], plus [`StoreError::Conflict`].
    pub fn save_if_unchanged(
        &self,
        tree: &MenuTree,
        policy: SavePolicy,
        expected: &Revision,
    ) -> Result<SaveReport, StoreError> {
        self.save_checked(tree, policy, Some(expected))
    }

    /// Backup records for this document, oldest first.
    ///
    /// # Errors
    ///
    /// [`StoreError::Read`] if the backup directory cannot be listed.
    pub fn list_backups(&self) -> Result<Vec<BackupRecord>, StoreError> {
        backup::list_backups(&self.document_name(), &self.backup_dir).map_err(|source| {
            StoreError::Read {
                path: self.backup_dir.clone(),
                source,
            }
        })
    }

    /// Loads the current tree and searches it.
    ///
    /// # Errors
    ///
    /// Same as [`MenuStore::load_current`].
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, StoreError> {
        let tree = self.load_current()?;
        Ok(search(&tree, query))
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn save_checked(
        &self,
        tree: &MenuTree,
        policy: SavePolicy,
        expected: Option<&Revision>,
    ) -> Result<SaveReport, StoreError> {
        let text = encode_document(tree);
        if let Err(e) = verify_round_trip(tree, &text) {
            warn!(path = %self.document_path.display(), error = %e, "menu rejected before save");
            return Err(StoreError::Validation(e));
        }

        let previous = self.read_existing()?;

        if let Some(expected) = expected {
            let actual = previous
                .as_deref()
                .map_or_else(Revision::missing, Revision::of);
            if actual != *expected {
                warn!(path = %self.document_path.display(), %expected, %actual, "stale menu save refused");
                return Err(StoreError::Conflict {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let backup = self.back_up(previous.as_deref(), policy)?;

        atomic_write(&self.document_path, text.as_bytes()).map_err(|source| StoreError::Write {
            path: self.document_path.clone(),
            source,
        })?;

        let revision = Revision::of(text.as_bytes());
        info!(
            path = %self.document_path.display(),
            nodes = tree.node_count(),
            bytes = text.len(),
            %revision,
            "menu document saved"
        );
        Ok(SaveReport {
            path: self.document_path.clone(),
            revision,
            bytes_written: text.len(),
            backup,
        })
    }

    fn back_up(&self, previous: Option<&[u8]>, policy: SavePolicy) -> Result<BackupOutcome, StoreError> {
        if !policy.backups_enabled {
            return Ok(BackupOutcome::Disabled);
        }
        let Some(contents) = previous else {
            return Ok(BackupOutcome::NothingToBackUp);
        };

        match backup::create_backup(&self.document_name(), contents, &self.backup_dir, self.clock.now()) {
            Ok(record) => {
                info!(backup = %record.path.display(), "previous menu backed up");
                Ok(BackupOutcome::Created(record))
            }
            Err(e) => match policy.on_backup_failure {
                BackupFailurePolicy::Continue => {
                    warn!(error = %e, "menu backup failed; saving anyway");
                    Ok(BackupOutcome::Failed(e))
                }
                BackupFailurePolicy::Abort => Err(StoreError::Backup(e)),
            },
        }
    }

    /// The previous document, or `None` if there is none yet.
    fn read_existing(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(&self.document_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.read_error(source)),
        }
    }

    fn read_error(&self, source: io::Error) -> StoreError {
        StoreError::Read {
            path: self.document_path.clone(),
            source,
        }
    }

    fn document_name(&self) -> String {
        self.document_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::MockClock;
    use chrono::{TimeZone, Utc};
    use menu_core::MenuNode;

    fn home_tree() -> MenuTree {
        MenuTree::from(vec![MenuNode::new().with("label", "Home").with("link", "/")])
    }

    fn store_in(dir: &Path) -> MenuStore {
        MenuStore::new(dir.join("menu.yml"))
    }

    #[test]
    fn test_new_puts_backups_next_to_document() {
        let store = MenuStore::new("/srv/site/config/menu.yml");
        assert_eq!(store.backup_dir(), Path::new("/srv/site/config"));
    }

    #[test]
    fn test_load_missing_document_is_not_found_read_error() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");

        // Act
        let err = store_in(dir.path()).load_current().expect_err("must fail");

        // Assert
        assert_eq!(err.kind(), ErrorKind::StorageRead);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_corrupt_document_is_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("menu.yml"), "- label: [broken\n").expect("seed");

        let err = store_in(dir.path()).load_current().expect_err("must fail");

        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(err.kind(), ErrorKind::StorageRead);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_save_then_load_returns_same_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());

        let report = store.save(&home_tree(), SavePolicy::default()).expect("save");

        assert_eq!(store.load_current().expect("load"), home_tree());
        assert!(matches!(report.backup, BackupOutcome::Disabled));
        assert_eq!(report.revision, store.current_revision().expect("revision"));
    }

    #[test]
    fn test_first_save_with_backups_has_nothing_to_back_up() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report = store_in(dir.path())
            .save(&home_tree(), SavePolicy::with_backups())
            .expect("save");
        assert!(matches!(report.backup, BackupOutcome::NothingToBackUp));
    }

    #[test]
    fn test_backup_uses_injected_clock() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let mut clock = MockClock::new();
        clock.expect_now().times(1).return_const(instant);
        let store = store_in(dir.path()).with_clock(clock);
        fs::write(store.document_path(), "- label: Before\n").expect("seed");

        // Act
        let report = store.save(&home_tree(), SavePolicy::with_backups()).expect("save");

        // Assert
        let BackupOutcome::Created(record) = &report.backup else {
            panic!("expected a backup record, got {:?}", report.backup);
        };
        assert_eq!(
            record.path.file_name().expect("name").to_string_lossy(),
            "menu.yml.20240102-030405.bak"
        );
    }

    #[test]
    fn test_clock_not_consulted_when_backups_disabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut clock = MockClock::new();
        clock.expect_now().never();
        let store = store_in(dir.path()).with_clock(clock);
        fs::write(store.document_path(), "[]\n").expect("seed");

        store.save(&home_tree(), SavePolicy::default()).expect("save");
    }

    #[test]
    fn test_validation_failure_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut node = MenuNode::new();
        node.push_field("label", "a");
        node.push_field("label", "b");

        let err = store_in(dir.path())
            .save(&MenuTree::from(vec![node]), SavePolicy::default())
            .expect_err("must fail");

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!dir.path().join("menu.yml").exists());
    }

    #[test]
    fn test_save_if_unchanged_accepts_missing_revision_for_new_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        store
            .save_if_unchanged(&home_tree(), SavePolicy::default(), &Revision::missing())
            .expect("save");
        assert!(store.document_path().exists());
    }
}
