//! Backup records.
//!
//! Before a save overwrites the live menu, the previous document can be copied
//! to a backup file named after the save time:
//!
//! ```text
//! menu.yml.20240517-083000.bak
//! menu.yml.20240517-083000-1.bak   ← second save within the same second
//! ```
//!
//! Backups are write-once: files are opened with `create_new`, so an existing
//! record is never replaced.  Pruning old backups is left to the operator.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// File extension of backup records.
pub const BACKUP_EXTENSION: &str = "bak";

/// Timestamp layout inside backup names (UTC).
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Length of a formatted [`TIMESTAMP_FORMAT`] value.
const TIMESTAMP_LEN: usize = 15;

/// How many `-N` suffixes to try before giving up on a name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// A backup file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    /// Full path of the backup file.
    pub path: PathBuf,
    /// Save time encoded in the file name (second precision).
    pub created_at: DateTime<Utc>,
    /// Collision counter: 0 for the first backup in a given second.
    pub sequence: u32,
}

/// Error raised when a backup could not be written.
#[derive(Debug, Error)]
#[error("could not back up {document} into {backup_dir}: {source}")]
pub struct BackupError {
    /// Name of the document being backed up.
    pub document: String,
    /// Directory the backup was meant to go to.
    pub backup_dir: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Writes `contents` to a new backup record for `document_name` in `backup_dir`.
///
/// # Errors
///
/// Returns [`BackupError`] if the directory cannot be created or the file
/// cannot be written.  A partially written backup file is removed.
pub fn create_backup(
    document_name: &str,
    contents: &[u8],
    backup_dir: &Path,
    now: DateTime<Utc>,
) -> Result<BackupRecord, BackupError> {
    let wrap = |source: io::Error| BackupError {
        document: document_name.to_string(),
        backup_dir: backup_dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(backup_dir).map_err(wrap)?;

    for sequence in 0..MAX_NAME_ATTEMPTS {
        let path = backup_dir.join(backup_file_name(document_name, now, sequence));
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(wrap(e)),
        };

        if let Err(e) = file.write_all(contents).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(wrap(e));
        }

        tracing::debug!(path = %path.display(), bytes = contents.len(), "backup written");
        return Ok(BackupRecord {
            path,
            // Names carry second precision; report what the name says.
            created_at: truncate_to_seconds(now),
            sequence,
        });
    }

    Err(wrap(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{MAX_NAME_ATTEMPTS} backups already exist for this second"),
    )))
}

/// Lists the backup records of `document_name` in `backup_dir`, oldest first.
///
/// A missing directory means there are no backups yet.  Files whose names do
/// not follow the backup pattern are ignored.
///
/// # Errors
///
/// Returns the I/O error if the directory exists but cannot be read.
pub fn list_backups(document_name: &str, backup_dir: &Path) -> io::Result<Vec<BackupRecord>> {
    let entries = match fs::read_dir(backup_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if let Some((created_at, sequence)) = parse_backup_name(document_name, &name.to_string_lossy()) {
            records.push(BackupRecord {
                path: entry.path(),
                created_at,
                sequence,
            });
        }
    }
    records.sort_by(|a, b| (a.created_at, a.sequence).cmp(&(b.created_at, b.sequence)));
    Ok(records)
}

/// `<document>.<timestamp>[-<sequence>].bak`
fn backup_file_name(document_name: &str, now: DateTime<Utc>, sequence: u32) -> String {
    let stamp = now.format(TIMESTAMP_FORMAT);
    if sequence == 0 {
        format!("{document_name}.{stamp}.{BACKUP_EXTENSION}")
    } else {
        format!("{document_name}.{stamp}-{sequence}.{BACKUP_EXTENSION}")
    }
}

fn parse_backup_name(document_name: &str, file_name: &str) -> Option<(DateTime<Utc>, u32)> {
    let middle = file_name
        .strip_prefix(document_name)?
        .strip_prefix('.')?
        .strip_suffix(BACKUP_EXTENSION)?
        .strip_suffix('.')?;

    let stamp = middle.get(..TIMESTAMP_LEN)?;
    let created_at = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .ok()?
        .and_utc();

    let sequence = match &middle[TIMESTAMP_LEN..] {
        "" => 0,
        rest => rest.strip_prefix('-')?.parse().ok()?,
    };
    Some((created_at, sequence))
}

fn truncate_to_seconds(t: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(t.timestamp(), 0).unwrap_or(t)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
