//! Atomic file replacement.
//!
//! Writing the menu in place (truncate, then write) leaves a window in which a
//! reader, or a crash, sees half a document.  Instead the new content goes to a
//! uniquely named temp file in the same directory, is flushed to disk, and is
//! then renamed over the target.  A rename within one directory is atomic on
//! the platforms we support, so the target path always holds a complete file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Atomically replaces `path` with `contents`.
///
/// Creates the parent directory if it does not exist.
///
/// # Errors
///
/// Returns the underlying I/O error.  On error the temp file is removed and
/// `path` is left as it was.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    atomic_write_with(path, |file| file.write_all(contents))
}

/// Like [`atomic_write`], but lets the caller fill the temp file.
///
/// `fill` receives the open temp file.  If it fails, nothing is renamed.
///
/// # Errors
///
/// Returns the error from `fill`, or from creating, syncing, or renaming the
/// temp file.
pub fn atomic_write_with<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let parent = parent_dir(path);
    fs::create_dir_all(parent)?;

    let temp_path = temp_path_for(path);
    let result = write_then_rename(&temp_path, path, fill);
    if result.is_err() {
        // The temp file may not exist if creation itself failed.
        let _ = fs::remove_file(&temp_path);
    } else {
        sync_dir(parent);
    }
    result
}

fn write_then_rename<F>(temp_path: &Path, path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)?;
    fill(&mut file)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// `dir/.name.<uuid>.tmp`, hidden and unique so concurrent writers never share one.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "menu".to_string());
    parent_dir(path).join(format!(".{name}.{}.tmp", Uuid::new_v4()))
}

/// Flushes the directory entry so the rename itself survives a crash.
/// Best effort: not every platform lets a directory be opened for syncing.
fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
    #[cfg(not(unix))]
    let _ = dir;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
