//! # menu-store
//!
//! Persistence manager for the menu document.
//!
//! The store owns the read/write lifecycle of one YAML menu file plus its
//! optional backups.  Every save is validated before the live file is touched,
//! and the live file is only ever replaced by an atomic rename, so a reader
//! sees either the old document or the new one and never a mix.
//!
//! # Layers
//!
//! ```text
//! application/     MenuStore: load, save, save_if_unchanged, search, backups
//! infrastructure/  atomic_write, backup files, clock, revision hashing
//! ```
//!
//! There is no global "current menu": each [`MenuStore`] is a handle on one
//! document path, so several sites (or several tests) can keep independent
//! stores side by side.

pub mod application;
pub mod infrastructure;

pub use application::store::{
    BackupFailurePolicy, BackupOutcome, ErrorKind, MenuSnapshot, MenuStore, SavePolicy,
    SaveReport, StoreError,
};
pub use infrastructure::backup::{BackupError, BackupRecord};
pub use infrastructure::clock::{Clock, FixedClock, SystemClock};
pub use infrastructure::revision::Revision;
