//! Infrastructure layer: everything that touches the file system or the clock.
//!
//! - **`atomic_write`** – temp file + fsync + rename.
//! - **`backup`**       – write-once, timestamped copies of the previous document.
//! - **`clock`**        – injectable time source for backup names.
//! - **`revision`**     – content hash used for optimistic concurrency.

pub mod atomic_write;
pub mod backup;
pub mod clock;
pub mod revision;
