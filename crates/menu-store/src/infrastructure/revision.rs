//! Document revisions.
//!
//! A [`Revision`] is the SHA-256 of the stored document bytes, hex encoded.
//! The editor hands it to the browser on load and gets it back on save; if
//! the file changed in between, the save is refused instead of silently
//! overwriting someone else's edit.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content hash of a menu document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Hashes `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// The revision of a document that does not exist yet (hash of no bytes).
    pub fn missing() -> Self {
        Self::of(&[])
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Revision {
    fn from(hex_digest: String) -> Self {
        Self(hex_digest.trim().to_ascii_lowercase())
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
