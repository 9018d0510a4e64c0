//! Application layer: the persistence use cases.
//!
//! [`store::MenuStore`] orchestrates the codec from `menu-core` and the file
//! helpers from [`crate::infrastructure`] into the load and save flows.  It
//! decides *what* happens and in which order (encode, validate, back up,
//! replace); the infrastructure modules decide *how* bytes reach the disk.

pub mod store;
