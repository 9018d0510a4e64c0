//! menu-editor library crate.
//!
//! The HTTP backend behind the drag-and-drop menu editor.  The browser loads
//! the current menu, rearranges it, and posts the whole tree back; this crate
//! turns that round trip into calls on a [`menu_store::MenuStore`].
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Browser (JSON / form posts over HTTP)
//!         ↕
//! [menu-editor]
//!   ├── domain/           EditorConfig, request and response bodies
//!   ├── application/      EditorService: load, save, search
//!   └── infrastructure/
//!         ├── config_file/  TOML configuration loading
//!         └── http_server/  axum routes and error → status mapping
//!         ↕
//! menu-store  (YAML document on disk)
//! ```
//!
//! # Layer rules
//!
//! - `domain` does no I/O.
//! - `application` depends on `domain`, `menu-core` and `menu-store`, and is
//!   synchronous so it can be tested without a runtime.
//! - `infrastructure` owns everything async and everything that touches
//!   configuration files.

/// Domain layer: configuration and message types (no I/O).
pub mod domain;

/// Application layer: the editor use cases.
pub mod application;

/// Infrastructure layer: config file loading and the HTTP server.
pub mod infrastructure;
