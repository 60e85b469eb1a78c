//! gzip-static creates precompressed (`.gz`) companions of static website
//! files, so a web server (eg. nginx with `gzip_static on`) can serve them
//! without compressing on every request.
//!
//! Running it is idempotent: for each static file (selected by extension, see
//! [extensions::ExtensionSet]) the companion `<file>.gz` is
//! - created, if missing,
//! - recompressed, if its decompressed content differs from the file,
//! - skipped otherwise.
//!
//! Optionally companions left behind after their static file was removed
//! (orphans) are deleted.
//!
//! This crate can be used in two ways:
//! - As a standalone application, `gzip-static` (and
//!   `gzip-static-find-orphans` for listing orphans without removing them).
//!   Run with `--help` for options.
//! - As a library, with [sync::sync] as the main entry point.
//!
//! # Using as a standalone application
//!
//! ```text
//! $ gzip-static ./public
//! ./public was updated
//! Created gzip files: 12
//! Updated gzip files: 0
//! Skipped gzip files: 0
//! Deleted gzip files: 0
//! ```
//!
//! Use `--zopfli` (or `-l 11`) for smaller output at much higher CPU cost,
//! `--remove-orphans` to delete companions of removed files and `-e` to
//! provide own list of extensions (one per line, with leading dot).
//!
//! # Using as a library
//!
//! ```no_run
//! # use anyhow::Error;
//! # use gzip_static::{
//! #     capabilities::Capabilities,
//! #     extensions::ExtensionSet,
//! #     sync::{sync, SyncOptions},
//! # };
//! # use std::path::PathBuf;
//! #
//! # fn main() -> Result<(), Error> {
//! let sync_result = sync(
//!     &PathBuf::from("public"),
//!     &ExtensionSet::default(),
//!     &SyncOptions {
//!         remove_orphans: true,
//!         ..SyncOptions::default()
//!     },
//!     &Capabilities::detect(),
//! )?;
//!
//! println!("created {} files", sync_result.created);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod capabilities;
pub mod compress;
pub mod directory;
pub mod error;
pub mod extensions;
pub mod hash;
pub mod sync;
