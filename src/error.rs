//! Typed errors. Most functions in this crate return [anyhow::Error], the
//! variants here are the ones a caller may want to tell apart (with
//! [anyhow::Error::downcast_ref]) from plain filesystem failures.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid run configuration, detected before (or instead of) touching any
/// file. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// High-ratio compression was requested, but this build has no zopfli
    /// backend.
    #[error(
        "zopfli compression was requested, but zopfli support is not available in this build. \
         Rebuild gzip-static with the `zopfli` feature enabled, or use compression level 6 or 9."
    )]
    ZopfliUnavailable,

    /// Hash algorithm was requested, but is not compiled in.
    #[error(
        "hash algorithm {0} is not available in this build. \
         Rebuild gzip-static with the `xxhash` feature enabled, or use sha3-256."
    )]
    HashAlgorithmUnavailable(&'static str),

    /// Compression level outside of supported range.
    #[error("unsupported compression level {0}, expected 0-9 or 11 (zopfli)")]
    UnsupportedCompressionLevel(u32),

    /// Directory to process does not exist or is not a directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}
