//! Synchronization of a directory with its compressed companions. Contains
//! [sync], the main entry point of this crate.

use crate::{
    capabilities::Capabilities,
    compress::{CompressOptions, compress_path, mirror_metadata},
    directory::{SearchOptions, companion_path, search, search_orphans},
    error::ConfigurationError,
    extensions::ExtensionSet,
    hash::{HashOptions, hash_file_contents},
};
use anyhow::{Context, Error};
use std::{fs, path::Path};

/// What happened to a single static file in [compress_idempotent].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Companion did not exist and was created.
    Created,
    /// Companion existed, but was outdated (or `force` was set) and was
    /// replaced.
    Recompressed,
    /// Companion existed and was up to date.
    Skipped,
}

/// Counts of actions taken by [sync].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncResult {
    /// Companions created for files that had none.
    pub created: usize,
    /// Companions replaced.
    pub recompressed: usize,
    /// Companions that were already up to date.
    pub skipped: usize,
    /// Orphaned companions removed.
    pub deleted: usize,
}
impl SyncResult {
    fn record(
        &mut self,
        outcome: Outcome,
    ) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Recompressed => self.recompressed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    /// Whether any file in the directory was written or removed.
    pub fn has_changes(&self) -> bool {
        self.created + self.recompressed + self.deleted > 0
    }
}

/// Options for [sync] and [compress_idempotent].
///
/// If not sure what to set here, use [Default].
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// How companions are written.
    pub compress: CompressOptions,
    /// How files are read when comparing with companions.
    pub hash: HashOptions,
    /// How the directory is traversed.
    pub search: SearchOptions,
    /// Recompress all files, even if companion is up to date.
    pub force: bool,
    /// Remove companions of static files that no longer exist.
    pub remove_orphans: bool,
}

/// Compresses file in `path`, unless its companion is already up to date.
///
/// Companion is up to date when its decompressed content hashes to the same
/// value as the file, timestamps are not compared. With
/// [SyncOptions::force] companion is always rewritten. After writing,
/// timestamps and permissions of the file are copied to the companion.
///
/// Fails with [ConfigurationError] if `capabilities` cannot provide the
/// requested compression level or hash algorithm.
pub fn compress_idempotent(
    path: &Path,
    options: &SyncOptions,
    capabilities: &Capabilities,
) -> Result<Outcome, Error> {
    capabilities.check(options.compress.level)?;

    let companion = companion_path(path);

    let outcome = if !companion
        .try_exists()
        .with_context(|| format!("stat {}", companion.display()))?
    {
        Outcome::Created
    } else if options.force {
        Outcome::Recompressed
    } else {
        let file_hash = hash_file_contents(path, capabilities.hash_algorithm, &options.hash)?;
        let companion_hash =
            hash_file_contents(&companion, capabilities.hash_algorithm, &options.hash)?;

        if file_hash == companion_hash {
            log::debug!("skip {}: already compressed", path.display());
            return Ok(Outcome::Skipped);
        }

        log::debug!("hashes do not match for {}, recompressing", path.display());
        Outcome::Recompressed
    };

    log::debug!(
        "compressing {} with compression level {}",
        path.display(),
        options.compress.level.level()
    );
    compress_path(path, &options.compress)?;
    mirror_metadata(path, &companion)?;

    Ok(outcome)
}

/// Removes orphaned companions below `path`, as found by [search_orphans].
///
/// Returns number of removed files.
pub fn remove_orphans(
    path: &Path,
    extensions: &ExtensionSet,
    options: &SearchOptions,
) -> Result<usize, Error> {
    let mut deleted = 0;
    for orphan in search_orphans(path, extensions, options) {
        let orphan = orphan?;

        log::warn!("found orphaned file {}, deleting", orphan.display());
        fs::remove_file(&orphan).with_context(|| format!("remove {}", orphan.display()))?;
        deleted += 1;
    }

    Ok(deleted)
}

/// Compresses all static files in directory `path` and its subdirectories, in
/// an idempotent manner.
///
/// Each file with extension from `extensions` gets a companion `.gz` file, see
/// [compress_idempotent]. With [SyncOptions::remove_orphans] companions of
/// removed files are deleted afterwards, see [remove_orphans].
///
/// Stops at first error, partial counts are not returned.
///
/// # Examples
///
/// ```
/// # use anyhow::Error;
/// # use gzip_static::{
/// #     capabilities::Capabilities,
/// #     extensions::ExtensionSet,
/// #     sync::{sync, SyncOptions, SyncResult},
/// # };
/// # use std::fs;
/// #
/// # fn main() -> Result<(), Error> {
/// #
/// let directory = tempfile::tempdir()?;
/// fs::write(directory.path().join("index.html"), "<html>Hello World!</html>")?;
///
/// let run = || {
///     sync(
///         directory.path(),
///         &ExtensionSet::default(),
///         &SyncOptions::default(),
///         &Capabilities::detect(),
///     )
/// };
///
/// assert_eq!(run()?, SyncResult { created: 1, ..SyncResult::default() });
/// assert_eq!(run()?, SyncResult { skipped: 1, ..SyncResult::default() });
/// #
/// # Ok(())
/// # }
/// ```
pub fn sync(
    path: &Path,
    extensions: &ExtensionSet,
    options: &SyncOptions,
    capabilities: &Capabilities,
) -> Result<SyncResult, Error> {
    capabilities.check(options.compress.level)?;
    if !path.is_dir() {
        return Err(ConfigurationError::NotADirectory(path.to_owned()).into());
    }

    let mut sync_result = SyncResult::default();

    for static_file in search(path, extensions, &options.search) {
        let static_file = static_file?;

        let outcome = compress_idempotent(&static_file, options, capabilities)
            .with_context(|| static_file.to_string_lossy().into_owned())?;
        sync_result.record(outcome);
    }

    if options.remove_orphans {
        sync_result.deleted = remove_orphans(path, extensions, &options.search)?;
    }

    log::debug!("{}: {:?}", path.display(), sync_result);

    Ok(sync_result)
}
