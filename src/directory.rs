//! Directory helpers. Contains [search] function, used to gather static files
//! from directory recursively, and [search_orphans] finding compressed files
//! left behind after their static file was removed.

use crate::extensions::ExtensionSet;
use anyhow::Error;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

/// Extension of compressed companion files.
pub const GZIP_EXTENSION: &str = ".gz";

/// Settings for [search] and [search_orphans] functions.
///
/// If not sure what to set here, use [Default].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Whether to follow links while traversing directories. If `false`,
    /// symbolic links (both to files and directories) are skipped.
    pub follow_links: bool,
}
impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            follow_links: false,
        }
    }
}

/// Path of compressed companion for `path`, eg. `index.html.gz` for
/// `index.html`.
pub fn companion_path(path: &Path) -> PathBuf {
    let mut companion_path = path.as_os_str().to_owned();
    companion_path.push(GZIP_EXTENSION);
    PathBuf::from(companion_path)
}

/// Whether file name ends with `.gz`.
pub fn is_gzip_name(name: &OsStr) -> bool {
    name.as_encoded_bytes()
        .ends_with(GZIP_EXTENSION.as_bytes())
}

fn walk(
    path: &Path,
    options: &SearchOptions,
) -> impl Iterator<Item = Result<DirEntry, Error>> {
    WalkDir::new(path)
        .min_depth(1)
        .follow_links(options.follow_links)
        .into_iter()
        .map(|entry| -> Result<Option<DirEntry>, Error> {
            let entry = entry?;

            // we are interested in files only
            // if follow_links is true, this will be resolved as link target
            if !entry.file_type().is_file() {
                if entry.path_is_symlink() {
                    log::debug!("skip {}: symbolic link", entry.path().display());
                }
                return Ok(None);
            }

            Ok(Some(entry))
        })
        .filter_map(|entry_result| entry_result.transpose()) // strips Ok(None)
}

/// Searches fs recursively for static files.
///
/// Yields every regular file below `path` whose extension is in
/// `extensions`. Files ending with `.gz` are never yielded, regardless of
/// `extensions`. Items are produced lazily, in unspecified order.
///
/// # Examples
///
/// ```
/// # use anyhow::Error;
/// # use gzip_static::{
/// #     directory::{search, SearchOptions},
/// #     extensions::ExtensionSet,
/// # };
/// # use std::fs;
/// #
/// # fn main() -> Result<(), Error> {
/// #
/// let directory = tempfile::tempdir()?;
/// fs::create_dir(directory.path().join("css"))?;
/// fs::write(directory.path().join("css").join("style.css"), "body {}")?;
/// fs::write(directory.path().join("css").join("style.css.gz"), "")?;
/// fs::write(directory.path().join("photo.png"), "")?;
///
/// let files = search(
///     directory.path(),
///     &ExtensionSet::from_iter([".css"]),
///     &SearchOptions::default(),
/// )
/// .collect::<Result<Vec<_>, Error>>()?;
///
/// assert_eq!(files, vec![directory.path().join("css").join("style.css")]);
/// #
/// # Ok(())
/// # }
/// ```
pub fn search(
    path: &Path,
    extensions: &ExtensionSet,
    options: &SearchOptions,
) -> impl Iterator<Item = Result<PathBuf, Error>> {
    walk(path, options)
        .map(move |entry| -> Result<Option<PathBuf>, Error> {
            let entry = entry?;
            let name = entry.file_name();

            // cheap check first, after first run half of the files are `.gz`
            if is_gzip_name(name) {
                return Ok(None);
            }

            if !extensions.matches_os_name(name) {
                log::debug!("skip {}: unsupported extension", entry.path().display());
                return Ok(None);
            }

            Ok(Some(entry.into_path()))
        })
        .filter_map(|entry_result| entry_result.transpose())
}

/// Searches fs recursively for orphaned compressed files.
///
/// A `.gz` file is an orphan if its name without `.gz` has extension from
/// `extensions` and such file does not exist. For example `page.html.gz` is an
/// orphan if `.html` is in `extensions` and `page.html` is missing, while
/// `backup.tar.gz` is never reported unless `.tar` is in `extensions`.
pub fn search_orphans(
    path: &Path,
    extensions: &ExtensionSet,
    options: &SearchOptions,
) -> impl Iterator<Item = Result<PathBuf, Error>> {
    walk(path, options)
        .map(move |entry| -> Result<Option<PathBuf>, Error> {
            let entry = entry?;
            let name = entry.file_name();

            if !is_gzip_name(name) || name == GZIP_EXTENSION {
                return Ok(None);
            }

            // `page.html.gz` -> `page.html`
            let Some(static_name) = entry.path().file_stem() else {
                return Ok(None);
            };
            if !extensions.matches_os_name(static_name) {
                return Ok(None);
            }

            let static_path = entry.path().with_file_name(static_name);
            if static_path.try_exists()? {
                return Ok(None);
            }

            Ok(Some(entry.into_path()))
        })
        .filter_map(|entry_result| entry_result.transpose())
}
