//! Extension helpers. Contains [ExtensionSet], the set of file extensions
//! treated as static files, and [extension_of] used to match file names
//! against it.

use anyhow::{Context, Error};
use std::{collections::HashSet, ffi::OsStr, fs, path::Path};

/// Default extensions, shipped with the crate.
pub const DEFAULT_EXTENSIONS: &str = include_str!("extensions.txt");

/// Returns extension of file `name`, including the leading dot (eg. `.html`).
///
/// Returns empty string if there is no extension, that is when `name` has no
/// dot, ends with a dot or the only dot is the leading one (eg. `.htaccess`).
///
/// # Examples
///
/// ```
/// # use gzip_static::extensions::extension_of;
/// assert_eq!(extension_of("index.html"), ".html");
/// assert_eq!(extension_of("jquery.min.js"), ".js");
/// assert_eq!(extension_of(".htaccess"), "");
/// assert_eq!(extension_of("Makefile"), "");
/// ```
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) if index > 0 && index < name.len() - 1 => &name[index..],
        _ => "",
    }
}

/// Byte variant of [extension_of], for file names that are not necessarily
/// valid UTF-8 (eg. `caf\xe9.html` on unix). Same rules apply.
pub fn extension_of_bytes(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|byte| *byte == b'.') {
        Some(index) if index > 0 && index < name.len() - 1 => &name[index..],
        _ => b"",
    }
}

/// Set of extensions (with leading dot) that are considered static files and
/// will be compressed.
///
/// Built once per run, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: HashSet<String>,
}
impl ExtensionSet {
    /// Parses newline separated list of extensions.
    ///
    /// Each line is stripped of surrounding whitespace. Duplicates are merged.
    /// Blank lines are kept as an empty extension, which will match every file
    /// without an extension.
    pub fn parse(text: &str) -> Self {
        let extensions = text
            .lines()
            .map(|line| line.trim().to_owned())
            .collect::<HashSet<_>>();

        if extensions.contains("") {
            log::warn!(
                "extensions list contains a blank line, files without extension will be compressed"
            );
        }

        Self { extensions }
    }

    /// Reads extensions list from file in `path`. See [Self::parse] for
    /// format.
    pub fn read_from_path(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read extensions file {}", path.display()))?;

        let extension_set = Self::parse(&text);
        log::debug!(
            "loaded extensions from {}: {}",
            path.display(),
            extension_set.display_sorted()
        );

        Ok(extension_set)
    }

    /// Whether `extension` (with leading dot) is in the set.
    pub fn contains(
        &self,
        extension: &str,
    ) -> bool {
        self.extensions.contains(extension)
    }

    /// Whether extension of file `name` is in the set.
    pub fn matches_name(
        &self,
        name: &str,
    ) -> bool {
        self.contains(extension_of(name))
    }

    /// Whether extension of file `name` is in the set. Only the extension
    /// needs to be valid UTF-8, the rest of the name may be arbitrary bytes.
    pub fn matches_os_name(
        &self,
        name: &OsStr,
    ) -> bool {
        std::str::from_utf8(extension_of_bytes(name.as_encoded_bytes()))
            .is_ok_and(|extension| self.contains(extension))
    }

    /// Number of extensions in the set.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Comma separated, sorted list of extensions, for logging.
    pub fn display_sorted(&self) -> String {
        itertools::join(itertools::sorted(self.extensions.iter()), ", ")
    }
}
impl Default for ExtensionSet {
    fn default() -> Self {
        Self::parse(DEFAULT_EXTENSIONS.trim())
    }
}
impl<S: Into<String>> FromIterator<S> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let extensions = iter.into_iter().map(Into::into).collect();
        Self { extensions }
    }
}

#[cfg(test)]
mod test {
    use super::{ExtensionSet, extension_of, extension_of_bytes};
    use std::{ffi::OsStr, fs};
    use tempfile::tempdir;
    use test_case::test_case;

    #[test_case("index.html", ".html"; "simple")]
    #[test_case("archive.tar.gz", ".gz"; "double extension")]
    #[test_case("Makefile", ""; "no dot")]
    #[test_case("trailing.", ""; "trailing dot")]
    #[test_case(".htaccess", ""; "leading dot only")]
    #[test_case(".config.json", ".json"; "leading dot and extension")]
    #[test_case("", ""; "empty name")]
    #[test_case(".", ""; "single dot")]
    fn extension_of_returns_expected(
        name: &str,
        expected: &str,
    ) {
        assert_eq!(extension_of(name), expected);
    }

    #[test_case(b"index.html", b".html"; "simple")]
    #[test_case(b"caf\xe9.html", b".html"; "non utf8 stem")]
    #[test_case(b"page.h\xe9ml", b".h\xe9ml"; "non utf8 extension")]
    #[test_case(b".htaccess", b""; "leading dot only")]
    #[test_case(b"trailing.", b""; "trailing dot")]
    #[test_case(b"", b""; "empty name")]
    fn extension_of_bytes_returns_expected(
        name: &[u8],
        expected: &[u8],
    ) {
        assert_eq!(extension_of_bytes(name), expected);
    }

    #[test]
    fn matches_os_name_agrees_with_matches_name() {
        let extension_set = ExtensionSet::from_iter([".html", ""]);

        for name in ["index.html", "style.css", "Makefile", ".htaccess", "a.tar.gz"] {
            assert_eq!(
                extension_set.matches_os_name(OsStr::new(name)),
                extension_set.matches_name(name),
                "{name}"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn matches_os_name_accepts_non_utf8_stem() {
        use std::os::unix::ffi::OsStrExt;

        let extension_set = ExtensionSet::from_iter([".html"]);

        assert!(extension_set.matches_os_name(OsStr::from_bytes(b"caf\xe9.html")));
        assert!(!extension_set.matches_os_name(OsStr::from_bytes(b"caf\xe9.css")));
        assert!(!extension_set.matches_os_name(OsStr::from_bytes(b"page.h\xe9ml")));
    }

    #[test]
    fn parse_strips_and_merges() {
        let extension_set = ExtensionSet::parse(" .html\n.css  \n\t.js\n.html\n");

        assert_eq!(extension_set.len(), 3);
        assert!(extension_set.contains(".html"));
        assert!(extension_set.contains(".css"));
        assert!(extension_set.contains(".js"));
        assert!(!extension_set.contains(""));
    }

    #[test]
    fn parse_keeps_blank_line_as_empty_extension() {
        let extension_set = ExtensionSet::parse(".html\n\n.css");

        assert!(extension_set.contains(""));
        assert!(extension_set.matches_name("LICENSE"));
    }

    #[test]
    fn default_contains_common_web_types() {
        let extension_set = ExtensionSet::default();

        for extension in [".html", ".css", ".js", ".svg", ".json"] {
            assert!(extension_set.contains(extension), "{extension}");
        }
        assert!(!extension_set.contains(""));
        assert!(!extension_set.contains(".gz"));
        assert!(!extension_set.contains(".png"));
    }

    #[test]
    fn matches_name_uses_last_extension() {
        let extension_set = ExtensionSet::from_iter([".tar"]);

        assert!(extension_set.matches_name("backup.tar"));
        assert!(!extension_set.matches_name("backup.tar.gz"));
    }

    #[test]
    fn read_from_path_reads_file() {
        let directory = tempdir().unwrap();
        let path = directory.path().join("extensions.txt");
        fs::write(&path, ".html\n.xml\n").unwrap();

        let extension_set = ExtensionSet::read_from_path(&path).unwrap();

        assert_eq!(extension_set, ExtensionSet::from_iter([".html", ".xml"]));
        assert_eq!(extension_set.display_sorted(), ".html, .xml");
    }

    #[test]
    fn read_from_path_missing_file_fails() {
        let directory = tempdir().unwrap();

        assert!(ExtensionSet::read_from_path(&directory.path().join("missing.txt")).is_err());
    }
}
