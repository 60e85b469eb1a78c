#![allow(dead_code)]

use flate2::{Compression, read::MultiGzDecoder, write::GzEncoder};
use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};
use tempfile::TempDir;
use walkdir::WalkDir;

// static files in data/site matching default extensions
pub const SITE_STATIC_FILES: &[&str] = &[
    "index.html",
    "robots.txt",
    "assets/css/style.css",
    "assets/js/script.js",
    "blog/first-post.html",
];

pub fn site_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("site")
}

// copies data/site into a fresh temporary directory, so tests can modify it
pub fn site_copy() -> TempDir {
    let directory = tempfile::tempdir().unwrap();
    let source = site_path();

    for entry in WalkDir::new(&source).min_depth(1) {
        let entry = entry.unwrap();
        let target = directory.path().join(entry.path().strip_prefix(&source).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }

    directory
}

pub fn decompress(path: &Path) -> Vec<u8> {
    let mut content = Vec::new();
    MultiGzDecoder::new(File::open(path).unwrap())
        .read_to_end(&mut content)
        .unwrap();
    content
}

pub fn write_gzip(
    path: &Path,
    content: &[u8],
) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    fs::write(path, encoder.finish().unwrap()).unwrap();
}

pub fn companion(path: &Path) -> PathBuf {
    gzip_static::directory::companion_path(path)
}
