//! Compression helpers. Contains [compress_path], writing `.gz` companion of a
//! file, and [mirror_metadata] copying timestamps and permissions onto it.

use crate::{directory::companion_path, error::ConfigurationError};
use anyhow::{Context, Error, ensure};
use flate2::{Compression, GzBuilder};
use std::{
    fs::{self, File, FileTimes, OpenOptions},
    io::{BufWriter, ErrorKind, Read, Write},
    path::Path,
    time::UNIX_EPOCH,
};

/// Level used when zopfli compression is not possible for a file.
pub const FALLBACK_LEVEL: CompressionLevel = CompressionLevel::Gzip(9);

/// Compression backend and its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Streaming deflate, level 0-9.
    Gzip(u32),
    /// Zopfli, in memory, slow, produces the smallest output. Requires
    /// `zopfli` feature.
    Zopfli,
}
impl CompressionLevel {
    /// Numeric level, as used in command line. Zopfli is `11`.
    pub fn level(self) -> u32 {
        match self {
            CompressionLevel::Gzip(level) => level,
            CompressionLevel::Zopfli => 11,
        }
    }
}
impl Default for CompressionLevel {
    fn default() -> Self {
        FALLBACK_LEVEL
    }
}
impl TryFrom<u32> for CompressionLevel {
    type Error = ConfigurationError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        match level {
            0..=9 => Ok(CompressionLevel::Gzip(level)),
            11 => Ok(CompressionLevel::Zopfli),
            level => Err(ConfigurationError::UnsupportedCompressionLevel(level)),
        }
    }
}

/// Options for [compress_path].
///
/// If not sure what to set here, use [Default].
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Backend and level to use.
    pub level: CompressionLevel,
    /// Size of chunks read from source file at once (streaming backend only).
    /// Must not be zero.
    pub block_size: usize,
    /// Files larger than this are compressed with [FALLBACK_LEVEL] instead of
    /// zopfli, as zopfli keeps whole file in memory.
    pub zopfli_maximum_size: u64,
}
impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            level: CompressionLevel::default(),
            block_size: 32 * 1024,
            zopfli_maximum_size: 50 * 1024 * 1024,
        }
    }
}

/// Compresses file in `path` into `path` + `.gz`, overwriting existing file.
///
/// Similar to `gzip -k <path>`. Metadata is not copied, see
/// [mirror_metadata].
///
/// # Examples
///
/// ```
/// # use anyhow::Error;
/// # use gzip_static::compress::{compress_path, CompressOptions, CompressionLevel};
/// # use std::{fs, io::Read};
/// #
/// # fn main() -> Result<(), Error> {
/// #
/// let directory = tempfile::tempdir()?;
/// let path = directory.path().join("style.css");
/// fs::write(&path, "body { color: red; }")?;
///
/// compress_path(
///     &path,
///     &CompressOptions {
///         level: CompressionLevel::Gzip(6),
///         ..CompressOptions::default()
///     },
/// )?;
///
/// let mut content = String::new();
/// flate2::read::GzDecoder::new(fs::File::open(directory.path().join("style.css.gz"))?)
///     .read_to_string(&mut content)?;
/// assert_eq!(content, "body { color: red; }");
/// #
/// # Ok(())
/// # }
/// ```
pub fn compress_path(
    path: &Path,
    options: &CompressOptions,
) -> Result<(), Error> {
    ensure!(options.block_size > 0, "block size must be greater than zero");

    let output_path = companion_path(path);

    let level = match options.level {
        CompressionLevel::Zopfli => {
            let size = fs::metadata(path)
                .with_context(|| format!("stat {}", path.display()))?
                .len();
            if size <= options.zopfli_maximum_size {
                return compress_zopfli(path, &output_path);
            }

            log::warn!(
                "{} is larger than {} bytes, falling back to gzip compression level {}",
                path.display(),
                options.zopfli_maximum_size,
                FALLBACK_LEVEL.level()
            );
            FALLBACK_LEVEL
        }
        level => level,
    };

    compress_gzip(path, &output_path, level.level(), options.block_size)
}

fn compress_gzip(
    path: &Path,
    output_path: &Path,
    level: u32,
    block_size: usize,
) -> Result<(), Error> {
    let mut input = File::open(path).with_context(|| format!("open {}", path.display()))?;

    // header carries original name and mtime, like `gzip` does
    let mut builder = GzBuilder::new();
    if let Some(name) = path.file_name() {
        builder = builder.filename(name.as_encoded_bytes());
    }
    let mtime = input
        .metadata()
        .and_then(|metadata| metadata.modified())
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .and_then(|since_epoch| u32::try_from(since_epoch.as_secs()).ok());
    if let Some(mtime) = mtime {
        builder = builder.mtime(mtime);
    }

    let output = File::create(output_path)
        .with_context(|| format!("create {}", output_path.display()))?;
    let mut encoder = builder.write(BufWriter::new(output), Compression::new(level));

    let mut block = vec![0u8; block_size];
    loop {
        let length = match input.read(&mut block) {
            Ok(0) => break,
            Ok(length) => length,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => {
                return Err(error).with_context(|| format!("read {}", path.display()));
            }
        };
        encoder
            .write_all(&block[..length])
            .with_context(|| format!("write {}", output_path.display()))?;
    }

    encoder
        .finish()
        .and_then(|mut writer| writer.flush())
        .with_context(|| format!("write {}", output_path.display()))?;

    Ok(())
}

#[cfg(feature = "zopfli")]
fn compress_zopfli(
    path: &Path,
    output_path: &Path,
) -> Result<(), Error> {
    let content = fs::read(path).with_context(|| format!("read {}", path.display()))?;

    let output = File::create(output_path)
        .with_context(|| format!("create {}", output_path.display()))?;
    let mut writer = BufWriter::new(output);
    zopfli::compress(
        zopfli::Options::default(),
        zopfli::Format::Gzip,
        content.as_slice(),
        &mut writer,
    )
    .and_then(|()| writer.flush())
    .with_context(|| format!("write {}", output_path.display()))?;

    Ok(())
}

#[cfg(not(feature = "zopfli"))]
fn compress_zopfli(
    _path: &Path,
    _output_path: &Path,
) -> Result<(), Error> {
    Err(ConfigurationError::ZopfliUnavailable.into())
}

/// Copies access and modification times and permissions from `source` to
/// `target`.
///
/// Web servers serving precompressed files report `Last-Modified` of the
/// compressed file, so it has to match the source.
pub fn mirror_metadata(
    source: &Path,
    target: &Path,
) -> Result<(), Error> {
    let metadata = fs::metadata(source).with_context(|| format!("stat {}", source.display()))?;

    let file_times = FileTimes::new()
        .set_accessed(
            metadata
                .accessed()
                .with_context(|| format!("stat {}", source.display()))?,
        )
        .set_modified(
            metadata
                .modified()
                .with_context(|| format!("stat {}", source.display()))?,
        );

    // times first, permissions may make the file read only
    let target_file = OpenOptions::new()
        .write(true)
        .open(target)
        .with_context(|| format!("open {}", target.display()))?;
    target_file
        .set_times(file_times)
        .with_context(|| format!("set times of {}", target.display()))?;
    drop(target_file);

    fs::set_permissions(target, metadata.permissions())
        .with_context(|| format!("set permissions of {}", target.display()))?;

    Ok(())
}
