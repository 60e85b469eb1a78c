//! Content hashing. Contains [hash_file_contents], used to compare a static
//! file with its compressed companion by content.
//!
//! Hashing is used only for equality checks between two local files, it is
//! not a security boundary. Any algorithm implementing [ContentHasher] can be
//! used, faster ones are preferred.

use crate::{directory::is_gzip_name, error::ConfigurationError};
use anyhow::{Context, Error, ensure};
use flate2::bufread::MultiGzDecoder;
use sha3::{Digest, Sha3_256};
use std::{
    fs::File,
    io::{BufReader, ErrorKind, Read},
    path::Path,
};

/// Streaming hasher, fed with consecutive chunks of content.
pub trait ContentHasher {
    /// Appends `data` to hashed content.
    fn update(
        &mut self,
        data: &[u8],
    );

    /// Consumes hasher, returning digest of all data passed to
    /// [Self::update].
    fn digest(self: Box<Self>) -> Box<[u8]>;
}

impl ContentHasher for Sha3_256 {
    fn update(
        &mut self,
        data: &[u8],
    ) {
        Digest::update(self, data);
    }

    fn digest(self: Box<Self>) -> Box<[u8]> {
        Digest::finalize(*self).to_vec().into_boxed_slice()
    }
}

#[cfg(feature = "xxhash")]
impl ContentHasher for xxhash_rust::xxh3::Xxh3 {
    fn update(
        &mut self,
        data: &[u8],
    ) {
        xxhash_rust::xxh3::Xxh3::update(self, data);
    }

    fn digest(self: Box<Self>) -> Box<[u8]> {
        Box::new(self.digest128().to_be_bytes())
    }
}

/// Available hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA3-256, always available.
    Sha3_256,
    /// XXH3 128 bit, much faster, requires `xxhash` feature.
    Xxh3_128,
}
impl HashAlgorithm {
    /// Human readable name, as used in command line.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha3_256 => "sha3-256",
            HashAlgorithm::Xxh3_128 => "xxh3-128",
        }
    }

    /// Whether this algorithm is compiled in.
    pub fn is_available(self) -> bool {
        match self {
            HashAlgorithm::Sha3_256 => true,
            HashAlgorithm::Xxh3_128 => cfg!(feature = "xxhash"),
        }
    }

    /// Creates new, empty hasher for this algorithm.
    pub fn hasher(self) -> Result<Box<dyn ContentHasher>, ConfigurationError> {
        match self {
            HashAlgorithm::Sha3_256 => Ok(Box::new(Sha3_256::new())),
            #[cfg(feature = "xxhash")]
            HashAlgorithm::Xxh3_128 => Ok(Box::new(xxhash_rust::xxh3::Xxh3::new())),
            #[cfg(not(feature = "xxhash"))]
            HashAlgorithm::Xxh3_128 => Err(ConfigurationError::HashAlgorithmUnavailable(
                self.name(),
            )),
        }
    }
}
impl Default for HashAlgorithm {
    /// Fastest available algorithm.
    fn default() -> Self {
        if HashAlgorithm::Xxh3_128.is_available() {
            HashAlgorithm::Xxh3_128
        } else {
            HashAlgorithm::Sha3_256
        }
    }
}

/// Options for [hash_file_contents].
///
/// If not sure what to set here, use [Default].
#[derive(Debug, Clone)]
pub struct HashOptions {
    /// Size of chunks hashed at once. For plain files this is also the read
    /// size, for compressed files this is the maximum size of decompressed
    /// output produced at once. Must not be zero.
    pub block_size: usize,
    /// Size of raw chunks read from compressed files and fed to the decoder.
    /// Must not be zero.
    pub gzip_block_size: usize,
}
impl Default for HashOptions {
    fn default() -> Self {
        Self {
            block_size: 32 * 1024,
            gzip_block_size: 8 * 1024,
        }
    }
}

/// Reads file in `path` and returns digest of its content.
///
/// Files with name ending in `.gz` are decompressed on the fly and digest of
/// decompressed content is returned, so a static file and its up to date
/// companion hash to the same value. Decompressed output is drained in
/// [HashOptions::block_size] chunks, so memory usage does not depend on the
/// compression ratio.
///
/// # Examples
///
/// ```
/// # use anyhow::Error;
/// # use gzip_static::{
/// #     compress::{compress_path, CompressOptions},
/// #     hash::{hash_file_contents, HashAlgorithm, HashOptions},
/// # };
/// # use std::fs;
/// #
/// # fn main() -> Result<(), Error> {
/// #
/// let directory = tempfile::tempdir()?;
/// let path = directory.path().join("index.html");
/// fs::write(&path, "<html>Hello World!</html>")?;
/// compress_path(&path, &CompressOptions::default())?;
///
/// assert_eq!(
///     hash_file_contents(&path, HashAlgorithm::Sha3_256, &HashOptions::default())?,
///     hash_file_contents(
///         &directory.path().join("index.html.gz"),
///         HashAlgorithm::Sha3_256,
///         &HashOptions::default(),
///     )?,
/// );
/// #
/// # Ok(())
/// # }
/// ```
pub fn hash_file_contents(
    path: &Path,
    hash_algorithm: HashAlgorithm,
    options: &HashOptions,
) -> Result<Box<[u8]>, Error> {
    ensure!(options.block_size > 0, "block size must be greater than zero");
    ensure!(
        options.gzip_block_size > 0,
        "gzip block size must be greater than zero"
    );

    let mut hasher = hash_algorithm.hasher()?;

    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader: Box<dyn Read> = if is_gzip_name(path.as_os_str()) {
        Box::new(MultiGzDecoder::new(BufReader::with_capacity(
            options.gzip_block_size,
            file,
        )))
    } else {
        Box::new(file)
    };

    let mut block = vec![0u8; options.block_size];
    loop {
        let length = match reader.read(&mut block) {
            Ok(0) => break,
            Ok(length) => length,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => {
                return Err(error).with_context(|| format!("read {}", path.display()));
            }
        };
        hasher.update(&block[..length]);
    }

    Ok(hasher.digest())
}

#[cfg(test)]
mod test {
    use super::{HashAlgorithm, HashOptions, hash_file_contents};
    use flate2::{Compression, write::GzEncoder};
    use std::{fs, io::Write, path::Path};
    use tempfile::tempdir;

    fn write_gzip(
        path: &Path,
        content: &[u8],
    ) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        fs::write(path, encoder.finish().unwrap()).unwrap();
    }

    fn assert_plain_and_compressed_hash_equal(
        hash_algorithm: HashAlgorithm,
        digest_length: usize,
    ) {
        let directory = tempdir().unwrap();
        let content = b"lorem ipsum lorem ipsum lorem ipsum lorem ipsum lorem ipsum".repeat(1000);
        let plain_path = directory.path().join("lorem.txt");
        let gzip_path = directory.path().join("lorem.txt.gz");
        fs::write(&plain_path, &content).unwrap();
        write_gzip(&gzip_path, &content);

        let plain = hash_file_contents(&plain_path, hash_algorithm, &HashOptions::default()).unwrap();
        let gzip = hash_file_contents(&gzip_path, hash_algorithm, &HashOptions::default()).unwrap();

        assert_eq!(plain.len(), digest_length);
        assert_eq!(plain, gzip);
    }

    #[test]
    fn plain_and_compressed_hash_equal_sha3() {
        assert_plain_and_compressed_hash_equal(HashAlgorithm::Sha3_256, 32);
    }

    #[cfg(feature = "xxhash")]
    #[test]
    fn plain_and_compressed_hash_equal_xxh3() {
        assert_plain_and_compressed_hash_equal(HashAlgorithm::Xxh3_128, 16);
    }

    #[test]
    fn different_content_hashes_differ() {
        let directory = tempdir().unwrap();
        let plain_path = directory.path().join("index.html");
        let gzip_path = directory.path().join("index.html.gz");
        fs::write(&plain_path, b"<html>new</html>").unwrap();
        write_gzip(&gzip_path, b"<html>old</html>");

        assert_ne!(
            hash_file_contents(&plain_path, HashAlgorithm::default(), &HashOptions::default())
                .unwrap(),
            hash_file_contents(&gzip_path, HashAlgorithm::default(), &HashOptions::default())
                .unwrap(),
        );
    }

    #[test]
    fn block_size_does_not_change_digest() {
        let directory = tempdir().unwrap();
        let content = (0..100_000u32)
            .flat_map(|value| value.to_le_bytes())
            .collect::<Vec<_>>();
        let gzip_path = directory.path().join("data.json.gz");
        write_gzip(&gzip_path, &content);

        let small = hash_file_contents(
            &gzip_path,
            HashAlgorithm::Sha3_256,
            &HashOptions {
                block_size: 7,
                gzip_block_size: 3,
            },
        )
        .unwrap();
        let large = hash_file_contents(&gzip_path, HashAlgorithm::Sha3_256, &HashOptions::default())
            .unwrap();

        assert_eq!(small, large);
    }

    #[test]
    fn concatenated_members_are_hashed_in_full() {
        let directory = tempdir().unwrap();
        let first = directory.path().join("first.gz");
        let second = directory.path().join("second.gz");
        write_gzip(&first, b"hello ");
        write_gzip(&second, b"world");
        let joined_path = directory.path().join("greeting.txt.gz");
        let mut joined = fs::read(&first).unwrap();
        joined.extend(fs::read(&second).unwrap());
        fs::write(&joined_path, joined).unwrap();
        let plain_path = directory.path().join("greeting.txt");
        fs::write(&plain_path, b"hello world").unwrap();

        assert_eq!(
            hash_file_contents(&joined_path, HashAlgorithm::Sha3_256, &HashOptions::default())
                .unwrap(),
            hash_file_contents(&plain_path, HashAlgorithm::Sha3_256, &HashOptions::default())
                .unwrap(),
        );
    }

    #[test]
    fn zero_block_size_fails() {
        let directory = tempdir().unwrap();
        let path = directory.path().join("a.txt");
        fs::write(&path, b"aaa").unwrap();

        for options in [
            HashOptions {
                block_size: 0,
                ..HashOptions::default()
            },
            HashOptions {
                gzip_block_size: 0,
                ..HashOptions::default()
            },
        ] {
            assert!(hash_file_contents(&path, HashAlgorithm::Sha3_256, &options).is_err());
        }
    }

    #[test]
    fn invalid_gzip_fails() {
        let directory = tempdir().unwrap();
        let gzip_path = directory.path().join("index.html.gz");
        fs::write(&gzip_path, b"this is not gzip at all").unwrap();

        assert!(
            hash_file_contents(&gzip_path, HashAlgorithm::default(), &HashOptions::default())
                .is_err()
        );
    }

    #[test]
    fn missing_file_fails() {
        let directory = tempdir().unwrap();

        assert!(
            hash_file_contents(
                &directory.path().join("missing.html"),
                HashAlgorithm::default(),
                &HashOptions::default()
            )
            .is_err()
        );
    }

    #[test]
    fn empty_file_hashes() {
        let directory = tempdir().unwrap();
        let plain_path = directory.path().join("empty.css");
        let gzip_path = directory.path().join("empty.css.gz");
        fs::write(&plain_path, b"").unwrap();
        write_gzip(&gzip_path, b"");

        assert_eq!(
            hash_file_contents(&plain_path, HashAlgorithm::default(), &HashOptions::default())
                .unwrap(),
            hash_file_contents(&gzip_path, HashAlgorithm::default(), &HashOptions::default())
                .unwrap(),
        );
    }

    #[test]
    fn default_prefers_available_algorithm() {
        assert!(HashAlgorithm::default().is_available());
        assert!(HashAlgorithm::Sha3_256.hasher().is_ok());
        assert_eq!(
            HashAlgorithm::Xxh3_128.hasher().is_ok(),
            HashAlgorithm::Xxh3_128.is_available()
        );
    }
}
