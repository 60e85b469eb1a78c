//! Optional backends available to a run. Contains [Capabilities], assembled
//! once at startup and passed to [crate::sync::sync].

use crate::{compress::CompressionLevel, error::ConfigurationError, hash::HashAlgorithm};

/// Backends a run may use.
///
/// [Capabilities::detect] describes what is compiled in. Tests may construct
/// it directly to simulate missing backends.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// Whether zopfli compression ([CompressionLevel::Zopfli]) may be used.
    pub zopfli: bool,
    /// Algorithm used to compare files with their companions.
    pub hash_algorithm: HashAlgorithm,
}
impl Capabilities {
    /// Capabilities of this build, with the fastest hash algorithm available.
    pub fn detect() -> Self {
        Self {
            zopfli: cfg!(feature = "zopfli"),
            hash_algorithm: HashAlgorithm::default(),
        }
    }

    /// Verifies that `level` and the hash algorithm can be used.
    pub fn check(
        &self,
        level: CompressionLevel,
    ) -> Result<(), ConfigurationError> {
        if level == CompressionLevel::Zopfli && !self.zopfli {
            return Err(ConfigurationError::ZopfliUnavailable);
        }
        if !self.hash_algorithm.is_available() {
            return Err(ConfigurationError::HashAlgorithmUnavailable(
                self.hash_algorithm.name(),
            ));
        }

        Ok(())
    }
}
