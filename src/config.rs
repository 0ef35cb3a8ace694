//! Global configuration options.
//!
//! The global configuration is held behind a read-write lock.
//! Use [`global_config`] to read it and [`global_config_mut`] to modify it.
//!
//! ## Validate Checksums
//! > default: [`true`]
//!
//! If enabled, the `crc32c` codec validates the checksum of a chunk on decode and fails on a mismatch.
//!
//! ## Codec Concurrent Limit
//! > default: [`std::thread::available_parallelism`]`()`
//!
//! The maximum number of chunks (or sub-chunks of a shard) processed concurrently by a parallel operation.
//!
//! ## Chunk Concurrent Minimum
//! > default: `4`
//!
//! Array operations spanning fewer chunks than this are processed serially.

use std::sync::OnceLock;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
#[derive(Debug)]
pub struct Config {
    validate_checksums: bool,
    codec_concurrent_limit: usize,
    chunk_concurrent_minimum: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validate_checksums: true,
            codec_concurrent_limit: std::thread::available_parallelism()
                .map_or(1, std::num::NonZeroUsize::get),
            chunk_concurrent_minimum: 4,
        }
    }
}

impl Config {
    /// Get the [validate checksums](#validate-checksums) configuration.
    #[must_use]
    pub fn validate_checksums(&self) -> bool {
        self.validate_checksums
    }

    /// Set the [validate checksums](#validate-checksums) configuration.
    pub fn set_validate_checksums(&mut self, validate_checksums: bool) {
        self.validate_checksums = validate_checksums;
    }

    /// Get the [codec concurrent limit](#codec-concurrent-limit) configuration.
    #[must_use]
    pub fn codec_concurrent_limit(&self) -> usize {
        self.codec_concurrent_limit
    }

    /// Set the [codec concurrent limit](#codec-concurrent-limit) configuration.
    ///
    /// A limit of zero is treated as one.
    pub fn set_codec_concurrent_limit(&mut self, concurrent_limit: usize) {
        self.codec_concurrent_limit = concurrent_limit.max(1);
    }

    /// Get the [chunk concurrent minimum](#chunk-concurrent-minimum) configuration.
    #[must_use]
    pub fn chunk_concurrent_minimum(&self) -> usize {
        self.chunk_concurrent_minimum
    }

    /// Set the [chunk concurrent minimum](#chunk-concurrent-minimum) configuration.
    pub fn set_chunk_concurrent_minimum(&mut self, concurrent_minimum: usize) {
        self.chunk_concurrent_minimum = concurrent_minimum;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global configuration.
///
/// Hold the guard only briefly, a writer blocks until it is dropped.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).read()
}

/// Returns a mutable reference to the global configuration.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).write()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert!(config.validate_checksums());
        assert!(config.codec_concurrent_limit() >= 1);
        assert_eq!(config.chunk_concurrent_minimum(), 4);
    }

    #[test]
    fn config_codec_concurrent_limit() {
        let limit = global_config().codec_concurrent_limit();
        global_config_mut().set_codec_concurrent_limit(0);
        assert_eq!(global_config().codec_concurrent_limit(), 1);
        global_config_mut().set_codec_concurrent_limit(limit);
        assert_eq!(global_config().codec_concurrent_limit(), limit);
    }
}
