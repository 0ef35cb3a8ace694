//! Concurrency limits for array operations and codecs.

use crate::config::global_config;

/// Return the concurrent limit of a codec operation.
///
/// This is the [codec concurrent limit](crate::config#codec-concurrent-limit) if `parallel`, otherwise 1.
pub(crate) fn concurrent_limit(parallel: bool) -> usize {
    if parallel {
        global_config().codec_concurrent_limit()
    } else {
        1
    }
}

/// Return the number of chunks an array operation over `num_chunks` chunks should process concurrently.
///
/// Operations spanning fewer chunks than the [chunk concurrent minimum](crate::config#chunk-concurrent-minimum) are serial.
pub(crate) fn chunk_concurrent_limit(num_chunks: usize, parallel: bool) -> usize {
    let config = global_config();
    if parallel && num_chunks >= config.chunk_concurrent_minimum() {
        config.codec_concurrent_limit().min(num_chunks).max(1)
    } else {
        1
    }
}
