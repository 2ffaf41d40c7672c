//! telemetry/snapshot.rs
//!
//! Last-operation statistics for a named compressor.
use std::time::Duration;
use serde::Serialize;

/// Ratio reported when the compressed size is zero (empty input).
pub const RATIO_UNDEFINED: f64 = 0.0;

/// Snapshot of the most recent compress call on one compressor.
/// Never mutated in place; the compressor swaps in a new value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CompressionStats {
    pub original_size: u64,
    pub compressed_size: u64,
    /// `original_size / compressed_size`, or `RATIO_UNDEFINED` when nothing
    /// was produced.
    pub compression_ratio: f64,
    pub compression_time: Duration,
}

impl CompressionStats {
    pub fn record(original_size: usize, compressed_size: usize, elapsed: Duration) -> Self {
        Self {
            original_size: original_size as u64,
            compressed_size: compressed_size as u64,
            compression_ratio: ratio(original_size as u64, compressed_size as u64),
            compression_time: elapsed,
        }
    }

    /// Elapsed time in nanoseconds, saturating at `u64::MAX`.
    pub fn compression_time_nanos(&self) -> u64 {
        u64::try_from(self.compression_time.as_nanos()).unwrap_or(u64::MAX)
    }
}

pub fn ratio(original_size: u64, compressed_size: u64) -> f64 {
    if compressed_size == 0 {
        return RATIO_UNDEFINED;
    }
    original_size as f64 / compressed_size as f64
}
