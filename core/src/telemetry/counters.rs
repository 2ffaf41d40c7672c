//! telemetry/counters.rs
//! Service-wide counters updated by every boundary call.
//!
//! Relaxed atomics: counters are monotonic tallies, no ordering with the data
//! they describe is implied.
use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

#[derive(Debug, Default)]
pub struct ServiceCounters {
    compress_calls: AtomicU64,
    decompress_calls: AtomicU64,
    quick_compress_calls: AtomicU64,
    quick_decompress_calls: AtomicU64,
    decode_failures: AtomicU64,
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
}

/// Point-in-time copy of `ServiceCounters`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    pub compress_calls: u64,
    pub decompress_calls: u64,
    pub quick_compress_calls: u64,
    pub quick_decompress_calls: u64,
    pub decode_failures: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl ServiceCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one compress call (named or quick) that turned `in_len` bytes
    /// into `out_len` bytes.
    pub fn add_compress(&self, quick: bool, in_len: usize, out_len: usize) {
        let calls = if quick { &self.quick_compress_calls } else { &self.compress_calls };
        calls.fetch_add(1, Ordering::Relaxed);
        self.add_bytes(in_len, out_len);
    }

    pub fn add_decompress(&self, quick: bool, in_len: usize, out_len: usize) {
        let calls = if quick { &self.quick_decompress_calls } else { &self.decompress_calls };
        calls.fetch_add(1, Ordering::Relaxed);
        self.add_bytes(in_len, out_len);
    }

    pub fn add_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn add_bytes(&self, in_len: usize, out_len: usize) {
        self.bytes_in.fetch_add(in_len as u64, Ordering::Relaxed);
        self.bytes_out.fetch_add(out_len as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            compress_calls: self.compress_calls.load(Ordering::Relaxed),
            decompress_calls: self.decompress_calls.load(Ordering::Relaxed),
            quick_compress_calls: self.quick_compress_calls.load(Ordering::Relaxed),
            quick_decompress_calls: self.quick_decompress_calls.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
        }
    }
}

impl CountersSnapshot {
    pub fn to_json(&self) -> String {
        // Plain integer fields: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}
