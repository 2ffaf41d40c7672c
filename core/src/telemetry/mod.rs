//! telemetry/mod.rs
//! Per-compressor statistics snapshots and service-wide counters.
//!
//! - `CompressionStats` is an immutable value replaced after every compress.
//! - `ServiceCounters` are lock-free atomics shared by every caller thread.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
