//! zreg-core
//!
//! Named zstd compressors in a concurrent registry, plus a pooled one-shot
//! path. Pure Rust; the C boundary lives in `zreg-ffi`.

#![forbid(unsafe_code)]

pub mod utils;

pub mod compression;
pub mod config;
pub mod service;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{
        codec_info, levels, CodecInfo, CompressionError, Compressor, CompressorHandle,
        DecodeError, DecoderLimits, QuickPool, Registry, DEFAULT_LEVEL, DEFAULT_WINDOW_LOG,
        MAX_LEVEL, MAX_WINDOW_LOG, MIN_LEVEL, MIN_WINDOW_LOG,
    };
    pub use crate::config::ServiceConfig;
    pub use crate::service::{CompressionService, ServiceState};
    pub use crate::telemetry::{CompressionStats, CountersSnapshot};
}
