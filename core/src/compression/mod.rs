//! compression/mod.rs
//! Named compressors, their registry and the pooled quick path.
//!
//! - `codecs` wraps the zstd contexts; nothing else touches zstd directly.
//! - `Compressor` owns one encoder/decoder pair behind its own lock.
//! - `Registry` maps names to compressors.
//! - `QuickPool` serves one-shot calls with no identity.

pub mod codecs;
pub mod compressor;
pub mod constants;
pub mod pool;
pub mod registry;
pub mod types;

pub use codecs::{codec_info, CodecInfo};
pub use compressor::Compressor;
pub use constants::*;
pub use pool::QuickPool;
pub use registry::*;
pub use types::*;
