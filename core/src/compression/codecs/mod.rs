//! compression/codecs/mod.rs
//! Codec adapters. Only zstd is linked; the registry, compressor and pool
//! talk to it exclusively through the handles defined here.

pub mod zstd;

pub use self::zstd::*;
