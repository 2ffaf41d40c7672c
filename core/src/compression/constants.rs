//! compression/constants.rs
//! Level and window bounds, presets and pool defaults.

/// Accepted compression levels (inclusive).
pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 22;
pub const DEFAULT_LEVEL: i32 = 3;

/// Accepted window exponents (inclusive). Window is `1 << window_log` bytes.
pub const MIN_WINDOW_LOG: u32 = 10;
pub const MAX_WINDOW_LOG: u32 = 31;
pub const DEFAULT_WINDOW_LOG: u32 = 22;

/// Named level presets exposed to hosts.
pub mod levels {
    pub const FASTEST: i32 = 1;
    pub const DEFAULT: i32 = 3;
    pub const BETTER: i32 = 6;
    pub const BEST: i32 = 9;
    pub const ULTRA: i32 = 19;
}

/// Default decode output ceiling (1 GiB).
pub const DEFAULT_MAX_DECODED_SIZE: u64 = 1 << 30;

/// Largest declared content size decoded straight into a pre-sized buffer.
/// Bigger frames are read through the bounded stream and grow as they decode.
pub const ONE_SHOT_DECODE_LIMIT: u64 = 8 << 20;

/// Handles parked per kind, per CPU, when no capacity is configured.
pub const POOL_SLOTS_PER_CPU: usize = 2;

/// Codec label used in error context.
pub const CODEC_NAME: &str = "zstd";

/// Prefix for names produced by `Registry::create_unique`.
pub const UNIQUE_NAME_PREFIX: &str = "compressor_";

/// FFI-safe enum over the level presets.
#[repr(i32)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
)]
pub enum LevelPreset {
    Fastest = levels::FASTEST,
    Default = levels::DEFAULT,
    Better = levels::BETTER,
    Best = levels::BEST,
    Ultra = levels::ULTRA,
}
