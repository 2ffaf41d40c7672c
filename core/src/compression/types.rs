//! compression/types.rs
//! Error taxonomy shared by the codec adapter, registry, compressor and pool.
use thiserror::Error;

/// Why a compressed buffer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input does not start with a zstd frame header.
    #[error("invalid frame header")]
    InvalidHeader,

    /// Declared content size exceeds the configured ceiling.
    #[error("frame too large: {size} > {max}")]
    FrameTooLarge { size: u64, max: u64 },

    /// Codec rejected the payload (corrupt, truncated, checksum mismatch).
    #[error("corrupt input: {0}")]
    Corrupt(String),
}

/// Unified error for every core operation.
///
/// Parameter and lookup errors are raised before any codec work begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("codec {codec} init failed: {msg}")]
    CodecInit { codec: &'static str, msg: String },

    #[error("codec {codec} process failed: {msg}")]
    CodecProcess { codec: &'static str, msg: String },

    #[error("compressor not found: {name}")]
    NotFound { name: String },

    #[error("compressor closed: {name}")]
    ClosedInstance { name: String },

    #[error("decompression failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CompressionError {
    /// Stable short label, used as a structured field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CompressionError::InvalidParameter(_) => "invalid_parameter",
            CompressionError::CodecInit { .. } => "codec_init",
            CompressionError::CodecProcess { .. } => "codec_process",
            CompressionError::NotFound { .. } => "not_found",
            CompressionError::ClosedInstance { .. } => "closed_instance",
            CompressionError::Decode(_) => "decode",
            CompressionError::Config(_) => "config",
        }
    }
}

/// Bounds every decoder is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderLimits {
    /// Largest output a single decode may produce, in bytes.
    pub max_decoded_size: u64,
    /// Largest window exponent a frame may declare.
    pub window_log_max: u32,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_decoded_size: crate::compression::constants::DEFAULT_MAX_DECODED_SIZE,
            window_log_max: crate::compression::constants::MAX_WINDOW_LOG,
        }
    }
}
