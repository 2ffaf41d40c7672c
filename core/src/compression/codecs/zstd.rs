//! src/compression/codecs/zstd.rs
//!
//! Zstd encoder/decoder handles.
//!
//! Design notes:
//! - Each handle owns one native context (`CCtx` / `DCtx`) for its whole life.
//! - `reset` clears session and parameters, then re-applies configuration, so
//!   a reused handle never leaks state from a previous caller.
//! - Encoders always write the content size and a content checksum; decoders
//!   rely on both to reject truncated or bit-flipped input.
//! - Errors are mapped into `CompressionError` variants with codec context.
use std::io::Read;

use serde::Serialize;
use zstd_safe::{CCtx, CParameter, DCtx, DParameter, ErrorCode, ResetDirective};

use crate::compression::constants::{
    CODEC_NAME, DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL, ONE_SHOT_DECODE_LIMIT,
};
use crate::compression::types::{CompressionError, DecodeError};

fn init_error(code: ErrorCode) -> CompressionError {
    CompressionError::CodecInit {
        codec: CODEC_NAME,
        msg: zstd_safe::get_error_name(code).to_string(),
    }
}

fn process_error(code: ErrorCode) -> CompressionError {
    CompressionError::CodecProcess {
        codec: CODEC_NAME,
        msg: zstd_safe::get_error_name(code).to_string(),
    }
}

fn corrupt(code: ErrorCode) -> CompressionError {
    DecodeError::Corrupt(zstd_safe::get_error_name(code).to_string()).into()
}

/// Zstd one-shot encoder.
/// - Holds a compression context configured for one level and window.
pub struct ZstdEncoder {
    cctx: CCtx<'static>,
    level: i32,
    window_log: Option<u32>,
}

impl ZstdEncoder {
    /// Create an encoder for `level`, optionally pinning the window exponent.
    ///
    /// # Errors
    /// - `CompressionError::CodecInit` if the context cannot be allocated or
    ///   zstd rejects a parameter.
    pub fn new(level: i32, window_log: Option<u32>) -> Result<Self, CompressionError> {
        let cctx = CCtx::try_create().ok_or_else(|| CompressionError::CodecInit {
            codec: CODEC_NAME,
            msg: "cannot allocate compression context".into(),
        })?;

        let mut encoder = Self { cctx, level, window_log };
        encoder.configure()?;
        Ok(encoder)
    }

    /// Drop all session and parameter state, then configure for `level`.
    pub fn reset(&mut self, level: i32, window_log: Option<u32>) -> Result<(), CompressionError> {
        self.cctx
            .reset(ResetDirective::SessionAndParameters)
            .map_err(init_error)?;
        self.level = level;
        self.window_log = window_log;
        self.configure()
    }

    fn configure(&mut self) -> Result<(), CompressionError> {
        self.cctx
            .set_parameter(CParameter::CompressionLevel(self.level))
            .map_err(init_error)?;
        if let Some(window_log) = self.window_log {
            self.cctx
                .set_parameter(CParameter::WindowLog(window_log))
                .map_err(init_error)?;
        }
        self.cctx
            .set_parameter(CParameter::ChecksumFlag(true))
            .map_err(init_error)?;
        Ok(())
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Encode `data` into a single complete frame.
    pub fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let mut out = Vec::with_capacity(zstd_safe::compress_bound(data.len()));
        self.cctx.compress2(&mut out, data).map_err(process_error)?;
        Ok(out)
    }
}

/// Zstd one-shot decoder.
/// - Frames declaring up to `ONE_SHOT_DECODE_LIMIT` bytes decode straight
///   into an exact allocation.
/// - Larger or undeclared frames go through a bounded streaming read; the
///   output grows with decoded bytes instead of the header's claim.
pub struct ZstdDecoder {
    dctx: DCtx<'static>,
    window_log_max: u32,
}

impl ZstdDecoder {
    pub fn new(window_log_max: u32) -> Result<Self, CompressionError> {
        let dctx = DCtx::try_create().ok_or_else(|| CompressionError::CodecInit {
            codec: CODEC_NAME,
            msg: "cannot allocate decompression context".into(),
        })?;

        let mut decoder = Self { dctx, window_log_max };
        decoder.configure()?;
        Ok(decoder)
    }

    pub fn reset(&mut self) -> Result<(), CompressionError> {
        self.dctx
            .reset(ResetDirective::SessionAndParameters)
            .map_err(init_error)?;
        self.configure()
    }

    fn configure(&mut self) -> Result<(), CompressionError> {
        self.dctx
            .set_parameter(DParameter::WindowLogMax(self.window_log_max))
            .map_err(init_error)?;
        Ok(())
    }

    /// Decode `data`, refusing to produce more than `max_output` bytes.
    ///
    /// # Errors
    /// - `DecodeError::InvalidHeader` when `data` is not a zstd frame.
    /// - `DecodeError::FrameTooLarge` when the declared size exceeds `max_output`.
    /// - `DecodeError::Corrupt` for truncated, corrupt or checksum-failing input.
    pub fn decode(&mut self, data: &[u8], max_output: u64) -> Result<Vec<u8>, CompressionError> {
        match zstd_safe::get_frame_content_size(data) {
            Ok(Some(size)) if size > max_output => {
                Err(DecodeError::FrameTooLarge { size, max: max_output }.into())
            }
            Ok(Some(size)) if size <= ONE_SHOT_DECODE_LIMIT => {
                let mut out = Vec::with_capacity(size as usize);
                self.dctx.decompress(&mut out, data).map_err(corrupt)?;
                Ok(out)
            }
            Ok(_) => self.decode_streaming(data, max_output),
            Err(_) => Err(DecodeError::InvalidHeader.into()),
        }
    }

    fn decode_streaming(&self, data: &[u8], max_output: u64) -> Result<Vec<u8>, CompressionError> {
        let mut reader = zstd::stream::read::Decoder::with_buffer(data)
            .map_err(|e| CompressionError::CodecInit { codec: CODEC_NAME, msg: e.to_string() })?;
        reader
            .window_log_max(self.window_log_max)
            .map_err(|e| CompressionError::CodecInit { codec: CODEC_NAME, msg: e.to_string() })?;

        let mut out = Vec::new();
        reader
            .take(max_output.saturating_add(1))
            .read_to_end(&mut out)
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?;

        if out.len() as u64 > max_output {
            return Err(DecodeError::FrameTooLarge { size: out.len() as u64, max: max_output }.into());
        }
        Ok(out)
    }
}

/// Static description of the linked codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodecInfo {
    /// Version of this library.
    pub version: &'static str,
    /// Version of the linked zstd library.
    pub codec_version: &'static str,
    pub min_level: i32,
    pub max_level: i32,
    pub default_level: i32,
}

pub fn codec_info() -> CodecInfo {
    CodecInfo {
        version: env!("CARGO_PKG_VERSION"),
        codec_version: zstd_safe::version_string(),
        min_level: MIN_LEVEL,
        max_level: MAX_LEVEL,
        default_level: DEFAULT_LEVEL,
    }
}
