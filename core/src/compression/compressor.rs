//! compression/compressor.rs
//! One named, stateful compression context.
//!
//! - The instance mutex guards the codec pair and the stats snapshot; it is
//!   held for exactly the duration of codec work and released before any
//!   event is emitted, so a log sink may call back into the same instance.
//! - Encoder and decoder live and die together (`Option<CodecPair>`), so a
//!   closed instance cannot reach either handle.
//! - Only `compress` replaces the stats; `decompress` leaves them alone.
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::compression::codecs::{ZstdDecoder, ZstdEncoder};
use crate::compression::types::{CompressionError, DecoderLimits};
use crate::telemetry::CompressionStats;
use crate::utils::{validate_level, validate_name, validate_window_log};

struct CodecPair {
    encoder: ZstdEncoder,
    decoder: ZstdDecoder,
}

struct State {
    codecs: Option<CodecPair>,
    stats: CompressionStats,
}

pub struct Compressor {
    name: String,
    level: i32,
    window_log: u32,
    limits: DecoderLimits,
    state: Mutex<State>,
}

impl std::fmt::Debug for Compressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compressor")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("window_log", &self.window_log)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Compressor {
    /// Validate parameters and build both codec handles.
    ///
    /// If the decoder cannot be built the already-built encoder is dropped
    /// before the error is returned.
    pub fn new(
        name: impl Into<String>,
        level: i32,
        window_log: u32,
        limits: DecoderLimits,
    ) -> Result<Self, CompressionError> {
        let name = name.into();
        validate_name(&name)?;
        validate_level(level)?;
        validate_window_log(window_log)?;

        let encoder = ZstdEncoder::new(level, Some(window_log))?;
        let decoder = ZstdDecoder::new(limits.window_log_max)?;

        Ok(Self {
            name,
            level,
            window_log,
            limits,
            state: Mutex::new(State {
                codecs: Some(CodecPair { encoder, decoder }),
                stats: CompressionStats::default(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn window_log(&self) -> u32 {
        self.window_log
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().codecs.is_none()
    }

    fn closed(&self) -> CompressionError {
        CompressionError::ClosedInstance { name: self.name.clone() }
    }

    /// Encode `data` into one frame and record sizes and elapsed time.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let out = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let codecs = state.codecs.as_mut().ok_or_else(|| self.closed())?;

            let started = Instant::now();
            let out = if data.is_empty() {
                Vec::new()
            } else {
                codecs.encoder.encode(data)?
            };
            state.stats = CompressionStats::record(data.len(), out.len(), started.elapsed());
            out
        };

        debug!(name = %self.name, in_len = data.len(), out_len = out.len(), "compress");
        Ok(out)
    }

    /// Decode `data`. Stats are not touched.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let out = {
            let mut guard = self.state.lock();
            let codecs = guard.codecs.as_mut().ok_or_else(|| self.closed())?;
            if data.is_empty() {
                return Ok(Vec::new());
            }
            codecs.decoder.decode(data, self.limits.max_decoded_size)?
        };

        debug!(name = %self.name, in_len = data.len(), out_len = out.len(), "decompress");
        Ok(out)
    }

    pub fn stats(&self) -> Result<CompressionStats, CompressionError> {
        let state = self.state.lock();
        if state.codecs.is_none() {
            return Err(self.closed());
        }
        Ok(state.stats)
    }

    /// Release both codec handles. A second close fails with `ClosedInstance`.
    pub fn close(&self) -> Result<(), CompressionError> {
        let codecs = self.state.lock().codecs.take().ok_or_else(|| self.closed())?;
        drop(codecs);
        debug!(name = %self.name, "codec handles released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compressor(level: i32, window_log: u32) -> Compressor {
        Compressor::new("unit", level, window_log, DecoderLimits::default()).unwrap()
    }

    #[test]
    fn compress_records_stats() {
        let c = compressor(3, 22);
        let data = vec![b'z'; 8192];
        let out = c.compress(&data).unwrap();

        let stats = c.stats().unwrap();
        assert_eq!(stats.original_size, 8192);
        assert_eq!(stats.compressed_size, out.len() as u64);
        assert_eq!(stats.compression_ratio, 8192.0 / out.len() as f64);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let c = compressor(1, 10);
        assert!(c.compress(&[]).unwrap().is_empty());
        assert!(c.decompress(&[]).unwrap().is_empty());
        let stats = c.stats().unwrap();
        assert_eq!((stats.original_size, stats.compressed_size), (0, 0));
        assert_eq!(stats.compression_ratio, crate::telemetry::RATIO_UNDEFINED);
    }

    #[test]
    fn invalid_parameters_rejected_before_codec_work() {
        let limits = DecoderLimits::default();
        for (name, level, window) in [("", 3, 22), ("x", 0, 22), ("x", 23, 22), ("x", 3, 9), ("x", 3, 32)] {
            assert!(matches!(
                Compressor::new(name, level, window, limits),
                Err(CompressionError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn closed_instance_refuses_everything() {
        let c = compressor(3, 22);
        c.close().unwrap();
        assert!(c.is_closed());
        assert!(matches!(c.compress(b"x"), Err(CompressionError::ClosedInstance { .. })));
        assert!(matches!(c.decompress(b"x"), Err(CompressionError::ClosedInstance { .. })));
        assert!(matches!(c.stats(), Err(CompressionError::ClosedInstance { .. })));
        assert!(matches!(c.close(), Err(CompressionError::ClosedInstance { .. })));
    }

    #[test]
    fn decompress_respects_output_ceiling() {
        let limits = DecoderLimits { max_decoded_size: 100, ..DecoderLimits::default() };
        let c = Compressor::new("small", 3, 22, limits).unwrap();
        let compressed = c.compress(&[1u8; 1000]).unwrap();
        assert!(matches!(c.decompress(&compressed), Err(CompressionError::Decode(_))));
    }
}
