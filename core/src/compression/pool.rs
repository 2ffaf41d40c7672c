//! compression/pool.rs
//! Identity-free quick path.
//!
//! Encoders and decoders park in bounded lock-free queues between calls.
//! - Every checkout resets the handle before use.
//! - A release into a full queue drops the handle.
//! - `trim` may empty both queues at any time; the next caller builds fresh
//!   handles.
use std::ops::{Deref, DerefMut};

use crossbeam::queue::ArrayQueue;
use tracing::{debug, trace};

use crate::compression::codecs::{ZstdDecoder, ZstdEncoder};
use crate::compression::types::{CompressionError, DecoderLimits};
use crate::utils::validate_level;

/// Checked-out handle; goes back to its queue on drop.
struct Pooled<'a, T> {
    handle: Option<T>,
    home: &'a ArrayQueue<T>,
}

impl<'a, T> Pooled<'a, T> {
    fn new(handle: T, home: &'a ArrayQueue<T>) -> Self {
        Self { handle: Some(handle), home }
    }
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `drop` takes the handle out.
        self.handle.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.handle.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if self.home.push(handle).is_err() {
                trace!("pool full, handle dropped");
            }
        }
    }
}

#[derive(Debug)]
pub struct QuickPool {
    encoders: ArrayQueue<ZstdEncoder>,
    decoders: ArrayQueue<ZstdDecoder>,
    limits: DecoderLimits,
}

impl QuickPool {
    /// `capacity` idle handles are kept per kind; zero is raised to one.
    pub fn new(capacity: usize, limits: DecoderLimits) -> Self {
        let capacity = capacity.max(1);
        Self {
            encoders: ArrayQueue::new(capacity),
            decoders: ArrayQueue::new(capacity),
            limits,
        }
    }

    pub fn capacity(&self) -> usize {
        self.encoders.capacity()
    }

    fn encoder(&self, level: i32) -> Result<Pooled<'_, ZstdEncoder>, CompressionError> {
        let encoder = match self.encoders.pop() {
            Some(mut encoder) => {
                encoder.reset(level, None)?;
                encoder
            }
            None => ZstdEncoder::new(level, None)?,
        };
        Ok(Pooled::new(encoder, &self.encoders))
    }

    fn decoder(&self) -> Result<Pooled<'_, ZstdDecoder>, CompressionError> {
        let decoder = match self.decoders.pop() {
            Some(mut decoder) => {
                decoder.reset()?;
                decoder
            }
            None => ZstdDecoder::new(self.limits.window_log_max)?,
        };
        Ok(Pooled::new(decoder, &self.decoders))
    }

    /// One-shot compress at `level` with a pooled encoder.
    pub fn quick_compress(&self, data: &[u8], level: i32) -> Result<Vec<u8>, CompressionError> {
        validate_level(level)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let mut encoder = self.encoder(level)?;
        let out = encoder.encode(data)?;
        debug!(in_len = data.len(), out_len = out.len(), level, "quick compress");
        Ok(out)
    }

    /// One-shot decompress with a pooled decoder.
    pub fn quick_decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let mut decoder = self.decoder()?;
        let out = decoder.decode(data, self.limits.max_decoded_size)?;
        debug!(in_len = data.len(), out_len = out.len(), "quick decompress");
        Ok(out)
    }

    /// Drop every idle handle. Returns how many were released.
    pub fn trim(&self) -> usize {
        let mut released = 0;
        while self.encoders.pop().is_some() {
            released += 1;
        }
        while self.decoders.pop().is_some() {
            released += 1;
        }
        debug!(released, "pool trimmed");
        released
    }

    /// Idle `(encoders, decoders)`.
    pub fn idle(&self) -> (usize, usize) {
        (self.encoders.len(), self.decoders.len())
    }
}
