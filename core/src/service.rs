//! service.rs
//! The object a host provisions, starts and stops.
//!
//! A `CompressionService` owns one registry, one quick-path pool and the
//! service counters. There is no process-wide instance; the host keeps the
//! service alive for as long as it wants the registry to exist.
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::compression::{
    codec_info, CodecInfo, CompressionError, DecoderLimits, QuickPool, Registry,
};
use crate::config::ServiceConfig;
use crate::telemetry::{CompressionStats, CountersSnapshot, ServiceCounters};

/// Host lifecycle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Provisioned,
    Running,
    Stopped,
}

#[derive(Debug)]
pub struct CompressionService {
    config: ServiceConfig,
    registry: Registry,
    pool: QuickPool,
    counters: ServiceCounters,
    state: Mutex<ServiceState>,
}

impl CompressionService {
    pub fn new(config: ServiceConfig) -> Result<Self, CompressionError> {
        config.validate()?;
        let limits = DecoderLimits {
            max_decoded_size: config.max_decoded_size,
            window_log_max: config.decoder_window_log_max,
        };

        info!(
            pool_capacity = config.pool_capacity,
            max_decoded_size = config.max_decoded_size,
            "compression service provisioned"
        );
        Ok(Self {
            registry: Registry::new(limits),
            pool: QuickPool::new(config.pool_capacity, limits),
            counters: ServiceCounters::new(),
            state: Mutex::new(ServiceState::Provisioned),
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }

    /// Idempotent; a stopped service may be started again.
    pub fn start(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), ServiceState::Running);
        if previous != ServiceState::Running {
            info!("compression service started");
        }
    }

    /// Close every compressor and empty the pool.
    pub fn stop(&self) {
        *self.state.lock() = ServiceState::Stopped;
        let closed = self.registry.close_all();
        let trimmed = self.pool.trim();
        info!(closed, trimmed, "compression service stopped");
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn pool(&self) -> &QuickPool {
        &self.pool
    }

    pub fn create(&self, name: &str, level: i32, window_log: u32) -> Result<(), CompressionError> {
        self.registry.create(name, self.resolve_level(level), window_log)
    }

    pub fn create_unique(&self, level: i32, window_log: u32) -> Result<String, CompressionError> {
        self.registry.create_unique(self.resolve_level(level), window_log)
    }

    pub fn compress(&self, name: &str, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let out = self.registry.get(name)?.compress(data)?;
        self.counters.add_compress(false, data.len(), out.len());
        Ok(out)
    }

    pub fn decompress(&self, name: &str, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let compressor = self.registry.get(name)?;
        let out = compressor.decompress(data).map_err(|e| self.note_failure(Some(name), e))?;
        self.counters.add_decompress(false, data.len(), out.len());
        Ok(out)
    }

    pub fn stats(&self, name: &str) -> Result<CompressionStats, CompressionError> {
        self.registry.get(name)?.stats()
    }

    pub fn close(&self, name: &str) -> Result<(), CompressionError> {
        self.registry.close(name)
    }

    pub fn quick_compress(&self, data: &[u8], level: i32) -> Result<Vec<u8>, CompressionError> {
        let out = self.pool.quick_compress(data, self.resolve_level(level))?;
        self.counters.add_compress(true, data.len(), out.len());
        Ok(out)
    }

    pub fn quick_decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let out = self
            .pool
            .quick_decompress(data)
            .map_err(|e| self.note_failure(None, e))?;
        self.counters.add_decompress(true, data.len(), out.len());
        Ok(out)
    }

    /// `(level, window_log)` of a registered compressor.
    pub fn params(&self, name: &str) -> Result<(i32, u32), CompressionError> {
        let compressor = self.registry.get(name)?;
        Ok((compressor.level(), compressor.window_log()))
    }

    /// Codec bounds, with `default_level` taken from the service config.
    pub fn codec_info(&self) -> CodecInfo {
        CodecInfo { default_level: self.config.default_level, ..codec_info() }
    }

    /// Zero or negative means "not given": use the configured default.
    /// Anything else is passed through for the registry or pool to validate.
    pub fn resolve_level(&self, level: i32) -> i32 {
        if level <= 0 {
            self.config.default_level
        } else {
            level
        }
    }

    pub fn counters(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }

    fn note_failure(&self, name: Option<&str>, err: CompressionError) -> CompressionError {
        if let CompressionError::Decode(ref decode) = err {
            self.counters.add_decode_failure();
            warn!(name = name.unwrap_or("<quick>"), error = %decode, "decode failed");
        }
        err
    }
}
