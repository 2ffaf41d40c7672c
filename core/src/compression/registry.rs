//! compression/registry.rs
//! Name → compressor map.
//!
//! Two lock scopes:
//! - the registry `RwLock` covers map structure only (insert, remove, handle
//!   lookup) and is never held across codec work;
//! - each `Compressor` carries its own mutex for codec work.
//!
//! Handles are built before the write lock is taken; the insert re-checks the
//! name so a racing create never overwrites a live entry.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::compression::compressor::Compressor;
use crate::compression::constants::UNIQUE_NAME_PREFIX;
use crate::compression::types::{CompressionError, DecoderLimits};
use crate::utils::{level_label, validate_level, validate_name, validate_window_log};

/// Shared handle to a registered compressor, valid for the current call even
/// if the entry is closed concurrently.
pub type CompressorHandle = Arc<Compressor>;

#[derive(Debug)]
pub struct Registry {
    entries: RwLock<HashMap<String, CompressorHandle>>,
    limits: DecoderLimits,
    next_unique: AtomicU64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DecoderLimits::default())
    }
}

impl Registry {
    pub fn new(limits: DecoderLimits) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            limits,
            next_unique: AtomicU64::new(1),
        }
    }

    /// Register a compressor under `name`.
    ///
    /// An existing name is a successful no-op: the live entry keeps its
    /// handles, parameters and stats.
    pub fn create(&self, name: &str, level: i32, window_log: u32) -> Result<(), CompressionError> {
        validate_name(name)?;
        validate_level(level)?;
        validate_window_log(window_log)?;

        if self.contains(name) {
            debug!(name = %name, "create on existing name ignored");
            return Ok(());
        }

        let compressor = Compressor::new(name, level, window_log, self.limits)?;

        let mut entries = self.entries.write();
        if entries.contains_key(name) {
            // Lost a race with another create; our handles drop here.
            drop(entries);
            debug!(name = %name, "create on existing name ignored");
            return Ok(());
        }
        entries.insert(name.to_string(), Arc::new(compressor));
        drop(entries);

        info!(name = %name, level = %level_label(level), window_log, "compressor created");
        Ok(())
    }

    /// Register a compressor under a freshly generated `compressor_<n>` name
    /// and return that name.
    pub fn create_unique(&self, level: i32, window_log: u32) -> Result<String, CompressionError> {
        validate_level(level)?;
        validate_window_log(window_log)?;

        loop {
            let n = self.next_unique.fetch_add(1, Ordering::Relaxed);
            let name = format!("{}{}", UNIQUE_NAME_PREFIX, n);
            let compressor = Compressor::new(name.as_str(), level, window_log, self.limits)?;

            let mut entries = self.entries.write();
            // A caller may have picked this name explicitly; try the next one.
            if entries.contains_key(&name) {
                continue;
            }
            entries.insert(name.clone(), Arc::new(compressor));
            drop(entries);

            info!(name = %name, level = %level_label(level), window_log, "compressor created");
            return Ok(name);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<CompressorHandle> {
        self.entries.read().get(name).cloned()
    }

    /// Like `lookup`, but absent names become `NotFound`.
    pub fn get(&self, name: &str) -> Result<CompressorHandle, CompressionError> {
        self.lookup(name)
            .ok_or_else(|| CompressionError::NotFound { name: name.to_string() })
    }

    /// Remove `name` and release its codec handles.
    ///
    /// The entry leaves the map first; the teardown then waits for the
    /// instance lock, so a call already holding it finishes on live state.
    pub fn close(&self, name: &str) -> Result<(), CompressionError> {
        let removed = self.entries.write().remove(name);
        let compressor = removed.ok_or_else(|| CompressionError::NotFound { name: name.to_string() })?;
        compressor.close()?;
        info!(name = %name, "compressor closed");
        Ok(())
    }

    /// Remove and release every entry. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let drained: Vec<CompressorHandle> = self.entries.write().drain().map(|(_, c)| c).collect();

        let mut closed = 0;
        for compressor in drained {
            match compressor.close() {
                Ok(()) => closed += 1,
                Err(e) => warn!(name = compressor.name(), error = %e, "close during drain failed"),
            }
        }
        info!(closed, "registry drained");
        closed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}
