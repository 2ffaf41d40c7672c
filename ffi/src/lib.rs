//! zreg-ffi
//!
//! C ABI over `zreg-core`. The declarations live in `include/zreg.h`.
//!
//! Memory rules:
//! - Inbound buffers are `(ptr, len)` pairs owned by the caller. `NULL` with a
//!   zero length is the empty buffer.
//! - Result buffers and strings are `malloc`'d here and owned by the caller
//!   afterwards; release them with `zreg_buffer_free` / `zreg_string_free`.
//! - Every fallible call returns a `ZregStatus`. On success the out slot is
//!   filled and `*error` is NULL; on failure the out slot is empty and
//!   `*error` (when the slot is given) holds a message.
//! - A service handle from `zreg_service_new` must be released with
//!   `zreg_service_free` once no other thread uses it.
//!
//! # Safety
//! Callers provide valid pointers; this is the usual C contract. Null
//! pointers are detected and reported, dangling ones are not.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

pub mod buffer;
pub mod logging;
pub mod status;

use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use libc::{c_char, c_int, c_void, size_t};
use tracing::info;
use zreg_core::compression::{codec_info, CompressionError};
use zreg_core::config::ServiceConfig;
use zreg_core::service::CompressionService;
use zreg_core::telemetry::CompressionStats;

pub use buffer::{ForeignBuffer, ZregBuffer};
pub use logging::ZregLogFn;
pub use status::{FfiError, ZregStatus};

use buffer::{foreign_string, inbound_bytes, inbound_str, release};
use logging::LogSink;

/// Opaque service handle.
pub struct ZregService {
    inner: CompressionService,
}

/// Stats of the last compress on a named compressor.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZregStats {
    pub original_size: u64,
    pub compressed_size: u64,
    /// `original_size / compressed_size`; 0.0 when nothing was produced.
    pub compression_ratio: f64,
    pub compression_time_ns: u64,
}

impl From<CompressionStats> for ZregStats {
    fn from(stats: CompressionStats) -> Self {
        Self {
            original_size: stats.original_size,
            compressed_size: stats.compressed_size,
            compression_ratio: stats.compression_ratio,
            compression_time_ns: stats.compression_time_nanos(),
        }
    }
}

/// Static codec description. `version` points at a static string.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ZregCodecInfo {
    pub version: *const c_char,
    pub min_level: c_int,
    pub max_level: c_int,
    pub default_level: c_int,
}

// ============================================================================
// Plumbing
// ============================================================================

/// Run `body` with panics contained; write the error message, if any, to
/// `error`.
fn guarded<F>(error: *mut *mut c_char, body: F) -> ZregStatus
where
    F: FnOnce() -> Result<(), FfiError>,
{
    // SAFETY: a non-null error slot is writable per the C contract.
    unsafe { clear(error, ptr::null_mut()) };

    let outcome = panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| Err(FfiError::panic(payload)));
    match outcome {
        Ok(()) => ZregStatus::Ok,
        Err(e) => {
            if !error.is_null() {
                // SAFETY: checked non-null above.
                unsafe { *error = foreign_string(&e.message) };
            }
            e.status
        }
    }
}

/// Buffer-producing calls share this shape: clear the slot, check it, run,
/// copy the result out.
fn produce<F>(out: *mut ZregBuffer, error: *mut *mut c_char, body: F) -> ZregStatus
where
    F: FnOnce() -> Result<Vec<u8>, FfiError>,
{
    // SAFETY: a non-null out slot is writable per the C contract.
    unsafe { clear(out, ZregBuffer::empty()) };
    guarded(error, || {
        // SAFETY: as above.
        let slot = unsafe { out_slot(out, "out")? };
        let bytes = body()?;
        *slot = ForeignBuffer::copy_from(&bytes)?.into_raw();
        Ok(())
    })
}

unsafe fn clear<T>(slot: *mut T, empty: T) {
    if !slot.is_null() {
        slot.write(empty);
    }
}

unsafe fn out_slot<'a, T>(slot: *mut T, what: &str) -> Result<&'a mut T, FfiError> {
    slot.as_mut().ok_or_else(|| FfiError::null(what))
}

unsafe fn service_ref<'a>(service: *const ZregService) -> Result<&'a CompressionService, FfiError> {
    service
        .as_ref()
        .map(|s| &s.inner)
        .ok_or_else(|| FfiError::null("service"))
}

fn window_arg(raw: c_int) -> Result<u32, FfiError> {
    u32::try_from(raw).map_err(|_| {
        CompressionError::InvalidParameter(format!("invalid window size: {}", raw)).into()
    })
}

// ============================================================================
// Service lifecycle
// ============================================================================

/// Provision a service.
///
/// `config` is a JSON document (`NULL`/empty means defaults). `log_sink` may be
/// NULL, in which case logs go to stderr. The subscriber is installed once
/// per process; later services share it.
///
/// # Safety
/// `out` must be writable. Free the handle with `zreg_service_free`.
#[no_mangle]
pub extern "C" fn zreg_service_new(
    config: *const u8,
    config_len: size_t,
    log_sink: Option<ZregLogFn>,
    out: *mut *mut ZregService,
    error: *mut *mut c_char,
) -> ZregStatus {
    // SAFETY: a non-null out slot is writable per the C contract.
    unsafe { clear(out, ptr::null_mut()) };
    guarded(error, || {
        let slot = unsafe { out_slot(out, "out")? };
        let raw = unsafe { inbound_bytes(config, config_len, "config")? };
        let config = ServiceConfig::from_json(raw)?;
        logging::install(LogSink::new(log_sink), &config.log_level);

        let inner = CompressionService::new(config)?;
        *slot = Box::into_raw(Box::new(ZregService { inner }));
        Ok(())
    })
}

/// Release a service and every compressor it still holds.
///
/// # Safety
/// `service` must come from `zreg_service_new` (or be NULL) and must not be
/// used afterwards.
#[no_mangle]
pub extern "C" fn zreg_service_free(service: *mut ZregService) {
    if service.is_null() {
        return;
    }
    let _ = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: ownership returns to Rust exactly once.
        let service = unsafe { Box::from_raw(service) };
        let remaining = service.inner.registry().len();
        drop(service);
        info!(remaining, "compression service freed");
    }));
}

#[no_mangle]
pub extern "C" fn zreg_service_start(service: *const ZregService) -> ZregStatus {
    guarded(ptr::null_mut(), || {
        unsafe { service_ref(service)? }.start();
        Ok(())
    })
}

/// Close every compressor and drop pooled handles. The service stays usable.
#[no_mangle]
pub extern "C" fn zreg_service_stop(service: *const ZregService) -> ZregStatus {
    guarded(ptr::null_mut(), || {
        unsafe { service_ref(service)? }.stop();
        Ok(())
    })
}

// ============================================================================
// Named compressors
// ============================================================================

/// Create a compressor under `name`. An existing name is left untouched and
/// the call succeeds.
#[no_mangle]
pub extern "C" fn zreg_create(
    service: *const ZregService,
    name: *const u8,
    name_len: size_t,
    level: c_int,
    window_log: c_int,
    error: *mut *mut c_char,
) -> ZregStatus {
    guarded(error, || {
        let service = unsafe { service_ref(service)? };
        let name = unsafe { inbound_str(name, name_len, "name")? };
        service.create(name, level, window_arg(window_log)?)?;
        Ok(())
    })
}

/// Create a compressor under a generated name, returned as a `malloc`'d C
/// string in `*out_name`.
#[no_mangle]
pub extern "C" fn zreg_create_unique(
    service: *const ZregService,
    level: c_int,
    window_log: c_int,
    out_name: *mut *mut c_char,
    error: *mut *mut c_char,
) -> ZregStatus {
    unsafe { clear(out_name, ptr::null_mut()) };
    guarded(error, || {
        let slot = unsafe { out_slot(out_name, "out_name")? };
        let service = unsafe { service_ref(service)? };
        let name = service.create_unique(level, window_arg(window_log)?)?;

        let raw = foreign_string(&name);
        if raw.is_null() {
            // The caller could never address it; do not leave it registered.
            service.close(&name)?;
            return Err(FfiError::alloc(name.len() + 1));
        }
        *slot = raw;
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn zreg_compress(
    service: *const ZregService,
    name: *const u8,
    name_len: size_t,
    data: *const u8,
    data_len: size_t,
    out: *mut ZregBuffer,
    error: *mut *mut c_char,
) -> ZregStatus {
    produce(out, error, || {
        let service = unsafe { service_ref(service)? };
        let name = unsafe { inbound_str(name, name_len, "name")? };
        let data = unsafe { inbound_bytes(data, data_len, "data")? };
        Ok(service.compress(name, data)?)
    })
}

#[no_mangle]
pub extern "C" fn zreg_decompress(
    service: *const ZregService,
    name: *const u8,
    name_len: size_t,
    data: *const u8,
    data_len: size_t,
    out: *mut ZregBuffer,
    error: *mut *mut c_char,
) -> ZregStatus {
    produce(out, error, || {
        let service = unsafe { service_ref(service)? };
        let name = unsafe { inbound_str(name, name_len, "name")? };
        let data = unsafe { inbound_bytes(data, data_len, "data")? };
        Ok(service.decompress(name, data)?)
    })
}

#[no_mangle]
pub extern "C" fn zreg_get_stats(
    service: *const ZregService,
    name: *const u8,
    name_len: size_t,
    out: *mut ZregStats,
    error: *mut *mut c_char,
) -> ZregStatus {
    unsafe { clear(out, ZregStats::default()) };
    guarded(error, || {
        let slot = unsafe { out_slot(out, "out")? };
        let service = unsafe { service_ref(service)? };
        let name = unsafe { inbound_str(name, name_len, "name")? };
        *slot = service.stats(name)?.into();
        Ok(())
    })
}

/// Level and window exponent a compressor was created with.
#[no_mangle]
pub extern "C" fn zreg_compressor_params(
    service: *const ZregService,
    name: *const u8,
    name_len: size_t,
    level_out: *mut c_int,
    window_log_out: *mut c_int,
    error: *mut *mut c_char,
) -> ZregStatus {
    guarded(error, || {
        let level_slot = unsafe { out_slot(level_out, "level_out")? };
        let window_slot = unsafe { out_slot(window_log_out, "window_log_out")? };
        let service = unsafe { service_ref(service)? };
        let name = unsafe { inbound_str(name, name_len, "name")? };

        let (level, window_log) = service.params(name)?;
        *level_slot = level;
        // Window exponents are at most 31.
        *window_slot = window_log as c_int;
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn zreg_close(
    service: *const ZregService,
    name: *const u8,
    name_len: size_t,
    error: *mut *mut c_char,
) -> ZregStatus {
    guarded(error, || {
        let service = unsafe { service_ref(service)? };
        let name = unsafe { inbound_str(name, name_len, "name")? };
        service.close(name)?;
        Ok(())
    })
}

// ============================================================================
// Quick path
// ============================================================================

#[no_mangle]
pub extern "C" fn zreg_quick_compress(
    service: *const ZregService,
    data: *const u8,
    data_len: size_t,
    level: c_int,
    out: *mut ZregBuffer,
    error: *mut *mut c_char,
) -> ZregStatus {
    produce(out, error, || {
        let service = unsafe { service_ref(service)? };
        let data = unsafe { inbound_bytes(data, data_len, "data")? };
        Ok(service.quick_compress(data, level)?)
    })
}

#[no_mangle]
pub extern "C" fn zreg_quick_decompress(
    service: *const ZregService,
    data: *const u8,
    data_len: size_t,
    out: *mut ZregBuffer,
    error: *mut *mut c_char,
) -> ZregStatus {
    produce(out, error, || {
        let service = unsafe { service_ref(service)? };
        let data = unsafe { inbound_bytes(data, data_len, "data")? };
        Ok(service.quick_decompress(data)?)
    })
}

// ============================================================================
// Introspection
// ============================================================================

#[no_mangle]
pub extern "C" fn zreg_codec_info(out: *mut ZregCodecInfo) -> ZregStatus {
    guarded(ptr::null_mut(), || {
        let slot = unsafe { out_slot(out, "out")? };
        let info = codec_info();
        *slot = ZregCodecInfo {
            version: concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char,
            min_level: info.min_level,
            max_level: info.max_level,
            default_level: info.default_level,
        };
        Ok(())
    })
}

/// Service counters as a JSON object in a `malloc`'d C string.
#[no_mangle]
pub extern "C" fn zreg_counters_json(
    service: *const ZregService,
    out: *mut *mut c_char,
    error: *mut *mut c_char,
) -> ZregStatus {
    unsafe { clear(out, ptr::null_mut()) };
    guarded(error, || {
        let slot = unsafe { out_slot(out, "out")? };
        let json = unsafe { service_ref(service)? }.counters().to_json();
        let raw = foreign_string(&json);
        if raw.is_null() {
            return Err(FfiError::alloc(json.len() + 1));
        }
        *slot = raw;
        Ok(())
    })
}

/// Static description of a status code. Never NULL.
#[no_mangle]
pub extern "C" fn zreg_status_message(status: i32) -> *const c_char {
    match ZregStatus::try_from(status) {
        Ok(status) => status.message_ptr(),
        Err(_) => b"unknown status\0".as_ptr() as *const c_char,
    }
}

// ============================================================================
// Release
// ============================================================================

/// Free a result buffer. Passing an empty (NULL) buffer is a no-op.
#[no_mangle]
pub extern "C" fn zreg_buffer_free(buffer: ZregBuffer) {
    // SAFETY: `buffer.data` came from this library or is NULL.
    unsafe { release(buffer.data as *mut c_void) };
}

/// Free a string returned through an out slot or the error slot.
#[no_mangle]
pub extern "C" fn zreg_string_free(s: *mut c_char) {
    // SAFETY: `s` came from this library or is NULL.
    unsafe { release(s as *mut c_void) };
}
