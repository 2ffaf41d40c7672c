//! Return codes and the error carried back across the boundary.
use std::any::Any;

use libc::c_char;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use zreg_core::compression::CompressionError;

/// Status returned by every fallible entry point.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum ZregStatus {
    Ok = 0,
    InvalidParameter = 1,
    NotFound = 2,
    ClosedInstance = 3,
    Decode = 4,
    CodecInit = 5,
    CodecProcess = 6,
    Config = 7,
    NullPointer = 8,
    AllocationFailed = 9,
    Panic = 10,
}

impl ZregStatus {
    /// Static NUL-terminated description.
    pub fn message(self) -> &'static [u8] {
        match self {
            ZregStatus::Ok => b"success\0",
            ZregStatus::InvalidParameter => b"invalid parameter\0",
            ZregStatus::NotFound => b"compressor not found\0",
            ZregStatus::ClosedInstance => b"compressor closed\0",
            ZregStatus::Decode => b"decompression failed\0",
            ZregStatus::CodecInit => b"codec initialisation failed\0",
            ZregStatus::CodecProcess => b"codec failed\0",
            ZregStatus::Config => b"invalid configuration\0",
            ZregStatus::NullPointer => b"null pointer\0",
            ZregStatus::AllocationFailed => b"memory allocation failed\0",
            ZregStatus::Panic => b"internal panic\0",
        }
    }

    pub fn message_ptr(self) -> *const c_char {
        self.message().as_ptr() as *const c_char
    }
}

/// Status plus the detailed message written to the caller's error slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiError {
    pub status: ZregStatus,
    pub message: String,
}

impl FfiError {
    pub fn new(status: ZregStatus, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn null(what: &str) -> Self {
        Self::new(ZregStatus::NullPointer, format!("{} must not be null", what))
    }

    pub fn alloc(len: usize) -> Self {
        Self::new(ZregStatus::AllocationFailed, format!("cannot allocate {} bytes", len))
    }

    pub fn panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self::new(ZregStatus::Panic, format!("panic: {}", detail))
    }
}

impl From<CompressionError> for FfiError {
    fn from(err: CompressionError) -> Self {
        let status = match err {
            CompressionError::InvalidParameter(_) => ZregStatus::InvalidParameter,
            CompressionError::CodecInit { .. } => ZregStatus::CodecInit,
            CompressionError::CodecProcess { .. } => ZregStatus::CodecProcess,
            CompressionError::NotFound { .. } => ZregStatus::NotFound,
            CompressionError::ClosedInstance { .. } => ZregStatus::ClosedInstance,
            CompressionError::Decode(_) => ZregStatus::Decode,
            CompressionError::Config(_) => ZregStatus::Config,
        };
        Self::new(status, err.to_string())
    }
}
