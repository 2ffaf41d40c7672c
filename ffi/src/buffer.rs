//! Memory crossing the boundary.
//!
//! Inbound: caller-owned `(ptr, len)` pairs, borrowed for the duration of a
//! call and never freed here.
//!
//! Outbound: `malloc`'d blocks handed to the caller, who releases them with
//! `zreg_buffer_free` / `zreg_string_free` (or plain `free(3)`).
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};
use std::{slice, str};

use libc::{c_char, c_void, size_t};

use crate::status::{FfiError, ZregStatus};

/// Result buffer written into the caller's out slot.
///
/// `data` is NULL only when no result was produced (error path); a successful
/// zero-length result still carries a valid, freeable pointer.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ZregBuffer {
    pub data: *mut u8,
    pub len: size_t,
}

impl ZregBuffer {
    pub const fn empty() -> Self {
        Self { data: ptr::null_mut(), len: 0 }
    }
}

/// A `malloc`'d block owned on the Rust side until `into_raw`.
///
/// Dropping it frees the block; `into_raw` hands ownership out instead. Either
/// way the allocation is released exactly once.
#[derive(Debug)]
pub struct ForeignBuffer {
    ptr: NonNull<u8>,
    len: usize,
}

impl ForeignBuffer {
    /// Copy `bytes` into a fresh allocation of at least one byte.
    pub fn copy_from(bytes: &[u8]) -> Result<Self, FfiError> {
        let ptr = malloc_at_least_one(bytes.len())?;
        // SAFETY: `ptr` is a fresh allocation of at least `bytes.len()` bytes.
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len()) };
        Ok(Self { ptr, len: bytes.len() })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len` initialised bytes while `self` lives.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn into_raw(self) -> ZregBuffer {
        let this = ManuallyDrop::new(self);
        ZregBuffer { data: this.ptr.as_ptr(), len: this.len }
    }
}

impl Drop for ForeignBuffer {
    fn drop(&mut self) {
        // SAFETY: allocated by `malloc` and not yet handed out.
        unsafe { libc::free(self.ptr.as_ptr() as *mut c_void) };
    }
}

fn malloc_at_least_one(len: usize) -> Result<NonNull<u8>, FfiError> {
    // SAFETY: plain allocation; a zero-length request is rounded up to one
    // byte so success never yields NULL.
    let raw = unsafe { libc::malloc(len.max(1)) } as *mut u8;
    NonNull::new(raw).ok_or_else(|| FfiError::alloc(len))
}

/// Copy `text` into a `malloc`'d NUL-terminated string. Interior NULs are
/// replaced so the message is never cut short. Returns NULL if allocation
/// fails.
pub fn foreign_string(text: &str) -> *mut c_char {
    let bytes = text.as_bytes();
    match malloc_at_least_one(bytes.len() + 1) {
        Ok(ptr) => {
            let base = ptr.as_ptr();
            for (i, &b) in bytes.iter().enumerate() {
                // SAFETY: `i < bytes.len()` and the block holds `len + 1` bytes.
                unsafe { *base.add(i) = if b == 0 { b'?' } else { b } };
            }
            // SAFETY: index `bytes.len()` is the last byte of the block.
            unsafe { *base.add(bytes.len()) = 0 };
            base as *mut c_char
        }
        Err(_) => ptr::null_mut(),
    }
}

/// Borrow an inbound byte buffer.
///
/// `NULL` with `len == 0` is the empty buffer; `NULL` with `len > 0` is an
/// error.
///
/// # Safety
/// A non-null `ptr` must be valid for reads of `len` bytes for `'a`.
pub unsafe fn inbound_bytes<'a>(ptr: *const u8, len: size_t, what: &str) -> Result<&'a [u8], FfiError> {
    if ptr.is_null() {
        if len == 0 {
            return Ok(&[]);
        }
        return Err(FfiError::null(what));
    }
    Ok(slice::from_raw_parts(ptr, len))
}

/// Borrow an inbound UTF-8 string given as `(ptr, len)`.
///
/// # Safety
/// Same contract as [`inbound_bytes`].
pub unsafe fn inbound_str<'a>(ptr: *const u8, len: size_t, what: &str) -> Result<&'a str, FfiError> {
    let bytes = inbound_bytes(ptr, len, what)?;
    str::from_utf8(bytes).map_err(|e| {
        FfiError::new(ZregStatus::InvalidParameter, format!("{} is not valid UTF-8: {}", what, e))
    })
}

/// Free a block previously handed out by this library.
///
/// # Safety
/// `ptr` must be NULL or a pointer returned through an out slot of this
/// library that has not been freed yet.
pub unsafe fn release(ptr: *mut c_void) {
    if !ptr.is_null() {
        libc::free(ptr);
    }
}
