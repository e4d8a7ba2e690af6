//! ABI layer for the bounded scan declared in `str.h`.
//!
//! Each function is an `extern "C"` entry point that:
//! 1. Validates pointer arguments through the membrane (skipped in `off`)
//! 2. In hardened mode, applies healing (bound clamping, result saturation)
//! 3. Scans byte-by-byte through the raw pointer, or delegates to
//!    `boundlen-core` when the caller supplies the buffer capacity

use std::ffi::{c_char, c_int};

use boundlen_core::{TERMINATOR, errno, str_len as core_str_len};
use boundlen_membrane::config::{SafetyLevel, safety_level};
use boundlen_membrane::heal::{HealingAction, global_healing_policy};

/// Bytes addressable from `addr` without wrapping the address space or
/// exceeding the `isize::MAX` limit on pointer offsets.
#[inline]
fn addressable_extent(addr: usize) -> usize {
    (usize::MAX - addr).min(isize::MAX as usize)
}

/// Hardened bound: `max_length` clamped to the addressable extent above `addr`.
/// A clamp is recorded in the global healing policy.
fn hardened_bound(addr: usize, max_length: usize) -> usize {
    let policy = global_healing_policy();
    match policy.heal_scan_bounds(max_length, Some(addressable_extent(addr))) {
        action @ HealingAction::ClampSize { clamped, .. } => {
            policy.record(&action);
            clamped
        }
        _ => max_length,
    }
}

/// Scan at most `limit` bytes for the terminator.
///
/// # Safety
///
/// `ptr` must be valid to read up to the discovered length (and `limit` when
/// no terminator occurs earlier).
unsafe fn scan_c_string(ptr: *const c_char, limit: usize) -> usize {
    for i in 0..limit {
        // SAFETY: caller provides validity for bounded read.
        let byte = unsafe { *ptr.add(i) };
        if byte as u8 == TERMINATOR {
            return i;
        }
    }
    limit
}

/// Membrane-mediated bounded scan shared by the exported entry points.
///
/// # Safety
///
/// As for [`boundlen_strnlen`].
unsafe fn bounded_len(s: *const c_char, max_length: usize, mode: SafetyLevel) -> usize {
    if max_length == 0 {
        return 0;
    }
    if mode.validation_enabled() && s.is_null() {
        // Null with a non-zero bound is UB in C. Return safe default.
        if mode.heals_enabled() {
            global_healing_policy().record(&HealingAction::ReturnSafeDefault);
        }
        return 0;
    }
    // Only hardened mode rewrites the bound.
    let limit = if mode.heals_enabled() {
        hardened_bound(s as usize, max_length)
    } else {
        max_length
    };
    // SAFETY: caller guarantees `s` is readable for `max_length` bytes or up to a
    // terminator; `limit <= max_length`.
    unsafe { scan_c_string(s, limit) }
}

fn saturate_to_c_int(len: usize, mode: SafetyLevel) -> c_int {
    match c_int::try_from(len) {
        Ok(v) => v,
        Err(_) => {
            if mode.heals_enabled() {
                global_healing_policy().record(&HealingAction::ClampSize {
                    requested: len,
                    clamped: c_int::MAX as usize,
                });
            }
            c_int::MAX
        }
    }
}

// ---------------------------------------------------------------------------
// str_len
// ---------------------------------------------------------------------------

/// `int str_len(const char *str, size_t max_length)`.
///
/// Returns the number of bytes before the first NUL in `str[0 .. max_length)`,
/// or `max_length` if there is none. Results above `INT_MAX` saturate.
///
/// # Safety
///
/// `s` must be readable for `max_length` bytes, or up to and including the
/// first NUL byte if that comes earlier. A null `s` returns 0 unless the
/// membrane is pinned `off`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn str_len(s: *const c_char, max_length: usize) -> c_int {
    let mode = safety_level();
    // SAFETY: forwarded caller contract.
    let len = unsafe { bounded_len(s, max_length, mode) };
    saturate_to_c_int(len, mode)
}

// ---------------------------------------------------------------------------
// boundlen_strnlen
// ---------------------------------------------------------------------------

/// `size_t boundlen_strnlen(const char *s, size_t max_length)`.
///
/// Full-width variant of [`str_len`] with `strnlen` semantics.
///
/// # Safety
///
/// `s` must be readable for `max_length` bytes, or up to and including the
/// first NUL byte if that comes earlier. A null `s` returns 0 unless the
/// membrane is pinned `off`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn boundlen_strnlen(s: *const c_char, max_length: usize) -> usize {
    // SAFETY: forwarded caller contract.
    unsafe { bounded_len(s, max_length, safety_level()) }
}

// ---------------------------------------------------------------------------
// boundlen_strnlen_checked
// ---------------------------------------------------------------------------

/// `int boundlen_strnlen_checked(const char *s, size_t buf_len, size_t max_length, size_t *out_len)`.
///
/// Checked-precondition form: the caller states the buffer capacity and the
/// scan fails with `EINVAL` (leaving `*out_len` untouched) when `max_length`
/// exceeds it, instead of reading past the buffer. Returns 0 on success.
///
/// # Safety
///
/// `s` must be readable for `buf_len` bytes (it may be null only when
/// `buf_len == 0`). `out_len` must be null or valid for a `size_t` write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn boundlen_strnlen_checked(
    s: *const c_char,
    buf_len: usize,
    max_length: usize,
    out_len: *mut usize,
) -> c_int {
    if out_len.is_null() || (s.is_null() && buf_len != 0) {
        return errno::EINVAL;
    }
    let buf: &[u8] = if buf_len == 0 {
        &[]
    } else {
        // SAFETY: caller guarantees `s` is readable for `buf_len` bytes.
        unsafe { std::slice::from_raw_parts(s.cast::<u8>(), buf_len) }
    };
    match core_str_len(buf, max_length) {
        Ok(len) => {
            // SAFETY: `out_len` checked non-null; caller guarantees writability.
            unsafe { *out_len = len };
            0
        }
        Err(err) => err.errno(),
    }
}
