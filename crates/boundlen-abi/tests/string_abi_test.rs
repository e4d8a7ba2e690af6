//! Integration tests for the exported bounded-scan ABI.
//!
//! Validates that:
//! 1. `str_len` / `boundlen_strnlen` match host `strnlen` on ordinary input.
//! 2. Null pointers and zero bounds yield 0 without reading.
//! 3. Hardened mode clamps impossible bounds and records the repair.
//! 4. The checked entry point rejects bounds past the stated capacity.
//!
//! Run: cargo test -p boundlen-abi --test string_abi_test

use std::ffi::{CString, c_char};
use std::ptr;
use std::sync::{Mutex, MutexGuard};

use boundlen_abi::string_abi::{boundlen_strnlen, boundlen_strnlen_checked, str_len};
use boundlen_core::errno::EINVAL;
use boundlen_membrane::config::{SafetyLevel, pin_safety_level};
use boundlen_membrane::heal::global_healing_policy;

// Mode and healing counters are process-wide.
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn with_mode(level: SafetyLevel) -> MutexGuard<'static, ()> {
    let guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    pin_safety_level(level);
    guard
}

fn as_c(bytes: &[u8]) -> *const c_char {
    bytes.as_ptr().cast()
}

#[test]
fn scenarios_in_every_mode() {
    for level in [SafetyLevel::Strict, SafetyLevel::Hardened, SafetyLevel::Off] {
        let _guard = with_mode(level);
        unsafe {
            assert_eq!(str_len(as_c(b"hello\0"), 10), 5, "{level}");
            assert_eq!(str_len(as_c(b"hello"), 3), 3, "{level}");
            assert_eq!(str_len(as_c(b"\0abc"), 4), 0, "{level}");
            assert_eq!(str_len(as_c(b""), 0), 0, "{level}");
            assert_eq!(str_len(as_c(b"abc\0def\0"), 8), 3, "{level}");
            assert_eq!(boundlen_strnlen(as_c(b"abc\0def\0"), 8), 3, "{level}");
        }
    }
}

#[test]
fn matches_host_strnlen() {
    let _guard = with_mode(SafetyLevel::Strict);
    let inputs: [&[u8]; 6] = [
        b"",
        b"\0",
        b"a",
        b"abcdef",
        b"abc\0def",
        b"\xff\xfe\x01\0\x02",
    ];
    for input in inputs {
        for m in 0..=input.len() {
            // SAFETY: every bound is within the input slice.
            let host = unsafe { libc::strnlen(as_c(input), m) };
            let ours = unsafe { boundlen_strnlen(as_c(input), m) };
            let narrow = unsafe { str_len(as_c(input), m) };
            assert_eq!(ours, host, "input={input:?} m={m}");
            assert_eq!(narrow as usize, host, "input={input:?} m={m}");
        }
    }
}

#[test]
fn zero_bound_and_null_pointer_yield_zero() {
    let _guard = with_mode(SafetyLevel::Hardened);
    let before = global_healing_policy().snapshot();
    unsafe {
        assert_eq!(str_len(ptr::null(), 0), 0);
        assert_eq!(str_len(ptr::null(), 16), 0);
        assert_eq!(boundlen_strnlen(ptr::null(), 16), 0);
    }
    let after = global_healing_policy().snapshot();
    // Zero bound short-circuits before the null check.
    assert_eq!(after.safe_defaults - before.safe_defaults, 2);
}

#[test]
fn strict_null_pointer_records_nothing() {
    let _guard = with_mode(SafetyLevel::Strict);
    let before = global_healing_policy().snapshot();
    assert_eq!(unsafe { str_len(ptr::null(), 16) }, 0);
    assert_eq!(global_healing_policy().snapshot(), before);
}

#[test]
fn hardened_clamps_bound_past_address_space() {
    let s = CString::new("abc").unwrap();

    {
        let _guard = with_mode(SafetyLevel::Strict);
        let before = global_healing_policy().snapshot();
        assert_eq!(unsafe { boundlen_strnlen(s.as_ptr(), usize::MAX) }, 3);
        assert_eq!(global_healing_policy().snapshot(), before);
    }

    let _guard = with_mode(SafetyLevel::Hardened);
    let before = global_healing_policy().snapshot();
    assert_eq!(unsafe { boundlen_strnlen(s.as_ptr(), usize::MAX) }, 3);
    let after = global_healing_policy().snapshot();
    assert_eq!(after.size_clamps - before.size_clamps, 1);
    assert_eq!(after.total_heals - before.total_heals, 1);
}

#[test]
fn checked_entry_point() {
    let _guard = with_mode(SafetyLevel::Strict);
    let buf = b"hello\0";
    let mut out = usize::MAX;

    let rc = unsafe { boundlen_strnlen_checked(as_c(buf), buf.len(), 6, &mut out) };
    assert_eq!((rc, out), (0, 5));

    out = 42;
    let rc = unsafe { boundlen_strnlen_checked(as_c(buf), buf.len(), 10, &mut out) };
    assert_eq!(rc, EINVAL);
    assert_eq!(out, 42, "out_len untouched on failure");

    let rc = unsafe { boundlen_strnlen_checked(ptr::null(), 0, 0, &mut out) };
    assert_eq!((rc, out), (0, 0));

    let rc = unsafe { boundlen_strnlen_checked(ptr::null(), 4, 0, &mut out) };
    assert_eq!(rc, EINVAL);

    let rc = unsafe { boundlen_strnlen_checked(as_c(buf), buf.len(), 3, ptr::null_mut()) };
    assert_eq!(rc, EINVAL);
}
