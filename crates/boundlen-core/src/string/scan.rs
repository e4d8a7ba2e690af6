//! Bounded terminator scan: the safe counterpart of C `strnlen`.
//!
//! The scan inspects at most `max_length` bytes and returns the count of bytes
//! before the first [`TERMINATOR`], or `max_length` when none is found within
//! the bound. The byte at index `max_length` is never read.

use thiserror::Error;

use crate::errno;

/// Logical end-of-content marker.
pub const TERMINATOR: u8 = 0;

/// Errors reported by the checked scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The caller asked for more bytes than the buffer holds.
    #[error("scan bound {max_length} exceeds buffer length {available}")]
    BoundExceedsBuffer { max_length: usize, available: usize },
}

impl ScanError {
    /// errno equivalent of this error.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::BoundExceedsBuffer { .. } => errno::EINVAL,
        }
    }
}

/// Length of the terminator-delimited content in the first `max_length` bytes of `buf`.
///
/// Equivalent to C `strnlen(buf, max_length)` with the readability precondition
/// checked: if `max_length > buf.len()` the call fails with
/// [`ScanError::BoundExceedsBuffer`] instead of reading out of bounds.
///
/// ```
/// use boundlen_core::str_len;
///
/// assert_eq!(str_len(b"abc\0def\0", 8), Ok(3));
/// assert_eq!(str_len(b"hello", 3), Ok(3));
/// assert!(str_len(b"hi", 3).is_err());
/// ```
pub fn str_len(buf: &[u8], max_length: usize) -> Result<usize, ScanError> {
    if max_length > buf.len() {
        return Err(ScanError::BoundExceedsBuffer {
            max_length,
            available: buf.len(),
        });
    }
    Ok(scan_prefix(&buf[..max_length]))
}

/// Like [`str_len`], but scans `min(max_length, buf.len())` bytes instead of failing.
///
/// Follows the slice convention of the other `n`-bounded string functions: the
/// slice length is an implicit second bound. The result is therefore also
/// capped by `buf.len()`.
#[must_use]
pub fn str_len_clamped(buf: &[u8], max_length: usize) -> usize {
    let count = max_length.min(buf.len());
    scan_prefix(&buf[..count])
}

#[inline]
fn scan_prefix(window: &[u8]) -> usize {
    window
        .iter()
        .position(|&b| b == TERMINATOR)
        .unwrap_or(window.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_terminator_before_bound() {
        assert_eq!(str_len(b"hello\0\0\0\0\0", 10), Ok(5));
    }

    #[test]
    fn bound_caps_unterminated_input() {
        assert_eq!(str_len(b"hello", 3), Ok(3));
        assert_eq!(str_len(b"hello", 5), Ok(5));
    }

    #[test]
    fn leading_terminator_is_zero() {
        assert_eq!(str_len(b"\0abc", 4), Ok(0));
    }

    #[test]
    fn empty_buffer_zero_bound() {
        assert_eq!(str_len(b"", 0), Ok(0));
    }

    #[test]
    fn only_first_terminator_counts() {
        assert_eq!(str_len(b"abc\0def\0", 8), Ok(3));
    }

    #[test]
    fn zero_bound_ignores_contents() {
        assert_eq!(str_len(b"abc", 0), Ok(0));
        assert_eq!(str_len(b"\0", 0), Ok(0));
    }

    #[test]
    fn terminator_at_bound_is_not_inspected() {
        // Index 3 holds the terminator but lies outside the bound.
        assert_eq!(str_len(b"abc\0", 3), Ok(3));
    }

    #[test]
    fn bound_past_buffer_is_rejected() {
        let err = str_len(b"hello\0", 10).unwrap_err();
        assert_eq!(
            err,
            ScanError::BoundExceedsBuffer {
                max_length: 10,
                available: 6
            }
        );
        assert_eq!(err.errno(), errno::EINVAL);
        assert_eq!(err.to_string(), "scan bound 10 exceeds buffer length 6");
    }

    #[test]
    fn clamped_uses_slice_length_as_second_bound() {
        assert_eq!(str_len_clamped(b"hello\0", 10), 5);
        assert_eq!(str_len_clamped(b"hello", 10), 5);
        assert_eq!(str_len_clamped(b"hello", 3), 3);
        assert_eq!(str_len_clamped(b"", usize::MAX), 0);
    }

    #[test]
    fn result_never_exceeds_bound() {
        let buf = b"ab\0cd\0\0efgh";
        for m in 0..=buf.len() {
            let n = str_len(buf, m).unwrap();
            assert!(n <= m);
            assert_eq!(n, str_len_clamped(buf, m));
        }
    }
}
