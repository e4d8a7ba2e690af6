//! Borrowed view over a terminator-conventioned byte buffer.

use super::scan::{ScanError, TERMINATOR, str_len_clamped};

/// A read-only view of `bound` bytes that may hold a zero-terminated string.
///
/// The bound is checked once at construction, so every scan through the view
/// stays within `as_bytes()` by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundedView<'a> {
    bytes: &'a [u8],
}

impl<'a> BoundedView<'a> {
    /// View the first `max_length` bytes of `buf`.
    pub fn new(buf: &'a [u8], max_length: usize) -> Result<Self, ScanError> {
        match buf.get(..max_length) {
            Some(bytes) => Ok(Self { bytes }),
            None => Err(ScanError::BoundExceedsBuffer {
                max_length,
                available: buf.len(),
            }),
        }
    }

    /// View the whole slice.
    #[must_use]
    pub const fn from_bytes(buf: &'a [u8]) -> Self {
        Self { bytes: buf }
    }

    /// Number of bytes the view may inspect.
    #[must_use]
    pub const fn bound(&self) -> usize {
        self.bytes.len()
    }

    /// The viewed bytes, terminator included if present.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Count of bytes before the first terminator, capped at [`bound`](Self::bound).
    #[must_use]
    pub fn len_to_terminator(&self) -> usize {
        str_len_clamped(self.bytes, self.bytes.len())
    }

    /// Bytes before the first terminator.
    #[must_use]
    pub fn content(&self) -> &'a [u8] {
        &self.bytes[..self.len_to_terminator()]
    }

    /// True when a terminator occurs within the bound.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.bytes.contains(&TERMINATOR)
    }
}

impl<'a> From<&'a [u8]> for BoundedView<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Self::from_bytes(buf)
    }
}
