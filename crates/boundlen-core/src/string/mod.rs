//! String operations.
//!
//! Implements the bounded length scan as safe Rust operating on slices.

pub mod scan;
pub mod view;

pub use scan::{ScanError, TERMINATOR, str_len, str_len_clamped};
pub use view::BoundedView;
