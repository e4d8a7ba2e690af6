//! # boundlen-core
//!
//! Safe Rust implementation of the bounded terminator scan (`strnlen`-style
//! length of a zero-terminated byte run, capped by a caller-supplied bound).
//!
//! Native Rust strings carry their own length and never need this. The scan is
//! for byte buffers that arrive from terminator-conventioned systems: C strings,
//! fixed-width record fields, data read out of foreign memory. No `unsafe` code
//! is permitted at the crate level; the raw-pointer boundary lives in
//! `boundlen-abi`.

#![deny(unsafe_code)]

pub mod errno;
pub mod string;

pub use string::{BoundedView, ScanError, TERMINATOR, str_len, str_len_clamped};
