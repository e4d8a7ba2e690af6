//! # boundlen-abi
//!
//! ABI-compatible extern "C" boundary layer for boundlen.
//!
//! This crate produces a `cdylib` exposing the bounded scan declared in
//! `include/str.h`. Each entry point passes through the membrane before
//! scanning.
//!
//! # Architecture
//!
//! ```text
//! C caller -> ABI entry (this crate) -> Membrane validation -> bounded scan -> return
//! ```
//!
//! In **strict** mode, the membrane validates but does not rewrite the request.
//!
//! In **hardened** mode, the membrane also clamps bounds that run past the
//! addressable extent of the pointer and saturates results that overflow `int`,
//! recording each repair in the global healing policy.

// The exported names do not collide with host libc symbols, so the module
// stays linked in test builds.
pub mod string_abi;
