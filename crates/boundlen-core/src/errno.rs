//! Error numbers reported by the core crate.
//!
//! Values match Linux `<errno.h>`.

/// Invalid argument.
pub const EINVAL: i32 = 22;
