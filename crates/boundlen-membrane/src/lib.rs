//! # boundlen-membrane
//!
//! Runtime validation layer sitting between C callers and the safe scan in
//! `boundlen-core`. It owns two things:
//!
//! - [`config`]: the process-wide [`SafetyLevel`], read once from `BOUNDLEN_MODE`
//!   and optionally pinned by the harness, benches and tests.
//! - [`heal`]: the deterministic [`HealingAction`]s applied in hardened mode and
//!   the counters that record them.

#![deny(unsafe_code)]

pub mod config;
pub mod heal;

pub use config::{
    SafetyLevel, UnknownSafetyLevel, pin_safety_level, restore_pinned_level, safety_level,
};
pub use heal::{HealingAction, HealingPolicy, HealingSnapshot, global_healing_policy};
