//! Runtime mode configuration.
//!
//! The runtime mode is set via the `BOUNDLEN_MODE` environment variable:
//! - `strict` (default): the ABI validates its arguments but scans exactly the
//!   bound the caller asked for. A null pointer still yields `0`.
//! - `hardened`: the ABI additionally clamps bounds that cannot be valid for the
//!   given pointer and saturates results that do not fit the return type, and
//!   records every such repair in the global healing policy.
//! - `off`: no validation. Only reachable through [`pin_safety_level`]; used as
//!   the benchmark baseline.
//!
//! The env var is read once. A pinned level, when present, takes precedence
//! over it until [`restore_pinned_level`] clears the pin.

use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

use thiserror::Error;

/// Environment variable consulted by [`safety_level`].
pub const MODE_ENV_VAR: &str = "BOUNDLEN_MODE";

/// Runtime operating mode for the membrane.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyLevel {
    /// Validate arguments, never rewrite them.
    #[default]
    Strict,
    /// Validate and apply deterministic healing.
    Hardened,
    /// No validation. Benchmark baseline.
    Off,
}

/// A mode name matched none of the accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown safety level '{0}' (expected strict, hardened or off)")]
pub struct UnknownSafetyLevel(pub String);

impl SafetyLevel {
    pub const ALL: [Self; 3] = [Self::Strict, Self::Hardened, Self::Off];

    /// Interpret a `BOUNDLEN_MODE` value. The env contract is strict|hardened,
    /// so anything else (including `off`) resolves to Strict.
    #[must_use]
    pub fn from_env_value(raw: &str) -> Self {
        match raw.parse::<Self>() {
            Ok(Self::Hardened) => Self::Hardened,
            _ => Self::Strict,
        }
    }

    /// Returns true if the membrane should apply healing actions.
    #[must_use]
    pub const fn heals_enabled(self) -> bool {
        matches!(self, Self::Hardened)
    }

    /// Returns true if validation is active.
    #[must_use]
    pub const fn validation_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Lowercase name used in structured logs and fixtures.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Hardened => "hardened",
            Self::Off => "off",
        }
    }
}

impl FromStr for SafetyLevel {
    type Err = UnknownSafetyLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "default" | "abi" => Ok(Self::Strict),
            "hardened" | "repair" | "full" => Ok(Self::Hardened),
            "off" | "none" | "disabled" => Ok(Self::Off),
            _ => Err(UnknownSafetyLevel(s.to_string())),
        }
    }
}

impl std::fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static ENV_LEVEL: OnceLock<SafetyLevel> = OnceLock::new();

// 0 = no pin, otherwise 1 + index into `SafetyLevel::ALL`.
static PINNED_LEVEL: AtomicU8 = AtomicU8::new(NO_PIN);
const NO_PIN: u8 = 0;

fn encode_pin(level: Option<SafetyLevel>) -> u8 {
    match level {
        None => NO_PIN,
        Some(SafetyLevel::Strict) => 1,
        Some(SafetyLevel::Hardened) => 2,
        Some(SafetyLevel::Off) => 3,
    }
}

fn decode_pin(raw: u8) -> Option<SafetyLevel> {
    SafetyLevel::ALL.get(usize::from(raw).checked_sub(1)?).copied()
}

/// Level resolved from `BOUNDLEN_MODE`, read on first use.
#[must_use]
pub fn env_safety_level() -> SafetyLevel {
    *ENV_LEVEL.get_or_init(|| {
        std::env::var(MODE_ENV_VAR)
            .map(|v| SafetyLevel::from_env_value(&v))
            .unwrap_or_default()
    })
}

/// The level in effect: the pinned level if any, else the env level.
#[must_use]
pub fn safety_level() -> SafetyLevel {
    decode_pin(PINNED_LEVEL.load(Ordering::Acquire)).unwrap_or_else(env_safety_level)
}

/// Pin the level, overriding `BOUNDLEN_MODE`.
///
/// Used by the conformance harness to run fixtures under a chosen mode, by
/// benches (to reach `Off`) and by tests. Returns the previous pin so callers
/// can hand it back to [`restore_pinned_level`].
pub fn pin_safety_level(level: SafetyLevel) -> Option<SafetyLevel> {
    decode_pin(PINNED_LEVEL.swap(encode_pin(Some(level)), Ordering::AcqRel))
}

/// Reinstate a pin returned by [`pin_safety_level`]. `None` removes the pin and
/// hands control back to the env level.
pub fn restore_pinned_level(previous: Option<SafetyLevel>) {
    PINNED_LEVEL.store(encode_pin(previous), Ordering::Release);
}
