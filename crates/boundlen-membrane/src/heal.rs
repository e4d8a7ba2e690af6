//! Self-healing policy engine.
//!
//! When the membrane sees a bound or pointer it cannot honor, hardened mode
//! applies one of a small set of deterministic repairs instead of letting the
//! scan run into undefined behavior. Every repair is counted here.

use std::sync::atomic::{AtomicU64, Ordering};

/// Actions the membrane can take to heal an unsafe scan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealingAction {
    /// Clamp a length parameter (or a result) to fit within known bounds.
    ClampSize { requested: usize, clamped: usize },
    /// Return a safe default value instead of performing the operation.
    ReturnSafeDefault,
    /// No healing needed.
    None,
}

impl HealingAction {
    /// Returns true if this action represents an actual healing (not None).
    #[must_use]
    pub const fn is_heal(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Stable name for structured logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ClampSize { .. } => "ClampSize",
            Self::ReturnSafeDefault => "ReturnSafeDefault",
            Self::None => "None",
        }
    }
}

/// Point-in-time copy of the policy counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HealingSnapshot {
    pub total_heals: u64,
    pub size_clamps: u64,
    pub safe_defaults: u64,
}

/// Policy engine that decides which healing action to apply.
pub struct HealingPolicy {
    /// Total heals applied.
    pub total_heals: AtomicU64,
    /// Size clamps applied.
    pub size_clamps: AtomicU64,
    /// Safe defaults returned.
    pub safe_defaults: AtomicU64,
}

impl HealingPolicy {
    /// Create a new policy with zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_heals: AtomicU64::new(0),
            size_clamps: AtomicU64::new(0),
            safe_defaults: AtomicU64::new(0),
        }
    }

    /// Record a healing action.
    pub fn record(&self, action: &HealingAction) {
        if action.is_heal() {
            self.total_heals.fetch_add(1, Ordering::Relaxed);
        }

        match action {
            HealingAction::ClampSize { .. } => {
                self.size_clamps.fetch_add(1, Ordering::Relaxed);
            }
            HealingAction::ReturnSafeDefault => {
                self.safe_defaults.fetch_add(1, Ordering::Relaxed);
            }
            HealingAction::None => {}
        }
    }

    /// Decide healing for a scan bound against the extent known to be readable.
    ///
    /// `available == None` means nothing is known and the bound is left alone.
    #[must_use]
    pub fn heal_scan_bounds(&self, requested: usize, available: Option<usize>) -> HealingAction {
        match available {
            Some(available) if requested > available => HealingAction::ClampSize {
                requested,
                clamped: available,
            },
            _ => HealingAction::None,
        }
    }

    /// Read all counters.
    #[must_use]
    pub fn snapshot(&self) -> HealingSnapshot {
        HealingSnapshot {
            total_heals: self.total_heals.load(Ordering::Relaxed),
            size_clamps: self.size_clamps.load(Ordering::Relaxed),
            safe_defaults: self.safe_defaults.load(Ordering::Relaxed),
        }
    }
}

impl Default for HealingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_POLICY: HealingPolicy = HealingPolicy::new();

/// Access the global healing policy.
#[must_use]
pub fn global_healing_policy() -> &'static HealingPolicy {
    &GLOBAL_POLICY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_when_bound_exceeds_extent() {
        let policy = HealingPolicy::new();
        assert_eq!(
            policy.heal_scan_bounds(1000, Some(500)),
            HealingAction::ClampSize {
                requested: 1000,
                clamped: 500
            }
        );
    }

    #[test]
    fn no_heal_within_extent_or_unknown() {
        let policy = HealingPolicy::new();
        assert_eq!(policy.heal_scan_bounds(500, Some(500)), HealingAction::None);
        assert_eq!(policy.heal_scan_bounds(usize::MAX, None), HealingAction::None);
    }

    #[test]
    fn record_increments_counters() {
        let policy = HealingPolicy::new();
        policy.record(&HealingAction::ReturnSafeDefault);
        policy.record(&HealingAction::ReturnSafeDefault);
        policy.record(&HealingAction::ClampSize {
            requested: 10,
            clamped: 5,
        });
        policy.record(&HealingAction::None);

        assert_eq!(
            policy.snapshot(),
            HealingSnapshot {
                total_heals: 3,
                size_clamps: 1,
                safe_defaults: 2,
            }
        );
    }

    #[test]
    fn none_is_not_a_heal() {
        assert!(!HealingAction::None.is_heal());
        assert!(HealingAction::ReturnSafeDefault.is_heal());
        assert_eq!(HealingAction::None.name(), "None");
        assert_eq!(
            HealingAction::ClampSize {
                requested: 1,
                clamped: 0
            }
            .name(),
            "ClampSize"
        );
    }
}
