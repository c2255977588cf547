//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use super::{DetectorSnapshot, Invariant, InvariantResult, Violation};

/// A stopped detector has no platform event source attached.
pub struct SilentWhenStopped;

impl Invariant for SilentWhenStopped {
    fn name(&self) -> &'static str {
        "silent_when_stopped"
    }

    fn check(&self, state: &DetectorSnapshot) -> InvariantResult {
        if !state.is_listening && state.source_attached {
            return Err(Violation {
                invariant: self.name(),
                message: "detector stopped but platform source still attached".into(),
            });
        }
        Ok(())
    }
}

/// On a permission-gated platform, no permission means no source.
pub struct PermissionGatesSource;

impl Invariant for PermissionGatesSource {
    fn name(&self) -> &'static str {
        "permission_gates_source"
    }

    fn check(&self, state: &DetectorSnapshot) -> InvariantResult {
        if state.requires_permission && !state.has_permission && state.source_attached {
            return Err(Violation {
                invariant: self.name(),
                message: "source attached without motion permission".into(),
            });
        }
        Ok(())
    }
}

/// Accepted shakes are separated by more than the cooldown.
pub struct CooldownSpacing;

impl Invariant for CooldownSpacing {
    fn name(&self) -> &'static str {
        "cooldown_spacing"
    }

    fn check(&self, state: &DetectorSnapshot) -> InvariantResult {
        for pair in state.shake_times.windows(2) {
            let gap = pair[1].saturating_sub(pair[0]);
            if gap <= state.cooldown {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "shakes at {:?} and {:?} only {gap:?} apart (cooldown {:?})",
                        pair[0], pair[1], state.cooldown
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Every enable attaches the platform source at most once.
pub struct SingleAttachment;

impl Invariant for SingleAttachment {
    fn name(&self) -> &'static str {
        "single_attachment"
    }

    fn check(&self, state: &DetectorSnapshot) -> InvariantResult {
        if state.attachments > state.enables {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{} attachments for {} effective enables",
                    state.attachments, state.enables
                ),
            });
        }
        Ok(())
    }
}
