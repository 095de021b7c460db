//! Status-change notifications raised by threat references.

use combat_rules::EntityId;

/// What changed on a reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThreatEventKind {
    /// Threat value moved by the given (non-zero) delta.
    ThreatChange(f32),
    /// Online flag flipped; read the new value from the reference.
    OnlineStatus,
    /// Accessible flag flipped.
    AccessibleStatus,
    /// Hostile state flipped between normal and suppressed.
    SuppressedStatus,
    /// Reference was unlinked and must leave its set.
    RemoveFromList,
}

/// A reference status change, identified by the reference's target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatEvent {
    pub target: EntityId,
    pub kind: ThreatEventKind,
}

impl ThreatEvent {
    pub fn new(target: EntityId, kind: ThreatEventKind) -> Self {
        Self { target, kind }
    }

    pub fn threat_change(target: EntityId, delta: f32) -> Self {
        Self::new(target, ThreatEventKind::ThreatChange(delta))
    }
}

/// Events raised by one mutating call, in the order they fired.
pub type ThreatEvents = Vec<ThreatEvent>;
