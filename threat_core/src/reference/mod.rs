//! Threat references - one attacker's standing against the owning actor.
//!
//! A reference never talks to its manager directly. Every mutating call
//! returns the events it raised, and the manager dispatches them before its
//! own call returns.

mod state;

pub use state::*;

use combat_rules::EntityId;
use serde::Serialize;

use crate::events::{ThreatEvent, ThreatEventKind, ThreatEvents};
use crate::world::CombatWorld;

/// The tracked relationship between one attacker and the owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatReference {
    target: EntityId,
    /// Cleared by `remove`; the target is then resolved again on demand.
    linked: bool,
    threat: f32,
    online: bool,
    accessible: bool,
    hostile_state: HostileState,
    taunt_state: TauntState,
    fadeout_reduction: f32,
    suppressibility_toggle: bool,
}

impl ThreatReference {
    /// Create a linked, online reference.
    pub fn new(target: EntityId, threat: f32) -> Self {
        Self {
            target,
            linked: true,
            threat: threat.max(0.0),
            online: true,
            accessible: true,
            hostile_state: HostileState::Normal,
            taunt_state: TauntState::None,
            fadeout_reduction: 0.0,
            suppressibility_toggle: false,
        }
    }

    /// The attacker this reference tracks.
    pub fn target_id(&self) -> EntityId {
        self.target
    }

    /// Whether the reference is still attached to its target.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// The target, if the link is intact and the handle still resolves.
    pub fn resolve_target<W: CombatWorld>(&self, world: &W) -> Option<EntityId> {
        (self.linked && world.exists(self.target)).then_some(self.target)
    }

    /// Current threat value, never negative.
    pub fn threat(&self) -> f32 {
        self.threat
    }

    /// Online references compete for the victim slot.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Whether the target is currently accessible.
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// Normal or suppressed.
    pub fn hostile_state(&self) -> HostileState {
        self.hostile_state
    }

    /// Current taunt override.
    pub fn taunt_state(&self) -> TauntState {
        self.taunt_state
    }

    /// Overwrite the taunt state. Raises no event.
    pub fn set_taunt_state(&mut self, state: TauntState) {
        self.taunt_state = state;
    }

    /// Threat shift applied by the active fadeout, if any.
    pub fn fadeout_reduction(&self) -> f32 {
        self.fadeout_reduction
    }

    /// Whether the one-shot toggle is armed.
    pub fn has_suppressibility_toggle(&self) -> bool {
        self.suppressibility_toggle
    }

    /// Arm the one-shot toggle: the next non-zero threat change lifts suppression.
    pub fn set_suppressibility_toggle(&mut self) {
        self.suppressibility_toggle = true;
    }

    /// Add `delta` to the threat value, flooring the result at zero.
    pub fn add_threat(&mut self, delta: f32) -> ThreatEvents {
        let mut events = ThreatEvents::new();
        let delta = if delta + self.threat < 0.0 {
            -self.threat
        } else {
            delta
        };

        self.threat += delta;

        if self.suppressibility_toggle && delta != 0.0 {
            events.extend(self.set_hostile_state(HostileState::Normal));
        }

        if delta != 0.0 {
            tracing::trace!(target_id = %self.target, delta, threat = self.threat, "threat changed");
            events.push(ThreatEvent::threat_change(self.target, delta));
        }
        events
    }

    /// Scale the threat value by `(100 + pct) / 100`.
    pub fn add_threat_percent(&mut self, pct: i32) -> ThreatEvents {
        let scaled = self.threat * (pct as f32 + 100.0) / 100.0;
        self.add_threat(scaled - self.threat)
    }

    /// Flip the online flag. `None` when it was already `online`.
    pub fn set_online(&mut self, online: bool) -> Option<ThreatEvent> {
        if self.online == online {
            return None;
        }
        self.online = online;
        Some(ThreatEvent::new(self.target, ThreatEventKind::OnlineStatus))
    }

    /// Flip the accessible flag. `None` when unchanged.
    pub fn set_accessible(&mut self, accessible: bool) -> Option<ThreatEvent> {
        if self.accessible == accessible {
            return None;
        }
        self.accessible = accessible;
        Some(ThreatEvent::new(self.target, ThreatEventKind::AccessibleStatus))
    }

    /// Change the hostile state. Always disarms the suppressibility toggle.
    pub fn set_hostile_state(&mut self, state: HostileState) -> Option<ThreatEvent> {
        let event = (self.hostile_state != state).then(|| {
            self.hostile_state = state;
            ThreatEvent::new(self.target, ThreatEventKind::SuppressedStatus)
        });
        self.suppressibility_toggle = false;
        event
    }

    /// Unlink from the target. The reference must be taken out of its set and
    /// dropped once the returned event has been dispatched.
    pub fn remove(&mut self) -> ThreatEvent {
        self.linked = false;
        ThreatEvent::new(self.target, ThreatEventKind::RemoveFromList)
    }

    /// Re-link if needed, then go online exactly when the target resolves and
    /// `owner` can engage it.
    pub fn update_online_status<W: CombatWorld>(
        &mut self,
        world: &W,
        owner: EntityId,
    ) -> Option<ThreatEvent> {
        if !self.linked && world.exists(self.target) {
            self.linked = true;
        }

        let online = self
            .resolve_target(world)
            .is_some_and(|target| !world.is_offline_target(owner, target));
        self.set_online(online)
    }

    /// Temporarily shift threat by `value` until [`reset_fadeout_threat_reduction`].
    ///
    /// [`reset_fadeout_threat_reduction`]: ThreatReference::reset_fadeout_threat_reduction
    pub fn set_fadeout_threat_reduction(&mut self, value: f32) -> ThreatEvents {
        self.fadeout_reduction = value;
        self.add_threat(value)
    }

    /// Undo the fadeout shift and forget it.
    pub fn reset_fadeout_threat_reduction(&mut self) -> ThreatEvents {
        let events = self.add_threat(-self.fadeout_reduction);
        self.fadeout_reduction = 0.0;
        events
    }
}
