//! Outbound notifications to observers of a threat list.
//!
//! Delivery and encoding belong to the implementor; the manager fires and
//! forgets.

use combat_rules::EntityId;
use serde::Serialize;

use crate::reference::{HostileState, TauntState, ThreatReference};

/// One row of a threat list as shown to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatEntry {
    pub target: EntityId,
    pub threat: f32,
    pub taunt_state: TauntState,
    pub hostile_state: HostileState,
}

impl From<&ThreatReference> for ThreatEntry {
    fn from(reference: &ThreatReference) -> Self {
        Self {
            target: reference.target_id(),
            threat: reference.threat(),
            taunt_state: reference.taunt_state(),
            hostile_state: reference.hostile_state(),
        }
    }
}

/// Full reachable threat list of one owner, in priority order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatSnapshot {
    pub owner: EntityId,
    pub current_victim: Option<EntityId>,
    pub entries: Vec<ThreatEntry>,
}

/// Receiver for threat list notifications.
pub trait ThreatSink {
    fn threat_list_updated(&mut self, snapshot: &ThreatSnapshot);
    fn current_victim_changed(&mut self, owner: EntityId, victim: EntityId);
    fn removed_from_threat_list(&mut self, owner: EntityId, target: EntityId);
    fn threat_list_cleared(&mut self, owner: EntityId);
    /// `owner` just started tracking `target`; used for aggro linking.
    fn entered_combat(&mut self, owner: EntityId, target: EntityId);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ThreatSink for NullSink {
    fn threat_list_updated(&mut self, _snapshot: &ThreatSnapshot) {}
    fn current_victim_changed(&mut self, _owner: EntityId, _victim: EntityId) {}
    fn removed_from_threat_list(&mut self, _owner: EntityId, _target: EntityId) {}
    fn threat_list_cleared(&mut self, _owner: EntityId) {}
    fn entered_combat(&mut self, _owner: EntityId, _target: EntityId) {}
}

/// A notification captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SinkMessage {
    ThreatList(ThreatSnapshot),
    VictimChanged { owner: EntityId, victim: EntityId },
    Removed { owner: EntityId, target: EntityId },
    Cleared { owner: EntityId },
    EnteredCombat { owner: EntityId, target: EntityId },
}

/// Keeps every notification in order, for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub messages: Vec<SinkMessage>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Victims announced so far, oldest first.
    pub fn victim_changes(&self) -> Vec<EntityId> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                SinkMessage::VictimChanged { victim, .. } => Some(*victim),
                _ => None,
            })
            .collect()
    }

    /// Targets announced as removed, oldest first.
    pub fn removals(&self) -> Vec<EntityId> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                SinkMessage::Removed { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl ThreatSink for RecordingSink {
    fn threat_list_updated(&mut self, snapshot: &ThreatSnapshot) {
        self.messages.push(SinkMessage::ThreatList(snapshot.clone()));
    }

    fn current_victim_changed(&mut self, owner: EntityId, victim: EntityId) {
        self.messages
            .push(SinkMessage::VictimChanged { owner, victim });
    }

    fn removed_from_threat_list(&mut self, owner: EntityId, target: EntityId) {
        self.messages.push(SinkMessage::Removed { owner, target });
    }

    fn threat_list_cleared(&mut self, owner: EntityId) {
        self.messages.push(SinkMessage::Cleared { owner });
    }

    fn entered_combat(&mut self, owner: EntityId, target: EntityId) {
        self.messages
            .push(SinkMessage::EnteredCombat { owner, target });
    }
}
