//! Reactions to reference status changes.

use combat_rules::EntityId;

use super::ThreatManager;
use crate::events::{ThreatEvent, ThreatEventKind};
use crate::reference::HostileState;
use crate::sink::ThreatSink;
use crate::world::CombatWorld;

impl<S: ThreatSink> ThreatManager<S> {
    /// Handle events in the order they were raised.
    pub(crate) fn dispatch<W, I>(&mut self, world: &W, events: I)
    where
        W: CombatWorld,
        I: IntoIterator<Item = ThreatEvent>,
    {
        for event in events {
            self.process_threat_event(world, event);
        }
    }

    /// React to one status change raised by a reference.
    pub fn process_threat_event<W: CombatWorld>(&mut self, world: &W, event: ThreatEvent) {
        let target = event.target;
        let is_victim = self.current_victim == Some(target);

        match event.kind {
            ThreatEventKind::ThreatChange(delta) => {
                // Only changes that could reorder the victim's standing matter.
                if (is_victim && delta < 0.0) || (!is_victim && delta > 0.0) {
                    self.reachable.set_dirty(true);
                }
            }
            ThreatEventKind::OnlineStatus => {
                let Some(online) = self.reference(target).map(|r| r.is_online()) else {
                    return;
                };
                if online {
                    self.handle_went_online(target);
                } else {
                    self.handle_went_offline(world, target, is_victim);
                }
            }
            ThreatEventKind::AccessibleStatus => {
                tracing::trace!(owner = %self.owner, target_id = %target, "accessible status changed");
            }
            ThreatEventKind::RemoveFromList => {
                if is_victim {
                    self.set_current_victim(None);
                    self.reachable.set_dirty(true);
                }
                self.sink.removed_from_threat_list(self.owner, target);

                let online = self.reference(target).map(|r| r.is_online());
                let removed = match online {
                    Some(true) => self.reachable.remove(target),
                    Some(false) => self.unreachable.remove(target),
                    None => None,
                };
                if removed.is_some() {
                    tracing::debug!(owner = %self.owner, target_id = %target, "threat reference removed");
                }
            }
            ThreatEventKind::SuppressedStatus => {
                self.clear_suppressed(world, target);
                self.reachable.set_dirty(true);
            }
        }
    }

    fn handle_went_offline<W: CombatWorld>(&mut self, world: &W, target: EntityId, is_victim: bool) {
        if is_victim {
            self.set_current_victim(None);
            self.reachable.set_dirty(true);
        }
        if world.exists(target) {
            self.sink.removed_from_threat_list(self.owner, target);
        }
        if let Some(reference) = self.reachable.remove(target) {
            tracing::debug!(owner = %self.owner, target_id = %target, "threat reference went offline");
            self.unreachable.add_reference(reference);
        }
    }

    fn handle_went_online(&mut self, target: EntityId) {
        let threat = self.reference(target).map(|r| r.threat()).unwrap_or(0.0);
        let victim_threat = self.current_victim_reference().map(|r| r.threat());
        if victim_threat.is_some_and(|v| threat > self.config.melee_switch_ratio * v) {
            self.reachable.set_dirty(true);
        }
        if let Some(reference) = self.unreachable.remove(target) {
            tracing::debug!(owner = %self.owner, target_id = %target, "threat reference came online");
            self.reachable.add_reference(reference);
        }
    }

    /// Lift suppression from every reachable reference, other than `except`,
    /// whose suppression condition no longer holds.
    fn clear_suppressed<W: CombatWorld>(&mut self, world: &W, except: EntityId) {
        let candidates: Vec<EntityId> = self
            .reachable
            .iter()
            .map(|r| r.target_id())
            .filter(|&target| target != except)
            .collect();

        for target in candidates {
            let owner = self.owner;
            let Some(reference) = self.reachable.lookup_mut(target) else {
                continue;
            };
            // Earlier iterations may already have released it.
            if reference.hostile_state() != HostileState::Suppressed
                || world.is_suppressed_target(owner, target)
            {
                continue;
            }
            let event = reference.set_hostile_state(HostileState::Normal);
            self.dispatch(world, event);
        }
    }
}
