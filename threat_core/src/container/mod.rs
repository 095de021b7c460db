//! Threat sets - ordered collections of references.
//!
//! A manager keeps two sets: reachable (online) references that compete for
//! the victim slot, and unreachable (offline) ones parked until they come back.
//!
//! Ordering is deferred: mutations only mark the set dirty, and the next
//! [`ThreatSet::resort`] puts it back in priority order.

mod selection;

use combat_rules::EntityId;
use std::cmp::Ordering;

use crate::events::ThreatEvents;
use crate::reference::ThreatReference;
use crate::world::CombatWorld;

/// An ordered sequence of references plus a dirty flag.
#[derive(Debug, Clone, Default)]
pub struct ThreatSet {
    refs: Vec<ThreatReference>,
    dirty: bool,
}

impl ThreatSet {
    /// Create an empty, clean set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of references.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Check if the set holds no references.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// The order may be stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the order stale, or clean.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// References in their current order.
    pub fn references(&self) -> &[ThreatReference] {
        &self.refs
    }

    /// Iterate references in their current order.
    pub fn iter(&self) -> impl Iterator<Item = &ThreatReference> {
        self.refs.iter()
    }

    /// Mutable iteration. Callers must mark the set dirty if order-relevant fields change.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ThreatReference> {
        self.refs.iter_mut()
    }

    /// Find the reference tracking `target`.
    pub fn lookup(&self, target: EntityId) -> Option<&ThreatReference> {
        self.refs.iter().find(|r| r.target_id() == target)
    }

    /// Find the reference tracking `target`, mutably.
    pub fn lookup_mut(&mut self, target: EntityId) -> Option<&mut ThreatReference> {
        self.refs.iter_mut().find(|r| r.target_id() == target)
    }

    /// Check if `target` is tracked here.
    pub fn contains(&self, target: EntityId) -> bool {
        self.lookup(target).is_some()
    }

    /// Append a reference at the back of the list.
    pub fn add_reference(&mut self, reference: ThreatReference) {
        self.refs.push(reference);
    }

    /// Take a reference out of the set, handing ownership back to the caller.
    pub fn remove(&mut self, target: EntityId) -> Option<ThreatReference> {
        let index = self.refs.iter().position(|r| r.target_id() == target)?;
        Some(self.refs.remove(index))
    }

    /// Drop every reference.
    pub fn clear_references(&mut self) {
        self.refs.clear();
    }

    /// Add threat to an existing reference. `None` when the target is not in
    /// this set; nothing is created.
    pub fn add_threat(&mut self, target: EntityId, delta: f32) -> Option<ThreatEvents> {
        self.lookup_mut(target).map(|r| r.add_threat(delta))
    }

    /// Scale one reference by `pct` percent. At -100% or below the reference
    /// is unlinked instead and the returned removal event drops it.
    pub fn modify_percent(&mut self, target: EntityId, pct: i32) -> ThreatEvents {
        match self.lookup_mut(target) {
            Some(r) if pct <= -100 => vec![r.remove()],
            Some(r) => r.add_threat_percent(pct),
            None => ThreatEvents::new(),
        }
    }

    /// Apply [`modify_percent`](ThreatSet::modify_percent) to every member.
    pub fn modify_all_percent(&mut self, pct: i32) -> ThreatEvents {
        if pct <= -100 {
            self.refs.iter_mut().map(|r| r.remove()).collect()
        } else {
            self.refs
                .iter_mut()
                .flat_map(|r| r.add_threat_percent(pct))
                .collect()
        }
    }

    /// Put the set back in priority order.
    ///
    /// Sorts when dirty, forced, or preferring players, and there is more than
    /// one member. `force` also ranks melee-reachable targets ahead of the
    /// rest; `prefer_players` ranks attackable players ahead of everyone.
    pub fn resort<W: CombatWorld>(
        &mut self,
        world: &W,
        owner: EntityId,
        force: bool,
        prefer_players: bool,
    ) {
        if (self.dirty || force || prefer_players) && self.refs.len() > 1 {
            self.refs
                .sort_by(|lhs, rhs| compare(world, owner, lhs, rhs, force, prefer_players));
            tracing::trace!(owner = %owner, size = self.refs.len(), force, prefer_players, "threat set resorted");
        }
        self.dirty = false;
    }
}

/// Priority comparator. `Less` means `lhs` goes first.
fn compare<W: CombatWorld>(
    world: &W,
    owner: EntityId,
    lhs: &ThreatReference,
    rhs: &ThreatReference,
    force: bool,
    prefer_players: bool,
) -> Ordering {
    let (left, right) = (lhs.target_id(), rhs.target_id());

    if prefer_players {
        let order = world.is_player(right).cmp(&world.is_player(left));
        if order != Ordering::Equal {
            return order;
        }
        let order = world
            .can_attack(owner, right)
            .cmp(&world.can_attack(owner, left));
        if order != Ordering::Equal {
            return order;
        }
    }

    if lhs.taunt_state() != rhs.taunt_state() {
        return rhs.taunt_state().cmp(&lhs.taunt_state());
    }

    if force {
        let order = world
            .can_reach_with_melee(owner, right)
            .cmp(&world.can_reach_with_melee(owner, left));
        if order != Ordering::Equal {
            return order;
        }
    }

    if lhs.hostile_state() != rhs.hostile_state() {
        return rhs.hostile_state().cmp(&lhs.hostile_state());
    }

    rhs.threat().total_cmp(&lhs.threat())
}
