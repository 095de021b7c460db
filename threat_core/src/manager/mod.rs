//! Threat manager - the per-actor aggregate that owns both threat sets and
//! decides who the actor fights.
//!
//! The control flow of one stimulus:
//! 1. **Contribution**: damage, healing or a scripted call reaches [`ThreatManager::add_threat`]
//! 2. **Calculation**: [`ThreatCalculator`] turns it into adjusted threat
//! 3. **Mutation**: the matching reference changes and raises events
//! 4. **Dispatch**: the manager reacts to each event before the call returns
//! 5. **Selection**: the next combat step calls [`ThreatManager::get_hostile_target`]

mod dispatch;

use combat_rules::EntityId;
use std::collections::HashMap;

use crate::calculator::{ThreatCalculator, ThreatContribution};
use crate::config::ThreatConfig;
use crate::error::ConfigError;
use crate::container::ThreatSet;
use crate::reference::{HostileState, TauntState, ThreatReference};
use crate::sink::{NullSink, ThreatEntry, ThreatSink, ThreatSnapshot};
use crate::world::CombatWorld;

/// Threat list and victim selection for one owning actor.
#[derive(Debug)]
pub struct ThreatManager<S: ThreatSink = NullSink> {
    owner: EntityId,
    config: ThreatConfig,
    /// Online references; the current victim always lives here.
    reachable: ThreatSet,
    /// Offline references.
    unreachable: ThreatSet,
    current_victim: Option<EntityId>,
    update_timer: u32,
    sink: S,
}

impl ThreatManager<NullSink> {
    /// Create a manager with default tuning that sends notifications nowhere.
    pub fn with_defaults(owner: EntityId) -> Self {
        Self::new(owner, ThreatConfig::default(), NullSink)
    }
}

impl<S: ThreatSink> ThreatManager<S> {
    /// Create a manager. `config` is used as given; see [`ThreatManager::try_new`].
    pub fn new(owner: EntityId, config: ThreatConfig, sink: S) -> Self {
        let update_timer = config.update_interval_ms;
        Self {
            owner,
            config,
            reachable: ThreatSet::new(),
            unreachable: ThreatSet::new(),
            current_victim: None,
            update_timer,
            sink,
        }
    }

    /// Create a manager after checking `config` with [`ThreatConfig::validate`].
    pub fn try_new(
        owner: EntityId,
        config: ThreatConfig,
        sink: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(owner, config, sink))
    }

    /// The actor this threat list belongs to.
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn config(&self) -> &ThreatConfig {
        &self.config
    }

    /// Notification receiver.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Target of the current victim, if any.
    pub fn current_victim(&self) -> Option<EntityId> {
        self.current_victim
    }

    pub fn current_victim_reference(&self) -> Option<&ThreatReference> {
        self.current_victim.and_then(|id| self.reachable.lookup(id))
    }

    /// Reachable references in their current order.
    pub fn threat_list(&self) -> &[ThreatReference] {
        self.reachable.references()
    }

    /// Offline references, unordered.
    pub fn offline_threat_list(&self) -> &[ThreatReference] {
        self.unreachable.references()
    }

    pub fn is_threat_list_empty(&self) -> bool {
        self.reachable.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.reachable.is_dirty()
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.reachable.set_dirty(dirty);
    }

    /// Find a reference in either set.
    pub fn reference(&self, target: EntityId) -> Option<&ThreatReference> {
        self.reachable
            .lookup(target)
            .or_else(|| self.unreachable.lookup(target))
    }

    fn reference_mut(&mut self, target: EntityId) -> Option<&mut ThreatReference> {
        match self.reachable.lookup_mut(target) {
            Some(reference) => Some(reference),
            None => self.unreachable.lookup_mut(target),
        }
    }

    /// Check if `target` is tracked, optionally counting offline references.
    pub fn has_threat(&self, target: EntityId, also_offline: bool) -> bool {
        self.reachable.contains(target) || (also_offline && self.unreachable.contains(target))
    }

    /// Threat `target` holds, or zero when it is not tracked.
    pub fn get_threat(&self, target: EntityId, also_offline: bool) -> f32 {
        self.reachable
            .lookup(target)
            .or_else(|| {
                also_offline
                    .then(|| self.unreachable.lookup(target))
                    .flatten()
            })
            .map(|r| r.threat())
            .unwrap_or(0.0)
    }

    /// Highest threat across both sets, zero when empty.
    pub fn highest_threat(&self) -> f32 {
        self.reachable
            .iter()
            .chain(self.unreachable.iter())
            .map(|r| r.threat())
            .fold(0.0, f32::max)
    }

    /// Record a threat contribution from `contribution.target`.
    ///
    /// Silently ignored for self-targeting, unknown or game-master targets,
    /// and when either side is dead. Positive threat from a target with an
    /// active redirect goes to the redirect target, and the original target
    /// is still linked at zero.
    pub fn add_threat<W: CombatWorld>(&mut self, world: &W, contribution: ThreatContribution) {
        let victim = contribution.target;

        if victim == self.owner {
            return;
        }
        if !world.exists(victim) || world.is_game_master(victim) {
            return;
        }
        if !world.is_alive(victim) || !world.is_alive(self.owner) {
            return;
        }

        let mut threat = ThreatCalculator::compute(world, self.owner, &contribution);

        if threat > 0.0 && !world.ignores_misdirection(self.owner) {
            if let Some(redirect) = world.threat_redirection_target(victim) {
                if redirect != self.owner && world.is_alive(redirect) {
                    tracing::debug!(owner = %self.owner, from = %victim, to = %redirect, threat, "threat redirected");
                    self.add_threat_directly(world, redirect, threat, false);
                    threat = 0.0;
                }
            }
        }

        self.add_threat_directly(world, victim, threat, contribution.suppresses_new_entry());
    }

    /// Add already-adjusted threat, creating the reference when allowed.
    pub fn add_threat_directly<W: CombatWorld>(
        &mut self,
        world: &W,
        victim: EntityId,
        threat: f32,
        suppress_creation: bool,
    ) {
        let existing = self
            .reachable
            .add_threat(victim, threat)
            .or_else(|| self.unreachable.add_threat(victim, threat));

        if let Some(events) = existing {
            self.dispatch(world, events);
            return;
        }
        if suppress_creation {
            return;
        }

        tracing::debug!(owner = %self.owner, target_id = %victim, threat, "threat reference created");
        self.reachable.add_reference(ThreatReference::new(victim, 0.0));
        if let Some(events) = self.reachable.add_threat(victim, threat) {
            self.dispatch(world, events);
        }

        self.sink.entered_combat(self.owner, victim);

        if world.propagates_threat_to_master(victim) {
            if let Some(master) = world.master(victim) {
                if world.is_alive(master) && world.can_join_in_attacking(master, self.owner) {
                    self.add_threat(world, ThreatContribution::new(master, 0.0));
                }
            }
        }

        if world.is_offline_target(self.owner, victim) || world.is_game_master(victim) {
            let event = self
                .reachable
                .lookup_mut(victim)
                .and_then(|r| r.set_online(false));
            self.dispatch(world, event);
        }
    }

    /// Scale one reachable reference; -100% or less removes it.
    pub fn modify_threat_percent<W: CombatWorld>(&mut self, world: &W, target: EntityId, pct: i32) {
        let events = self.reachable.modify_percent(target, pct);
        self.dispatch(world, events);
    }

    /// Scale every reachable reference; -100% or less empties the list.
    pub fn modify_all_threat_percent<W: CombatWorld>(&mut self, world: &W, pct: i32) {
        let events = self.reachable.modify_all_percent(pct);
        self.dispatch(world, events);
    }

    /// Resort if needed, pick the next victim and return it.
    pub fn get_hostile_target<W: CombatWorld>(&mut self, world: &W) -> Option<EntityId> {
        let force = world.ignores_ranged_targets(self.owner);
        let prefer_players = world.is_player(self.owner);
        self.reachable
            .resort(world, self.owner, force, prefer_players);

        let next = self.reachable.select_next_victim(
            world,
            self.owner,
            self.current_victim,
            &self.config,
        );
        self.set_current_victim(next);
        self.current_victim
    }

    /// Assign the victim. Observers hear about a new non-empty victim only.
    pub fn set_current_victim(&mut self, victim: Option<EntityId>) {
        if let Some(victim) = victim {
            if self.current_victim != Some(victim) {
                tracing::debug!(owner = %self.owner, victim = %victim, "current victim changed");
                self.sink.current_victim_changed(self.owner, victim);
            }
        }
        self.current_victim = victim;
    }

    /// Make the reachable reference for `target` the victim, if there is one.
    pub fn set_current_victim_by_target(&mut self, target: EntityId) {
        if self.current_victim == Some(target) {
            return;
        }
        if self.reachable.contains(target) {
            self.set_current_victim(Some(target));
        }
    }

    /// Rebuild taunt ranks from the taunt effects currently on the owner.
    ///
    /// Each taunter ranks above every earlier one. Fixated references keep
    /// their state.
    pub fn taunt_update<W: CombatWorld>(&mut self, world: &W) {
        let ranks: HashMap<EntityId, TauntState> = world
            .taunt_casters(self.owner)
            .into_iter()
            .zip(1u32..)
            .map(|(caster, rank)| (caster, TauntState::Taunted(rank)))
            .collect();

        let owner = self.owner;
        for reference in self.reachable.iter_mut() {
            if reference.taunt_state() == TauntState::Fixated {
                continue;
            }
            let target = reference.target_id();
            let state = match ranks.get(&target) {
                Some(rank) => *rank,
                None if world.has_detaunt_from(target, owner) => TauntState::Detaunted,
                None => TauntState::None,
            };
            reference.set_taunt_state(state);
        }
        self.reachable.set_dirty(true);
    }

    /// Fixate on `target`, releasing any other fixation.
    pub fn fixate_target<W: CombatWorld>(&mut self, world: &W, target: EntityId) {
        for reference in self.reachable.iter_mut() {
            if reference.target_id() == target {
                reference.set_taunt_state(TauntState::Fixated);
            } else if reference.taunt_state() == TauntState::Fixated {
                reference.set_taunt_state(TauntState::None);
            }
        }
        self.taunt_update(world);
    }

    /// Suppress `target` until its threat next changes.
    pub fn set_target_suppressed<W: CombatWorld>(&mut self, world: &W, target: EntityId) {
        let Some(reference) = self.reachable.lookup_mut(target) else {
            return;
        };
        let event = reference.set_hostile_state(HostileState::Suppressed);
        self.dispatch(world, event);

        if let Some(reference) = self.reachable.lookup_mut(target) {
            reference.set_suppressibility_toggle();
        }
    }

    /// Unlink and drop the reference for `target` (death, despawn, scripts).
    pub fn remove_reference<W: CombatWorld>(&mut self, world: &W, target: EntityId) {
        let event = self.reference_mut(target).map(|r| r.remove());
        self.dispatch(world, event);
    }

    /// Drop every reference farther than the configured combat distance.
    pub fn delete_out_of_range_references<W: CombatWorld>(&mut self, world: &W) {
        let max = self.config.max_combat_distance;
        let owner = self.owner;
        let out_of_range: Vec<EntityId> = self
            .reachable
            .iter()
            .chain(self.unreachable.iter())
            .filter(|r| r.is_linked())
            .map(|r| r.target_id())
            .filter(|&target| {
                world
                    .combat_distance(target, owner)
                    .is_some_and(|distance| distance > max)
            })
            .collect();

        for target in out_of_range {
            tracing::debug!(owner = %owner, target_id = %target, "threat reference out of range");
            self.remove_reference(world, target);
        }
    }

    /// Re-check whether the owner can engage `target` and move it accordingly.
    pub fn update_online_status<W: CombatWorld>(&mut self, world: &W, target: EntityId) {
        let owner = self.owner;
        let event = self
            .reference_mut(target)
            .and_then(|r| r.update_online_status(world, owner));
        self.dispatch(world, event);
    }

    pub fn update_all_online_status<W: CombatWorld>(&mut self, world: &W) {
        let targets: Vec<EntityId> = self
            .reachable
            .iter()
            .chain(self.unreachable.iter())
            .map(|r| r.target_id())
            .collect();
        for target in targets {
            self.update_online_status(world, target);
        }
    }

    pub fn set_accessible<W: CombatWorld>(&mut self, world: &W, target: EntityId, accessible: bool) {
        let event = self
            .reference_mut(target)
            .and_then(|r| r.set_accessible(accessible));
        self.dispatch(world, event);
    }

    pub fn set_fadeout_threat_reduction<W: CombatWorld>(
        &mut self,
        world: &W,
        target: EntityId,
        value: f32,
    ) {
        if let Some(events) = self
            .reference_mut(target)
            .map(|r| r.set_fadeout_threat_reduction(value))
        {
            self.dispatch(world, events);
        }
    }

    pub fn reset_fadeout_threat_reduction<W: CombatWorld>(&mut self, world: &W, target: EntityId) {
        if let Some(events) = self
            .reference_mut(target)
            .map(|r| r.reset_fadeout_threat_reduction())
        {
            self.dispatch(world, events);
        }
    }

    /// Drop every reference without notifying anyone.
    pub fn clear_references(&mut self) {
        self.reachable.clear_references();
        self.unreachable.clear_references();
        self.current_victim = None;
        self.update_timer = self.config.update_interval_ms;
    }

    /// Tell observers the list is gone, then drop every reference.
    pub fn clear_all_threat(&mut self) {
        if !self.is_threat_list_empty() {
            self.sink.threat_list_cleared(self.owner);
        }
        self.clear_references();
    }

    /// Advance the sync timer by `elapsed_ms`. True when observers are due a
    /// full list. Never true while the reachable set is empty.
    pub fn is_need_update_to_client(&mut self, elapsed_ms: u32) -> bool {
        if self.is_threat_list_empty() {
            return false;
        }
        if elapsed_ms >= self.update_timer {
            self.update_timer = self.config.update_interval_ms;
            return true;
        }
        self.update_timer -= elapsed_ms;
        false
    }

    /// Push a snapshot to the sink when the sync timer fires.
    pub fn send_threat_update(&mut self, elapsed_ms: u32) -> bool {
        if !self.is_need_update_to_client(elapsed_ms) {
            return false;
        }
        let snapshot = self.snapshot();
        self.sink.threat_list_updated(&snapshot);
        true
    }

    /// Reachable references as observers see them.
    pub fn snapshot(&self) -> ThreatSnapshot {
        ThreatSnapshot {
            owner: self.owner,
            current_victim: self.current_victim,
            entries: self.reachable.iter().map(ThreatEntry::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{RecordingSink, SinkMessage};
    use combat_rules::{
        AuraKind, Combatant, CombatantKind, SchoolMask, SpellSchool, ThreatSpell, WorldState,
    };

    const MELEE: f32 = 2.0;
    const RANGED: f32 = 30.0;

    struct Arena {
        world: WorldState,
        owner: EntityId,
        manager: ThreatManager<RecordingSink>,
    }

    impl Arena {
        fn new() -> Self {
            let mut world = WorldState::new();
            let owner = world.add_combatant(Combatant::creature("Ogre"));
            let manager = ThreatManager::new(owner, ThreatConfig::default(), RecordingSink::new());
            Self {
                world,
                owner,
                manager,
            }
        }

        fn player(&mut self, name: &str, distance: f32) -> EntityId {
            self.world
                .add_combatant(Combatant::player(name).at(distance, 0.0, 0.0))
        }

        fn hit(&mut self, target: EntityId, amount: f32) {
            self.manager
                .add_threat(&self.world, ThreatContribution::new(target, amount));
        }

        fn select(&mut self) -> Option<EntityId> {
            self.manager.get_hostile_target(&self.world)
        }

        fn owner_mut(&mut self) -> &mut Combatant {
            self.world.get_combatant_mut(self.owner).unwrap()
        }
    }

    #[test]
    fn test_first_contribution_creates_reference() {
        let mut arena = Arena::new();
        let hero = arena.player("Hero", MELEE);

        arena.hit(hero, 0.0);

        assert!(arena.manager.has_threat(hero, false));
        assert_eq!(arena.manager.get_threat(hero, false), 0.0);
        assert!(arena
            .manager
            .sink()
            .messages
            .contains(&SinkMessage::EnteredCombat {
                owner: arena.owner,
                target: hero
            }));
    }

    #[test]
    fn test_rejected_contributions_are_silent() {
        let mut arena = Arena::new();
        let owner = arena.owner;
        let ghost = EntityId::new();
        let mut gm = Combatant::player("Admin");
        gm.game_master = true;
        let gm = arena.world.add_combatant(gm);
        let corpse = arena.player("Corpse", MELEE);
        arena.world.kill(corpse);

        arena.hit(owner, 100.0);
        arena.hit(ghost, 100.0);
        arena.hit(gm, 100.0);
        arena.hit(corpse, 100.0);

        assert!(arena.manager.is_threat_list_empty());
        assert!(arena.manager.offline_threat_list().is_empty());
        assert!(arena.manager.sink().messages.is_empty());

        // A dead owner tracks nothing either.
        let hero = arena.player("Hero", MELEE);
        arena.world.kill(owner);
        arena.hit(hero, 100.0);
        assert!(!arena.manager.has_threat(hero, true));
    }

    #[test]
    fn test_game_master_added_directly_starts_offline() {
        let mut arena = Arena::new();
        let mut gm = Combatant::player("Admin").at(MELEE, 0.0, 0.0);
        gm.game_master = true;
        let gm = arena.world.add_combatant(gm);

        arena.manager.add_threat_directly(&arena.world, gm, 10.0, false);

        assert!(!arena.manager.has_threat(gm, false));
        assert!(arena
            .manager
            .offline_threat_list()
            .iter()
            .any(|r| r.target_id() == gm));
        assert_eq!(arena.select(), None);
    }

    #[test]
    fn test_redirect_to_game_master_parks_it_offline() {
        let mut arena = Arena::new();
        let mut gm = Combatant::player("Admin").at(MELEE, 0.0, 0.0);
        gm.game_master = true;
        let gm = arena.world.add_combatant(gm);
        let hunter = arena.player("Hunter", RANGED);
        arena
            .world
            .get_combatant_mut(hunter)
            .unwrap()
            .redirect_threat_to = Some(gm);

        arena.hit(hunter, 300.0);

        assert!(!arena.manager.has_threat(gm, false));
        assert!(arena
            .manager
            .offline_threat_list()
            .iter()
            .any(|r| r.target_id() == gm));
        assert_eq!(arena.manager.get_threat(gm, true), 300.0);
        assert!(arena.manager.has_threat(hunter, false));
        assert_eq!(arena.select(), Some(hunter));
    }

    #[test]
    fn test_threat_accumulates_with_modifiers() {
        let mut arena = Arena::new();
        let mage = arena.player("Mage", RANGED);
        arena
            .world
            .get_combatant_mut(mage)
            .unwrap()
            .threat_modifiers
            .school_pct
            .insert(SpellSchool::Fire, 100.0);

        arena.manager.add_threat(
            &arena.world,
            ThreatContribution::new(mage, 50.0).with_school(SchoolMask::FIRE),
        );
        arena.hit(mage, 25.0);

        assert!((arena.manager.get_threat(mage, false) - 125.0).abs() < 0.001);
        assert!((arena.manager.highest_threat() - 125.0).abs() < 0.001);
    }

    #[test]
    fn test_redirect_sends_threat_elsewhere() {
        let mut arena = Arena::new();
        let tank = arena.player("Tank", MELEE);
        let hunter = arena.player("Hunter", RANGED);
        arena
            .world
            .get_combatant_mut(hunter)
            .unwrap()
            .redirect_threat_to = Some(tank);

        arena.hit(hunter, 300.0);

        assert_eq!(arena.manager.get_threat(tank, false), 300.0);
        assert!(arena.manager.has_threat(hunter, false));
        assert_eq!(arena.manager.get_threat(hunter, false), 0.0);
    }

    #[test]
    fn test_redirect_ignored_when_owner_immune_or_redirect_dead() {
        let mut arena = Arena::new();
        let tank = arena.player("Tank", MELEE);
        let hunter = arena.player("Hunter", RANGED);
        arena
            .world
            .get_combatant_mut(hunter)
            .unwrap()
            .redirect_threat_to = Some(tank);
        arena.world.kill(tank);

        arena.hit(hunter, 100.0);
        assert_eq!(arena.manager.get_threat(hunter, false), 100.0);
        assert!(!arena.manager.has_threat(tank, true));

        let mut arena = Arena::new();
        let tank = arena.player("Tank", MELEE);
        let hunter = arena.player("Hunter", RANGED);
        arena
            .world
            .get_combatant_mut(hunter)
            .unwrap()
            .redirect_threat_to = Some(tank);
        arena.owner_mut().ignores_misdirection = true;

        arena.hit(hunter, 100.0);
        assert_eq!(arena.manager.get_threat(hunter, false), 100.0);
    }

    #[test]
    fn test_no_threat_spell_never_creates() {
        let mut arena = Arena::new();
        let priest = arena.player("Priest", RANGED);
        let silent = ThreatContribution::new(priest, 40.0).with_spell(ThreatSpell::new(9).with_no_threat());

        arena.manager.add_threat(&arena.world, silent);
        assert!(!arena.manager.has_threat(priest, true));

        // Existing references still take the threat.
        arena.hit(priest, 10.0);
        arena.manager.add_threat(&arena.world, silent);
        assert!((arena.manager.get_threat(priest, false) - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_pet_links_master() {
        let mut arena = Arena::new();
        let hunter = arena.player("Hunter", RANGED);
        let pet = arena
            .world
            .add_combatant(Combatant::pet("Wolf", hunter).at(MELEE, 0.0, 0.0));

        arena.hit(pet, 80.0);

        assert_eq!(arena.manager.get_threat(pet, false), 80.0);
        assert!(arena.manager.has_threat(hunter, false));
        assert_eq!(arena.manager.get_threat(hunter, false), 0.0);
    }

    #[test]
    fn test_unreachable_target_starts_offline() {
        let mut arena = Arena::new();
        let mut flyer = Combatant::player("Flyer");
        flyer.unreachable = true;
        let flyer = arena.world.add_combatant(flyer);

        arena.hit(flyer, 10.0);

        assert!(!arena.manager.has_threat(flyer, false));
        assert!(arena.manager.has_threat(flyer, true));
        assert_eq!(arena.manager.get_threat(flyer, true), 10.0);
        assert!(!arena.manager.reference(flyer).unwrap().is_online());
    }

    #[test]
    fn test_modify_threat_percent() {
        let mut arena = Arena::new();
        let hero = arena.player("Hero", MELEE);
        arena.hit(hero, 200.0);

        arena.manager.modify_threat_percent(&arena.world, hero, -50);
        assert!((arena.manager.get_threat(hero, false) - 100.0).abs() < 0.001);

        arena.manager.modify_threat_percent(&arena.world, hero, -150);
        assert!(!arena.manager.has_threat(hero, true));
        assert_eq!(arena.manager.sink().removals(), vec![hero]);
    }

    #[test]
    fn test_modify_all_minus_100_empties() {
        let mut arena = Arena::new();
        for (i, name) in ["A", "B", "C"].into_iter().enumerate() {
            let id = arena.player(name, MELEE);
            arena.hit(id, 10.0 * (i + 1) as f32);
        }
        arena.select();
        assert!(arena.manager.current_victim().is_some());

        arena.manager.modify_all_threat_percent(&arena.world, -100);

        assert!(arena.manager.is_threat_list_empty());
        assert_eq!(arena.manager.current_victim(), None);
        assert!(arena.manager.is_dirty());
    }

    #[test]
    fn test_hostile_target_hysteresis() {
        let mut arena = Arena::new();
        let tank = arena.player("Tank", MELEE);
        let mage = arena.player("Mage", RANGED);

        arena.hit(tank, 100.0);
        assert_eq!(arena.select(), Some(tank));

        arena.hit(mage, 120.0);
        assert_eq!(arena.select(), Some(tank));

        arena.hit(mage, 15.0);
        assert_eq!(arena.select(), Some(mage));
        assert_eq!(arena.manager.sink().victim_changes(), vec![tank, mage]);
    }

    #[test]
    fn test_victim_notification_only_on_change() {
        let mut arena = Arena::new();
        let tank = arena.player("Tank", MELEE);
        arena.hit(tank, 100.0);

        arena.select();
        arena.select();
        arena.select();

        assert_eq!(arena.manager.sink().victim_changes(), vec![tank]);
    }

    #[test]
    fn test_threat_change_dirty_rules() {
        let mut arena = Arena::new();
        let tank = arena.player("Tank", MELEE);
        let rogue = arena.player("Rogue", MELEE);
        arena.hit(tank, 100.0);
        arena.hit(rogue, 50.0);
        arena.select();
        assert!(!arena.manager.is_dirty());

        // Victim gaining threat cannot cost it the top spot.
        arena.hit(tank, 10.0);
        assert!(!arena.manager.is_dirty());

        arena.hit(rogue, 10.0);
        assert!(arena.manager.is_dirty());
        arena.select();

        arena
            .manager
            .modify_threat_percent(&arena.world, tank, -10);
        assert!(arena.manager.is_dirty());
    }

    #[test]
    fn test_victim_going_offline_clears_it() {
        let mut arena = Arena::new();
        let tank = arena.player("Tank", MELEE);
        let rogue = arena.player("Rogue", MELEE);
        arena.hit(tank, 100.0);
        arena.hit(rogue, 50.0);
        assert_eq!(arena.select(), Some(tank));

        arena.world.get_combatant_mut(tank).unwrap().unreachable = true;
        arena.manager.update_online_status(&arena.world, tank);

        assert_eq!(arena.manager.current_victim(), None);
        assert!(arena.manager.is_dirty());
        assert!(arena.manager.has_threat(tank, true));
        assert!(!arena.manager.has_threat(tank, false));
        assert_eq!(arena.manager.sink().removals(), vec![tank]);
        assert_eq!(arena.select(), Some(rogue));
    }

    #[test]
    fn test_coming_back_online() {
        let mut arena = Arena::new();
        let tank = arena.player("Tank", MELEE);
        let rogue = arena.player("Rogue", MELEE);
        arena.hit(tank, 100.0);
        arena.hit(rogue, 300.0);
        arena.world.get_combatant_mut(rogue).unwrap().unreachable = true;
        arena.manager.update_all_online_status(&arena.world);
        assert_eq!(arena.select(), Some(tank));
        assert!(!arena.manager.is_dirty());

        arena.world.get_combatant_mut(rogue).unwrap().unreachable = false;
        arena.manager.update_all_online_status(&arena.world);

        assert!(arena.manager.has_threat(rogue, false));
        assert!(arena.manager.is_dirty());
        assert_eq!(arena.select(), Some(rogue));
    }

    #[test]
    fn test_remove_reference() {
        let mut arena = Arena::new();
        let tank = arena.player("Tank", MELEE);
        arena.hit(tank, 100.0);
        arena.select();

        arena.manager.remove_reference(&arena.world, tank);

        assert!(!arena.manager.has_threat(tank, true));
        assert_eq!(arena.manager.current_victim(), None);
        assert_eq!(arena.select(), None);
    }

    #[test]
    fn test_taunt_update_ranks_most_recent_highest() {
        let mut arena = Arena::new();
        let owner = arena.owner;
        let dps = arena.player("Dps", MELEE);
        let first = arena.player("First", MELEE);
        let second = arena.player("Second", MELEE);
        arena.hit(dps, 1000.0);
        arena.hit(first, 1.0);
        arena.hit(second, 1.0);
        assert_eq!(arena.select(), Some(dps));

        arena.owner_mut().auras.apply(AuraKind::Taunt, first);
        arena.owner_mut().auras.apply(AuraKind::Taunt, second);
        arena.manager.taunt_update(&arena.world);

        let taunt = |id| arena.manager.reference(id).unwrap().taunt_state();
        assert_eq!(taunt(first), TauntState::Taunted(1));
        assert_eq!(taunt(second), TauntState::Taunted(2));
        assert_eq!(taunt(dps), TauntState::None);
        assert_eq!(arena.select(), Some(second));

        arena.owner_mut().auras.remove(AuraKind::Taunt, second);
        arena
            .world
            .get_combatant_mut(dps)
            .unwrap()
            .auras
            .apply(AuraKind::Detaunt, owner);
        arena.manager.taunt_update(&arena.world);

        assert_eq!(
            arena.manager.reference(dps).unwrap().taunt_state(),
            TauntState::Detaunted
        );
        assert_eq!(arena.select(), Some(first));
    }

    #[test]
    fn test_fixate_is_sticky_and_exclusive() {
        let mut arena = Arena::new();
        let a = arena.player("A", MELEE);
        let b = arena.player("B", MELEE);
        let tank = arena.player("Tank", MELEE);
        arena.hit(a, 10.0);
        arena.hit(b, 10.0);
        arena.hit(tank, 10.0);

        arena.manager.fixate_target(&arena.world, a);
        assert_eq!(
            arena.manager.reference(a).unwrap().taunt_state(),
            TauntState::Fixated
        );

        // A taunt does not override fixation.
        arena.owner_mut().auras.apply(AuraKind::Taunt, tank);
        arena.manager.taunt_update(&arena.world);
        assert_eq!(arena.select(), Some(a));

        arena.manager.fixate_target(&arena.world, b);
        assert_eq!(
            arena.manager.reference(a).unwrap().taunt_state(),
            TauntState::None
        );
        assert_eq!(
            arena.manager.reference(b).unwrap().taunt_state(),
            TauntState::Fixated
        );
        assert_eq!(
            arena.manager.reference(tank).unwrap().taunt_state(),
            TauntState::Taunted(1)
        );
        assert_eq!(arena.select(), Some(b));
    }

    #[test]
    fn test_suppression_toggle_clears_on_threat() {
        let mut arena = Arena::new();
        let rogue = arena.player("Rogue", MELEE);
        let tank = arena.player("Tank", MELEE);
        arena.hit(rogue, 500.0);
        arena.hit(tank, 10.0);
        assert_eq!(arena.select(), Some(rogue));

        arena.manager.set_target_suppressed(&arena.world, rogue);
        let suppressed = arena.manager.reference(rogue).unwrap();
        assert_eq!(suppressed.hostile_state(), HostileState::Suppressed);
        assert!(suppressed.has_suppressibility_toggle());
        assert_eq!(arena.select(), Some(tank));

        arena.hit(rogue, 1.0);
        assert_eq!(
            arena.manager.reference(rogue).unwrap().hostile_state(),
            HostileState::Normal
        );
        assert_eq!(arena.select(), Some(rogue));
    }

    #[test]
    fn test_suppression_change_releases_others() {
        let mut arena = Arena::new();
        let a = arena.player("A", MELEE);
        let b = arena.player("B", MELEE);
        arena.hit(a, 10.0);
        arena.hit(b, 10.0);
        arena.world.get_combatant_mut(b).unwrap().crowd_controlled = true;

        arena.manager.set_target_suppressed(&arena.world, a);
        arena.manager.set_target_suppressed(&arena.world, b);
        // B is still crowd controlled, so A is released while B stays.
        assert_eq!(
            arena.manager.reference(a).unwrap().hostile_state(),
            HostileState::Normal
        );
        assert_eq!(
            arena.manager.reference(b).unwrap().hostile_state(),
            HostileState::Suppressed
        );
    }

    #[test]
    fn test_distance_sweep_removes_from_both_sets() {
        let mut arena = Arena::new();
        let near = arena.player("Near", MELEE);
        let far = arena.player("Far", 40.0);
        let mut flyer = Combatant::player("Flyer").at(0.0, 40.0, 0.0);
        flyer.unreachable = true;
        let flyer = arena.world.add_combatant(flyer);
        arena.hit(near, 1.0);
        arena.hit(far, 10_000.0);
        arena.hit(flyer, 10_000.0);
        assert_eq!(arena.select(), Some(far));

        arena.world.move_to(far, 100.0, 0.0, 0.0);
        arena.world.move_to(flyer, 0.0, 100.0, 0.0);
        arena.manager.delete_out_of_range_references(&arena.world);

        assert!(!arena.manager.has_threat(far, true));
        assert!(!arena.manager.has_threat(flyer, true));
        assert!(arena.manager.has_threat(near, false));
        assert_eq!(arena.manager.current_victim(), None);
        assert_eq!(arena.select(), Some(near));
    }

    #[test]
    fn test_client_update_timer() {
        let mut arena = Arena::new();
        assert!(!arena.manager.is_need_update_to_client(5_000));

        let hero = arena.player("Hero", MELEE);
        arena.hit(hero, 10.0);

        assert!(!arena.manager.is_need_update_to_client(1_500));
        assert!(arena.manager.is_need_update_to_client(500));
        assert!(!arena.manager.is_need_update_to_client(1_999));
        assert!(arena.manager.send_threat_update(1));

        match arena.manager.sink().messages.last() {
            Some(SinkMessage::ThreatList(snapshot)) => {
                assert_eq!(snapshot.owner, arena.owner);
                assert_eq!(snapshot.entries.len(), 1);
                assert_eq!(snapshot.entries[0].target, hero);
            }
            other => panic!("expected threat list, got {other:?}"),
        }

        // Empty list: never due, even with the timer long expired.
        arena.manager.modify_all_threat_percent(&arena.world, -100);
        assert!(!arena.manager.is_need_update_to_client(60_000));
    }

    #[test]
    fn test_clear_all_threat() {
        let mut arena = Arena::new();
        let hero = arena.player("Hero", MELEE);
        arena.hit(hero, 10.0);
        arena.select();

        arena.manager.clear_all_threat();

        assert!(arena.manager.is_threat_list_empty());
        assert_eq!(arena.manager.current_victim(), None);
        assert_eq!(
            arena.manager.sink().messages.last(),
            Some(&SinkMessage::Cleared { owner: arena.owner })
        );

        // Nothing to announce the second time.
        let before = arena.manager.sink().messages.len();
        arena.manager.clear_all_threat();
        assert_eq!(arena.manager.sink().messages.len(), before);
    }

    #[test]
    fn test_fadeout_through_manager() {
        let mut arena = Arena::new();
        let priest = arena.player("Priest", RANGED);
        arena.hit(priest, 100.0);

        arena
            .manager
            .set_fadeout_threat_reduction(&arena.world, priest, -60.0);
        assert!((arena.manager.get_threat(priest, false) - 40.0).abs() < 0.001);

        arena.hit(priest, 10.0);
        arena
            .manager
            .reset_fadeout_threat_reduction(&arena.world, priest);
        assert!((arena.manager.get_threat(priest, false) - 110.0).abs() < 0.001);
    }

    #[test]
    fn test_set_current_victim_by_target() {
        let mut arena = Arena::new();
        let a = arena.player("A", MELEE);
        let b = arena.player("B", MELEE);
        arena.hit(a, 100.0);
        arena.hit(b, 10.0);
        assert_eq!(arena.select(), Some(a));

        arena.manager.set_current_victim_by_target(b);
        assert_eq!(arena.manager.current_victim(), Some(b));

        arena.manager.set_current_victim_by_target(EntityId::new());
        assert_eq!(arena.manager.current_victim(), Some(b));
        assert_eq!(arena.manager.sink().victim_changes(), vec![a, b]);
    }

    #[test]
    fn test_accessible_flag() {
        let mut arena = Arena::new();
        let hero = arena.player("Hero", MELEE);
        arena.hit(hero, 10.0);

        arena.manager.set_accessible(&arena.world, hero, false);

        let reference = arena.manager.reference(hero).unwrap();
        assert!(!reference.is_accessible());
        assert!(reference.is_online());
    }

    #[test]
    fn test_player_owner_prefers_players_over_pets() {
        let mut world = WorldState::new();
        let owner = world.add_combatant(Combatant::player("Duelist"));
        let wolf = world
            .add_combatant(Combatant::new("Wolf", CombatantKind::Pet).at(MELEE, 0.0, 0.0));
        let rogue = world.add_combatant(Combatant::player("Rogue").at(RANGED, 0.0, 0.0));
        let mut manager = ThreatManager::new(owner, ThreatConfig::default(), RecordingSink::new());

        manager.add_threat_directly(&world, wolf, 500.0, false);
        assert_eq!(manager.get_hostile_target(&world), Some(wolf));

        manager.add_threat_directly(&world, rogue, 10.0, false);
        assert_eq!(manager.threat_list()[0].target_id(), wolf);

        assert_eq!(manager.get_hostile_target(&world), Some(rogue));
        assert_eq!(manager.threat_list()[0].target_id(), rogue);
        assert_eq!(manager.sink().victim_changes(), vec![wolf, rogue]);
    }

    #[test]
    fn test_try_new_rejects_inverted_ratios() {
        let owner = EntityId::new();
        let config = ThreatConfig {
            melee_switch_ratio: 1.5,
            ranged_switch_ratio: 1.2,
            ..ThreatConfig::default()
        };

        let result = ThreatManager::try_new(owner, config, NullSink);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "ranged_switch_ratio",
                ..
            })
        ));

        let manager = ThreatManager::try_new(owner, ThreatConfig::default(), NullSink).unwrap();
        assert_eq!(manager.owner(), owner);
    }
}
