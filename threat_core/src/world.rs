//! Queries the threat engine makes against the surrounding actor, aura and
//! spatial systems.
//!
//! Every method is a side-effect-free lookup. Unknown ids must degrade to a
//! neutral answer (`false`, `None`, unchanged threat) rather than fail.

use combat_rules::{AuraKind, EntityId, SchoolMask, SpellId, WorldState};

/// Read-only view of the world, as seen by a threat manager.
pub trait CombatWorld {
    /// The handle resolves to a live actor object.
    fn exists(&self, id: EntityId) -> bool;
    fn is_alive(&self, id: EntityId) -> bool;
    fn is_player(&self, id: EntityId) -> bool;
    fn is_game_master(&self, id: EntityId) -> bool;

    fn generates_no_threat(&self, id: EntityId) -> bool;
    fn is_support_threat_only(&self, id: EntityId) -> bool;
    fn ignores_misdirection(&self, id: EntityId) -> bool;
    /// Attacker is restricted to targets in melee reach.
    fn ignores_ranged_targets(&self, id: EntityId) -> bool;

    fn can_attack(&self, attacker: EntityId, target: EntityId) -> bool;
    fn can_reach_with_melee(&self, attacker: EntityId, target: EntityId) -> bool;
    /// `owner` currently cannot engage `target` at all.
    fn is_offline_target(&self, owner: EntityId, target: EntityId) -> bool;
    /// `owner` must treat `target` as suppressed (e.g. crowd controlled).
    fn is_suppressed_target(&self, owner: EntityId, target: EntityId) -> bool;
    /// Reach-adjusted distance between two actors.
    fn combat_distance(&self, a: EntityId, b: EntityId) -> Option<f32>;

    fn apply_spell_threat_mod(&self, id: EntityId, spell: SpellId, threat: f32) -> f32;
    fn critical_threat_multiplier(&self, id: EntityId, mask: SchoolMask) -> f32;
    fn apply_total_threat_modifier(&self, id: EntityId, threat: f32, mask: SchoolMask) -> f32;

    fn threat_redirection_target(&self, id: EntityId) -> Option<EntityId>;
    fn master(&self, id: EntityId) -> Option<EntityId>;
    fn propagates_threat_to_master(&self, id: EntityId) -> bool;
    /// `helper` may be pulled into a fight against `enemy`.
    fn can_join_in_attacking(&self, helper: EntityId, enemy: EntityId) -> bool;

    /// Casters of taunt effects on `owner`, oldest first.
    fn taunt_casters(&self, owner: EntityId) -> Vec<EntityId>;
    /// `target` carries a detaunt effect cast by `caster`.
    fn has_detaunt_from(&self, target: EntityId, caster: EntityId) -> bool;
}

impl CombatWorld for WorldState {
    fn exists(&self, id: EntityId) -> bool {
        self.get_combatant(id).is_some()
    }

    fn is_alive(&self, id: EntityId) -> bool {
        self.get_combatant(id).is_some_and(|c| c.is_alive())
    }

    fn is_player(&self, id: EntityId) -> bool {
        self.get_combatant(id).is_some_and(|c| c.is_player())
    }

    fn is_game_master(&self, id: EntityId) -> bool {
        self.get_combatant(id).is_some_and(|c| c.is_game_master())
    }

    fn generates_no_threat(&self, id: EntityId) -> bool {
        self.get_combatant(id).is_some_and(|c| c.no_threat)
    }

    fn is_support_threat_only(&self, id: EntityId) -> bool {
        self.get_combatant(id).is_some_and(|c| c.support_threat_only)
    }

    fn ignores_misdirection(&self, id: EntityId) -> bool {
        self.get_combatant(id).is_some_and(|c| c.ignores_misdirection)
    }

    fn ignores_ranged_targets(&self, id: EntityId) -> bool {
        self.get_combatant(id).is_some_and(|c| c.ignores_ranged_targets)
    }

    fn can_attack(&self, attacker: EntityId, target: EntityId) -> bool {
        if attacker == target || !self.is_alive(attacker) {
            return false;
        }
        self.get_combatant(target)
            .is_some_and(|c| c.is_alive() && c.attackable && !c.unreachable)
    }

    fn can_reach_with_melee(&self, attacker: EntityId, target: EntityId) -> bool {
        self.in_melee_range(attacker, target)
    }

    fn is_offline_target(&self, owner: EntityId, target: EntityId) -> bool {
        if !self.exists(owner) {
            return true;
        }
        match self.get_combatant(target) {
            Some(c) => !c.is_alive() || c.unreachable || !c.attackable || c.is_game_master(),
            None => true,
        }
    }

    fn is_suppressed_target(&self, _owner: EntityId, target: EntityId) -> bool {
        self.get_combatant(target).is_some_and(|c| c.crowd_controlled)
    }

    fn combat_distance(&self, a: EntityId, b: EntityId) -> Option<f32> {
        WorldState::combat_distance(self, a, b)
    }

    fn apply_spell_threat_mod(&self, id: EntityId, spell: SpellId, threat: f32) -> f32 {
        match self.get_combatant(id) {
            Some(c) => c.threat_modifiers.apply_spell(spell, threat),
            None => threat,
        }
    }

    fn critical_threat_multiplier(&self, id: EntityId, mask: SchoolMask) -> f32 {
        self.get_combatant(id)
            .map(|c| c.threat_modifiers.critical_multiplier(mask))
            .unwrap_or(1.0)
    }

    fn apply_total_threat_modifier(&self, id: EntityId, threat: f32, mask: SchoolMask) -> f32 {
        match self.get_combatant(id) {
            Some(c) => c.threat_modifiers.apply_total(threat, mask),
            None => threat,
        }
    }

    fn threat_redirection_target(&self, id: EntityId) -> Option<EntityId> {
        self.get_combatant(id).and_then(|c| c.redirect_threat_to)
    }

    fn master(&self, id: EntityId) -> Option<EntityId> {
        self.get_combatant(id).and_then(|c| c.master)
    }

    fn propagates_threat_to_master(&self, id: EntityId) -> bool {
        self.get_combatant(id)
            .is_some_and(|c| c.propagates_threat_to_master)
    }

    fn can_join_in_attacking(&self, helper: EntityId, enemy: EntityId) -> bool {
        let Some(helper) = self.get_combatant(helper) else {
            return false;
        };
        helper.is_alive() && !helper.is_game_master() && self.can_attack(helper.id, enemy)
    }

    fn taunt_casters(&self, owner: EntityId) -> Vec<EntityId> {
        self.get_combatant(owner)
            .map(|c| c.auras.casters(AuraKind::Taunt).collect())
            .unwrap_or_default()
    }

    fn has_detaunt_from(&self, target: EntityId, caster: EntityId) -> bool {
        self.get_combatant(target)
            .is_some_and(|c| c.auras.has_with_caster(AuraKind::Detaunt, caster))
    }
}
