//! Victim selection over a sorted threat set.

use combat_rules::EntityId;

use super::ThreatSet;
use crate::config::ThreatConfig;
use crate::reference::ThreatReference;
use crate::world::CombatWorld;

impl ThreatSet {
    /// Pick the victim `attacker` should fight next. May be the current one.
    ///
    /// Expects the set to be sorted. Walks it front to back; with a current
    /// victim, a candidate only takes over by outranking it on taunt, player
    /// status, melee reach (when ranged targets are ignored) or hostile state,
    /// or by beating its threat by the melee ratio in melee reach or the
    /// ranged ratio anywhere. A candidate within the melee ratio ends the scan
    /// in favour of the current victim.
    ///
    /// # Panics
    ///
    /// If a reference in the set cannot resolve its target. Online references
    /// always have a live target; anything else is a broken invariant.
    pub fn select_next_victim<W: CombatWorld>(
        &self,
        world: &W,
        attacker: EntityId,
        current_victim: Option<EntityId>,
        config: &ThreatConfig,
    ) -> Option<EntityId> {
        let current = current_victim.and_then(|id| self.lookup(id));
        let suppress_ranged = world.ignores_ranged_targets(attacker);
        let current_in_melee = match current {
            Some(victim) if suppress_ranged => {
                world.can_reach_with_melee(attacker, victim.target_id())
            }
            _ => true,
        };

        for candidate in &self.refs {
            let target = resolve_or_abort(world, attacker, candidate);
            let in_melee = world.can_reach_with_melee(attacker, target);

            let Some(victim) = current else {
                if !suppress_ranged || in_melee {
                    return Some(target);
                }
                continue;
            };

            if candidate.target_id() == victim.target_id() {
                if suppress_ranged && !current_in_melee {
                    continue;
                }
                return Some(target);
            }

            // Taunt overrides reach and threat.
            if candidate.taunt_state() > victim.taunt_state() {
                return Some(target);
            }

            if is_live_player(world, target) && !is_live_player(world, victim.target_id()) {
                return Some(target);
            }

            if suppress_ranged {
                if !in_melee {
                    continue;
                }
                if !current_in_melee {
                    return Some(target);
                }
            }

            if candidate.hostile_state() > victim.hostile_state() {
                return Some(target);
            }

            // Sorted descending: nothing further down can clear the bar either.
            if candidate.threat() <= config.melee_switch_ratio * victim.threat() {
                return Some(victim.target_id());
            }

            if candidate.threat() > config.ranged_switch_ratio * victim.threat()
                || (candidate.threat() > config.melee_switch_ratio * victim.threat() && in_melee)
            {
                return Some(target);
            }
        }

        None
    }
}

fn is_live_player<W: CombatWorld>(world: &W, id: EntityId) -> bool {
    world.is_player(id) && world.is_alive(id)
}

fn resolve_or_abort<W: CombatWorld>(
    world: &W,
    attacker: EntityId,
    reference: &ThreatReference,
) -> EntityId {
    match reference.resolve_target(world) {
        Some(target) => target,
        None => {
            tracing::error!(
                attacker = %attacker,
                target_id = %reference.target_id(),
                "online threat reference has no resolvable target"
            );
            panic!(
                "threat reference for {} selected without a resolvable target",
                reference.target_id()
            );
        }
    }
}
