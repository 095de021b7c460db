//! Raw contribution to adjusted threat.

use combat_rules::{EntityId, SchoolMask, ThreatSpell};

use crate::world::CombatWorld;

/// One threat contribution made by `target` against a threat list owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatContribution {
    /// The actor generating the threat.
    pub target: EntityId,
    pub amount: f32,
    pub critical: bool,
    pub school: SchoolMask,
    pub spell: Option<ThreatSpell>,
    /// Healing or buffing someone else, rather than attacking.
    pub assist: bool,
}

impl ThreatContribution {
    pub fn new(target: EntityId, amount: f32) -> Self {
        Self {
            target,
            amount,
            critical: false,
            school: SchoolMask::PHYSICAL,
            spell: None,
            assist: false,
        }
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn with_school(mut self, school: SchoolMask) -> Self {
        self.school = school;
        self
    }

    pub fn with_spell(mut self, spell: ThreatSpell) -> Self {
        self.spell = Some(spell);
        self
    }

    pub fn assist(mut self) -> Self {
        self.assist = true;
        self
    }

    /// The spell carries the "no threat" attribute.
    pub fn suppresses_new_entry(&self) -> bool {
        self.spell.is_some_and(|spell| spell.no_threat)
    }
}

/// Converts raw contributions into the threat actually recorded.
pub struct ThreatCalculator;

impl ThreatCalculator {
    /// Compute the threat `contribution` adds to `owner`'s list.
    ///
    /// # Steps
    ///
    /// 1. Zero for a zero amount, a no-threat target, a player owner, or a
    ///    non-assist contribution from a support-only target
    /// 2. With a spell: the target's spell modifier, then its critical
    ///    multiplier for the school if the hit was critical
    /// 3. The target's total threat modifier for the school
    pub fn compute<W: CombatWorld>(
        world: &W,
        owner: EntityId,
        contribution: &ThreatContribution,
    ) -> f32 {
        let target = contribution.target;
        let mut threat = contribution.amount;

        if threat == 0.0 {
            return 0.0;
        }
        if world.generates_no_threat(target) {
            return 0.0;
        }
        // Player-controlled owners keep zero-threat entries only.
        if world.is_player(owner) {
            return 0.0;
        }
        if !contribution.assist && world.is_support_threat_only(target) {
            return 0.0;
        }

        if let Some(spell) = contribution.spell {
            threat = world.apply_spell_threat_mod(target, spell.id, threat);
            if contribution.critical {
                threat *= world.critical_threat_multiplier(target, contribution.school);
            }
        }

        world.apply_total_threat_modifier(target, threat, contribution.school)
    }
}
