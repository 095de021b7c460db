//! Game mechanics: spell schools, spell contexts and auras.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

use crate::entities::EntityId;

/// Magic schools a hit can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellSchool {
    Physical,
    Holy,
    Fire,
    Nature,
    Frost,
    Shadow,
    Arcane,
}

impl SpellSchool {
    pub const ALL: [SpellSchool; 7] = [
        SpellSchool::Physical,
        SpellSchool::Holy,
        SpellSchool::Fire,
        SpellSchool::Nature,
        SpellSchool::Frost,
        SpellSchool::Shadow,
        SpellSchool::Arcane,
    ];

    /// The single-bit mask for this school.
    pub fn mask(self) -> SchoolMask {
        let bit = match self {
            SpellSchool::Physical => 0,
            SpellSchool::Holy => 1,
            SpellSchool::Fire => 2,
            SpellSchool::Nature => 3,
            SpellSchool::Frost => 4,
            SpellSchool::Shadow => 5,
            SpellSchool::Arcane => 6,
        };
        SchoolMask(1 << bit)
    }
}

/// A set of spell schools, one bit per school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SchoolMask(pub u32);

impl SchoolMask {
    pub const NONE: SchoolMask = SchoolMask(0);
    pub const PHYSICAL: SchoolMask = SchoolMask(1 << 0);
    pub const HOLY: SchoolMask = SchoolMask(1 << 1);
    pub const FIRE: SchoolMask = SchoolMask(1 << 2);
    pub const NATURE: SchoolMask = SchoolMask(1 << 3);
    pub const FROST: SchoolMask = SchoolMask(1 << 4);
    pub const SHADOW: SchoolMask = SchoolMask(1 << 5);
    pub const ARCANE: SchoolMask = SchoolMask(1 << 6);
    pub const ALL: SchoolMask = SchoolMask(0x7f);

    /// Check whether the two masks share at least one school.
    pub fn intersects(self, other: SchoolMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Check whether every school of `other` is in this mask.
    pub fn contains(self, other: SchoolMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// The lowest school present in the mask, if any.
    pub fn first_school(self) -> Option<SpellSchool> {
        SpellSchool::ALL
            .into_iter()
            .find(|school| self.contains(school.mask()))
    }
}

impl BitOr for SchoolMask {
    type Output = SchoolMask;

    fn bitor(self, rhs: SchoolMask) -> SchoolMask {
        SchoolMask(self.0 | rhs.0)
    }
}

impl From<SpellSchool> for SchoolMask {
    fn from(school: SpellSchool) -> Self {
        school.mask()
    }
}

/// Numeric spell identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpellId(pub u32);

/// The spell responsible for a threat contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatSpell {
    pub id: SpellId,
    /// Spell carries the "no threat" attribute: it never opens a new entry.
    pub no_threat: bool,
}

impl ThreatSpell {
    pub fn new(id: u32) -> Self {
        Self {
            id: SpellId(id),
            no_threat: false,
        }
    }

    /// Mark the spell as one that must not create new threat entries.
    pub fn with_no_threat(mut self) -> Self {
        self.no_threat = true;
        self
    }
}

/// Auras the threat engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuraKind {
    /// Forces the bearer to attack the caster.
    Taunt,
    /// Placed on an attacker; the caster deprioritizes it.
    Detaunt,
}

/// An aura currently applied to a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAura {
    pub kind: AuraKind,
    pub caster: EntityId,
}
