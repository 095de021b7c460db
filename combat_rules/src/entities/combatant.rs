//! Combatant definitions.

use serde::{Deserialize, Serialize};

use super::{AuraComponent, CombatantKind, EntityId, Position, ThreatModifiers};

/// Default combat reach radius for a humanoid-sized combatant.
pub const DEFAULT_COMBAT_REACH: f32 = 1.5;

/// Everything the threat engine needs to know about one combatant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: EntityId,
    pub name: String,
    pub kind: CombatantKind,

    pub current_hp: i32,

    pub position: Position,
    pub combat_reach: f32,

    /// Players only: game masters never enter threat lists.
    pub game_master: bool,
    /// Generates no threat at all.
    pub no_threat: bool,
    /// Only assist (healing/buff) actions generate threat.
    pub support_threat_only: bool,
    /// Threat this combatant receives is never redirected.
    pub ignores_misdirection: bool,
    /// Rooted or otherwise limited to targets in melee reach.
    pub ignores_ranged_targets: bool,
    /// Cannot be engaged right now (in flight, evading, out of phase...).
    pub unreachable: bool,
    /// Can be attacked at all.
    pub attackable: bool,
    /// Under crowd control that suppresses it as a target.
    pub crowd_controlled: bool,

    /// Controller of a pet or summon.
    pub master: Option<EntityId>,
    /// Pet passes threat links on to its master.
    pub propagates_threat_to_master: bool,
    /// Threat generated by this combatant goes to another actor instead.
    pub redirect_threat_to: Option<EntityId>,

    pub threat_modifiers: ThreatModifiers,
    pub auras: AuraComponent,
}

impl Combatant {
    /// Create a new combatant with the given name and kind.
    pub fn new(name: impl Into<String>, kind: CombatantKind) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            kind,
            current_hp: 100,
            position: Position::default(),
            combat_reach: DEFAULT_COMBAT_REACH,
            game_master: false,
            no_threat: false,
            support_threat_only: false,
            ignores_misdirection: false,
            ignores_ranged_targets: false,
            unreachable: false,
            attackable: true,
            crowd_controlled: false,
            master: None,
            propagates_threat_to_master: kind == CombatantKind::Pet,
            redirect_threat_to: None,
            threat_modifiers: ThreatModifiers::default(),
            auras: AuraComponent::default(),
        }
    }

    pub fn player(name: impl Into<String>) -> Self {
        Self::new(name, CombatantKind::Player)
    }

    pub fn creature(name: impl Into<String>) -> Self {
        Self::new(name, CombatantKind::Creature)
    }

    /// Create a pet controlled by `master`.
    pub fn pet(name: impl Into<String>, master: EntityId) -> Self {
        let mut pet = Self::new(name, CombatantKind::Pet);
        pet.master = Some(master);
        pet
    }

    /// Place the combatant at a position.
    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Position::new(x, y, z);
        self
    }

    /// Check if the combatant is alive.
    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn is_player(&self) -> bool {
        self.kind == CombatantKind::Player
    }

    /// A player flagged as game master.
    pub fn is_game_master(&self) -> bool {
        self.is_player() && self.game_master
    }
}
