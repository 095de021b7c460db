//! Priority states carried by a reference.

use serde::{Deserialize, Serialize};

/// Whether a reference competes normally or is pushed down the list.
///
/// Ordered by priority: `Normal` outranks `Suppressed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum HostileState {
    Suppressed,
    #[default]
    Normal,
}

/// Taunt override on a reference. Ordered by priority, lowest first: a
/// detaunted attacker sinks below untouched ones.
///
/// `Taunted(n)` ranks concurrent taunts: the most recently applied one has the
/// highest `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum TauntState {
    Detaunted,
    #[default]
    None,
    Taunted(u32),
    Fixated,
}
