//! # Combat Rules
//!
//! The data side of combat: who the combatants are, which spell schools and
//! auras exist, and the world state that holds them. This crate carries no
//! threat logic; the threat engine only reads what is defined here.

pub mod entities;
pub mod mechanics;
pub mod world_state;

pub use entities::*;
pub use mechanics::*;
pub use world_state::*;
