//! # Threat Core
//!
//! Threat tracking and target selection for combat-capable actors. Each actor
//! owns a [`ThreatManager`] that records how much threat every attacker has
//! built up, keeps those attackers in priority order, and picks who to fight.
//!
//! ## Core Components
//!
//! - **calculator**: Raw contribution to adjusted threat
//! - **reference**: One attacker's standing and its status flags
//! - **container**: Ordered threat sets and victim selection
//! - **manager**: The per-actor aggregate and its event dispatcher
//! - **world** / **sink**: Queries into, and notifications out to, the rest of the game
//!
//! ## Design Philosophy
//!
//! - **Synchronous**: Every effect of a call is visible before it returns
//! - **Handle-based**: References name their target by [`EntityId`](combat_rules::EntityId) and resolve it lazily
//! - **Hysteresis**: Victims only change on a decisive lead, a taunt, or a reach change

pub mod calculator;
pub mod config;
pub mod container;
pub mod error;
pub mod events;
pub mod manager;
pub mod reference;
pub mod sink;
pub mod world;

pub use calculator::*;
pub use config::*;
pub use container::*;
pub use error::*;
pub use events::*;
pub use manager::*;
pub use reference::*;
pub use sink::*;
pub use world::*;
