//! Deterministic progression core for the military career simulation.
//!
//! Pure state transitions over `contracts::GameState` plus the NPC roster:
//! clock translation, promotion, action resolution, random events, award
//! ceremonies, and pause coordination. Storage and transport live elsewhere.

pub mod actions;
pub mod ceremony;
pub mod clock;
pub mod config;
pub mod daily;
pub mod engine;
pub mod error;
pub mod events;
pub mod npc;
pub mod pause;
pub mod progression;
pub mod random;
mod world;

#[cfg(test)]
mod test_support;

pub use config::{load_config_from_env, CareerConfig, ConfigError};
pub use engine::{CareerEngine, SyncReport};
pub use error::{GameError, GameResult};
pub use npc::NpcRoster;
pub use world::{CareerWorld, CeremonyResolution, Resolution};
