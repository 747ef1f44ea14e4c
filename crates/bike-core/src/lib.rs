//! Megabike Agent Decision Core
//!
//! Scoring, ranking and voting for agents sharing a megabike: destination
//! proposals and ballots, the loot split vote and the round-end leader
//! election, all driven by each agent's private reputation model of its peers.

pub mod biker;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod setup;
pub mod strategy;
pub mod systems;

pub use biker::Biker;
pub use components::*;
pub use config::{default_config_toml, ConfigError, DecisionConfig};
pub use error::{DecisionError, DecisionResult};
pub use strategy::{BikerStrategy, DecisionContext, NearestLootStrategy, ReputationStrategy};
