//! Shared round-snapshot, ballot and decision-log types for the megabike game.
//!
//! This crate contains pure data structures with no decision logic.
//! It is a dependency for all other crates in the workspace.

pub mod ballot;
pub mod event;
pub mod geometry;
pub mod ids;
pub mod snapshot;
pub mod world;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export identifier types
pub use ids::{AgentId, BikeId, LootBoxId};

// Re-export world types
pub use world::{Colour, Coordinates, GridSize, LootBox, MegaBike, OccupantView};

// Re-export geometry types
pub use geometry::{Euclidean, Geometry};

// Re-export snapshot types
pub use snapshot::RoundSnapshot;

// Re-export ballot types
pub use ballot::{AcceptBallot, AllocationVote, RankBallot, ALLOCATION_EPSILON};

// Re-export decision log types
pub use event::{generate_decision_id, DecisionEvent, DecisionKind};
