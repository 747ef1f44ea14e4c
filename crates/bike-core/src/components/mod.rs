//! Agent-owned state: the reputation model and the running counters.

pub mod agent;
pub mod reputation;

pub use agent::AgentState;
pub use reputation::{PeerObservation, ReputationRecord, ReputationTracker};
