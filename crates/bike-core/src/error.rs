//! Decision Errors
//!
//! Contract violations by the environment collaborator. Any of these aborts the
//! affected agent's decision for the round; none of them is retried.

use bike_events::{AgentId, LootBoxId};
use thiserror::Error;

/// Errors raised by the decision core.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// A scoring or voting stage was handed nothing to work on
    #[error("no candidates reached the {stage} stage")]
    EmptyCandidates { stage: &'static str },
    /// A proposal referenced a loot box missing from the snapshot
    #[error("loot box {0} is not in the round snapshot")]
    UnknownLootBox(LootBoxId),
    /// The agent is not riding any bike in the snapshot
    #[error("agent {0} is not riding any bike in the round snapshot")]
    NotOnBike(AgentId),
    /// The snapshot failed validation
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
    /// A ballot did not cover the candidate set exactly once
    #[error("malformed ballot from {voter}: {reason}")]
    MalformedBallot { voter: AgentId, reason: String },
    /// An occupant never submitted a required ballot
    #[error("occupant {0} did not submit a ballot")]
    MissingBallot(AgentId),
    /// A score came out NaN or infinite
    #[error("non-finite score in the {stage} stage")]
    NonFiniteScore { stage: &'static str },
}

/// Result alias used throughout the decision core.
pub type DecisionResult<T> = Result<T, DecisionError>;
