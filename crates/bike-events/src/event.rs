//! Decision Log Types
//!
//! One record per decision an agent hands to the orchestrator. Written as
//! JSONL so a run can be replayed and compared across seeds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ballot::RankBallot;
use crate::ids::{AgentId, LootBoxId};

/// A single logged decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEvent {
    /// Unique identifier (e.g., "dec_00000042")
    pub event_id: String,
    /// Round the decision was taken in
    pub round: u32,
    /// Agent that took the decision (or ran the tally)
    pub agent: AgentId,
    #[serde(flatten)]
    pub kind: DecisionKind,
}

/// What was decided
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum DecisionKind {
    /// Destination this agent proposes
    DirectionProposed { loot_box: LootBoxId, regime: String },
    /// Dense-rank ballot over the proposed destinations
    DirectionBallot { ranks: RankBallot<LootBoxId> },
    /// Destination picked by tallying every direction ballot
    DirectionChosen { loot_box: LootBoxId, points: u64 },
    /// Normalised loot split vote
    AllocationVote {
        strategy: String,
        weights: BTreeMap<AgentId, f64>,
    },
    /// Rank-position ballot over the leader shortlist
    LeaderBallot { ranks: RankBallot<AgentId> },
    /// Accept/reject on the Borda winner
    LeaderConfirmation { candidate: AgentId, accept: bool },
    /// Full election outcome as seen by the tally runner
    ElectionResult {
        shortlist: Vec<AgentId>,
        points: Vec<u64>,
        candidate: AgentId,
        accepts: usize,
        occupants: usize,
        elected: Option<AgentId>,
    },
}

impl DecisionEvent {
    pub fn new(event_id: impl Into<String>, round: u32, agent: AgentId, kind: DecisionKind) -> Self {
        Self {
            event_id: event_id.into(),
            round,
            agent,
            kind,
        }
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates a decision event ID with the given sequence number.
pub fn generate_decision_id(sequence: u64) -> String {
    format!("dec_{:08}", sequence)
}
