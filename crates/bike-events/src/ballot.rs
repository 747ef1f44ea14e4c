//! Ballot Types
//!
//! Values the decision core hands back to the round orchestrator. They are
//! recomputed every round and never retained.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::AgentId;

/// Tolerance used when checking that allocation weights sum to one.
pub const ALLOCATION_EPSILON: f64 = 1e-9;

/// Rank-valued ballot: candidate -> integer rank.
pub type RankBallot<K> = BTreeMap<K, u32>;

/// Boolean ballot: candidate -> accept/reject.
pub type AcceptBallot<K> = BTreeMap<K, bool>;

/// Normalised vote over a bike's occupants for splitting collected loot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationVote {
    weights: BTreeMap<AgentId, f64>,
}

impl AllocationVote {
    /// Wraps already-normalised weights.
    pub fn from_weights(weights: BTreeMap<AgentId, f64>) -> Self {
        Self { weights }
    }

    /// Equal 1/N split over the given occupants.
    pub fn equal_split(occupants: &[AgentId]) -> Self {
        let share = if occupants.is_empty() {
            0.0
        } else {
            1.0 / occupants.len() as f64
        };
        Self {
            weights: occupants.iter().map(|id| (*id, share)).collect(),
        }
    }

    pub fn weight(&self, agent: AgentId) -> Option<f64> {
        self.weights.get(&agent).copied()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// True if every weight is in [0, 1] and they sum to 1 within `epsilon`.
    pub fn is_normalised(&self, epsilon: f64) -> bool {
        self.weights.values().all(|w| (0.0..=1.0 + epsilon).contains(w))
            && (self.total() - 1.0).abs() <= epsilon
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, &f64)> {
        self.weights.iter()
    }

    pub fn into_inner(self) -> BTreeMap<AgentId, f64> {
        self.weights
    }
}
