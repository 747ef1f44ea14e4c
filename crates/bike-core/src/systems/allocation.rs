//! Allocation Scoring
//!
//! Produces this agent's normalised vote for splitting the bike's loot among
//! its current riders.

use std::collections::{BTreeMap, HashSet};

use bike_events::{AgentId, AllocationVote};
use tracing::{debug, warn};

use crate::components::agent::AgentState;
use crate::components::reputation::ReputationTracker;
use crate::error::{DecisionError, DecisionResult};

/// How peers are scored for the split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStrategy {
    /// Energy is scarce: score peers by remaining energy only
    SmallestFirst,
    /// Affinity, merit, recent effort, prior reward and need combined
    Ration,
    /// Everyone gets 1/N
    EqualSplit,
}

impl AllocationStrategy {
    /// Smallest-First when a loot event costs more on average than the energy
    /// the agent has left, Ration otherwise.
    pub fn choose(state: &AgentState) -> Self {
        if state.is_energy_scarce() {
            AllocationStrategy::SmallestFirst
        } else {
            AllocationStrategy::Ration
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::SmallestFirst => "smallest_first",
            AllocationStrategy::Ration => "ration",
            AllocationStrategy::EqualSplit => "equal_split",
        }
    }
}

/// A normalised vote plus how it was reached
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub strategy: AllocationStrategy,
    pub vote: AllocationVote,
    /// Raw scores summed to zero and the vote fell back to 1/N
    pub equal_split_fallback: bool,
}

/// Scores every occupant (self included) and normalises the scores.
///
/// A raw total of exactly zero gives the equal 1/N split. Otherwise negative
/// scores are floored at zero before normalising so every weight stays in
/// [0, 1]. Duplicate occupant ids are counted once.
pub fn allocation_vote(
    strategy: AllocationStrategy,
    occupants: &[AgentId],
    reputation: &ReputationTracker,
) -> DecisionResult<AllocationOutcome> {
    let mut seen = HashSet::new();
    let occupants: Vec<AgentId> = occupants.iter().copied().filter(|id| seen.insert(*id)).collect();
    if occupants.is_empty() {
        return Err(DecisionError::EmptyCandidates { stage: "allocation" });
    }

    let raw_scores: Vec<(AgentId, f64)> = occupants
        .iter()
        .map(|id| {
            let record = reputation.get(*id);
            let raw = match strategy {
                AllocationStrategy::SmallestFirst => record.energy_remain,
                AllocationStrategy::Ration => record.ration_score(),
                AllocationStrategy::EqualSplit => 1.0,
            };
            (*id, raw)
        })
        .collect();

    let raw_total: f64 = raw_scores.iter().map(|(_, s)| s).sum();
    if !raw_total.is_finite() {
        return Err(DecisionError::NonFiniteScore { stage: "allocation" });
    }

    let scores: Vec<(AgentId, f64)> = raw_scores.into_iter().map(|(id, s)| (id, s.max(0.0))).collect();
    let total: f64 = scores.iter().map(|(_, s)| s).sum();

    // Floored total is zero when every raw score is zero or negative
    if raw_total == 0.0 || total == 0.0 {
        warn!(
            observer = %reputation.observer(),
            strategy = strategy.as_str(),
            raw_total,
            "allocation scores sum to zero, splitting equally"
        );
        return Ok(AllocationOutcome {
            strategy,
            vote: AllocationVote::equal_split(&occupants),
            equal_split_fallback: true,
        });
    }

    let weights: BTreeMap<AgentId, f64> = scores.into_iter().map(|(id, s)| (id, s / total)).collect();
    debug!(
        observer = %reputation.observer(),
        strategy = strategy.as_str(),
        occupants = weights.len(),
        "allocation vote cast"
    );

    Ok(AllocationOutcome {
        strategy,
        vote: AllocationVote::from_weights(weights),
        equal_split_fallback: false,
    })
}
