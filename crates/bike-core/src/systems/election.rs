//! Leader Election
//!
//! Three stages, run once at round end:
//! 1. Shortlist: the top occupants by a coarse reputation score
//! 2. Borda count: every occupant ranks the shortlist, position p of k earns
//!    k - p points, ties go to the earliest-shortlisted candidate
//! 3. Confirmation: the Borda winner needs accepts from a strict majority of
//!    occupants, otherwise the round has no leader
//!
//! Given identical reputation and ballots every agent computes the same result,
//! so any occupant can act as tally runner.

use std::collections::HashSet;

use bike_events::{AcceptBallot, AgentId, RankBallot};
use tracing::{debug, info};

use crate::components::reputation::ReputationTracker;
use crate::config::ElectionConfig;
use crate::error::{DecisionError, DecisionResult};
use crate::systems::tally::{count_accepts, majority_confirms, BordaTally};

/// Final result of an election round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionOutcome {
    Elected(AgentId),
    NoLeader,
}

impl ElectionOutcome {
    pub fn leader(&self) -> Option<AgentId> {
        match self {
            ElectionOutcome::Elected(id) => Some(*id),
            ElectionOutcome::NoLeader => None,
        }
    }
}

/// Everything the tally runner learned while running the election.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionResult {
    /// Stage 1 shortlist, best first
    pub shortlist: Vec<AgentId>,
    /// Borda points per shortlisted candidate, same order
    pub points: Vec<u64>,
    /// Stage 2 winner put to the confirmation vote
    pub candidate: AgentId,
    pub accepts: usize,
    pub occupants: usize,
    pub outcome: ElectionOutcome,
}

/// An occupant taking part in the Borda and confirmation stages.
pub trait LeaderVoter {
    fn voter_id(&self) -> AgentId;

    /// Full ranking over the shortlist: candidate -> position, 1 = most preferred.
    fn leader_ballot(&self, shortlist: &[AgentId]) -> DecisionResult<RankBallot<AgentId>>;

    /// Accept or reject the Borda winner.
    fn confirm_leader(&self, candidate: AgentId, occupants: &[AgentId]) -> bool;
}

/// Runs the three-stage leader election.
#[derive(Debug, Clone)]
pub struct LeaderElector {
    shortlist_size: usize,
}

impl LeaderElector {
    pub fn new(config: &ElectionConfig) -> Self {
        Self {
            shortlist_size: config.shortlist_size.max(1),
        }
    }

    pub fn shortlist_size(&self) -> usize {
        self.shortlist_size
    }

    /// Stage 1: occupants ordered by shortlist score, best first, truncated.
    /// Equal scores keep occupant order.
    pub fn shortlist(&self, reputation: &ReputationTracker, occupants: &[AgentId]) -> DecisionResult<Vec<AgentId>> {
        let mut seen = HashSet::new();
        let mut scored: Vec<(AgentId, f64)> = occupants
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .map(|id| (id, reputation.get(id).shortlist_score()))
            .collect();

        if scored.is_empty() {
            return Err(DecisionError::EmptyCandidates {
                stage: "leader shortlist",
            });
        }
        if scored.iter().any(|(_, s)| !s.is_finite()) {
            return Err(DecisionError::NonFiniteScore {
                stage: "leader shortlist",
            });
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scored
            .into_iter()
            .take(self.shortlist_size)
            .map(|(id, _)| id)
            .collect())
    }

    /// Stage 2: Borda count over validated ballots.
    pub fn borda(
        &self,
        shortlist: &[AgentId],
        ballots: &[(AgentId, RankBallot<AgentId>)],
    ) -> DecisionResult<BordaTally<AgentId>> {
        if shortlist.is_empty() {
            return Err(DecisionError::EmptyCandidates { stage: "borda count" });
        }

        let k = shortlist.len() as u32;
        let mut tally = BordaTally::new(shortlist.iter().copied());
        for (voter, ballot) in ballots {
            validate_ranking(*voter, shortlist, ballot)?;
            for (candidate, position) in ballot {
                tally.add(*candidate, u64::from(k - position));
            }
        }
        Ok(tally)
    }

    /// Stage 3: strict-majority confirmation of `candidate`.
    ///
    /// Returns the accept count and the outcome.
    pub fn confirm(
        &self,
        candidate: AgentId,
        confirmations: &AcceptBallot<AgentId>,
        occupants: &[AgentId],
    ) -> (usize, ElectionOutcome) {
        let accepts = count_accepts(confirmations);
        let outcome = if majority_confirms(accepts, occupants.len()) {
            ElectionOutcome::Elected(candidate)
        } else {
            ElectionOutcome::NoLeader
        };
        (accepts, outcome)
    }

    /// Runs all three stages with the tally runner's reputation for stage 1.
    ///
    /// `voters` must contain exactly one entry per occupant.
    pub fn run(
        &self,
        reputation: &ReputationTracker,
        occupants: &[AgentId],
        voters: &[&dyn LeaderVoter],
    ) -> DecisionResult<ElectionResult> {
        let shortlist = self.shortlist(reputation, occupants)?;
        let voters = match_voters(occupants, voters)?;

        let ballots = voters
            .iter()
            .map(|v| v.leader_ballot(&shortlist).map(|ballot| (v.voter_id(), ballot)))
            .collect::<DecisionResult<Vec<_>>>()?;
        let tally = self.borda(&shortlist, &ballots)?;
        let (candidate, points) = tally.winner().ok_or(DecisionError::EmptyCandidates { stage: "borda count" })?;
        debug!(candidate = %candidate, points, "borda winner");

        let voter_ids: Vec<AgentId> = voters.iter().map(|v| v.voter_id()).collect();
        let confirmations: AcceptBallot<AgentId> = voters
            .iter()
            .map(|v| (v.voter_id(), v.confirm_leader(candidate, &voter_ids)))
            .collect();
        let occupant_count = voter_ids.len();
        let (accepts, outcome) = self.confirm(candidate, &confirmations, &voter_ids);

        match outcome {
            ElectionOutcome::Elected(leader) => {
                info!(leader = %leader, accepts, occupants = occupant_count, "leader elected")
            }
            ElectionOutcome::NoLeader => {
                info!(candidate = %candidate, accepts, occupants = occupant_count, "no leader this round")
            }
        }

        Ok(ElectionResult {
            shortlist,
            points: tally.point_totals().to_vec(),
            candidate,
            accepts,
            occupants: occupant_count,
            outcome,
        })
    }
}

/// Turns a preference order (best first) into a position ballot.
pub fn ballot_from_order(order: &[AgentId]) -> RankBallot<AgentId> {
    order
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as u32 + 1))
        .collect()
}

/// Ranks the shortlist by recent contribution, highest first; ties keep
/// shortlist order.
pub fn rank_by_recent_contribution(reputation: &ReputationTracker, shortlist: &[AgentId]) -> RankBallot<AgentId> {
    let mut order: Vec<AgentId> = shortlist.to_vec();
    order.sort_by(|a, b| {
        reputation
            .get(*b)
            .recent_contribution
            .total_cmp(&reputation.get(*a).recent_contribution)
    });
    ballot_from_order(&order)
}

/// Accepts a candidate whose shortlist score is at least the occupants' mean.
pub fn accepts_candidate(reputation: &ReputationTracker, candidate: AgentId, occupants: &[AgentId]) -> bool {
    let mean = reputation.mean_over(occupants, |r| r.shortlist_score());
    reputation.get(candidate).shortlist_score() >= mean
}

fn validate_ranking(voter: AgentId, shortlist: &[AgentId], ballot: &RankBallot<AgentId>) -> DecisionResult<()> {
    let k = shortlist.len();
    let malformed = |reason: String| DecisionError::MalformedBallot { voter, reason };

    if ballot.len() != k {
        return Err(malformed(format!("ranked {} candidates, expected {}", ballot.len(), k)));
    }
    if let Some(missing) = shortlist.iter().find(|c| !ballot.contains_key(c)) {
        return Err(malformed(format!("candidate {} is not ranked", missing)));
    }

    let positions: HashSet<u32> = ballot.values().copied().collect();
    let complete = positions.len() == k && positions.iter().all(|p| (1..=k as u32).contains(p));
    if !complete {
        return Err(malformed(format!("positions must be exactly 1..={}", k)));
    }
    Ok(())
}

fn match_voters<'v>(occupants: &[AgentId], voters: &[&'v dyn LeaderVoter]) -> DecisionResult<Vec<&'v dyn LeaderVoter>> {
    let mut unique_occupants: Vec<AgentId> = Vec::new();
    for id in occupants {
        if !unique_occupants.contains(id) {
            unique_occupants.push(*id);
        }
    }

    let mut seen = HashSet::new();
    for voter in voters {
        let id = voter.voter_id();
        if !unique_occupants.contains(&id) {
            return Err(DecisionError::MalformedBallot {
                voter: id,
                reason: "voter is not an occupant".to_string(),
            });
        }
        if !seen.insert(id) {
            return Err(DecisionError::MalformedBallot {
                voter: id,
                reason: "voted more than once".to_string(),
            });
        }
    }

    unique_occupants
        .iter()
        .map(|id| {
            voters
                .iter()
                .copied()
                .find(|v| v.voter_id() == *id)
                .ok_or(DecisionError::MissingBallot(*id))
        })
        .collect()
}
