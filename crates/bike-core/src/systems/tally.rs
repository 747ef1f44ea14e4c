//! Ballot Tallies
//!
//! Summing ballots is order-independent; the only order that matters is the
//! candidate insertion order, which breaks ties. Arrival order of ballots never
//! changes a result.

use bike_events::{AcceptBallot, AgentId, LootBoxId, RankBallot};

/// Points tally over an insertion-ordered candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BordaTally<K> {
    candidates: Vec<K>,
    points: Vec<u64>,
}

impl<K: Copy + Eq> BordaTally<K> {
    /// Starts a tally. Repeated candidates keep their first position.
    pub fn new(candidates: impl IntoIterator<Item = K>) -> Self {
        let mut unique: Vec<K> = Vec::new();
        for candidate in candidates {
            if !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }
        let points = vec![0; unique.len()];
        Self {
            candidates: unique,
            points,
        }
    }

    /// Adds points to a candidate. Returns false for an unknown candidate.
    pub fn add(&mut self, candidate: K, points: u64) -> bool {
        match self.candidates.iter().position(|c| *c == candidate) {
            Some(index) => {
                self.points[index] += points;
                true
            }
            None => false,
        }
    }

    pub fn points(&self, candidate: K) -> Option<u64> {
        self.candidates
            .iter()
            .position(|c| *c == candidate)
            .map(|index| self.points[index])
    }

    pub fn candidates(&self) -> &[K] {
        &self.candidates
    }

    /// Points per candidate, in insertion order.
    pub fn point_totals(&self) -> &[u64] {
        &self.points
    }

    /// Highest total; ties go to the earliest inserted candidate.
    pub fn winner(&self) -> Option<(K, u64)> {
        let mut best: Option<(K, u64)> = None;
        for (candidate, points) in self.candidates.iter().zip(&self.points) {
            if best.map_or(true, |(_, top)| *points > top) {
                best = Some((*candidate, *points));
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Sums dense-rank direction ballots, treating each rank as points.
///
/// Ranks for boxes outside `proposals` are ignored. Returns the winning box and
/// its points, or `None` when nothing was proposed.
pub fn tally_direction_ballots(
    proposals: &[LootBoxId],
    ballots: &[RankBallot<LootBoxId>],
) -> Option<(LootBoxId, u64)> {
    let mut tally = BordaTally::new(proposals.iter().copied());
    for ballot in ballots {
        for (loot_box, rank) in ballot {
            tally.add(*loot_box, u64::from(*rank));
        }
    }
    tally.winner()
}

/// Number of accept votes in a confirmation ballot.
pub fn count_accepts(ballot: &AcceptBallot<AgentId>) -> usize {
    ballot.values().filter(|accept| **accept).count()
}

/// Strict majority: accepts must exceed half the occupant count.
pub fn majority_confirms(accepts: usize, occupants: usize) -> bool {
    accepts * 2 > occupants
}
