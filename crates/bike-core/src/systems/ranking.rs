//! Proposal Ranking
//!
//! Scores the destinations other riders proposed and turns the scores into a
//! dense-rank ballot for the external Borda tally. Proposer reputation is not
//! used here: a proposal cannot be traced back to its proposer yet.

use bike_events::{Colour, Coordinates, Geometry, GridSize, LootBox, LootBoxId, RankBallot};
use tracing::debug;

use crate::config::RankingWeights;
use crate::error::{DecisionError, DecisionResult};

/// Ranks proposed loot boxes from one agent's point of view.
pub struct ProposalRanker<'a> {
    weights: &'a RankingWeights,
    geometry: &'a dyn Geometry,
}

impl<'a> ProposalRanker<'a> {
    pub fn new(weights: &'a RankingWeights, geometry: &'a dyn Geometry) -> Self {
        Self { weights, geometry }
    }

    /// Loot/colour/distance score of one proposal.
    pub fn score(&self, colour: Colour, position: Coordinates, grid: GridSize, loot_box: &LootBox) -> f64 {
        let w = self.weights;
        let value = loot_box.total_resources / w.loot_normaliser;
        let colour_match = if loot_box.colour == colour { 1.0 } else { 0.0 };
        let distance = self.geometry.distance(position, loot_box.position) / grid.area();

        w.loot * value + w.colour * colour_match + w.distance * distance
    }

    /// Dense-rank ballot: the best proposal gets the highest rank.
    pub fn rank(
        &self,
        colour: Colour,
        position: Coordinates,
        grid: GridSize,
        proposals: &[&LootBox],
    ) -> DecisionResult<RankBallot<LootBoxId>> {
        if proposals.is_empty() {
            return Err(DecisionError::EmptyCandidates {
                stage: "proposal ranking",
            });
        }

        let scores: Vec<f64> = proposals
            .iter()
            .map(|b| self.score(colour, position, grid, b))
            .collect();
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(DecisionError::NonFiniteScore {
                stage: "proposal ranking",
            });
        }

        let ranks = dense_ranks(&scores);
        let ballot: RankBallot<LootBoxId> = proposals
            .iter()
            .zip(ranks)
            .map(|(loot_box, rank)| (loot_box.id, rank))
            .collect();

        debug!(proposals = proposals.len(), distinct = ballot.values().max().copied().unwrap_or(0), "proposals ranked");
        Ok(ballot)
    }
}

/// Dense ranking: distinct values sorted ascending and numbered from 1, equal
/// values share a rank, no gaps.
///
/// ```
/// use bike_core::systems::dense_ranks;
///
/// assert_eq!(dense_ranks(&[0.5, 0.1, 0.5, 0.9]), vec![2, 1, 2, 3]);
/// ```
pub fn dense_ranks(scores: &[f64]) -> Vec<u32> {
    let mut distinct: Vec<f64> = scores.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup_by(|a, b| a == b);

    scores
        .iter()
        .map(|s| distinct.partition_point(|d| d < s) as u32 + 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bike_events::Euclidean;
    use std::collections::HashSet;

    fn loot(id: u128, x: f64, colour: Colour, value: f64) -> LootBox {
        LootBox::new(LootBoxId::from_u128(id), Coordinates::new(x, 0.0), colour, value)
    }

    #[test]
    fn test_dense_ranks_share_and_have_no_gaps() {
        let scores = [0.3, 0.7, 0.3, 0.1, 0.7, 0.9];
        let ranks = dense_ranks(&scores);

        assert_eq!(ranks, vec![2, 3, 2, 1, 3, 4]);

        let distinct_ranks: HashSet<u32> = ranks.iter().copied().collect();
        assert_eq!(distinct_ranks.len(), 4);
        assert_eq!(*ranks.iter().max().unwrap() as usize, distinct_ranks.len());
    }

    #[test]
    fn test_dense_ranks_treat_signed_zero_as_equal() {
        assert_eq!(dense_ranks(&[0.0, -0.0, 1.0]), vec![1, 1, 2]);
    }

    #[test]
    fn test_rank_prefers_valuable_own_colour_boxes() {
        let weights = RankingWeights::default();
        let ranker = ProposalRanker::new(&weights, &Euclidean);
        let grid = GridSize::new(10.0, 10.0);

        let rich_red = loot(1, 1.0, Colour::Red, 8.0);
        let poor_red = loot(2, 1.0, Colour::Red, 0.0);
        let rich_blue = loot(3, 1.0, Colour::Blue, 8.0);
        let same_as_rich_blue = loot(4, 1.0, Colour::Blue, 8.0);

        let ballot = ranker
            .rank(
                Colour::Red,
                Coordinates::new(0.0, 0.0),
                grid,
                &[&rich_red, &poor_red, &rich_blue, &same_as_rich_blue],
            )
            .unwrap();

        // poor_red and rich_blue both score 0.2 plus the same distance term
        assert_eq!(ballot[&LootBoxId::from_u128(1)], 2);
        assert_eq!(ballot[&LootBoxId::from_u128(2)], 1);
        assert_eq!(ballot[&LootBoxId::from_u128(3)], 1);
        assert_eq!(ballot[&LootBoxId::from_u128(4)], 1);
    }

    #[test]
    fn test_default_distance_weight_favours_farther_box() {
        let weights = RankingWeights::default();
        let ranker = ProposalRanker::new(&weights, &Euclidean);
        let near = loot(1, 1.0, Colour::Green, 4.0);
        let far = loot(2, 9.0, Colour::Green, 4.0);

        let ballot = ranker
            .rank(Colour::Red, Coordinates::new(0.0, 0.0), GridSize::new(10.0, 10.0), &[&far, &near])
            .unwrap();
        assert_eq!(ballot[&far.id], 2);
        assert_eq!(ballot[&near.id], 1);
    }

    #[test]
    fn test_negative_distance_weight_favours_closer_box() {
        let weights = RankingWeights {
            distance: -0.2,
            ..RankingWeights::default()
        };
        let ranker = ProposalRanker::new(&weights, &Euclidean);
        let near = loot(1, 1.0, Colour::Green, 4.0);
        let far = loot(2, 9.0, Colour::Green, 4.0);

        let ballot = ranker
            .rank(Colour::Red, Coordinates::new(0.0, 0.0), GridSize::new(10.0, 10.0), &[&far, &near])
            .unwrap();
        assert_eq!(ballot[&near.id], 2);
        assert_eq!(ballot[&far.id], 1);
    }

    #[test]
    fn test_empty_proposals_is_an_error() {
        let weights = RankingWeights::default();
        let ranker = ProposalRanker::new(&weights, &Euclidean);
        let result = ranker.rank(Colour::Red, Coordinates::new(0.0, 0.0), GridSize::default(), &[]);
        assert!(matches!(result, Err(DecisionError::EmptyCandidates { .. })));
    }
}
