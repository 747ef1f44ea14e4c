//! Baseline strategy: the plain biker every team starts from.
//!
//! Heads for the closest loot box, ranks proposals by proximity, splits loot
//! equally, accepts any leader and ranks the shortlist as given.

use bike_events::{AgentId, LootBox, LootBoxId, RankBallot};

use crate::components::agent::AgentState;
use crate::components::reputation::ReputationTracker;
use crate::error::{DecisionError, DecisionResult};
use crate::systems::allocation::AllocationStrategy;
use crate::systems::election::ballot_from_order;
use crate::systems::ranking::dense_ranks;
use crate::systems::target::{nearest_loot_box, TargetChoice, TargetRegime};

use super::{BikerStrategy, DecisionContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct NearestLootStrategy;

impl BikerStrategy for NearestLootStrategy {
    fn name(&self) -> &'static str {
        "nearest_loot"
    }

    fn choose_target(&self, ctx: &DecisionContext<'_>) -> DecisionResult<TargetChoice> {
        let bike = ctx.own_bike()?;
        let nearest = nearest_loot_box(ctx.geometry, bike.position, &ctx.snapshot.loot_boxes).ok_or(
            DecisionError::EmptyCandidates {
                stage: "target selection",
            },
        )?;
        Ok(TargetChoice {
            loot_box: nearest.id,
            regime: TargetRegime::Nearest,
            score: None,
        })
    }

    fn rank_proposals(
        &self,
        ctx: &DecisionContext<'_>,
        proposals: &[&LootBox],
    ) -> DecisionResult<RankBallot<LootBoxId>> {
        if proposals.is_empty() {
            return Err(DecisionError::EmptyCandidates {
                stage: "proposal ranking",
            });
        }

        let bike = ctx.own_bike()?;
        let closeness: Vec<f64> = proposals
            .iter()
            .map(|b| -ctx.geometry.distance(bike.position, b.position))
            .collect();
        if closeness.iter().any(|d| !d.is_finite()) {
            return Err(DecisionError::NonFiniteScore {
                stage: "proposal ranking",
            });
        }

        Ok(proposals
            .iter()
            .zip(dense_ranks(&closeness))
            .map(|(loot_box, rank)| (loot_box.id, rank))
            .collect())
    }

    fn allocation_strategy(&self, _agent: &AgentState) -> AllocationStrategy {
        AllocationStrategy::EqualSplit
    }

    fn leader_ballot(&self, _reputation: &ReputationTracker, shortlist: &[AgentId]) -> RankBallot<AgentId> {
        ballot_from_order(shortlist)
    }

    fn confirm_leader(&self, _reputation: &ReputationTracker, _candidate: AgentId, _occupants: &[AgentId]) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecisionConfig;
    use bike_events::fixtures::{self, ALDER, BLUE_BOX, FAR_RED, NEAR_RED};
    use bike_events::{Colour, Euclidean};

    #[test]
    fn test_heads_for_nearest_box() {
        let snapshot = fixtures::sample_round();
        let agent = AgentState::new(ALDER, Colour::Red);
        let tracker = ReputationTracker::new(ALDER, Colour::Red);
        let config = DecisionConfig::default();
        let ctx = DecisionContext {
            snapshot: &snapshot,
            agent: &agent,
            reputation: &tracker,
            geometry: &Euclidean,
            config: &config,
        };

        let choice = NearestLootStrategy.choose_target(&ctx).unwrap();
        assert_eq!(choice.loot_box, NEAR_RED);
        assert_eq!(choice.regime, TargetRegime::Nearest);

        let proposals: Vec<&LootBox> = [NEAR_RED, FAR_RED, BLUE_BOX]
            .iter()
            .filter_map(|id| snapshot.loot_box(*id))
            .collect();
        let ballot = NearestLootStrategy.rank_proposals(&ctx, &proposals).unwrap();
        assert_eq!(ballot[&NEAR_RED], 3);
        assert_eq!(ballot[&BLUE_BOX], 2);
        assert_eq!(ballot[&FAR_RED], 1);
    }

    #[test]
    fn test_elections_follow_shortlist() {
        let tracker = ReputationTracker::new(ALDER, Colour::Red);
        let a = AgentId::from_u128(1);
        let b = AgentId::from_u128(2);

        let ballot = NearestLootStrategy.leader_ballot(&tracker, &[b, a]);
        assert_eq!(ballot[&b], 1);
        assert_eq!(ballot[&a], 2);
        assert!(NearestLootStrategy.confirm_leader(&tracker, a, &[a, b]));
        assert_eq!(
            NearestLootStrategy.allocation_strategy(&AgentState::new(a, Colour::Red)),
            AllocationStrategy::EqualSplit
        );
    }
}
