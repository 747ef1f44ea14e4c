//! Reputation-driven strategy: the full decision core.

use bike_events::{AgentId, LootBox, LootBoxId, RankBallot};

use crate::components::agent::AgentState;
use crate::components::reputation::ReputationTracker;
use crate::error::DecisionResult;
use crate::systems::allocation::AllocationStrategy;
use crate::systems::election::{accepts_candidate, rank_by_recent_contribution};
use crate::systems::ranking::ProposalRanker;
use crate::systems::target::{TargetChoice, TargetInputs, TargetSelector};

use super::{BikerStrategy, DecisionContext};

/// Scores destinations, splits and leaders from the agent's private
/// reputation model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReputationStrategy;

impl BikerStrategy for ReputationStrategy {
    fn name(&self) -> &'static str {
        "reputation"
    }

    fn choose_target(&self, ctx: &DecisionContext<'_>) -> DecisionResult<TargetChoice> {
        let bike = ctx.own_bike()?;
        let inputs = TargetInputs {
            agent: ctx.agent.id,
            colour: ctx.agent.colour,
            position: bike.position,
            grid: ctx.snapshot.grid,
            occupants: &bike.occupants,
            candidates: &ctx.snapshot.loot_boxes,
            reputation: ctx.reputation,
        };
        TargetSelector::new(&ctx.config.target, ctx.geometry).select(&inputs)
    }

    fn rank_proposals(
        &self,
        ctx: &DecisionContext<'_>,
        proposals: &[&LootBox],
    ) -> DecisionResult<RankBallot<LootBoxId>> {
        let bike = ctx.own_bike()?;
        ProposalRanker::new(&ctx.config.ranking, ctx.geometry).rank(
            ctx.agent.colour,
            bike.position,
            ctx.snapshot.grid,
            proposals,
        )
    }

    fn allocation_strategy(&self, agent: &AgentState) -> AllocationStrategy {
        AllocationStrategy::choose(agent)
    }

    fn leader_ballot(&self, reputation: &ReputationTracker, shortlist: &[AgentId]) -> RankBallot<AgentId> {
        rank_by_recent_contribution(reputation, shortlist)
    }

    fn confirm_leader(&self, reputation: &ReputationTracker, candidate: AgentId, occupants: &[AgentId]) -> bool {
        accepts_candidate(reputation, candidate, occupants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecisionConfig;
    use crate::systems::perception::observe_round;
    use crate::systems::target::TargetRegime;
    use bike_events::fixtures::{self, ALDER, BLUE_BOX, ELM, FAR_RED, NEAR_RED};
    use bike_events::{Colour, Euclidean};

    fn alder() -> (AgentState, ReputationTracker) {
        let snapshot = fixtures::sample_round();
        let mut tracker = ReputationTracker::new(ALDER, Colour::Red);
        observe_round(&mut tracker, &snapshot);
        (AgentState::new(ALDER, Colour::Red).with_energy(0.9), tracker)
    }

    #[test]
    fn test_default_tuning_triggers_all_weak() {
        let snapshot = fixtures::sample_round();
        let (agent, tracker) = alder();
        let config = DecisionConfig::default();
        let ctx = DecisionContext {
            snapshot: &snapshot,
            agent: &agent,
            reputation: &tracker,
            geometry: &Euclidean,
            config: &config,
        };

        let choice = ReputationStrategy.choose_target(&ctx).unwrap();
        assert_eq!(choice.loot_box, NEAR_RED);
        assert_eq!(choice.regime, TargetRegime::AllWeak);
    }

    #[test]
    fn test_cheap_travel_uses_weighted_score() {
        let snapshot = fixtures::sample_round();
        let (agent, tracker) = alder();
        let mut config = DecisionConfig::default();
        config.target.energy_per_distance = 0.02;
        let ctx = DecisionContext {
            snapshot: &snapshot,
            agent: &agent,
            reputation: &tracker,
            geometry: &Euclidean,
            config: &config,
        };

        let choice = ReputationStrategy.choose_target(&ctx).unwrap();
        assert_eq!(choice.loot_box, FAR_RED);
        assert_eq!(choice.regime, TargetRegime::WeightedScore);
    }

    #[test]
    fn test_rank_proposals_prefers_own_colour_value() {
        let snapshot = fixtures::sample_round();
        let (agent, tracker) = alder();
        let config = DecisionConfig::default();
        let ctx = DecisionContext {
            snapshot: &snapshot,
            agent: &agent,
            reputation: &tracker,
            geometry: &Euclidean,
            config: &config,
        };
        let proposals: Vec<&LootBox> = [NEAR_RED, FAR_RED, BLUE_BOX]
            .iter()
            .filter_map(|id| snapshot.loot_box(*id))
            .collect();

        let ballot = ReputationStrategy.rank_proposals(&ctx, &proposals).unwrap();
        assert_eq!(ballot[&FAR_RED], 3);
        assert_eq!(ballot[&NEAR_RED], 2);
        assert_eq!(ballot[&BLUE_BOX], 1);
    }

    #[test]
    fn test_agent_off_every_bike_is_reported() {
        let snapshot = fixtures::sample_round();
        let tracker = ReputationTracker::new(AgentId::from_u128(0xff), Colour::Red);
        let agent = AgentState::new(AgentId::from_u128(0xff), Colour::Red);
        let config = DecisionConfig::default();
        let ctx = DecisionContext {
            snapshot: &snapshot,
            agent: &agent,
            reputation: &tracker,
            geometry: &Euclidean,
            config: &config,
        };

        assert!(ReputationStrategy.choose_target(&ctx).is_err());
        assert_eq!(ctx.own_bike().map(|b| b.id).ok(), None);
        // Elm is riding, just not on Alder's bike
        assert!(snapshot.bike_of(ELM).is_some());
    }
}
