//! Biker Strategies
//!
//! A strategy decides how an agent scores destinations, ranks proposals,
//! votes on the loot split and takes part in leader elections. It is picked
//! once when the agent is built and never changes afterwards.
//!
//! Strategies are stateless: everything they read comes in through a
//! [`DecisionContext`] borrowed from the owning agent.

pub mod baseline;
pub mod reputation;

use std::fmt;

use bike_events::{AgentId, Geometry, LootBox, LootBoxId, MegaBike, RankBallot, RoundSnapshot};

use crate::components::agent::AgentState;
use crate::components::reputation::ReputationTracker;
use crate::config::DecisionConfig;
use crate::error::{DecisionError, DecisionResult};
use crate::systems::allocation::AllocationStrategy;
use crate::systems::target::TargetChoice;

pub use baseline::NearestLootStrategy;
pub use reputation::ReputationStrategy;

/// Read-only view of one agent's world for a single decision.
#[derive(Clone, Copy)]
pub struct DecisionContext<'a> {
    pub snapshot: &'a RoundSnapshot,
    pub agent: &'a AgentState,
    pub reputation: &'a ReputationTracker,
    pub geometry: &'a dyn Geometry,
    pub config: &'a DecisionConfig,
}

impl<'a> DecisionContext<'a> {
    /// The bike the agent is riding this round.
    pub fn own_bike(&self) -> DecisionResult<&'a MegaBike> {
        self.snapshot
            .bike_of(self.agent.id)
            .ok_or(DecisionError::NotOnBike(self.agent.id))
    }
}

impl fmt::Debug for DecisionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionContext")
            .field("round", &self.snapshot.round)
            .field("agent", &self.agent.id)
            .finish_non_exhaustive()
    }
}

/// Decision behaviour of a biker.
pub trait BikerStrategy: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Destination this agent pursues and proposes.
    fn choose_target(&self, ctx: &DecisionContext<'_>) -> DecisionResult<TargetChoice>;

    /// Rank ballot over the destinations proposed on this agent's bike.
    fn rank_proposals(
        &self,
        ctx: &DecisionContext<'_>,
        proposals: &[&LootBox],
    ) -> DecisionResult<RankBallot<LootBoxId>>;

    /// Scoring rule for this round's allocation vote.
    fn allocation_strategy(&self, agent: &AgentState) -> AllocationStrategy;

    /// Position ballot over the leader shortlist, 1 = most preferred.
    fn leader_ballot(&self, reputation: &ReputationTracker, shortlist: &[AgentId]) -> RankBallot<AgentId>;

    /// Accept or reject the Borda winner.
    fn confirm_leader(&self, reputation: &ReputationTracker, candidate: AgentId, occupants: &[AgentId]) -> bool;
}
