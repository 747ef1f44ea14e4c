//! Biker
//!
//! One autonomous agent: its own state, its private reputation model and the
//! strategy picked at construction. The orchestrator drives it through a
//! round in this order:
//!
//! 1. [`Biker::begin_round`] with the round snapshot
//! 2. [`Biker::propose_direction`], then [`Biker::final_direction_vote`] over
//!    every proposal made on the bike
//! 3. [`Biker::decide_allocation`] once loot has been collected
//! 4. the leader election, through [`LeaderVoter`] and [`Biker::tally_election`]
//! 5. [`Biker::reroll_colour`] when a box of the rider's colour was looted

use std::fmt;
use std::sync::Arc;

use bike_events::{AcceptBallot, AgentId, Colour, Euclidean, Geometry, LootBox, LootBoxId, RankBallot, RoundSnapshot};
use rand::Rng;
use tracing::{debug, info};

use crate::components::agent::AgentState;
use crate::components::reputation::ReputationTracker;
use crate::config::DecisionConfig;
use crate::error::{DecisionError, DecisionResult};
use crate::strategy::{BikerStrategy, DecisionContext};
use crate::systems::allocation::{allocation_vote, AllocationOutcome};
use crate::systems::election::{ElectionResult, LeaderElector, LeaderVoter};
use crate::systems::perception::{observe_round, validate_snapshot};
use crate::systems::target::TargetChoice;

pub struct Biker {
    state: AgentState,
    reputation: ReputationTracker,
    strategy: Box<dyn BikerStrategy>,
    config: Arc<DecisionConfig>,
    geometry: Arc<dyn Geometry>,
}

impl Biker {
    /// Creates a biker with default tuning and Euclidean geometry.
    pub fn new(id: AgentId, colour: Colour, strategy: Box<dyn BikerStrategy>) -> Self {
        Self {
            state: AgentState::new(id, colour),
            reputation: ReputationTracker::new(id, colour),
            strategy,
            config: Arc::new(DecisionConfig::default()),
            geometry: Arc::new(Euclidean),
        }
    }

    pub fn with_config(mut self, config: Arc<DecisionConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn with_geometry(mut self, geometry: Arc<dyn Geometry>) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.state = self.state.with_energy(energy);
        self
    }

    pub fn id(&self) -> AgentId {
        self.state.id
    }

    pub fn colour(&self) -> Colour {
        self.state.colour
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn reputation(&self) -> &ReputationTracker {
        &self.reputation
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Validates the snapshot, tracks the energy deficit and observes every
    /// rider in the round. Call exactly once per round, before any decision.
    pub fn begin_round(&mut self, snapshot: &RoundSnapshot) -> DecisionResult<()> {
        validate_snapshot(snapshot)?;

        if let Some(me) = snapshot.occupant(self.state.id) {
            self.state.track_energy(me.energy_level);
        }
        self.state.bike = snapshot.bike_of(self.state.id).map(|b| b.id);

        self.reputation.set_observer_colour(self.state.colour);
        let observed = observe_round(&mut self.reputation, snapshot);
        debug!(
            agent = %self.state.id,
            round = snapshot.round,
            observed,
            energy_spent = self.state.energy_spent,
            "round started"
        );
        Ok(())
    }

    /// Destination this agent proposes to its bike.
    pub fn propose_direction(&self, snapshot: &RoundSnapshot) -> DecisionResult<TargetChoice> {
        let choice = self.strategy.choose_target(&self.context(snapshot))?;
        debug!(
            agent = %self.state.id,
            loot_box = %choice.loot_box,
            regime = choice.regime.as_str(),
            "direction proposed"
        );
        Ok(choice)
    }

    /// Rank ballot over the proposals made on this agent's bike.
    ///
    /// Repeated proposals are ranked once.
    pub fn final_direction_vote(
        &self,
        snapshot: &RoundSnapshot,
        proposals: &[LootBoxId],
    ) -> DecisionResult<RankBallot<LootBoxId>> {
        let mut boxes: Vec<&LootBox> = Vec::with_capacity(proposals.len());
        for id in proposals {
            let loot_box = snapshot.loot_box(*id).ok_or(DecisionError::UnknownLootBox(*id))?;
            if !boxes.iter().any(|b| b.id == loot_box.id) {
                boxes.push(loot_box);
            }
        }
        self.strategy.rank_proposals(&self.context(snapshot), &boxes)
    }

    /// Normalised vote for splitting the bike's loot. Counts as one loot event.
    pub fn decide_allocation(&mut self, snapshot: &RoundSnapshot) -> DecisionResult<AllocationOutcome> {
        let occupants = self.context(snapshot).own_bike()?.occupant_ids();
        self.state.record_loot_event();

        let strategy = self.strategy.allocation_strategy(&self.state);
        let outcome = allocation_vote(strategy, &occupants, &self.reputation)?;
        debug!(
            agent = %self.state.id,
            strategy = outcome.strategy.as_str(),
            average_loot_cost = self.state.average_loot_cost(),
            "allocation decided"
        );
        Ok(outcome)
    }

    /// Accepts every agent asking to join the bike.
    pub fn decide_joining(&self, pending: &[AgentId]) -> AcceptBallot<AgentId> {
        pending.iter().map(|id| (*id, true)).collect()
    }

    /// Draws a new sought colour from the first `palette` colours. Called when
    /// a box of the current colour has been looted.
    pub fn reroll_colour<R: Rng + ?Sized>(&mut self, rng: &mut R, palette: usize) -> Colour {
        let palette = palette.clamp(1, Colour::all().len());
        let colour = Colour::from_index(rng.gen_range(0..palette)).unwrap_or(self.state.colour);
        self.state.colour = colour;
        self.reputation.set_observer_colour(colour);
        colour
    }

    /// Runs the leader election for this agent's bike with this agent as
    /// tally runner.
    pub fn tally_election(
        &self,
        snapshot: &RoundSnapshot,
        voters: &[&dyn LeaderVoter],
    ) -> DecisionResult<ElectionResult> {
        let occupants = self.context(snapshot).own_bike()?.occupant_ids();
        let result = LeaderElector::new(&self.config.election).run(&self.reputation, &occupants, voters)?;
        info!(
            runner = %self.state.id,
            round = snapshot.round,
            leader = ?result.outcome.leader(),
            "election tallied"
        );
        Ok(result)
    }

    fn context<'a>(&'a self, snapshot: &'a RoundSnapshot) -> DecisionContext<'a> {
        DecisionContext {
            snapshot,
            agent: &self.state,
            reputation: &self.reputation,
            geometry: self.geometry.as_ref(),
            config: &self.config,
        }
    }
}

impl LeaderVoter for Biker {
    fn voter_id(&self) -> AgentId {
        self.state.id
    }

    fn leader_ballot(&self, shortlist: &[AgentId]) -> DecisionResult<RankBallot<AgentId>> {
        Ok(self.strategy.leader_ballot(&self.reputation, shortlist))
    }

    fn confirm_leader(&self, candidate: AgentId, occupants: &[AgentId]) -> bool {
        self.strategy.confirm_leader(&self.reputation, candidate, occupants)
    }
}

impl fmt::Debug for Biker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Biker")
            .field("state", &self.state)
            .field("strategy", &self.strategy)
            .field("observed_peers", &self.reputation.len())
            .finish_non_exhaustive()
    }
}
