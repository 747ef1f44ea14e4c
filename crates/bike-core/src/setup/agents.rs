//! Agent Spawning
//!
//! Every random draw made while building agents comes from the generator
//! passed in, so a seed fully determines ids, colours and strategies.

use std::sync::Arc;

use bike_events::{AgentId, Colour, RoundSnapshot};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::biker::Biker;
use crate::config::DecisionConfig;
use crate::strategy::{BikerStrategy, NearestLootStrategy, ReputationStrategy};

/// Configuration for agent spawning
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub agent_count: usize,
    /// Probability that an agent gets the baseline strategy
    pub baseline_share: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            agent_count: 8,
            baseline_share: 0.0,
        }
    }
}

pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Uniform draw over the full colour palette.
pub fn random_colour<R: Rng + ?Sized>(rng: &mut R) -> Colour {
    let all = Colour::all();
    all[rng.gen_range(0..all.len())]
}

/// Stable agent id derived from the generator.
pub fn generate_agent_id<R: Rng + ?Sized>(rng: &mut R) -> AgentId {
    AgentId::from_random_bytes(rng.gen())
}

fn pick_strategy<R: Rng + ?Sized>(rng: &mut R, baseline_share: f64) -> Box<dyn BikerStrategy> {
    if rng.gen_bool(baseline_share.clamp(0.0, 1.0)) {
        Box::new(NearestLootStrategy)
    } else {
        Box::new(ReputationStrategy)
    }
}

/// Spawns fresh agents with generated ids and colours.
pub fn spawn_bikers<R: Rng + ?Sized>(rng: &mut R, spawn: &SpawnConfig, config: &Arc<DecisionConfig>) -> Vec<Biker> {
    (0..spawn.agent_count)
        .map(|_| {
            let id = generate_agent_id(rng);
            let colour = random_colour(rng);
            let strategy = pick_strategy(rng, spawn.baseline_share);
            Biker::new(id, colour, strategy).with_config(Arc::clone(config))
        })
        .collect()
}

/// One agent per rider in the snapshot, adopting the rider's id, colour and
/// energy. Only the strategy is drawn from the generator.
pub fn bikers_for_snapshot<R: Rng + ?Sized>(
    snapshot: &RoundSnapshot,
    rng: &mut R,
    baseline_share: f64,
    config: &Arc<DecisionConfig>,
) -> Vec<Biker> {
    snapshot
        .all_occupants()
        .map(|rider| {
            let strategy = pick_strategy(rng, baseline_share);
            Biker::new(rider.id, rider.colour, strategy)
                .with_energy(rider.energy_level)
                .with_config(Arc::clone(config))
        })
        .collect()
}
