//! Target Selection
//!
//! Picks the loot box this agent pursues and proposes. Three regimes are tried
//! in priority order:
//! - All-weak: the whole bike cannot reach the nearest box of our colour, so
//!   head there regardless of value
//! - Opponent-strong: the other riders could reach anything, so grab the most
//!   valuable box of our colour before someone else does
//! - Weighted score: value, colour, distance and the reputation of riders who
//!   share the box colour

use bike_events::{AgentId, Colour, Coordinates, Geometry, GridSize, LootBox, LootBoxId, OccupantView};
use tracing::debug;

use crate::components::reputation::ReputationTracker;
use crate::config::TargetWeights;
use crate::error::{DecisionError, DecisionResult};

/// Which rule produced a destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRegime {
    AllWeak,
    OpponentStrong,
    WeightedScore,
    /// Baseline behaviour: closest box of any colour
    Nearest,
}

impl TargetRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetRegime::AllWeak => "all_weak",
            TargetRegime::OpponentStrong => "opponent_strong",
            TargetRegime::WeightedScore => "weighted_score",
            TargetRegime::Nearest => "nearest",
        }
    }
}

/// A chosen destination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetChoice {
    pub loot_box: LootBoxId,
    pub regime: TargetRegime,
    /// Weighted score, only set by the weighted regime
    pub score: Option<f64>,
}

/// Everything target selection reads for one agent.
#[derive(Debug, Clone, Copy)]
pub struct TargetInputs<'a> {
    pub agent: AgentId,
    pub colour: Colour,
    pub position: Coordinates,
    pub grid: GridSize,
    /// Riders of the agent's bike, the agent included
    pub occupants: &'a [OccupantView],
    pub candidates: &'a [LootBox],
    pub reputation: &'a ReputationTracker,
}

/// Reputation-aware destination selector.
pub struct TargetSelector<'a> {
    weights: &'a TargetWeights,
    geometry: &'a dyn Geometry,
}

impl<'a> TargetSelector<'a> {
    pub fn new(weights: &'a TargetWeights, geometry: &'a dyn Geometry) -> Self {
        Self { weights, geometry }
    }

    /// Selects one destination from the candidates.
    pub fn select(&self, inputs: &TargetInputs<'_>) -> DecisionResult<TargetChoice> {
        if inputs.candidates.is_empty() {
            return Err(DecisionError::EmptyCandidates {
                stage: "target selection",
            });
        }

        if let Some(loot_box) = self.all_weak(inputs) {
            debug!(agent = %inputs.agent, loot_box = %loot_box.id, "all riders weak, heading to nearest own-colour box");
            return Ok(TargetChoice {
                loot_box: loot_box.id,
                regime: TargetRegime::AllWeak,
                score: None,
            });
        }

        if let Some(loot_box) = self.opponents_strong(inputs) {
            debug!(agent = %inputs.agent, loot_box = %loot_box.id, "other riders strong, taking richest own-colour box");
            return Ok(TargetChoice {
                loot_box: loot_box.id,
                regime: TargetRegime::OpponentStrong,
                score: None,
            });
        }

        let mut best: Option<(&LootBox, f64)> = None;
        for loot_box in inputs.candidates {
            let score = self.score(inputs, loot_box);
            if !score.is_finite() {
                return Err(DecisionError::NonFiniteScore {
                    stage: "target selection",
                });
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((loot_box, score));
            }
        }

        let (loot_box, score) = best.ok_or(DecisionError::EmptyCandidates {
            stage: "target selection",
        })?;
        debug!(agent = %inputs.agent, loot_box = %loot_box.id, score, "weighted target chosen");
        Ok(TargetChoice {
            loot_box: loot_box.id,
            regime: TargetRegime::WeightedScore,
            score: Some(score),
        })
    }

    /// Weighted score of one candidate.
    pub fn score(&self, inputs: &TargetInputs<'_>, loot_box: &LootBox) -> f64 {
        let w = self.weights;

        let value = loot_box.total_resources / w.loot_normaliser;
        let colour_match = if loot_box.colour == inputs.colour { 1.0 } else { 0.0 };
        let distance = self.geometry.distance(inputs.position, loot_box.position) / inputs.grid.area();

        let sharing: Vec<AgentId> = inputs
            .occupants
            .iter()
            .filter(|o| o.colour == loot_box.colour)
            .map(|o| o.id)
            .collect();
        let fraction = if inputs.occupants.is_empty() {
            0.0
        } else {
            sharing.len() as f64 / inputs.occupants.len() as f64
        };

        let rep = inputs.reputation;
        let reputation_term = w.history * rep.mean_over(&sharing, |r| r.history_contribution)
            + w.recent * rep.mean_over(&sharing, |r| r.recent_contribution)
            + w.energy * rep.mean_over(&sharing, |r| r.energy_remain);

        w.loot * value
            + w.colour * colour_match
            + w.distance * distance
            + w.crowd * fraction
            + w.reputation * reputation_term
    }

    fn travel_cost(&self, from: Coordinates, to: Coordinates) -> f64 {
        self.geometry.distance(from, to) * self.weights.energy_per_distance
    }

    fn all_weak<'c>(&self, inputs: &TargetInputs<'c>) -> Option<&'c LootBox> {
        let total_energy: f64 = inputs.occupants.iter().map(|o| o.energy_level).sum();

        let mut nearest: Option<(&'c LootBox, f64)> = None;
        for loot_box in inputs.candidates.iter().filter(|b| b.colour == inputs.colour) {
            let cost = self.travel_cost(inputs.position, loot_box.position);
            if nearest.map_or(true, |(_, best)| cost < best) {
                nearest = Some((loot_box, cost));
            }
        }

        nearest
            .filter(|(_, cost)| total_energy < *cost)
            .map(|(loot_box, _)| loot_box)
    }

    fn opponents_strong<'c>(&self, inputs: &TargetInputs<'c>) -> Option<&'c LootBox> {
        let others_energy: f64 = inputs
            .occupants
            .iter()
            .filter(|o| o.id != inputs.agent)
            .map(|o| o.energy_level)
            .sum();

        let farthest = inputs
            .candidates
            .iter()
            .map(|b| self.travel_cost(inputs.position, b.position))
            .fold(0.0_f64, f64::max);

        if others_energy <= farthest {
            return None;
        }

        let mut richest: Option<&'c LootBox> = None;
        for loot_box in inputs.candidates.iter().filter(|b| b.colour == inputs.colour) {
            if richest.map_or(true, |best| loot_box.total_resources > best.total_resources) {
                richest = Some(loot_box);
            }
        }
        richest
    }
}

/// Closest box of any colour; ties keep the first in candidate order.
pub fn nearest_loot_box<'c>(
    geometry: &dyn Geometry,
    from: Coordinates,
    candidates: &'c [LootBox],
) -> Option<&'c LootBox> {
    let mut nearest: Option<(&'c LootBox, f64)> = None;
    for loot_box in candidates {
        let distance = geometry.distance(from, loot_box.position);
        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((loot_box, distance));
        }
    }
    nearest.map(|(loot_box, _)| loot_box)
}
