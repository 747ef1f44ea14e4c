//! Perception System
//!
//! Validates the orchestrator's snapshot and folds what the agent can see into
//! its reputation map. Runs once per round, before anything reads reputation.

use std::collections::HashSet;

use bike_events::RoundSnapshot;
use tracing::debug;

use crate::components::reputation::{PeerObservation, ReputationTracker};
use crate::error::{DecisionError, DecisionResult};

/// Rejects snapshots that would poison scoring with NaNs or ambiguous riders.
pub fn validate_snapshot(snapshot: &RoundSnapshot) -> DecisionResult<()> {
    let grid = snapshot.grid;
    if !(grid.width.is_finite() && grid.height.is_finite()) || grid.area() <= 0.0 {
        return Err(DecisionError::MalformedSnapshot(format!(
            "grid must have a positive finite area, got {}x{}",
            grid.width, grid.height
        )));
    }

    let mut box_ids = HashSet::new();
    for loot_box in &snapshot.loot_boxes {
        if !box_ids.insert(loot_box.id) {
            return Err(DecisionError::MalformedSnapshot(format!(
                "loot box {} listed twice",
                loot_box.id
            )));
        }
        if !loot_box.position.is_finite() || !loot_box.total_resources.is_finite() {
            return Err(DecisionError::MalformedSnapshot(format!(
                "loot box {} has non-finite position or value",
                loot_box.id
            )));
        }
    }

    let mut riders = HashSet::new();
    for bike in &snapshot.bikes {
        if !bike.position.is_finite() {
            return Err(DecisionError::MalformedSnapshot(format!(
                "bike {} has a non-finite position",
                bike.id
            )));
        }
        for occupant in &bike.occupants {
            if !riders.insert(occupant.id) {
                return Err(DecisionError::MalformedSnapshot(format!(
                    "agent {} appears on more than one seat",
                    occupant.id
                )));
            }
            let readings = [
                occupant.energy_level,
                occupant.energy_spent,
                occupant.energy_gained,
            ];
            if readings.iter().any(|v| !v.is_finite()) {
                return Err(DecisionError::MalformedSnapshot(format!(
                    "agent {} has non-finite energy readings",
                    occupant.id
                )));
            }
        }
    }

    Ok(())
}

/// Updates the tracker with every occupant of every bike in the snapshot.
///
/// Returns how many peers were observed.
pub fn observe_round(tracker: &mut ReputationTracker, snapshot: &RoundSnapshot) -> usize {
    let mut observed = 0;
    for occupant in snapshot.all_occupants() {
        tracker.update(occupant.id, &PeerObservation::from(occupant));
        observed += 1;
    }

    debug!(
        observer = %tracker.observer(),
        round = snapshot.round,
        observed,
        "reputation updated"
    );
    observed
}
