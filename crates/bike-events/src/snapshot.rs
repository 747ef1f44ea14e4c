//! Round Snapshot
//!
//! The immutable view of the world the orchestrator hands every agent at the
//! start of a round. Agents only ever read it, so one snapshot can be shared
//! between any number of concurrent decision passes.

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, BikeId, LootBoxId};
use crate::world::{GridSize, LootBox, MegaBike, OccupantView};

/// Complete environment state for one round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// Round number (0-based)
    pub round: u32,
    #[serde(default)]
    pub grid: GridSize,
    #[serde(default)]
    pub loot_boxes: Vec<LootBox>,
    #[serde(default)]
    pub bikes: Vec<MegaBike>,
}

impl RoundSnapshot {
    pub fn new(round: u32, grid: GridSize) -> Self {
        Self {
            round,
            grid,
            loot_boxes: Vec::new(),
            bikes: Vec::new(),
        }
    }

    pub fn with_loot_box(mut self, loot_box: LootBox) -> Self {
        self.loot_boxes.push(loot_box);
        self
    }

    pub fn with_bike(mut self, bike: MegaBike) -> Self {
        self.bikes.push(bike);
        self
    }

    pub fn loot_box(&self, id: LootBoxId) -> Option<&LootBox> {
        self.loot_boxes.iter().find(|b| b.id == id)
    }

    pub fn bike(&self, id: BikeId) -> Option<&MegaBike> {
        self.bikes.iter().find(|b| b.id == id)
    }

    /// The bike a given agent is currently riding, if any.
    pub fn bike_of(&self, agent: AgentId) -> Option<&MegaBike> {
        self.bikes.iter().find(|b| b.has_occupant(agent))
    }

    /// The observable state of an agent, wherever it is riding.
    pub fn occupant(&self, agent: AgentId) -> Option<&OccupantView> {
        self.bikes.iter().find_map(|b| b.occupant(agent))
    }

    /// Every occupant of every bike, in bike then boarding order.
    pub fn all_occupants(&self) -> impl Iterator<Item = &OccupantView> {
        self.bikes.iter().flat_map(|b| b.occupants.iter())
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Colour, Coordinates};

    fn two_bike_snapshot() -> RoundSnapshot {
        RoundSnapshot::new(3, GridSize::default())
            .with_bike(
                MegaBike::new(BikeId::from_u128(1), Coordinates::new(0.0, 0.0))
                    .with_occupant(OccupantView::new(AgentId::from_u128(1), Colour::Red, 1.0)),
            )
            .with_bike(
                MegaBike::new(BikeId::from_u128(2), Coordinates::new(10.0, 0.0))
                    .with_occupant(OccupantView::new(AgentId::from_u128(2), Colour::Blue, 0.4))
                    .with_occupant(OccupantView::new(AgentId::from_u128(3), Colour::Red, 0.6)),
            )
    }

    #[test]
    fn test_bike_of_finds_rider() {
        let snapshot = two_bike_snapshot();
        assert_eq!(snapshot.bike_of(AgentId::from_u128(3)).map(|b| b.id), Some(BikeId::from_u128(2)));
        assert!(snapshot.bike_of(AgentId::from_u128(9)).is_none());
    }

    #[test]
    fn test_all_occupants_order() {
        let snapshot = two_bike_snapshot();
        let ids: Vec<AgentId> = snapshot.all_occupants().map(|o| o.id).collect();
        assert_eq!(
            ids,
            vec![AgentId::from_u128(1), AgentId::from_u128(2), AgentId::from_u128(3)]
        );
    }

    #[test]
    fn test_json_round_trip_preserves_snapshot() {
        let snapshot = two_bike_snapshot();
        let json = snapshot.to_json().unwrap();
        assert_eq!(RoundSnapshot::from_json(&json).unwrap(), snapshot);
    }
}
