//! World Types
//!
//! Loot boxes, megabikes and the per-occupant view exposed by the environment.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{AgentId, BikeId, LootBoxId};

/// Colour of a loot box, and the colour an agent is currently seeking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colour {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Pink,
    Purple,
    White,
}

impl Colour {
    /// Returns all colour variants in declaration order.
    pub fn all() -> &'static [Colour] {
        &[
            Colour::Red,
            Colour::Green,
            Colour::Blue,
            Colour::Yellow,
            Colour::Orange,
            Colour::Pink,
            Colour::Purple,
            Colour::White,
        ]
    }

    /// Looks up a colour by its position in [`Colour::all`].
    pub fn from_index(index: usize) -> Option<Colour> {
        Self::all().get(index).copied()
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Colour::Red => "red",
            Colour::Green => "green",
            Colour::Blue => "blue",
            Colour::Yellow => "yellow",
            Colour::Orange => "orange",
            Colour::Pink => "pink",
            Colour::Purple => "purple",
            Colour::White => "white",
        };
        write!(f, "{}", name)
    }
}

/// A point on the map
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

impl Coordinates {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Dimensions of the playing grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: f64,
    pub height: f64,
}

impl GridSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Grid area, used to normalise distances into roughly [0, 1].
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
        }
    }
}

/// A collectible resource source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootBox {
    pub id: LootBoxId,
    pub position: Coordinates,
    pub colour: Colour,
    /// Total resource value held by the box
    pub total_resources: f64,
}

impl LootBox {
    pub fn new(id: LootBoxId, position: Coordinates, colour: Colour, total_resources: f64) -> Self {
        Self {
            id,
            position,
            colour,
            total_resources,
        }
    }
}

/// What the environment lets every agent observe about one occupant this round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupantView {
    pub id: AgentId,
    /// Colour the occupant is currently seeking
    pub colour: Colour,
    /// Current energy level
    pub energy_level: f64,
    /// Energy the occupant expended pedalling during the last round
    #[serde(default)]
    pub energy_spent: f64,
    /// Energy the occupant gained in the last allocation
    #[serde(default)]
    pub energy_gained: f64,
    /// Whether the occupant's last action yielded loot
    #[serde(default)]
    pub received_loot: bool,
}

impl OccupantView {
    pub fn new(id: AgentId, colour: Colour, energy_level: f64) -> Self {
        Self {
            id,
            colour,
            energy_level,
            energy_spent: 0.0,
            energy_gained: 0.0,
            received_loot: false,
        }
    }

    pub fn with_energy_spent(mut self, spent: f64) -> Self {
        self.energy_spent = spent;
        self
    }

    pub fn with_energy_gained(mut self, gained: f64) -> Self {
        self.energy_gained = gained;
        self
    }

    pub fn with_loot(mut self, received: bool) -> Self {
        self.received_loot = received;
        self
    }
}

/// A shared vehicle and its current occupants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MegaBike {
    pub id: BikeId,
    pub position: Coordinates,
    /// Heading in radians
    #[serde(default)]
    pub orientation: f64,
    #[serde(default)]
    pub occupants: Vec<OccupantView>,
}

impl MegaBike {
    pub fn new(id: BikeId, position: Coordinates) -> Self {
        Self {
            id,
            position,
            orientation: 0.0,
            occupants: Vec::new(),
        }
    }

    pub fn with_occupant(mut self, occupant: OccupantView) -> Self {
        self.occupants.push(occupant);
        self
    }

    /// Occupant ids in boarding order.
    pub fn occupant_ids(&self) -> Vec<AgentId> {
        self.occupants.iter().map(|o| o.id).collect()
    }

    pub fn occupant(&self, agent: AgentId) -> Option<&OccupantView> {
        self.occupants.iter().find(|o| o.id == agent)
    }

    pub fn has_occupant(&self, agent: AgentId) -> bool {
        self.occupants.iter().any(|o| o.id == agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_index_round_trip() {
        for (i, colour) in Colour::all().iter().enumerate() {
            assert_eq!(Colour::from_index(i), Some(*colour));
        }
        assert_eq!(Colour::from_index(Colour::all().len()), None);
    }

    #[test]
    fn test_bike_occupant_lookup() {
        let bike = MegaBike::new(BikeId::from_u128(1), Coordinates::new(0.0, 0.0))
            .with_occupant(OccupantView::new(AgentId::from_u128(1), Colour::Red, 0.5))
            .with_occupant(OccupantView::new(AgentId::from_u128(2), Colour::Blue, 0.25));

        assert_eq!(bike.occupant_ids(), vec![AgentId::from_u128(1), AgentId::from_u128(2)]);
        assert!(bike.has_occupant(AgentId::from_u128(2)));
        assert!(!bike.has_occupant(AgentId::from_u128(3)));
    }

    #[test]
    fn test_occupant_view_defaults_when_fields_missing() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000001","colour":"green","energy_level":0.8}"#;
        let view: OccupantView = serde_json::from_str(json).unwrap();

        assert_eq!(view.colour, Colour::Green);
        assert_eq!(view.energy_spent, 0.0);
        assert!(!view.received_loot);
    }
}
