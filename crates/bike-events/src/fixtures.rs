//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // bike-events = { path = "../bike-events", features = ["test-fixtures"] }
//!
//! use bike_events::fixtures;
//!
//! let snapshot = fixtures::sample_round();
//! ```

use crate::{AgentId, BikeId, LootBoxId, RoundSnapshot};

/// Red rider on the main bike, lots of energy.
pub const ALDER: AgentId = AgentId::from_u128(0xa1);
/// Red rider on the main bike.
pub const BRYN: AgentId = AgentId::from_u128(0xa2);
/// Blue rider on the main bike.
pub const CEDAR: AgentId = AgentId::from_u128(0xa3);
/// Green rider on the main bike, nearly exhausted.
pub const DALE: AgentId = AgentId::from_u128(0xa4);
/// Rider on the second bike.
pub const ELM: AgentId = AgentId::from_u128(0xa5);
/// Rider on the second bike.
pub const FERN: AgentId = AgentId::from_u128(0xa6);

/// Bike carrying Alder, Bryn, Cedar and Dale.
pub const MAIN_BIKE: BikeId = BikeId::from_u128(0xb1);
/// Bike carrying Elm and Fern.
pub const SECOND_BIKE: BikeId = BikeId::from_u128(0xb2);

/// Red box close to the main bike, low value.
pub const NEAR_RED: LootBoxId = LootBoxId::from_u128(0xc1);
/// Red box further away, high value.
pub const FAR_RED: LootBoxId = LootBoxId::from_u128(0xc2);
/// Blue box, mid distance.
pub const BLUE_BOX: LootBoxId = LootBoxId::from_u128(0xc3);
/// Green box at the far corner.
pub const GREEN_BOX: LootBoxId = LootBoxId::from_u128(0xc4);

/// Returns the sample round snapshot.
///
/// Contains:
/// - a 100x100 grid
/// - 2 bikes (4 occupants on the main bike, 2 on the second)
/// - 4 loot boxes of three colours
pub fn sample_round() -> RoundSnapshot {
    let json = include_str!("../tests/fixtures/sample_round.json");
    RoundSnapshot::from_json(json).expect("Failed to parse sample_round.json")
}

/// Occupant ids of the main bike in boarding order.
pub fn main_bike_occupants() -> Vec<AgentId> {
    vec![ALDER, BRYN, CEDAR, DALE]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Colour;

    #[test]
    fn test_sample_round_load() {
        let snapshot = sample_round();

        assert_eq!(snapshot.bikes.len(), 2);
        assert_eq!(snapshot.loot_boxes.len(), 4);
        assert_eq!(snapshot.all_occupants().count(), 6);
    }

    #[test]
    fn test_main_bike_layout() {
        let snapshot = sample_round();
        let bike = snapshot.bike(MAIN_BIKE).expect("main bike should exist");

        assert_eq!(bike.occupant_ids(), main_bike_occupants());
        assert_eq!(snapshot.loot_box(NEAR_RED).map(|b| b.colour), Some(Colour::Red));
    }
}
