//! Agent Components
//!
//! The agent's own physical view and the running counters that feed the
//! allocation vote.

use bike_events::{AgentId, BikeId, Colour};

/// Starting energy for a freshly spawned agent
pub const INITIAL_ENERGY: f64 = 1.0;

/// An agent's own state, persisted across rounds
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    pub id: AgentId,
    /// Colour of loot box currently sought
    pub colour: Colour,
    pub energy_level: f64,
    /// Energy level seen at the previous round
    pub last_energy_level: f64,
    /// Cumulative energy deficit tracked round over round
    pub energy_spent: f64,
    /// Loot events experienced
    pub loot_box_count: f64,
    /// Bike currently ridden, if any
    pub bike: Option<BikeId>,
}

impl AgentState {
    pub fn new(id: AgentId, colour: Colour) -> Self {
        Self {
            id,
            colour,
            energy_level: INITIAL_ENERGY,
            last_energy_level: INITIAL_ENERGY,
            energy_spent: 0.0,
            loot_box_count: 0.0,
            bike: None,
        }
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy_level = energy;
        self.last_energy_level = energy;
        self
    }

    /// Records this round's energy level, adding any drop to `energy_spent`.
    pub fn track_energy(&mut self, current: f64) {
        if current < self.last_energy_level {
            self.energy_spent += self.last_energy_level - current;
        }
        self.last_energy_level = current;
        self.energy_level = current;
    }

    pub fn record_loot_event(&mut self) {
        self.loot_box_count += 1.0;
    }

    /// Average energy spent per loot event so far.
    pub fn average_loot_cost(&self) -> f64 {
        if self.loot_box_count > 0.0 {
            self.energy_spent / self.loot_box_count
        } else {
            0.0
        }
    }

    /// True when a loot event costs more on average than the energy left.
    pub fn is_energy_scarce(&self) -> bool {
        self.average_loot_cost() > self.energy_level
    }
}
