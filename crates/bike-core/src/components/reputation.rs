//! Reputation Components
//!
//! Each agent's private, multi-axis model of every peer it has observed.
//! Records are owned by the observer and never shared or merged, so two agents'
//! views of the same peer are free to diverge.

use bike_events::{AgentId, Colour, OccupantView};
use std::collections::HashMap;

/// One observer's view of one peer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReputationRecord {
    /// Energy the peer has spent pedalling, accumulated across rounds
    pub history_contribution: f64,
    /// Energy the peer spent pedalling in the latest round only
    pub recent_contribution: f64,
    /// Number of loot events the peer has benefited from
    pub loot_box_get: f64,
    /// Peer's latest observed energy gain
    pub energy_gain: f64,
    /// Peer's latest observed energy level
    pub energy_remain: f64,
    /// Does the peer currently seek the observer's colour?
    pub is_same_colour: bool,
}

impl ReputationRecord {
    /// `is_same_colour` as a 0/1 score term.
    pub fn same_colour_score(&self) -> f64 {
        if self.is_same_colour {
            1.0
        } else {
            0.0
        }
    }

    /// Coarse leader-shortlist score (unweighted sum).
    pub fn shortlist_score(&self) -> f64 {
        self.history_contribution + self.loot_box_get + self.same_colour_score() + self.energy_remain
    }

    /// Score used by the Ration allocation strategy.
    ///
    /// Affinity + merit + recent effort - prior reward + need.
    pub fn ration_score(&self) -> f64 {
        self.same_colour_score()
            + self.history_contribution
            + self.loot_box_get
            + self.recent_contribution
            - self.energy_gain
            + self.energy_remain
    }
}

/// What an observer saw a peer do during one round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerObservation {
    /// Energy the peer spent pedalling this round
    pub energy_spent: f64,
    /// Whether the peer's last action yielded loot
    pub received_loot: bool,
    pub energy_gained: f64,
    pub energy_level: f64,
    /// Colour the peer is currently seeking
    pub colour: Colour,
}

impl From<&OccupantView> for PeerObservation {
    fn from(view: &OccupantView) -> Self {
        Self {
            energy_spent: view.energy_spent,
            received_loot: view.received_loot,
            energy_gained: view.energy_gained,
            energy_level: view.energy_level,
            colour: view.colour,
        }
    }
}

/// Per-agent reputation map keyed by peer.
///
/// The owning agent is the observer, so the effective key is
/// `(observer, peer)`.
#[derive(Debug, Clone)]
pub struct ReputationTracker {
    observer: AgentId,
    observer_colour: Colour,
    records: HashMap<AgentId, ReputationRecord>,
}

impl ReputationTracker {
    pub fn new(observer: AgentId, observer_colour: Colour) -> Self {
        Self {
            observer,
            observer_colour,
            records: HashMap::new(),
        }
    }

    pub fn observer(&self) -> AgentId {
        self.observer
    }

    pub fn observer_colour(&self) -> Colour {
        self.observer_colour
    }

    /// Changes the colour `is_same_colour` is tested against on later updates.
    pub fn set_observer_colour(&mut self, colour: Colour) {
        self.observer_colour = colour;
    }

    /// Merges one round's observation of `peer` into its record.
    ///
    /// `history_contribution` and `loot_box_get` accumulate, so the caller must
    /// apply each round's observation exactly once.
    pub fn update(&mut self, peer: AgentId, observation: &PeerObservation) {
        let observer_colour = self.observer_colour;
        let record = self.records.entry(peer).or_default();

        record.recent_contribution = observation.energy_spent;
        record.history_contribution += observation.energy_spent;
        if observation.received_loot {
            record.loot_box_get += 1.0;
        }
        record.is_same_colour = observation.colour == observer_colour;
        record.energy_gain = observation.energy_gained;
        record.energy_remain = observation.energy_level;
    }

    /// Record for `peer`, or a zero record if it has never been observed.
    pub fn get(&self, peer: AgentId) -> ReputationRecord {
        self.records.get(&peer).copied().unwrap_or_default()
    }

    pub fn has_observed(&self, peer: AgentId) -> bool {
        self.records.contains_key(&peer)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean of `field` over `peers`; 0.0 for an empty set.
    pub fn mean_over<F>(&self, peers: &[AgentId], field: F) -> f64
    where
        F: Fn(&ReputationRecord) -> f64,
    {
        if peers.is_empty() {
            return 0.0;
        }
        let sum: f64 = peers.iter().map(|p| field(&self.get(*p))).sum();
        sum / peers.len() as f64
    }
}
