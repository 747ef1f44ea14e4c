//! Decision systems: pure computations over a round snapshot and the agent's
//! own reputation state.

pub mod allocation;
pub mod election;
pub mod perception;
pub mod ranking;
pub mod tally;
pub mod target;

pub use allocation::{allocation_vote, AllocationOutcome, AllocationStrategy};
pub use election::{ElectionOutcome, ElectionResult, LeaderElector, LeaderVoter};
pub use perception::{observe_round, validate_snapshot};
pub use ranking::{dense_ranks, ProposalRanker};
pub use tally::{count_accepts, majority_confirms, tally_direction_ballots, BordaTally};
pub use target::{TargetChoice, TargetInputs, TargetRegime, TargetSelector};
