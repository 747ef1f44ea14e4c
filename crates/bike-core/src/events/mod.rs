//! Decision log output.

pub mod logger;

pub use logger::{DecisionLogger, PendingDecisions};
