//! Decision Logger
//!
//! Append-only JSONL log of every decision handed to the orchestrator.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use bike_events::{generate_decision_id, AgentId, DecisionEvent, DecisionKind};
use tracing::warn;

/// Writes decision events to a JSONL file
pub struct DecisionLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
    next_sequence: u64,
}

impl DecisionLogger {
    /// Create a logger writing to `path`, truncating any previous run
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
            next_sequence: 1,
        })
    }

    /// Create a logger that discards events (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
            next_sequence: 1,
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Log one decision and return the id it was given
    pub fn log(&mut self, round: u32, agent: AgentId, kind: DecisionKind) -> std::io::Result<String> {
        let event_id = generate_decision_id(self.next_sequence);
        self.next_sequence += 1;
        self.event_count += 1;

        if let Some(ref mut writer) = self.writer {
            let event = DecisionEvent::new(event_id.clone(), round, agent, kind);
            writeln!(writer, "{}", event.to_jsonl()?)?;
        }
        Ok(event_id)
    }

    /// Log queued decisions in queue order
    pub fn log_pending(&mut self, round: u32, pending: &mut PendingDecisions) -> std::io::Result<usize> {
        let drained = pending.drain();
        let count = drained.len();
        for (agent, kind) in drained {
            self.log(round, agent, kind)?;
        }
        Ok(count)
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for DecisionLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to flush decision log");
        }
    }
}

/// Decisions collected during a round, logged once the round is over
#[derive(Debug, Default)]
pub struct PendingDecisions {
    decisions: Vec<(AgentId, DecisionKind)>,
}

impl PendingDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, agent: AgentId, kind: DecisionKind) {
        self.decisions.push((agent, kind));
    }

    pub fn extend(&mut self, decisions: impl IntoIterator<Item = (AgentId, DecisionKind)>) {
        self.decisions.extend(decisions);
    }

    pub fn drain(&mut self) -> Vec<(AgentId, DecisionKind)> {
        std::mem::take(&mut self.decisions)
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bike_events::LootBoxId;
    use std::io::BufRead;

    fn proposal() -> DecisionKind {
        DecisionKind::DirectionProposed {
            loot_box: LootBoxId::from_u128(0xc1),
            regime: "all_weak".to_string(),
        }
    }

    #[test]
    fn test_decision_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");
        let agent = AgentId::from_u128(0xa1);

        let mut logger = DecisionLogger::new(&path).unwrap();
        let id = logger.log(3, agent, proposal()).unwrap();
        logger.flush().unwrap();
        assert_eq!(id, "dec_00000001");

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file).lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 1);

        let parsed = DecisionEvent::from_jsonl(&lines[0]).unwrap();
        assert_eq!(parsed.event_id, "dec_00000001");
        assert_eq!(parsed.round, 3);
        assert_eq!(parsed.agent, agent);
        assert_eq!(parsed.kind, proposal());
    }

    #[test]
    fn test_null_logger() {
        let mut logger = DecisionLogger::null();
        let agent = AgentId::from_u128(1);

        assert_eq!(logger.log(0, agent, proposal()).unwrap(), "dec_00000001");
        assert_eq!(logger.log(0, agent, proposal()).unwrap(), "dec_00000002");
        assert_eq!(logger.event_count(), 2);
    }

    #[test]
    fn test_pending_decisions() {
        let mut pending = PendingDecisions::new();
        assert!(pending.is_empty());

        pending.push(AgentId::from_u128(1), proposal());
        pending.extend([(AgentId::from_u128(2), proposal())]);
        assert_eq!(pending.len(), 2);

        let mut logger = DecisionLogger::null();
        assert_eq!(logger.log_pending(1, &mut pending).unwrap(), 2);
        assert!(pending.is_empty());
        assert_eq!(logger.event_count(), 2);
    }
}
