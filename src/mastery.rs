//! Per-learner, per-fact attempt history.
//!
//! Storage belongs to an external collaborator behind [`MasteryLedger`]; the
//! engine only defines the record shape and how one answer updates it.
//! [`InMemoryLedger`] is the reference implementation used by the terminal
//! front end and tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::session::LearnerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryRecord {
  pub attempts: u32,
  pub correct: u32,
  pub last_seen_at: DateTime<Utc>,
}

impl MasteryRecord {
  pub fn new(now: DateTime<Utc>) -> Self {
    Self {
      attempts: 0,
      correct: 0,
      last_seen_at: now,
    }
  }

  /// Apply one evaluated answer
  pub fn apply(&mut self, is_correct: bool, at: DateTime<Utc>) {
    self.attempts = self.attempts.saturating_add(1);
    if is_correct {
      self.correct = self.correct.saturating_add(1);
    }
    self.last_seen_at = at;
  }

  pub fn success_rate(&self) -> f64 {
    if self.attempts > 0 {
      self.correct as f64 / self.attempts as f64
    } else {
      0.0
    }
  }
}

/// Write side of the learner's mastery store
pub trait MasteryLedger {
  fn record_attempt(&mut self, learner: &LearnerId, fact_token: &str, is_correct: bool) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
  records: HashMap<LearnerId, HashMap<String, MasteryRecord>>,
}

impl InMemoryLedger {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&self, learner: &LearnerId, fact_token: &str) -> Option<&MasteryRecord> {
    self.records.get(learner)?.get(fact_token)
  }

  /// All records for a learner, weakest facts first
  pub fn records_for(&self, learner: &LearnerId) -> Vec<(&str, &MasteryRecord)> {
    let mut records: Vec<_> = self
      .records
      .get(learner)
      .map(|facts| facts.iter().map(|(token, r)| (token.as_str(), r)).collect())
      .unwrap_or_default();
    records.sort_by(|a, b| {
      a.1
        .success_rate()
        .total_cmp(&b.1.success_rate())
        .then_with(|| a.0.cmp(b.0))
    });
    records
  }
}

impl MasteryLedger for InMemoryLedger {
  fn record_attempt(&mut self, learner: &LearnerId, fact_token: &str, is_correct: bool) -> Result<()> {
    let now = Utc::now();
    self
      .records
      .entry(learner.clone())
      .or_default()
      .entry(fact_token.to_string())
      .or_insert_with(|| MasteryRecord::new(now))
      .apply(is_correct, now);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn test_record_apply() {
    let start = Utc::now();
    let mut record = MasteryRecord::new(start);
    record.apply(true, start + Duration::seconds(1));
    record.apply(false, start + Duration::seconds(2));

    assert_eq!(record.attempts, 2);
    assert_eq!(record.correct, 1);
    assert_eq!(record.last_seen_at, start + Duration::seconds(2));
    assert!((record.success_rate() - 0.5).abs() < f64::EPSILON);
  }

  #[test]
  fn test_unseen_success_rate_is_zero() {
    assert_eq!(MasteryRecord::new(Utc::now()).success_rate(), 0.0);
  }

  #[test]
  fn test_ledger_keeps_learners_apart() {
    let maya = LearnerId::new("maya");
    let leo = LearnerId::new("leo");
    let mut ledger = InMemoryLedger::new();

    ledger.record_attempt(&maya, "6×7", true).unwrap();
    ledger.record_attempt(&maya, "6×7", false).unwrap();
    ledger.record_attempt(&leo, "6×7", true).unwrap();

    let record = ledger.record(&maya, "6×7").unwrap();
    assert_eq!((record.attempts, record.correct), (2, 1));
    let record = ledger.record(&leo, "6×7").unwrap();
    assert_eq!((record.attempts, record.correct), (1, 1));
    assert!(ledger.record(&leo, "7×8").is_none());
  }

  #[test]
  fn test_records_for_sorted_weakest_first() {
    let maya = LearnerId::new("maya");
    let mut ledger = InMemoryLedger::new();
    ledger.record_attempt(&maya, "2×2", true).unwrap();
    ledger.record_attempt(&maya, "7×8", false).unwrap();
    ledger.record_attempt(&maya, "3×4", true).unwrap();
    ledger.record_attempt(&maya, "3×4", false).unwrap();

    let tokens: Vec<&str> = ledger.records_for(&maya).into_iter().map(|(t, _)| t).collect();
    assert_eq!(tokens, vec!["7×8", "3×4", "2×2"]);
    assert!(ledger.records_for(&LearnerId::new("nobody")).is_empty());
  }
}
