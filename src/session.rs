//! Session-scoped drill state.
//!
//! A [`SessionContext`] belongs to exactly one learner's game view. The
//! presentation layer owns it and hands it to the engine by reference; nothing
//! here is global. Every reset bumps the generation so deferred work issued
//! for an older session can be recognised and dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Problem;
use crate::scheduler::{AdvanceTicket, PendingAdvance};

/// Identity of the learner, supplied by the profile system
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LearnerId(String);

impl LearnerId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for LearnerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for LearnerId {
  fn from(id: &str) -> Self {
    Self::new(id)
  }
}

impl From<String> for LearnerId {
  fn from(id: String) -> Self {
    Self(id)
  }
}

/// Correct/total counters for one practice session.
///
/// Fields are private so `correct <= total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
  correct: u32,
  total: u32,
}

impl SessionStats {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn correct(&self) -> u32 {
    self.correct
  }

  pub fn total(&self) -> u32 {
    self.total
  }

  /// Count one answer. Total always moves; correct only for right answers.
  #[must_use]
  pub fn record_attempt(self, is_correct: bool) -> Self {
    let total = self.total.saturating_add(1);
    let correct = if is_correct {
      self.correct.saturating_add(1)
    } else {
      self.correct
    };
    Self {
      correct: correct.min(total),
      total,
    }
  }

  /// Share of correct answers in `[0, 1]`, 0 before the first answer
  pub fn progress_ratio(&self) -> f64 {
    (f64::from(self.correct) / f64::from(self.total.max(1))).clamp(0.0, 1.0)
  }

  /// Progress bar width in percent
  pub fn progress_percent(&self) -> u8 {
    (self.progress_ratio() * 100.0).round() as u8
  }
}

impl fmt::Display for SessionStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Session: {}/{} correct", self.correct, self.total)
  }
}

/// Fresh counters for a restarted session
pub fn reset_session() -> SessionStats {
  SessionStats::default()
}

/// Everything the engine needs to know about one learner's active game view
#[derive(Debug)]
pub struct SessionContext {
  learner_id: LearnerId,
  pub(crate) tier_index: usize,
  pub(crate) problem: Option<Problem>,
  pub(crate) stats: SessionStats,
  /// Consecutive correct answers in the current tier
  pub(crate) streak: u32,
  generation: u64,
  /// Bumped for every scheduled advance
  sequence: u64,
  pub(crate) pending: Option<PendingAdvance>,
}

impl SessionContext {
  pub(crate) fn new(learner_id: LearnerId, tier_index: usize) -> Self {
    Self {
      learner_id,
      tier_index,
      problem: None,
      stats: SessionStats::new(),
      streak: 0,
      generation: 0,
      sequence: 0,
      pending: None,
    }
  }

  pub fn learner_id(&self) -> &LearnerId {
    &self.learner_id
  }

  pub fn tier_index(&self) -> usize {
    self.tier_index
  }

  /// Problem currently on screen, None while feedback is showing
  pub fn problem(&self) -> Option<&Problem> {
    self.problem.as_ref()
  }

  pub fn stats(&self) -> SessionStats {
    self.stats
  }

  pub fn streak(&self) -> u32 {
    self.streak
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn has_pending_advance(&self) -> bool {
    self.pending.is_some()
  }

  /// New ticket for this session. No two tickets from one context are equal.
  pub(crate) fn issue_ticket(&mut self) -> AdvanceTicket {
    self.sequence = self.sequence.wrapping_add(1);
    AdvanceTicket {
      learner_id: self.learner_id.clone(),
      generation: self.generation,
      sequence: self.sequence,
    }
  }

  /// Whether a ticket was issued for this learner and this generation
  pub fn is_current(&self, ticket: &AdvanceTicket) -> bool {
    ticket.learner_id == self.learner_id && ticket.generation == self.generation
  }

  /// Drop the pending advance, if any
  pub(crate) fn cancel_pending(&mut self) -> bool {
    match self.pending.take() {
      Some(pending) => {
        pending.cancel();
        true
      }
      None => false,
    }
  }

  /// Start over: cancel deferred work, clear the problem and counters.
  pub(crate) fn reset(&mut self) {
    self.cancel_pending();
    self.generation = self.generation.wrapping_add(1);
    self.problem = None;
    self.stats = reset_session();
    self.streak = 0;
  }
}
