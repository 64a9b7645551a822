//! Error types for the drill engine.
//!
//! Catalog problems (malformed or duplicate facts, empty tiers) are meant to be
//! caught once when the catalog is loaded. Everything a running session can hit
//! is either surfaced to the caller or logged through [`LogOnError`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DrillError>;

#[derive(Debug, Error)]
pub enum DrillError {
  /// A fact token is not `a×b` with two positive integer operands.
  #[error("malformed fact {token:?}: {reason}")]
  MalformedFact { token: String, reason: String },

  /// Tier index outside `[0, tier_count)`.
  #[error("tier index {index} out of range (catalog has {count} tiers)")]
  OutOfRange { index: usize, count: usize },

  #[error("tier {name:?} has no facts")]
  EmptyTier { name: String },

  #[error("tier {tier:?} lists {token} more than once")]
  DuplicateFact { tier: String, token: String },

  /// An answer was submitted while no problem was on screen.
  #[error("no problem is active for learner {learner}")]
  NoActiveProblem { learner: String },

  /// The mastery ledger collaborator rejected a write.
  #[error("mastery ledger: {0}")]
  Ledger(String),

  #[error("configuration: {0}")]
  Config(String),

  /// The feedback-delay timer could not be started.
  #[error("scheduler: {0}")]
  Scheduler(String),
}

impl DrillError {
  pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
    Self::MalformedFact {
      token: token.to_string(),
      reason: reason.into(),
    }
  }
}

/// Extension trait for logging errors that should not end a session
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }
}
