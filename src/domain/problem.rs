use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Fact;

/// Number of answer buttons shown for a problem
pub const CHOICE_COUNT: usize = 3;

/// The fact on screen plus its shuffled answer choices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
  pub fact: Fact,
  pub choices: [u32; CHOICE_COUNT],
  pub presented_at: DateTime<Utc>,
}

impl Problem {
  pub fn new(fact: Fact, choices: [u32; CHOICE_COUNT]) -> Self {
    Self {
      fact,
      choices,
      presented_at: Utc::now(),
    }
  }

  pub fn answer(&self) -> u32 {
    self.fact.product()
  }

  /// Whether `choice` is one of the buttons shown to the learner
  pub fn offers(&self, choice: u32) -> bool {
    self.choices.contains(&choice)
  }

  /// Prompt text, e.g. `"6 × 7 = ?"`
  pub fn prompt(&self) -> String {
    format!("{} × {} = ?", self.fact.factor1, self.fact.factor2)
  }

  /// Milliseconds since the problem was presented
  pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
    (now - self.presented_at).num_milliseconds().max(0)
  }
}
