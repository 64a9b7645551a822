//! Answer checking for multiple choice problems.
//!
//! Evaluation is pure: it only looks at the problem and the submitted value.
//! Routing the outcome into session stats and the mastery ledger is the
//! engine's job.

use serde::{Deserialize, Serialize};

use crate::config;
use crate::domain::Problem;

/// Result of answer validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerResult {
  Correct,
  /// One of the offered distractors
  Incorrect,
  /// A value that was never on screen. Points at an integration bug, so it
  /// is scored like a wrong answer instead of failing.
  NotOffered,
}

impl AnswerResult {
  pub fn is_correct(&self) -> bool {
    matches!(self, Self::Correct)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Correct => "correct",
      Self::Incorrect => "incorrect",
      Self::NotOffered => "not_offered",
    }
  }
}

/// Feedback for one submitted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
  pub result: AnswerResult,
  pub is_correct: bool,
  pub message: String,
}

/// Score `submitted` against the problem on screen.
///
/// A wrong answer always spells out the full equation so the learner can
/// correct themselves straight away.
pub fn evaluate(problem: &Problem, submitted: u32) -> Evaluation {
  let result = if submitted == problem.answer() {
    AnswerResult::Correct
  } else if problem.offers(submitted) {
    AnswerResult::Incorrect
  } else {
    AnswerResult::NotOffered
  };

  let message = if result.is_correct() {
    config::CORRECT_FEEDBACK.to_string()
  } else {
    format!("{} {}", config::INCORRECT_FEEDBACK_PREFIX, problem.fact.equation())
  };

  Evaluation {
    result,
    is_correct: result.is_correct(),
    message,
  }
}
