//! Multiple choice generation.
//!
//! Wrong answers are built the way children actually slip: off by one, or off
//! by ten. Random numbers only fill in when those candidates run out.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config;
use crate::domain::CHOICE_COUNT;

/// Generate the answer buttons for `correct` using the thread RNG
pub fn generate_choices(correct: u32) -> [u32; CHOICE_COUNT] {
  generate_choices_with(correct, &mut rand::rng())
}

/// Generate the answer buttons for `correct`.
///
/// Returns `correct` plus two distinct positive distractors, in uniformly
/// random order.
pub fn generate_choices_with<R: Rng + ?Sized>(correct: u32, rng: &mut R) -> [u32; CHOICE_COUNT] {
  let mut distractors = common_error_distractors(correct);
  backfill(correct, &mut distractors, rng);

  let mut choices = [correct, distractors[0], distractors[1]];
  // Fisher-Yates
  choices.shuffle(rng);
  choices
}

/// Offset candidates that survive filtering, in priority order
pub(crate) fn common_error_distractors(correct: u32) -> Vec<u32> {
  let mut distractors = Vec::with_capacity(config::DISTRACTOR_COUNT);
  for offset in config::COMMON_ERROR_OFFSETS {
    if distractors.len() == config::DISTRACTOR_COUNT {
      break;
    }
    let Ok(candidate) = u32::try_from(i64::from(correct) + offset) else {
      continue;
    };
    if candidate > 0 && candidate != correct && !distractors.contains(&candidate) {
      distractors.push(candidate);
    }
  }
  distractors
}

/// Top up `distractors` to the required count with random values.
///
/// Random draws are capped; after that an ascending scan from the bottom of
/// the range picks the first free values, running past the range if needed.
pub(crate) fn backfill<R: Rng + ?Sized>(correct: u32, distractors: &mut Vec<u32>, rng: &mut R) {
  let usable = |v: u32, taken: &[u32]| v != correct && !taken.contains(&v);

  let mut attempts = 0;
  while distractors.len() < config::DISTRACTOR_COUNT && attempts < config::BACKFILL_MAX_ATTEMPTS {
    attempts += 1;
    let candidate = rng.random_range(config::BACKFILL_MIN..=config::BACKFILL_MAX);
    if usable(candidate, distractors.as_slice()) {
      distractors.push(candidate);
    }
  }

  let mut candidate = config::BACKFILL_MIN;
  while distractors.len() < config::DISTRACTOR_COUNT {
    if usable(candidate, distractors.as_slice()) {
      distractors.push(candidate);
    }
    candidate += 1;
  }

  if attempts > 0 {
    tracing::debug!("Backfilled distractors for {} after {} draws", correct, attempts);
  }
}
