//! Problem selection within the active tier.
//!
//! Facts are drawn uniformly with replacement, so a fact may come up again
//! before every fact in the tier has been seen.

use rand::Rng;

use super::choices::generate_choices_with;
use crate::domain::{Fact, Problem, Tier};
use crate::error::{DrillError, Result};

/// Pick a fact from the tier, or None if it has none
pub fn select_fact<R: Rng + ?Sized>(tier: &Tier, rng: &mut R) -> Option<Fact> {
  if tier.facts.is_empty() {
    return None;
  }
  let idx = rng.random_range(0..tier.facts.len());
  Some(tier.facts[idx])
}

/// Build the next problem for `tier` using the thread RNG
pub fn next_problem(tier: &Tier) -> Result<Problem> {
  next_problem_with(tier, &mut rand::rng())
}

pub fn next_problem_with<R: Rng + ?Sized>(tier: &Tier, rng: &mut R) -> Result<Problem> {
  let fact = select_fact(tier, rng).ok_or_else(|| DrillError::EmptyTier {
    name: tier.display_name.clone(),
  })?;
  let choices = generate_choices_with(fact.product(), rng);
  Ok(Problem::new(fact, choices))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::parse;
  use rand::SeedableRng;
  use rand::rngs::StdRng;
  use std::collections::HashSet;

  fn tier(tokens: &[&str]) -> Tier {
    Tier {
      index: 0,
      display_name: "Test".to_string(),
      icon: String::new(),
      facts: tokens.iter().map(|t| parse(t).unwrap()).collect(),
    }
  }

  #[test]
  fn test_single_fact_tier() {
    let t = tier(&["3×4"]);
    for _ in 0..20 {
      let problem = next_problem(&t).unwrap();
      assert_eq!(problem.fact.token(), "3×4");
      assert_eq!(problem.answer(), 12);
      let mut choices = problem.choices;
      choices.sort_unstable();
      assert_eq!(choices, [11, 12, 13]);
    }
  }

  #[test]
  fn test_selected_fact_is_member_of_tier() {
    let t = tier(&["6×6", "6×7", "6×8", "7×7", "7×8", "8×8"]);
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
      let problem = next_problem_with(&t, &mut rng).unwrap();
      assert!(t.contains(&problem.fact));
      assert!(problem.offers(problem.answer()));
    }
  }

  #[test]
  fn test_selection_reaches_every_fact() {
    let t = tier(&["2×2", "2×3", "2×4", "2×5"]);
    let mut rng = StdRng::seed_from_u64(9);
    let seen: HashSet<Fact> = (0..200).filter_map(|_| select_fact(&t, &mut rng)).collect();
    assert_eq!(seen.len(), 4);
  }

  #[test]
  fn test_empty_tier() {
    let t = tier(&[]);
    assert!(select_fact(&t, &mut rand::rng()).is_none());
    assert!(matches!(next_problem(&t), Err(DrillError::EmptyTier { name }) if name == "Test"));
  }
}
