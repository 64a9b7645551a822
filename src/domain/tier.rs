use serde::Serialize;

use super::Fact;

/// A named stage of difficulty with its own set of facts.
///
/// Tiers are only built by [`crate::catalog::FactCatalog`], which guarantees a
/// non-empty, duplicate-free fact list and contiguous indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tier {
  pub index: usize,
  pub display_name: String,
  pub icon: String,
  pub facts: Vec<Fact>,
}

impl Tier {
  pub fn contains(&self, fact: &Fact) -> bool {
    self.facts.contains(fact)
  }

  /// Header text, e.g. `"🌱 Identity Facts"`
  pub fn title(&self) -> String {
    if self.icon.is_empty() {
      self.display_name.clone()
    } else {
      format!("{} {}", self.icon, self.display_name)
    }
  }
}
