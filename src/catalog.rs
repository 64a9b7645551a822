//! Tier catalog: the ordered list of fact groups a learner works through.
//!
//! Catalogs are validated in full when they are built, so a bad fact token or
//! an empty tier stops startup instead of surfacing mid-session.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::config::{self, DrillSettings};
use crate::domain::{self, Tier};
use crate::error::{DrillError, Result};

/// One tier as written in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TierDefinition {
  pub name: String,
  #[serde(default)]
  pub icon: String,
  pub facts: Vec<String>,
}

/// TOML catalog file: a list of `[[tiers]]` tables
#[derive(Debug, Deserialize)]
struct CatalogFile {
  tiers: Vec<TierDefinition>,
}

#[derive(Debug, Clone)]
pub struct FactCatalog {
  tiers: Vec<Tier>,
}

impl FactCatalog {
  /// Build and validate a catalog. Tier indices follow definition order.
  pub fn from_definitions(definitions: Vec<TierDefinition>) -> Result<Self> {
    if definitions.is_empty() {
      return Err(DrillError::Config("catalog has no tiers".to_string()));
    }

    let mut tiers = Vec::with_capacity(definitions.len());
    for (index, def) in definitions.into_iter().enumerate() {
      if def.facts.is_empty() {
        return Err(DrillError::EmptyTier { name: def.name });
      }

      let mut seen = HashSet::new();
      let mut facts = Vec::with_capacity(def.facts.len());
      for token in &def.facts {
        let fact = domain::parse(token)?;
        if !seen.insert(fact) {
          return Err(DrillError::DuplicateFact {
            tier: def.name,
            token: fact.token(),
          });
        }
        facts.push(fact);
      }

      tiers.push(Tier {
        index,
        display_name: def.name,
        icon: def.icon,
        facts,
      });
    }

    tracing::debug!("Loaded catalog with {} tiers", tiers.len());
    Ok(Self { tiers })
  }

  /// The built-in seven tiers, from identity facts to the challenging mix
  pub fn builtin() -> Result<Self> {
    let definitions = config::TIERS
      .iter()
      .map(|t| TierDefinition {
        name: t.name.to_string(),
        icon: t.icon.to_string(),
        facts: t.facts.iter().map(|f| f.to_string()).collect(),
      })
      .collect();
    Self::from_definitions(definitions)
  }

  pub fn from_toml_str(contents: &str) -> Result<Self> {
    let file: CatalogFile =
      toml::from_str(contents).map_err(|e| DrillError::Config(format!("invalid catalog: {}", e)))?;
    Self::from_definitions(file.tiers)
  }

  pub fn load(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| DrillError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    Self::from_toml_str(&contents)
  }

  /// Catalog named by the settings, or the built-in one
  pub fn from_settings(settings: &DrillSettings) -> Result<Self> {
    match &settings.catalog_path {
      Some(path) => Self::load(path),
      None => Self::builtin(),
    }
  }

  pub fn tier_at(&self, index: usize) -> Result<&Tier> {
    self.tiers.get(index).ok_or(DrillError::OutOfRange {
      index,
      count: self.tiers.len(),
    })
  }

  pub fn tier_count(&self) -> usize {
    self.tiers.len()
  }

  pub fn tiers(&self) -> &[Tier] {
    &self.tiers
  }

  /// Index of the tier after `current`, staying on the last tier
  pub fn advance_tier(&self, current: usize) -> usize {
    current
      .saturating_add(1)
      .min(self.tiers.len().saturating_sub(1))
  }
}
