//! Drill configuration constants and runtime settings.
//!
//! This module centralizes the tunable values of the engine and the built-in
//! tier table. Runtime settings are resolved from `config.toml`, then the
//! environment (including `.env`), then defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ==================== Feedback Configuration ====================

/// Delay between showing feedback and presenting the next problem
pub const FEEDBACK_DELAY_MS: u64 = 2000;

pub const CORRECT_FEEDBACK: &str = "🎉 Excellent! Well done!";

/// Prefix for the incorrect-answer message, followed by the full equation
pub const INCORRECT_FEEDBACK_PREFIX: &str = "Good try!";

// ==================== Choice Configuration ====================

/// Number of wrong answers offered next to the correct product
pub const DISTRACTOR_COUNT: usize = 2;

/// Offsets that mimic common slips, in priority order
pub const COMMON_ERROR_OFFSETS: [i64; 4] = [1, -1, 10, -10];

/// Inclusive range for random backfill distractors
pub const BACKFILL_MIN: u32 = 1;
pub const BACKFILL_MAX: u32 = 50;

/// Random draws before the backfill falls back to an ascending scan
pub const BACKFILL_MAX_ATTEMPTS: u32 = 64;

// ==================== Tier Configuration ====================

/// Built-in tier definition
pub struct TierInfo {
    pub name: &'static str,
    pub icon: &'static str,
    pub facts: &'static [&'static str],
}

/// Built-in tiers in teaching order
pub const TIERS: [TierInfo; 7] = [
    TierInfo {
        name: "Identity Facts",
        icon: "🌱",
        facts: &["1×1", "1×2", "1×3", "1×4", "1×5", "1×6", "1×7", "1×8", "1×9", "1×10"],
    },
    TierInfo {
        name: "Doubles",
        icon: "👥",
        facts: &["2×2", "2×3", "2×4", "2×5", "2×6", "2×7", "2×8", "2×9"],
    },
    TierInfo {
        name: "Counting by 5s",
        icon: "🖐️",
        facts: &["5×5", "5×6", "5×7", "5×8", "5×9"],
    },
    TierInfo {
        name: "Easy Patterns",
        icon: "🔢",
        facts: &["11×11", "11×2", "11×3", "11×4", "11×5"],
    },
    TierInfo {
        name: "Tricky Threes",
        icon: "🎯",
        facts: &["3×3", "3×4", "3×6", "3×7", "3×8"],
    },
    TierInfo {
        name: "Fantastic Fours",
        icon: "🎪",
        facts: &["4×4", "4×6", "4×7", "4×8", "4×9"],
    },
    TierInfo {
        name: "Challenging Mix",
        icon: "🚀",
        facts: &["6×6", "6×7", "6×8", "7×7", "7×8", "8×8"],
    },
];

// ==================== Runtime Settings ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    drill: Option<DrillSection>,
}

#[derive(Debug, Default, Deserialize)]
struct DrillSection {
    feedback_delay_ms: Option<u64>,
    auto_advance_streak: Option<u32>,
    catalog_path: Option<String>,
}

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct DrillSettings {
    pub feedback_delay: Duration,
    /// Move to the next tier after this many consecutive correct answers.
    /// `None` keeps tier selection manual.
    pub auto_advance_streak: Option<u32>,
    /// TOML catalog replacing the built-in tiers
    pub catalog_path: Option<PathBuf>,
}

impl Default for DrillSettings {
    fn default() -> Self {
        Self {
            feedback_delay: Duration::from_millis(FEEDBACK_DELAY_MS),
            auto_advance_streak: None,
            catalog_path: None,
        }
    }
}

/// Load settings with priority: config.toml > .env > default
pub fn load_settings() -> DrillSettings {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    load_settings_from(Path::new("config.toml"))
}

/// Load settings from a specific config file, falling back to the environment
pub fn load_settings_from(path: &Path) -> DrillSettings {
    let section = read_config_file(path).and_then(|c| c.drill).unwrap_or_default();
    let mut settings = DrillSettings::default();

    // Priority 1: config file
    // Priority 2: environment
    match section.feedback_delay_ms.or_else(|| env_parse("DRILL_FEEDBACK_DELAY_MS")) {
        Some(ms) => settings.feedback_delay = Duration::from_millis(ms),
        None => tracing::debug!("Using default feedback delay: {}ms", FEEDBACK_DELAY_MS),
    }

    settings.auto_advance_streak = section
        .auto_advance_streak
        .or_else(|| env_parse("DRILL_AUTO_ADVANCE_STREAK"))
        .filter(|&n| n > 0);

    settings.catalog_path = section
        .catalog_path
        .or_else(|| std::env::var("DRILL_CATALOG_PATH").ok())
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    if let Some(path) = &settings.catalog_path {
        tracing::info!("Using tier catalog from {}", path.display());
    }

    settings
}

fn read_config_file(path: &Path) -> Option<AppConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => {
            tracing::info!("Loaded drill settings from {}", path.display());
            Some(config)
        }
        Err(e) => {
            tracing::warn!("Ignoring invalid {}: {}", path.display(), e);
            None
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a number", key, value);
            None
        }
    }
}
