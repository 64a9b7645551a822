//! Event types for profiling.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A profiling event with timestamp and optional duration.
#[derive(Serialize)]
pub struct ProfileEvent {
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The type of event
    pub event_type: EventType,
    /// Duration in microseconds (for timed events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<u64>,
    /// Additional metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ProfileEvent {
    /// Create a new event with the current timestamp.
    pub fn new(event_type: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            duration_us: None,
            metadata: None,
        }
    }

    /// Create a new event with duration.
    pub fn with_duration(event_type: EventType, duration: std::time::Duration) -> Self {
        Self {
            duration_us: Some(duration.as_micros() as u64),
            ..Self::new(event_type)
        }
    }

    /// Create a new event with metadata.
    pub fn with_metadata(event_type: EventType, metadata: serde_json::Value) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::new(event_type)
        }
    }
}

/// Types of events that can be logged.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    // === Profiler lifecycle ===
    /// Profiling run started
    ProfilerStart {
        run_id: String,
    },
    /// Profiling run ended
    ProfilerEnd {
        /// Total events logged
        total_events: u64,
    },

    // === Drill session ===
    /// A learner entered game mode
    SessionStart {
        learner_id: String,
        tier: usize,
    },
    /// Session restarted or moved to another tier
    TierChanged {
        learner_id: String,
        from: usize,
        to: usize,
        /// True when triggered by a correct-answer streak
        automatic: bool,
    },

    // === Problems ===
    /// A problem was put on screen
    ProblemPresented {
        fact: String,
        choices: Vec<u32>,
    },
    /// An answer was scored
    AnswerEvaluated {
        fact: String,
        /// correct, incorrect or not_offered
        result: String,
        /// Time from presentation to answer
        latency_ms: i64,
    },
    /// A deferred advance arrived for a superseded session
    AdvanceDiscarded {
        learner_id: String,
        generation: u64,
    },

    // === Timed scope ===
    /// A timed code block completed
    TimedScope {
        /// Name of the scope
        name: String,
    },
}
