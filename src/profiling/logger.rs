//! JSONL file logger for profiling events.

#![allow(dead_code)]

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use super::event::{EventType, ProfileEvent};

/// Directory the profile files are written to
const PROFILE_DIR: &str = "data";

/// Global logger instance - must be initialized via init().
static LOGGER: Mutex<Option<ProfileLogger>> = Mutex::new(None);

/// Event counter for run statistics.
static EVENT_COUNT: AtomicU64 = AtomicU64::new(0);

/// The profile logger that writes events to a JSONL file.
pub struct ProfileLogger {
    writer: BufWriter<File>,
    run_id: String,
}

impl ProfileLogger {
    /// Create a new logger with a timestamped filename.
    fn new() -> std::io::Result<Self> {
        let run_id = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let filename = format!("{}/profile_{}.jsonl", PROFILE_DIR, run_id);

        create_dir_all(PROFILE_DIR)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&filename)?;

        tracing::info!("Profiling enabled: writing to {}", filename);

        Ok(Self {
            writer: BufWriter::new(file),
            run_id,
        })
    }

    /// Write an event to the log file.
    fn log(&mut self, event: ProfileEvent) {
        if let Ok(json) = serde_json::to_string(&event) {
            let _ = writeln!(self.writer, "{}", json);
            // Flush every 100 events
            if EVENT_COUNT.load(Ordering::Relaxed) % 100 == 0 {
                let _ = self.writer.flush();
            }
            tracing::trace!("[PROFILE] {}", json);
        }
        EVENT_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Initialize the profiler. Call this from main() before any logging.
pub fn init() {
    let Ok(mut guard) = LOGGER.lock() else {
        tracing::error!("Profiler lock poisoned");
        return;
    };
    if guard.is_some() {
        tracing::warn!("Profiler already initialized");
        return;
    }

    match ProfileLogger::new() {
        Ok(logger) => {
            let run_id = logger.run_id.clone();
            *guard = Some(logger);

            // Release lock before logging
            drop(guard);
            log_event(EventType::ProfilerStart { run_id });
        }
        Err(e) => {
            tracing::error!("Failed to initialize profiler: {}", e);
        }
    }
}

/// Shutdown the profiler and flush remaining events.
pub fn shutdown() {
    let total_events = EVENT_COUNT.load(Ordering::Relaxed);
    log_event(EventType::ProfilerEnd { total_events });

    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.flush();
            tracing::info!("Profiling ended: {} events logged", total_events);
        }
        *guard = None;
    }
}

fn write(event: ProfileEvent) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(event);
        }
    }
}

/// Log a profiling event.
pub fn log_event(event_type: EventType) {
    write(ProfileEvent::new(event_type));
}

/// Log a profiling event with additional metadata.
pub fn log_event_with_meta(event_type: EventType, metadata: serde_json::Value) {
    write(ProfileEvent::with_metadata(event_type, metadata));
}

/// Log a timed scope completion.
pub fn log_timed(name: &str, duration: Duration) {
    write(ProfileEvent::with_duration(
        EventType::TimedScope {
            name: name.to_string(),
        },
        duration,
    ));
}
