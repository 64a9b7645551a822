//! Optional drill event log.
//!
//! With the `profiling` feature enabled, drill events (problems presented,
//! answers scored, tier changes, discarded advances) are appended as JSON
//! lines to `data/profile_<timestamp>.jsonl`. Without it every entry point
//! below compiles to nothing.
//!
//! ```ignore
//! use times_drill::profile_log;
//!
//! profile_log!(times_drill::profiling::EventType::TierChanged {
//!     learner_id: "maya".into(),
//!     from: 0,
//!     to: 1,
//!     automatic: false,
//! });
//! ```

#[cfg(feature = "profiling")]
mod event;
#[cfg(feature = "profiling")]
mod logger;

#[cfg(feature = "profiling")]
pub use event::*;
#[cfg(feature = "profiling")]
pub use logger::*;

#[cfg(not(feature = "profiling"))]
#[inline(always)]
pub fn init() {}

#[cfg(not(feature = "profiling"))]
#[inline(always)]
pub fn shutdown() {}

/// Log a profiling event. Expands to nothing without the `profiling` feature.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_log {
    ($event_type:expr) => {
        $crate::profiling::log_event($event_type)
    };
    ($event_type:expr, $meta:expr) => {
        $crate::profiling::log_event_with_meta($event_type, $meta)
    };
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_log {
    ($($args:tt)*) => {};
}

/// Execute a block and log its duration.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $body:block) => {{
        let _start = std::time::Instant::now();
        let result = $body;
        $crate::profiling::log_timed($name, _start.elapsed());
        result
    }};
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $body:block) => {
        $body
    };
}
