//! Timing utilities for measuring and formatting durations

use serde::Serialize;
use std::time::{Duration, Instant};

/// A simple timer for measuring elapsed time
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Create a new timer that starts immediately
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration since the timer started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

/// Format a duration into a human-readable string
///
/// - Durations >= 1 second: "1.23s"
/// - Durations >= 1 millisecond: "456ms"
/// - Durations < 1 millisecond: "< 1ms"
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();

    if millis == 0 {
        "< 1ms".to_string()
    } else if millis >= 1000 {
        let secs = duration.as_secs_f64();
        format!("{:.2}s", secs)
    } else {
        format!("{}ms", millis)
    }
}

/// Wall-clock split of one pipeline run
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunTiming {
    /// Walking the tree
    #[serde(serialize_with = "as_millis")]
    pub discovery: Duration,
    /// Reading, analysing and fixing every file
    #[serde(serialize_with = "as_millis")]
    pub processing: Duration,
}

impl RunTiming {
    pub fn total(&self) -> Duration {
        self.discovery + self.processing
    }

    pub fn total_formatted(&self) -> String {
        format_duration(self.total())
    }
}

fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
