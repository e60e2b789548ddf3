//! Application telemetry events and sinks.
//!
//! Aggregation passes are slow, so callers benefit from structured progress
//! signals alongside the `tracing` log stream. Events never leave the
//! process; the binary can mirror them to stderr as JSON lines.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by mergescope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A crawl finished and produced the given number of summaries.
    CrawlCompleted {
        /// States crawled, in request order.
        states: Vec<String>,
        /// Summaries left after filtering and deduplication.
        merge_requests: u64,
    },
    /// Progress after one merge request was merged or skipped.
    ProgressUpdated {
        /// Project-local merge request number.
        iid: u64,
        /// Units handled so far, processed or skipped.
        completed: u64,
        /// Units requested for the pass.
        requested: u64,
        /// Projected whole seconds left.
        remaining_seconds: u64,
    },
    /// A merge request was left out after a non-fatal failure.
    UnitSkipped {
        /// Project-local merge request number.
        iid: u64,
        /// Failure description.
        reason: String,
    },
    /// An aggregation pass ended, completely or not.
    AggregationFinished {
        /// Units merged into the result.
        processed: u64,
        /// Units requested for the pass.
        requested: u64,
        /// Units skipped after failures.
        skipped: u64,
        /// True when every requested unit was merged.
        complete: bool,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// This is intended for local debugging and is not transmitted anywhere.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

/// Sinks for asserting on emitted events.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::Mutex;

    use super::{TelemetryEvent, TelemetrySink};

    /// Keeps every recorded event in memory.
    #[derive(Debug, Default)]
    pub struct RecordingTelemetrySink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingTelemetrySink {
        /// Removes and returns the events recorded so far.
        #[must_use]
        pub fn take(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .map(|mut events| events.drain(..).collect())
                .unwrap_or_default()
        }
    }

    impl TelemetrySink for RecordingTelemetrySink {
        fn record(&self, event: TelemetryEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingTelemetrySink;
    use super::{TelemetryEvent, TelemetrySink};

    #[test]
    fn recording_sink_captures_events() {
        let sink = RecordingTelemetrySink::default();
        sink.record(TelemetryEvent::UnitSkipped {
            iid: 4,
            reason: "network error".to_owned(),
        });

        assert_eq!(
            sink.take(),
            vec![TelemetryEvent::UnitSkipped {
                iid: 4,
                reason: "network error".to_owned(),
            }]
        );
        assert!(sink.take().is_empty());
    }

    #[test]
    fn events_serialise_with_snake_case_tag() {
        let event = TelemetryEvent::AggregationFinished {
            processed: 2,
            requested: 3,
            skipped: 1,
            complete: false,
        };

        let json = serde_json::to_value(&event).expect("event should serialise");

        assert_eq!(json["type"], "aggregation_finished");
        assert_eq!(json["complete"], false);
    }
}
