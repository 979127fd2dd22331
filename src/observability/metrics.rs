//! Delivery metrics.
//!
//! # Metrics
//! - `logger_service_events_total` (counter): events written, by target and level
//! - `logger_service_delivery_failures_total` (counter): failed writes, by target

use crate::service::LogLevel;

pub const EVENTS_TOTAL: &str = "logger_service_events_total";
pub const DELIVERY_FAILURES_TOTAL: &str = "logger_service_delivery_failures_total";

pub fn record_delivery(target: &str, level: LogLevel) {
    metrics::counter!(
        EVENTS_TOTAL,
        "target" => target.to_string(),
        "level" => level.as_str()
    )
    .increment(1);
}

pub fn record_failure(target: &str) {
    metrics::counter!(DELIVERY_FAILURES_TOTAL, "target" => target.to_string()).increment(1);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

    /// Current value of counter `name` for `target`, summed across other labels.
    pub(crate) fn counter(snapshotter: &Snapshotter, name: &str, target: &str) -> u64 {
        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, ..)| {
                key.key().name() == name
                    && key
                        .key()
                        .labels()
                        .any(|label| label.key() == "target" && label.value() == target)
            })
            .map(|(.., value)| match value {
                DebugValue::Counter(n) => n,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_counters_are_labelled_by_target() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_delivery("udp", LogLevel::Info);
            record_delivery("udp", LogLevel::Warn);
            record_delivery("console", LogLevel::Info);
            record_failure("udp");
        });

        assert_eq!(counter(&snapshotter, EVENTS_TOTAL, "udp"), 2);
        assert_eq!(counter(&snapshotter, EVENTS_TOTAL, "console"), 1);
        assert_eq!(counter(&snapshotter, DELIVERY_FAILURES_TOTAL, "udp"), 1);
        assert_eq!(counter(&snapshotter, DELIVERY_FAILURES_TOTAL, "console"), 0);
    }
}
