//! Operation telemetry: what ran, on what size, and how long it took.
//!
//! The pixel operations themselves never measure or record anything.
//! [`Session::apply`](crate::Session::apply) times each operation with a
//! caller-supplied [`Clock`] and appends an [`OperationRecord`] to a
//! caller-supplied [`TelemetrySink`].
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::operation::Operation;
use crate::types::Dimensions;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// A monotonic time source.
///
/// Kept abstract so the engine has no opinion on the platform clock;
/// native callers wrap `std::time::Instant`, tests can use a fake.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// One completed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// The operation and its parameters.
    pub operation: Operation,
    /// Buffer dimensions before the operation.
    pub input: Dimensions,
    /// Buffer dimensions after the operation.
    pub output: Dimensions,
    /// Wall-clock duration (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Append-only consumer of [`OperationRecord`]s.
pub trait TelemetrySink {
    /// Record one completed operation.
    fn record(&mut self, record: OperationRecord);
}

impl TelemetrySink for Vec<OperationRecord> {
    fn record(&mut self, record: OperationRecord) {
        self.push(record);
    }
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for &mut T {
    fn record(&mut self, record: OperationRecord) {
        (**self).record(record);
    }
}

/// A sink that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&mut self, _record: OperationRecord) {}
}

/// In-memory sink that keeps records in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySink {
    records: Vec<OperationRecord>,
}

impl MemorySink {
    /// An empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// All records so far, oldest first.
    #[must_use]
    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all recorded durations.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.records.iter().map(|r| r.duration).sum()
    }

    /// Format the records as a human-readable table.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Operation Log\n{}", "=".repeat(60)));
        lines.push(format!("{:<32} {:>13} {:>10}", "Operation", "Size", "Duration"));
        lines.push("-".repeat(60));

        for record in &self.records {
            let size = if record.input == record.output {
                record.output.to_string()
            } else {
                format!("{}->{}", record.input, record.output)
            };
            lines.push(format!(
                "{:<32} {size:>13} {:>8.3}ms",
                record.operation.to_string(),
                duration_ms(record.duration),
            ));
        }

        lines.push(String::new());
        let total = duration_ms(self.total_duration());
        #[allow(clippy::cast_precision_loss)]
        let mean = if self.records.is_empty() {
            0.0
        } else {
            total / self.records.len() as f64
        };
        lines.push(format!(
            "{} operations, total {total:.3}ms, mean {mean:.3}ms",
            self.records.len(),
        ));

        lines.join("\n")
    }
}

impl TelemetrySink for MemorySink {
    fn record(&mut self, record: OperationRecord) {
        self.records.push(record);
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
#[must_use]
pub fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
