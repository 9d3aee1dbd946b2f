use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// One timestamped, tagged, multi-field observation bound for the
/// time-series destination.
#[derive(Debug, Clone)]
pub struct Point {
    pub measurement: String,
    /// Low-cardinality indexed attributes.
    pub tags: BTreeMap<String, String>,
    /// Flattened record attributes.
    pub fields: BTreeMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    /// Build a point stamped with the current wall-clock time. This is the
    /// write time, not the emission time the record itself may carry.
    ///
    /// No validation of tag or field cardinality or naming happens here;
    /// that is the destination's concern.
    pub fn now(
        measurement: impl Into<String>,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, Value>,
    ) -> Self {
        Point {
            measurement: measurement.into(),
            tags,
            fields,
            timestamp: Utc::now(),
        }
    }

    /// Nanoseconds since the Unix epoch, for on-the-wire encoding.
    pub fn timestamp_ns(&self) -> i64 {
        self.timestamp.timestamp_nanos_opt().unwrap_or_default()
    }
}
