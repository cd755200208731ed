use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A "worker is available now" signal produced by a missed call.
///
/// The timestamp is kept as the RFC 3339 string that was written so that a
/// hand-edited entry with an odd format does not poison the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEvent {
    pub phone_number: String,
    pub timestamp: String,
}

impl AvailabilityEvent {
    pub fn new(phone_number: &str, at: DateTime<Utc>) -> Self {
        Self {
            phone_number: phone_number.to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// Parsed timestamp, `None` when the stored string is not RFC 3339.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissedCallStatus {
    Available,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissedCallResponse {
    pub status: MissedCallStatus,
    pub worker_id: u64,
    pub phone_number: String,
    pub recorded_at: String,
}
