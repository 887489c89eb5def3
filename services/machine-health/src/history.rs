//! Bounded, most-recent-first log of session predictions

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::predictor::PredictionResponse;
use crate::schema::{MachineType, TelemetryReading};

/// Maximum number of entries kept in the session log
pub const HISTORY_LIMIT: usize = 5;

/// Probabilities strictly above this are reported as imminent failure
pub const FAILURE_THRESHOLD: f64 = 0.5;

/// Machine health classification of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Normal,
    #[serde(rename = "Failure Imminent")]
    FailureImminent,
}

impl HealthStatus {
    pub fn from_probability(probability: f64) -> Self {
        if probability > FAILURE_THRESHOLD {
            HealthStatus::FailureImminent
        } else {
            HealthStatus::Normal
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Normal => write!(f, "Normal"),
            HealthStatus::FailureImminent => write!(f, "Failure Imminent"),
        }
    }
}

/// One logged prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp_epoch_ms: u64,
    pub status: HealthStatus,
    pub probability: f64,
    pub machine_type: MachineType,
}

impl HistoryEntry {
    pub fn new(
        response: &PredictionResponse,
        reading: &TelemetryReading,
        timestamp_epoch_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp_epoch_ms,
            status: response.status(),
            probability: response.failure_probability,
            machine_type: reading.machine_type(),
        }
    }
}

/// Build an entry for `response` and return a new log with it in front.
///
/// The input log is left untouched; the result holds at most
/// [`HISTORY_LIMIT`] entries.
pub fn record(
    log: &[HistoryEntry],
    response: &PredictionResponse,
    reading: &TelemetryReading,
) -> Vec<HistoryEntry> {
    prepend(log, HistoryEntry::new(response, reading, current_epoch_ms()))
}

/// Put `entry` in front of `log`, keeping the newest [`HISTORY_LIMIT`]
pub fn prepend(log: &[HistoryEntry], entry: HistoryEntry) -> Vec<HistoryEntry> {
    std::iter::once(entry)
        .chain(log.iter().cloned())
        .take(HISTORY_LIMIT)
        .collect()
}

pub fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
