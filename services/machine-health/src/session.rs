//! Dashboard session state and the submit flow
//!
//! A session moves between three phases:
//!
//! ```text
//! Idle --submit(valid)--> Submitting --response--> ResultShown
//!   ^                         |                        |
//!   +--------error------------+                        |
//!   +--------------------------reset-------------------+
//! ```
//!
//! Invalid submissions never leave the current phase. A submission made
//! while another is in flight is rejected with [`SubmitError::Busy`].
//! If the caller of [`submit`] goes away mid-flight the session drops back
//! to `Idle`; the request itself still runs to completion and its result is
//! discarded.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::history::{self, HistoryEntry};
use crate::predictor::{PredictionClient, PredictionResponse};
use crate::schema::{validate, FieldErrors, TelemetryReading};
use crate::MachineHealthError;

/// Generic notice shown when a prediction could not be obtained
pub const FAILURE_NOTICE: &str = "Failed to fetch prediction. Please check your connection.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Submitting,
    ResultShown,
}

/// Reasons a submission did not produce a prediction
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Invalid telemetry: {0}")]
    Invalid(FieldErrors),

    #[error("A prediction is already in progress")]
    Busy,

    #[error(transparent)]
    Prediction(#[from] MachineHealthError),
}

/// State of one dashboard session
#[derive(Debug, Default, Serialize)]
pub struct Session {
    phase: SessionPhase,
    current_result: Option<PredictionResponse>,
    history: Vec<HistoryEntry>,
    field_errors: Option<FieldErrors>,
    notice: Option<String>,
    #[serde(skip)]
    ticket: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_result(&self) -> Option<&PredictionResponse> {
        self.current_result.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Field errors from the most recent rejected submission
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }

    /// Failure notice from the most recent failed prediction
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Validate `raw` and enter `Submitting`.
    ///
    /// On rejection the phase, result and history are unchanged.
    pub fn begin_submit(&mut self, raw: &Value) -> Result<TelemetryReading, SubmitError> {
        if self.phase == SessionPhase::Submitting {
            tracing::debug!("Rejecting submission while another is in flight");
            return Err(SubmitError::Busy);
        }

        match validate(raw) {
            Ok(reading) => {
                self.phase = SessionPhase::Submitting;
                self.ticket = self.ticket.wrapping_add(1);
                self.current_result = None;
                self.field_errors = None;
                self.notice = None;
                Ok(reading)
            }
            Err(errors) => {
                tracing::debug!("Submission rejected: {}", errors);
                self.field_errors = Some(errors.clone());
                Err(SubmitError::Invalid(errors))
            }
        }
    }

    /// Apply a successful prediction: `Submitting -> ResultShown`
    pub fn complete(&mut self, reading: &TelemetryReading, response: PredictionResponse) {
        if self.phase != SessionPhase::Submitting {
            tracing::warn!("Ignoring prediction result in phase {:?}", self.phase);
            return;
        }
        self.history = history::record(&self.history, &response, reading);
        self.current_result = Some(response);
        self.phase = SessionPhase::ResultShown;
    }

    /// Apply a failed prediction: `Submitting -> Idle`
    pub fn fail(&mut self, error: &MachineHealthError) {
        if self.phase != SessionPhase::Submitting {
            tracing::warn!("Ignoring prediction failure in phase {:?}", self.phase);
            return;
        }
        tracing::warn!("Prediction failed: {}", error);
        self.phase = SessionPhase::Idle;
        self.notice = Some(FAILURE_NOTICE.to_string());
    }

    /// Identifies the most recent submission that entered `Submitting`
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Drop an in-flight submission whose caller went away: `Submitting -> Idle`.
    ///
    /// Only acts if `ticket` is still the current submission. No notice is
    /// set and history is untouched.
    pub fn abandon(&mut self, ticket: u64) {
        if self.phase != SessionPhase::Submitting || self.ticket != ticket {
            return;
        }
        tracing::debug!("Submission {} abandoned by its caller", ticket);
        self.phase = SessionPhase::Idle;
    }

    /// Clear the shown result: `ResultShown -> Idle`. History is kept.
    pub fn reset(&mut self) {
        if self.phase != SessionPhase::ResultShown {
            return;
        }
        self.phase = SessionPhase::Idle;
        self.current_result = None;
        self.field_errors = None;
        self.notice = None;
    }
}

/// Shared session handle
pub type SessionHandle = Arc<RwLock<Session>>;

pub fn new_session_handle() -> SessionHandle {
    Arc::new(RwLock::new(Session::new()))
}

/// Returns the session to `Idle` if dropped while still armed
struct InFlight {
    session: SessionHandle,
    ticket: u64,
    armed: bool,
}

impl InFlight {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let ticket = self.ticket;
        if let Ok(mut session) = self.session.try_write() {
            session.abandon(ticket);
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let session = Arc::clone(&self.session);
                handle.spawn(async move {
                    session.write().await.abandon(ticket);
                });
            }
            Err(e) => tracing::error!("Cannot release abandoned submission {}: {}", ticket, e),
        }
    }
}

/// Run one submission end to end against `predictor`.
///
/// The session lock is released while the request is in flight. The request
/// runs on its own task, so dropping this future leaves it to finish in the
/// background while the session returns to `Idle`.
/// `result_delay` is applied after a successful response, before the result
/// is committed.
pub async fn submit(
    session: &SessionHandle,
    predictor: &Arc<PredictionClient>,
    raw: &Value,
    result_delay: Duration,
) -> Result<PredictionResponse, SubmitError> {
    let (reading, ticket) = {
        let mut s = session.write().await;
        let reading = s.begin_submit(raw)?;
        (reading, s.ticket())
    };
    let guard = InFlight {
        session: Arc::clone(session),
        ticket,
        armed: true,
    };

    let request = {
        let predictor = Arc::clone(predictor);
        let reading = reading.clone();
        tokio::spawn(async move { predictor.predict(&reading).await })
    };
    let outcome = request.await.unwrap_or_else(|e| {
        Err(MachineHealthError::Task(format!(
            "prediction request ended unexpectedly: {}",
            e
        )))
    });

    match outcome {
        Ok(response) => {
            if !result_delay.is_zero() {
                tokio::time::sleep(result_delay).await;
            }
            session.write().await.complete(&reading, response.clone());
            guard.disarm();
            tracing::info!(
                "Prediction for type {}: {} ({:.2})",
                reading.machine_type(),
                response.status(),
                response.failure_probability
            );
            Ok(response)
        }
        Err(e) => {
            session.write().await.fail(&e);
            guard.disarm();
            Err(SubmitError::Prediction(e))
        }
    }
}
