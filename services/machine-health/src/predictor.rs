//! Client for the remote failure prediction service

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::PredictorConfig;
use crate::history::HealthStatus;
use crate::io::HttpClient;
use crate::request::to_request;
use crate::schema::TelemetryReading;
use crate::MachineHealthError;

/// Normalized prediction returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub failure_probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_failure_type: Option<String>,
}

impl PredictionResponse {
    pub fn status(&self) -> HealthStatus {
        HealthStatus::from_probability(self.failure_probability)
    }
}

/// Normalize a successful response body.
///
/// A body that is not JSON is a parse error. A missing or non-numeric
/// `failure_probability` becomes `0`. Only a string `predicted_failure_type`
/// is kept: any other JSON value in that slot is dropped rather than passed
/// through, and every other response key is ignored.
pub fn normalize_response(body: &str) -> crate::Result<PredictionResponse> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| MachineHealthError::Parse(format!("Invalid prediction body: {}", e)))?;

    let failure_probability = match value.get("failure_probability").and_then(Value::as_f64) {
        Some(p) => p,
        None => {
            tracing::debug!("Response has no numeric failure_probability, using 0");
            0.0
        }
    };
    let predicted_failure_type = value
        .get("predicted_failure_type")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(PredictionResponse {
        failure_probability,
        predicted_failure_type,
    })
}

/// Issues one prediction request per call; no retries, no caching
pub struct PredictionClient {
    endpoint_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for PredictionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionClient")
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl PredictionClient {
    pub fn new(config: &PredictorConfig, http: Arc<dyn HttpClient>) -> Self {
        tracing::debug!("Created PredictionClient for {}", config.endpoint_url);
        Self {
            endpoint_url: config.endpoint_url.clone(),
            http,
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Submit a reading and return the normalized prediction
    pub async fn predict(&self, reading: &TelemetryReading) -> crate::Result<PredictionResponse> {
        let body = serde_json::to_value(to_request(reading))?;
        tracing::debug!("Requesting prediction: {}", body);

        let response = self.http.post_json(&self.endpoint_url, &body).await?;

        if !response.is_success() {
            tracing::warn!(
                "Prediction service returned status {}: {}",
                response.status,
                response.body
            );
            return Err(MachineHealthError::Server {
                status: response.status,
            });
        }

        let prediction = normalize_response(&response.body)?;
        tracing::debug!(
            "Prediction received: probability={}, status={}",
            prediction.failure_probability,
            prediction.status()
        );
        Ok(prediction)
    }
}
