//! Projection of a validated reading onto the prediction service's request body

use serde::Serialize;

use crate::schema::{MachineType, TelemetryReading};

/// Request body expected by the remote prediction endpoint.
///
/// Field identifiers, including their unit annotations, are fixed by the
/// service and must match exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    #[serde(rename = "Type")]
    pub machine_type: MachineType,
    #[serde(rename = "Air temperature [K]")]
    pub air_temperature_k: f64,
    #[serde(rename = "Process temperature [K]")]
    pub process_temperature_k: f64,
    #[serde(rename = "Rotational speed [rpm]")]
    pub rotational_speed_rpm: u32,
    #[serde(rename = "Torque [Nm]")]
    pub torque_nm: f64,
    #[serde(rename = "Tool wear [min]")]
    pub tool_wear_min: u64,
}

/// Map a reading to the wire request
pub fn to_request(reading: &TelemetryReading) -> PredictionRequest {
    PredictionRequest {
        machine_type: reading.machine_type(),
        air_temperature_k: reading.air_temperature_k(),
        process_temperature_k: reading.process_temperature_k(),
        rotational_speed_rpm: reading.rotational_speed_rpm(),
        torque_nm: reading.torque_nm(),
        tool_wear_min: reading.tool_wear_min(),
    }
}
