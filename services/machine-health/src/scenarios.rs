//! Preset telemetry readings for exercising the prediction service

use serde::Serialize;
use serde_json::{json, Value};

use crate::schema::MachineType;

/// A named set of form values
#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub machine_type: MachineType,
    pub air_temp: f64,
    pub process_temp: f64,
    pub rotational_speed: u32,
    pub torque: f64,
    pub tool_wear: u64,
}

impl Scenario {
    /// The scenario as a raw form record
    pub fn raw(&self) -> Value {
        json!({
            "type": self.machine_type.as_str(),
            "airTemp": self.air_temp,
            "processTemp": self.process_temp,
            "rotationalSpeed": self.rotational_speed,
            "torque": self.torque,
            "toolWear": self.tool_wear,
        })
    }
}

/// Values the form starts with
pub const DEFAULT_VALUES: Scenario = Scenario {
    id: "default",
    label: "Default",
    description: "Initial form values.",
    machine_type: MachineType::L,
    air_temp: 298.1,
    process_temp: 308.6,
    rotational_speed: 1551,
    torque: 42.8,
    tool_wear: 0,
};

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "normal",
        label: "Normal (Safe)",
        description: "A healthy machine running smoothly.",
        machine_type: MachineType::M,
        air_temp: 298.5,
        process_temp: 309.1,
        rotational_speed: 1500,
        torque: 40.2,
        tool_wear: 10,
    },
    Scenario {
        id: "failure",
        label: "Failure (Critical)",
        description: "A machine under extreme load with significant wear, a classic failure scenario.",
        machine_type: MachineType::L,
        air_temp: 301.8,
        process_temp: 311.2,
        rotational_speed: 1380,
        torque: 75.3,
        tool_wear: 215,
    },
    Scenario {
        id: "borderline",
        label: "Borderline",
        description: "A machine with high, but not extreme, wear and load. This tests the sensitivity of the tuned model.",
        machine_type: MachineType::H,
        air_temp: 302.4,
        process_temp: 311.6,
        rotational_speed: 1450,
        torque: 58.5,
        tool_wear: 170,
    },
    Scenario {
        id: "tool_fatigue",
        label: "Tool Fatigue",
        description: "Even with low stress, an old tool is a major risk.",
        machine_type: MachineType::L,
        air_temp: 298.9,
        process_temp: 309.1,
        rotational_speed: 1400,
        torque: 38.5,
        tool_wear: 225,
    },
    Scenario {
        id: "overheating",
        label: "Overheating",
        description: "Air temperature is high, causing the process temperature to spike, putting the machine at risk.",
        machine_type: MachineType::H,
        air_temp: 303.9,
        process_temp: 313.5,
        rotational_speed: 1550,
        torque: 45.0,
        tool_wear: 90,
    },
    Scenario {
        id: "low_quality_strain",
        label: "Low Quality Strain",
        description: "A \"Low Quality\" (Type L) machine operating at the upper limit of its safe torque range.",
        machine_type: MachineType::L,
        air_temp: 299.5,
        process_temp: 310.2,
        rotational_speed: 1350,
        torque: 62.0,
        tool_wear: 110,
    },
    Scenario {
        id: "high_speed_safe",
        label: "High Speed (Safe)",
        description: "The machine is running very fast, but torque is low (idling), so it should be safe.",
        machine_type: MachineType::H,
        air_temp: 297.5,
        process_temp: 308.0,
        rotational_speed: 2200,
        torque: 15.5,
        tool_wear: 40,
    },
];

pub fn find(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}
