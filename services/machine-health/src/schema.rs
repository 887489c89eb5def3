//! Telemetry reading schema and validation
//!
//! Raw input arrives as an untyped JSON record (the shape a form layer
//! produces). [`validate`] checks every field independently and either
//! returns a fully valid [`TelemetryReading`] or the complete set of field
//! errors. A `TelemetryReading` can only be obtained through validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw record keys accepted by [`validate`]
pub mod field {
    pub const MACHINE_TYPE: &str = "type";
    pub const AIR_TEMP: &str = "airTemp";
    pub const PROCESS_TEMP: &str = "processTemp";
    pub const ROTATIONAL_SPEED: &str = "rotationalSpeed";
    pub const TORQUE: &str = "torque";
    pub const TOOL_WEAR: &str = "toolWear";

    /// All fields in form order
    pub const ALL: [&str; 6] = [
        MACHINE_TYPE,
        AIR_TEMP,
        PROCESS_TEMP,
        ROTATIONAL_SPEED,
        TORQUE,
        TOOL_WEAR,
    ];
}

/// Machine quality grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineType {
    L,
    M,
    H,
}

impl MachineType {
    pub const ALL: [MachineType; 3] = [MachineType::L, MachineType::M, MachineType::H];

    pub fn as_str(&self) -> &'static str {
        match self {
            MachineType::L => "L",
            MachineType::M => "M",
            MachineType::H => "H",
        }
    }

    /// Exact, case-sensitive token match
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "L" => Some(MachineType::L),
            "M" => Some(MachineType::M),
            "H" => Some(MachineType::H),
            _ => None,
        }
    }

    /// Human readable quality label
    pub fn label(&self) -> &'static str {
        match self {
            MachineType::L => "Low Quality (L)",
            MachineType::M => "Medium Quality (M)",
            MachineType::H => "High Quality (H)",
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated telemetry snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReading {
    machine_type: MachineType,
    air_temperature_k: f64,
    process_temperature_k: f64,
    rotational_speed_rpm: u32,
    torque_nm: f64,
    tool_wear_min: u64,
}

impl TelemetryReading {
    pub fn machine_type(&self) -> MachineType {
        self.machine_type
    }

    pub fn air_temperature_k(&self) -> f64 {
        self.air_temperature_k
    }

    pub fn process_temperature_k(&self) -> f64 {
        self.process_temperature_k
    }

    pub fn rotational_speed_rpm(&self) -> u32 {
        self.rotational_speed_rpm
    }

    pub fn torque_nm(&self) -> f64 {
        self.torque_nm
    }

    pub fn tool_wear_min(&self) -> u64 {
        self.tool_wear_min
    }
}

/// Field name to message map for every field that failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, field: &str, message: String) {
        self.0.insert(field.to_string(), message);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

const TOO_LARGE: &str = "Value too large";

struct Bounds {
    min: f64,
    below_min: &'static str,
    max: Option<(f64, &'static str)>,
}

const AIR_TEMP_BOUNDS: Bounds = Bounds {
    min: 0.0,
    below_min: "Air temperature must be positive",
    max: Some((500.0, "Unrealistic temperature")),
};

const PROCESS_TEMP_BOUNDS: Bounds = Bounds {
    min: 0.0,
    below_min: "Process temperature must be positive",
    max: Some((500.0, "Unrealistic temperature")),
};

const ROTATIONAL_SPEED_BOUNDS: Bounds = Bounds {
    min: 0.0,
    below_min: "Speed cannot be negative",
    max: Some((10_000.0, "Exceeds max RPM")),
};

const TORQUE_BOUNDS: Bounds = Bounds {
    min: 0.0,
    below_min: "Torque cannot be negative",
    max: None,
};

const TOOL_WEAR_BOUNDS: Bounds = Bounds {
    min: 0.0,
    below_min: "Tool wear cannot be negative",
    max: None,
};

/// Validate a raw record, collecting an error for every invalid field
pub fn validate(raw: &Value) -> Result<TelemetryReading, FieldErrors> {
    let empty = Map::new();
    let record = raw.as_object().unwrap_or(&empty);
    let mut errors = FieldErrors::default();

    let machine_type = check(
        &mut errors,
        field::MACHINE_TYPE,
        parse_machine_type(record.get(field::MACHINE_TYPE)),
    );
    let air_temperature_k = check(
        &mut errors,
        field::AIR_TEMP,
        number(record.get(field::AIR_TEMP), &AIR_TEMP_BOUNDS),
    );
    let process_temperature_k = check(
        &mut errors,
        field::PROCESS_TEMP,
        number(record.get(field::PROCESS_TEMP), &PROCESS_TEMP_BOUNDS),
    );
    let rotational_speed_rpm = check(
        &mut errors,
        field::ROTATIONAL_SPEED,
        integer(
            record.get(field::ROTATIONAL_SPEED),
            &ROTATIONAL_SPEED_BOUNDS,
        ),
    );
    let torque_nm = check(
        &mut errors,
        field::TORQUE,
        number(record.get(field::TORQUE), &TORQUE_BOUNDS),
    );
    let tool_wear_min = check(
        &mut errors,
        field::TOOL_WEAR,
        integer(record.get(field::TOOL_WEAR), &TOOL_WEAR_BOUNDS),
    );

    match (
        machine_type,
        air_temperature_k,
        process_temperature_k,
        rotational_speed_rpm,
        torque_nm,
        tool_wear_min,
    ) {
        (
            Some(machine_type),
            Some(air_temperature_k),
            Some(process_temperature_k),
            Some(rotational_speed_rpm),
            Some(torque_nm),
            Some(tool_wear_min),
        ) => Ok(TelemetryReading {
            machine_type,
            air_temperature_k,
            process_temperature_k,
            // bounded to [0, 10000] above
            rotational_speed_rpm: rotational_speed_rpm as u32,
            torque_nm,
            tool_wear_min,
        }),
        _ => Err(errors),
    }
}

fn check<T>(
    errors: &mut FieldErrors,
    field: &str,
    result: Result<T, &'static str>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.insert(field, message.to_string());
            None
        }
    }
}

fn parse_machine_type(value: Option<&Value>) -> Result<MachineType, &'static str> {
    match value {
        None | Some(Value::Null) => Err("Required"),
        Some(Value::String(token)) => {
            MachineType::from_token(token).ok_or("Expected one of L, M, H")
        }
        Some(_) => Err("Expected one of L, M, H"),
    }
}

fn number(value: Option<&Value>, bounds: &Bounds) -> Result<f64, &'static str> {
    let n = match value {
        None | Some(Value::Null) => return Err("Required"),
        Some(Value::Number(n)) => n.as_f64().ok_or("Expected number")?,
        Some(_) => return Err("Expected number"),
    };
    if n < bounds.min {
        return Err(bounds.below_min);
    }
    if let Some((max, above_max)) = bounds.max {
        if n > max {
            return Err(above_max);
        }
    }
    Ok(n)
}

fn integer(value: Option<&Value>, bounds: &Bounds) -> Result<u64, &'static str> {
    let n = match value {
        None | Some(Value::Null) => return Err("Required"),
        Some(Value::Number(n)) => n,
        Some(_) => return Err("Expected number"),
    };

    // Exact integers stay integers; only float-encoded values go through f64
    let whole = match (n.as_u64(), n.as_i64()) {
        (Some(whole), _) => whole,
        (None, Some(_)) => return Err(bounds.below_min),
        (None, None) => {
            let v = n.as_f64().ok_or("Expected number")?;
            if v.fract() != 0.0 {
                return Err("Expected integer");
            }
            if v < bounds.min {
                return Err(bounds.below_min);
            }
            // u64::MAX as f64 rounds up to 2^64
            if v >= u64::MAX as f64 {
                return Err(TOO_LARGE);
            }
            v as u64
        }
    };

    if let Some((max, above_max)) = bounds.max {
        if whole as f64 > max {
            return Err(above_max);
        }
    }
    Ok(whole)
}
