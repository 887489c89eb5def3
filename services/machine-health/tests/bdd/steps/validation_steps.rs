//! BDD step definitions for telemetry validation

use cucumber::{given, then, when};
use machine_health::scenarios;
use machine_health::validate;
use serde_json::Value;

use crate::world::MachineHealthWorld;

fn raw_mut(world: &mut MachineHealthWorld) -> &mut serde_json::Map<String, Value> {
    world
        .raw
        .as_mut()
        .and_then(Value::as_object_mut)
        .expect("telemetry reading not set")
}

#[given(expr = "the telemetry reading from the {string} scenario")]
fn reading_from_scenario(world: &mut MachineHealthWorld, id: String) {
    let scenario = scenarios::find(&id).unwrap_or_else(|| panic!("Unknown scenario: {}", id));
    world.raw = Some(scenario.raw());
}

#[given(expr = "the field {string} is set to {string}")]
fn field_set_to_json(world: &mut MachineHealthWorld, field: String, json: String) {
    let value: Value =
        serde_json::from_str(&json).unwrap_or_else(|e| panic!("Invalid JSON '{}': {}", json, e));
    raw_mut(world).insert(field, value);
}

#[given(expr = "the field {string} is set to the text {string}")]
fn field_set_to_text(world: &mut MachineHealthWorld, field: String, text: String) {
    raw_mut(world).insert(field, Value::String(text));
}

#[given(expr = "the field {string} is removed")]
fn field_removed(world: &mut MachineHealthWorld, field: String) {
    raw_mut(world).remove(&field);
}

#[when("the reading is validated")]
fn reading_validated(world: &mut MachineHealthWorld) {
    let raw = world.raw.as_ref().expect("telemetry reading not set");
    world.validation = Some(validate(raw));
}

#[then("validation succeeds")]
fn validation_succeeds(world: &mut MachineHealthWorld) {
    match world.validation.as_ref().expect("reading not validated") {
        Ok(_) => {}
        Err(errors) => panic!("Expected validation to succeed, got: {}", errors),
    }
}

#[then(expr = "validation fails for exactly the fields {string}")]
fn validation_fails_for(world: &mut MachineHealthWorld, fields: String) {
    let errors = match world.validation.as_ref().expect("reading not validated") {
        Ok(reading) => panic!("Expected validation to fail, got {:?}", reading),
        Err(errors) => errors,
    };
    let mut expected: Vec<&str> = fields.split(',').map(str::trim).collect();
    expected.sort_unstable();
    let actual: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
    assert_eq!(actual, expected, "errors: {}", errors);
}

#[then(expr = "the error for {string} is {string}")]
fn error_for_field(world: &mut MachineHealthWorld, field: String, message: String) {
    let errors = match world.validation.as_ref().expect("reading not validated") {
        Ok(reading) => panic!("Expected validation to fail, got {:?}", reading),
        Err(errors) => errors,
    };
    assert_eq!(errors.get(&field), Some(message.as_str()), "errors: {}", errors);
}
