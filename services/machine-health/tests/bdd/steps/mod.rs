//! BDD step definitions for the machine health service

pub mod prediction_steps;
pub mod validation_steps;
