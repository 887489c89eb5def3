//! Error types for the machine health service

/// Errors that can occur in the machine health service
#[derive(Debug, thiserror::Error)]
pub enum MachineHealthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: status {status}")]
    Server { status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dashboard error: {0}")]
    Dashboard(String),

    #[error("Task error: {0}")]
    Task(String),
}

/// Result type alias for machine health operations
pub type Result<T> = std::result::Result<T, MachineHealthError>;
