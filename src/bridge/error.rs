use std::time::Duration;

use thiserror::Error;

/// Why a camera operation produced no usable JSON.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("{operation} timed out after {}s", .timeout.as_secs())]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    #[error("{operation} exited with {}", exit_label(.code))]
    ProcessFailure {
        operation: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{operation} returned invalid JSON: {source}")]
    InvalidResponse {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to run {operation}: {source}")]
    Spawn {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl OperationError {
    /// Short machine-readable tag, also sent to HTTP clients.
    pub fn kind(&self) -> &'static str {
        match self {
            OperationError::Timeout { .. } => "timeout",
            OperationError::ProcessFailure { .. } => "process_failure",
            OperationError::InvalidResponse { .. } => "invalid_response",
            OperationError::Spawn { .. } => "spawn_failure",
        }
    }

    /// HTTP status independent of the operation. A failed parameter lookup
    /// is reported as 404 by the server, not here.
    pub fn status_code(&self) -> u16 {
        match self {
            OperationError::Timeout { .. } => 408,
            _ => 500,
        }
    }

    pub fn operation(&self) -> &str {
        match self {
            OperationError::Timeout { operation, .. }
            | OperationError::ProcessFailure { operation, .. }
            | OperationError::InvalidResponse { operation, .. }
            | OperationError::Spawn { operation, .. } => operation,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no exit status (killed by signal)".to_string(),
    }
}
