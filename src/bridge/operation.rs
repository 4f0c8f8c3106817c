//! Logical camera operations and the command line each one maps to.

use std::time::Duration;

use crate::bridge::config::BridgeConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListCameras,
    CaptureAll,
    GetParameters(String),
    Capture(String),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListCameras => "list_cameras",
            Operation::CaptureAll => "capture_all",
            Operation::GetParameters(_) => "get_parameters",
            Operation::Capture(_) => "capture",
        }
    }

    /// Arguments appended after `--config <path>`.
    pub fn args(&self) -> Vec<String> {
        let args = match self {
            Operation::ListCameras => vec!["--json", "--list-cameras"],
            Operation::CaptureAll => vec!["--json", "--capture-all"],
            Operation::GetParameters(id) => vec!["--json", "--get-params", id.as_str()],
            Operation::Capture(id) => vec!["--json", "--camera", id.as_str(), "--capture"],
        };
        args.into_iter().map(String::from).collect()
    }

    pub fn timeout(&self, config: &BridgeConfig) -> Duration {
        match self {
            Operation::CaptureAll => config.capture_all_timeout,
            _ => config.default_timeout,
        }
    }

    /// HTTP status, error tag and detail for a non-zero exit.
    pub fn failure(&self) -> (u16, &'static str, String) {
        match self {
            Operation::ListCameras => (500, "process_failure", "Failed to list cameras".to_string()),
            Operation::CaptureAll => (500, "process_failure", "Capture operation failed".to_string()),
            Operation::GetParameters(id) => (404, "not_found", format!("Camera {} not found", id)),
            Operation::Capture(id) => (500, "process_failure", format!("Capture failed for camera {}", id)),
        }
    }

    pub fn invalid_response_detail(&self) -> &'static str {
        match self {
            Operation::ListCameras | Operation::GetParameters(_) => "Invalid response from camera system",
            Operation::CaptureAll | Operation::Capture(_) => "Invalid response from capture operation",
        }
    }
}
