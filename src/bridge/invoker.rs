//! External process invocation.
//!
//! The camera-control executable is an opaque collaborator: the bridge hands
//! it a command line, waits for it to exit and reads JSON from its stdout.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::bridge::config::BridgeConfig;
use crate::bridge::error::OperationError;
use crate::bridge::operation::Operation;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const STDOUT_LOG_PREVIEW: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub operation: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

impl CommandRequest {
    /// Full command line, program first.
    pub fn tokens(&self) -> Vec<String> {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Raw bytes; only valid UTF-8 JSON is accepted from it
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs one command to completion or until its timeout expires.
pub trait CommandRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandResult, OperationError>;
}

/// Spawns a real child process per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandResult, OperationError> {
        let spawn_error = |source: std::io::Error| OperationError::Spawn {
            operation: request.operation.clone(),
            source,
        };

        let mut child = Command::new(&request.program)
            .args(&request.args)
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Drained on their own threads so a child writing more than a pipe
        // buffer never blocks waiting for us.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + request.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(spawn_error(source));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(
                    "{} still running after {}s, killing it",
                    request.operation,
                    request.timeout.as_secs_f64()
                );
                let _ = child.kill();
                let _ = child.wait();
                return Err(OperationError::Timeout {
                    operation: request.operation.clone(),
                    timeout: request.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        };

        Ok(CommandResult {
            exit_code: status.code(),
            stdout: collect(stdout),
            stderr: String::from_utf8_lossy(&collect(stderr)).into_owned(),
        })
    }
}

fn drain<T: Read + Send + 'static>(mut pipe: T) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default()
}

/// The bridge's single capability toward the camera system.
pub struct CameraBridge<R: CommandRunner> {
    config: Arc<BridgeConfig>,
    runner: R,
}

impl CameraBridge<ProcessRunner> {
    pub fn new(config: Arc<BridgeConfig>) -> Self {
        Self {
            config,
            runner: ProcessRunner,
        }
    }
}

impl<R: CommandRunner> CameraBridge<R> {
    pub fn with_runner(config: Arc<BridgeConfig>, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `<executable> --config <config_path> <operation args...>`, run in the data directory.
    pub fn request_for(&self, operation: &Operation) -> CommandRequest {
        let mut args = vec![
            "--config".to_string(),
            self.config.config_path.display().to_string(),
        ];
        args.extend(operation.args());

        CommandRequest {
            operation: operation.name().to_string(),
            program: self.config.executable.clone(),
            args,
            working_dir: self.config.data_dir.clone(),
            timeout: operation.timeout(&self.config),
        }
    }

    /// Runs `operation` and parses its stdout as JSON.
    pub fn invoke(&self, operation: &Operation) -> Result<Value, OperationError> {
        let request = self.request_for(operation);
        info!("Executing: {}", request.tokens().join(" "));
        debug!("Working directory: {}", request.working_dir.display());

        let result = self.runner.run(&request)?;

        info!(
            "{} completed - return code: {:?}",
            request.operation, result.exit_code
        );
        debug!("Stdout: {}", preview(&String::from_utf8_lossy(&result.stdout)));
        if !result.stderr.is_empty() {
            warn!("{} stderr: {}", request.operation, result.stderr.trim_end());
        }

        if !result.success() {
            return Err(OperationError::ProcessFailure {
                operation: request.operation,
                code: result.exit_code,
                stderr: result.stderr,
            });
        }

        serde_json::from_slice(&result.stdout).map_err(|source| {
            error!("Invalid JSON response from {}", request.operation);
            OperationError::InvalidResponse {
                operation: request.operation,
                source,
            }
        })
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(STDOUT_LOG_PREVIEW) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
