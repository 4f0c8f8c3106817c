//! REST front end for the camera system.
//!
//! Every camera endpoint runs exactly one external command and blocks its
//! connection thread until the command exits or times out.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Component, Path};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::bridge::config::BridgeConfig;
use crate::bridge::error::OperationError;
use crate::bridge::http::{HttpResponse, read_request, write_response};
use crate::bridge::invoker::{CameraBridge, CommandRunner, ProcessRunner};
use crate::bridge::operation::Operation;

const ACCEPT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct BridgeHandle {
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl BridgeHandle {
    /// Stops accepting connections. In-flight requests finish on their own threads.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        self.join_accept_loop()
    }

    /// Blocks until the accept loop exits.
    pub fn wait(mut self) -> Result<()> {
        self.join_accept_loop()
    }

    fn join_accept_loop(&mut self) -> Result<()> {
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| anyhow!("bridge accept thread panicked"))?;
        }
        Ok(())
    }
}

pub struct BridgeServer<R: CommandRunner> {
    bridge: Arc<CameraBridge<R>>,
}

impl BridgeServer<ProcessRunner> {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            bridge: Arc::new(CameraBridge::new(Arc::new(config))),
        }
    }
}

impl<R: CommandRunner + Send + Sync + 'static> BridgeServer<R> {
    pub fn with_runner(config: BridgeConfig, runner: R) -> Self {
        Self {
            bridge: Arc::new(CameraBridge::with_runner(Arc::new(config), runner)),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        self.bridge.config()
    }

    pub fn spawn(self) -> Result<BridgeHandle> {
        let listener = TcpListener::bind(&self.bridge.config().addr)?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let bridge = self.bridge;
        let join = std::thread::spawn(move || {
            if let Err(err) = accept_loop(listener, bridge, shutdown_thread) {
                error!("bridge server stopped: {}", err);
            }
        });

        info!("Bridge listening on http://{}", addr);
        Ok(BridgeHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }

    /// Answers one request without touching the network.
    pub fn handle(&self, method: &str, path: &str) -> HttpResponse {
        route(&*self.bridge, method, path)
    }
}

fn accept_loop<R: CommandRunner + Send + Sync + 'static>(
    listener: TcpListener,
    bridge: Arc<CameraBridge<R>>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, peer)) => {
                let bridge = bridge.clone();
                std::thread::spawn(move || {
                    if let Err(err) = handle_connection(stream, &*bridge) {
                        warn!("request from {} failed: {}", peer, err);
                    }
                });
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn handle_connection<R: CommandRunner>(mut stream: TcpStream, bridge: &CameraBridge<R>) -> Result<()> {
    stream.set_nonblocking(false)?;
    let request = match read_request(&mut stream) {
        Ok(request) => request,
        Err(err) => {
            write_response(&mut stream, &HttpResponse::detail(400, "Bad Request"))?;
            return Err(err);
        }
    };
    debug!("{} {}", request.method, request.path);

    let response = route(bridge, &request.method, &request.path);
    write_response(&mut stream, &response)
}

fn route<R: CommandRunner>(bridge: &CameraBridge<R>, method: &str, path: &str) -> HttpResponse {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        ("GET", ["api", "cameras"]) => run_operation(bridge, Operation::ListCameras),
        ("POST", ["api", "cameras", "capture-all"]) => run_operation(bridge, Operation::CaptureAll),
        ("GET", ["api", "cameras", id]) => {
            let operation = Operation::GetParameters(id.to_string());
            match camera_id(id) {
                Some(_) => run_operation(bridge, operation),
                None => unknown_camera(&operation, id),
            }
        }
        ("POST", ["api", "cameras", id, "capture"]) => {
            let operation = Operation::Capture(id.to_string());
            match camera_id(id) {
                Some(_) => run_operation(bridge, operation),
                None => unknown_camera(&operation, id),
            }
        }
        ("GET", ["api", "system", "status"]) => system_status(bridge.config()),

        ("GET", [""]) => static_file(bridge.config(), "index.html"),
        ("GET", ["styles.css"]) => static_file(bridge.config(), "styles.css"),
        ("GET", ["js", file]) => static_file(bridge.config(), &format!("js/{}", file)),
        ("GET", ["static", rest @ ..]) if !rest.is_empty() => {
            static_file(bridge.config(), &rest.join("/"))
        }

        (_, ["api", "cameras"])
        | (_, ["api", "cameras", _])
        | (_, ["api", "cameras", _, "capture"])
        | (_, ["api", "system", "status"]) => HttpResponse::method_not_allowed(),
        _ => HttpResponse::not_found(),
    }
}

/// Ids are forwarded as a single argv token; anything that could read as a
/// flag to the executable is refused.
fn camera_id(raw: &str) -> Option<&str> {
    let valid = !raw.is_empty()
        && !raw.starts_with('-')
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    valid.then_some(raw)
}

/// Same payload shape as a failed lookup, without running the executable.
fn unknown_camera(operation: &Operation, id: &str) -> HttpResponse {
    HttpResponse::json(
        404,
        &ErrorBody {
            detail: format!("Camera {} not found", id),
            error: "not_found",
            operation: operation.name(),
        },
    )
}

fn run_operation<R: CommandRunner>(bridge: &CameraBridge<R>, operation: Operation) -> HttpResponse {
    info!("Running {}", operation.name());
    match bridge.invoke(&operation) {
        Ok(value) => HttpResponse::json(200, &decorate(bridge.config(), &operation, value)),
        Err(err) => {
            error!("{}", err);
            error_response(&operation, &err)
        }
    }
}

fn decorate(config: &BridgeConfig, operation: &Operation, mut value: Value) -> Value {
    match operation {
        Operation::ListCameras => {
            let total = value.get("total_cameras").and_then(Value::as_u64).unwrap_or(0);
            info!("Found {} cameras", total);
        }
        Operation::CaptureAll => {
            let total = value.get("total_images").and_then(Value::as_u64).unwrap_or(0);
            info!("Capture completed: {} images", total);
            if let Some(object) = value.as_object_mut() {
                object.insert(
                    "system_info".to_string(),
                    json!({
                        "executable": file_name(&config.executable),
                        "config": file_name(&config.config_path),
                        "data_directory": config.data_dir.display().to_string(),
                    }),
                );
            }
        }
        _ => {}
    }
    value
}

/// Body of every failed camera operation. `error` keeps the failure
/// families apart even when they share a status code.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    detail: String,
    error: &'a str,
    operation: &'a str,
}

#[derive(Debug, Serialize)]
struct SystemStatus {
    status: &'static str,
    executable_exists: bool,
    config_exists: bool,
    data_directory: String,
    frontend_directory: String,
    version: &'static str,
}

/// Maps an operation failure to status and payload.
pub fn error_response(operation: &Operation, err: &OperationError) -> HttpResponse {
    let (status, kind, detail) = match err {
        OperationError::ProcessFailure { .. } => operation.failure(),
        OperationError::Timeout { .. } => {
            (err.status_code(), err.kind(), "Camera operation timed out".to_string())
        }
        OperationError::InvalidResponse { .. } => (
            err.status_code(),
            err.kind(),
            operation.invalid_response_detail().to_string(),
        ),
        OperationError::Spawn { source, .. } => (
            err.status_code(),
            err.kind(),
            format!("Camera operation failed: {}", source),
        ),
    };

    HttpResponse::json(
        status,
        &ErrorBody {
            detail,
            error: kind,
            operation: operation.name(),
        },
    )
}

/// Static report; never runs the executable.
fn system_status(config: &BridgeConfig) -> HttpResponse {
    HttpResponse::json(
        200,
        &SystemStatus {
            status: "operational",
            executable_exists: config.executable.exists(),
            config_exists: config.config_path.exists(),
            data_directory: config.data_dir.display().to_string(),
            frontend_directory: config.frontend_dir.display().to_string(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

fn static_file(config: &BridgeConfig, relative: &str) -> HttpResponse {
    let relative = Path::new(relative);
    if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return HttpResponse::not_found();
    }

    let path = config.frontend_dir.join(relative);
    match std::fs::read(&path) {
        Ok(body) => HttpResponse {
            status: 200,
            content_type: content_type(&path),
            body,
        },
        Err(err) => {
            debug!("static file {} unavailable: {}", path.display(), err);
            HttpResponse::not_found()
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::invoker::{CommandRequest, CommandResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedRunner {
        exit_code: i32,
        stdout: String,
        timed_out: bool,
        calls: Mutex<Vec<CommandRequest>>,
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, request: &CommandRequest) -> Result<CommandResult, OperationError> {
            self.calls.lock().unwrap().push(request.clone());
            if self.timed_out {
                return Err(OperationError::Timeout {
                    operation: request.operation.clone(),
                    timeout: request.timeout,
                });
            }
            Ok(CommandResult {
                exit_code: Some(self.exit_code),
                stdout: self.stdout.clone().into_bytes(),
                stderr: "camera 3 missing".to_string(),
            })
        }
    }

    fn server(runner: ScriptedRunner) -> BridgeServer<ScriptedRunner> {
        BridgeServer::with_runner(BridgeConfig::from_root("/nonexistent/rig"), runner)
    }

    fn body(response: &HttpResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    fn ok_runner(stdout: &str) -> ScriptedRunner {
        ScriptedRunner {
            stdout: stdout.to_string(),
            ..ScriptedRunner::default()
        }
    }

    #[test]
    fn test_list_cameras_passes_json_through() {
        let server = server(ok_runner(r#"{"total_cameras":2,"cameras":[{"id":"1"},{"id":"2"}]}"#));
        let response = server.handle("GET", "/api/cameras");

        assert_eq!(response.status, 200);
        assert_eq!(
            body(&response),
            json!({"total_cameras": 2, "cameras": [{"id": "1"}, {"id": "2"}]})
        );
    }

    #[test]
    fn test_capture_all_adds_system_info() {
        let server = server(ok_runner(r#"{"total_images":4}"#));
        let response = server.handle("POST", "/api/cameras/capture-all");

        assert_eq!(response.status, 200);
        let body = body(&response);
        assert_eq!(body["total_images"], 4);
        assert_eq!(body["system_info"]["config"], "camera_config.json");
        assert_eq!(body["system_info"]["data_directory"], "/nonexistent/rig/data");

        let calls = server.bridge.runner_calls();
        assert_eq!(calls[0].timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_capture_all_non_object_untouched() {
        let server = server(ok_runner("[1,2]"));
        let response = server.handle("POST", "/api/cameras/capture-all");
        assert_eq!(body(&response), json!([1, 2]));
    }

    #[test]
    fn test_get_parameters_failure_is_not_found() {
        let server = server(ScriptedRunner {
            exit_code: 1,
            ..ScriptedRunner::default()
        });
        let response = server.handle("GET", "/api/cameras/3");

        assert_eq!(response.status, 404);
        assert_eq!(body(&response)["detail"], "Camera 3 not found");
        assert_eq!(body(&response)["error"], "not_found");
    }

    #[test]
    fn test_failure_families_are_distinguishable() {
        let timed_out = server(ScriptedRunner {
            timed_out: true,
            ..ScriptedRunner::default()
        })
        .handle("POST", "/api/cameras/1/capture");
        let failed = server(ScriptedRunner {
            exit_code: 2,
            ..ScriptedRunner::default()
        })
        .handle("POST", "/api/cameras/1/capture");
        let garbage = server(ok_runner("Capturing... done"))
            .handle("POST", "/api/cameras/1/capture");

        assert_eq!(timed_out.status, 408);
        assert_eq!(body(&timed_out)["error"], "timeout");
        assert_eq!(body(&timed_out)["detail"], "Camera operation timed out");

        assert_eq!(failed.status, 500);
        assert_eq!(body(&failed)["error"], "process_failure");
        assert_eq!(body(&failed)["operation"], "capture");
        assert_eq!(body(&failed)["detail"], "Capture failed for camera 1");

        assert_eq!(garbage.status, 500);
        assert_eq!(body(&garbage)["error"], "invalid_response");
        assert_eq!(body(&garbage)["detail"], "Invalid response from capture operation");
        assert_ne!(body(&failed), body(&garbage));
    }

    #[test]
    fn test_status_does_not_invoke() {
        let server = server(ok_runner("{}"));
        let response = server.handle("GET", "/api/system/status");

        assert_eq!(response.status, 200);
        let body = body(&response);
        assert_eq!(body["status"], "operational");
        assert_eq!(body["executable_exists"], false);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(server.bridge.runner_calls().is_empty());
    }

    #[test]
    fn test_routing_errors() {
        let server = server(ok_runner("{}"));
        assert_eq!(server.handle("DELETE", "/api/cameras").status, 405);
        assert_eq!(server.handle("GET", "/api/cameras/1/capture").status, 405);
        assert_eq!(server.handle("GET", "/api/unknown").status, 404);
        let rejected = server.handle("GET", "/api/cameras/--capture-all");
        assert_eq!(rejected.status, 404);
        assert_eq!(
            body(&rejected),
            json!({
                "detail": "Camera --capture-all not found",
                "error": "not_found",
                "operation": "get_parameters",
            })
        );
        let rejected = server.handle("POST", "/api/cameras/-x/capture");
        assert_eq!(rejected.status, 404);
        assert_eq!(body(&rejected)["error"], "not_found");
        assert_eq!(body(&rejected)["operation"], "capture");
        assert!(server.bridge.runner_calls().is_empty());
    }

    #[test]
    fn test_static_files() {
        let root = tempfile::tempdir().unwrap();
        let frontend = root.path().join("frontend");
        std::fs::create_dir_all(frontend.join("js")).unwrap();
        std::fs::write(frontend.join("index.html"), "<h1>rig</h1>").unwrap();
        std::fs::write(frontend.join("js").join("app.js"), "console.log(1)").unwrap();

        let server = BridgeServer::with_runner(BridgeConfig::from_root(root.path()), ok_runner("{}"));

        let index = server.handle("GET", "/");
        assert_eq!(index.status, 200);
        assert_eq!(index.content_type, "text/html; charset=utf-8");
        assert_eq!(index.body, b"<h1>rig</h1>");

        let script = server.handle("GET", "/js/app.js");
        assert_eq!(script.content_type, "application/javascript");

        assert_eq!(server.handle("GET", "/static/js/app.js").status, 200);
        assert_eq!(server.handle("GET", "/static/../frontend/index.html").status, 404);
        assert_eq!(server.handle("GET", "/styles.css").status, 404);
    }

    impl CameraBridge<ScriptedRunner> {
        fn runner_calls(&self) -> Vec<CommandRequest> {
            self.runner().calls.lock().unwrap().clone()
        }
    }
}
