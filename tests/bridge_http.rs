use anyhow::Result;
use rawcam_rs::bridge::{
    BridgeConfig, BridgeHandle, BridgeServer, CommandRequest, CommandResult, CommandRunner,
    OperationError,
};
use serde_json::Value;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// Answers by camera id so one server can exercise every failure family.
#[derive(Clone, Default)]
struct ScriptedCameras {
    seen: Arc<Mutex<Vec<Vec<String>>>>,
}

impl CommandRunner for ScriptedCameras {
    fn run(&self, request: &CommandRequest) -> Result<CommandResult, OperationError> {
        self.seen.lock().unwrap().push(request.args.clone());

        let exit = |code: i32, stdout: &str| -> Result<CommandResult, OperationError> {
            Ok(CommandResult {
                exit_code: Some(code),
                stdout: stdout.as_bytes().to_vec(),
                stderr: String::new(),
            })
        };

        let args: Vec<&str> = request.args.iter().map(String::as_str).collect();
        match args.as_slice() {
            [_, _, "--json", "--list-cameras"] => {
                exit(0, r#"{"total_cameras":1,"cameras":[{"id":"1","model":"M4112"}]}"#)
            }
            [_, _, "--json", "--capture-all"] => exit(0, r#"{"total_images":3,"images":[]}"#),
            [_, _, "--json", "--get-params", "1"] => exit(0, r#"{"exposure_us":8000}"#),
            [_, _, "--json", "--get-params", _] => exit(1, ""),
            [_, _, "--json", "--camera", "slow", "--capture"] => Err(OperationError::Timeout {
                operation: request.operation.clone(),
                timeout: request.timeout,
            }),
            [_, _, "--json", "--camera", "broken", "--capture"] => exit(2, ""),
            [_, _, "--json", "--camera", "chatty", "--capture"] => exit(0, "Capturing..."),
            [_, _, "--json", "--camera", _, "--capture"] => exit(0, r#"{"path":"img_0001.raw"}"#),
            _ => exit(64, ""),
        }
    }
}

fn read_response(stream: &mut TcpStream) -> Result<(String, String)> {
    let mut response = String::new();
    stream.read_to_string(&mut response)?;
    let mut parts = response.splitn(2, "\r\n\r\n");
    let headers = parts.next().unwrap_or("").to_string();
    let body = parts.next().unwrap_or("").to_string();
    Ok((headers, body))
}

struct TestBridge {
    dir: tempfile::TempDir,
    runner: ScriptedCameras,
    handle: Option<BridgeHandle>,
}

impl TestBridge {
    fn new() -> Result<Self> {
        let dir = tempdir()?;
        let config = BridgeConfig::builder(dir.path()).addr("127.0.0.1:0").build();
        config.prepare()?;
        let runner = ScriptedCameras::default();
        let handle = BridgeServer::with_runner(config, runner.clone()).spawn()?;

        Ok(Self {
            dir,
            runner,
            handle: Some(handle),
        })
    }

    fn request(&self, method: &str, path: &str) -> Result<(u16, Value)> {
        let addr = self.handle.as_ref().expect("bridge should be running").addr;
        let mut stream = TcpStream::connect(addr)?;
        let body = if method == "POST" { "{}" } else { "" };
        let request = format!(
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(request.as_bytes())?;

        let (headers, body) = read_response(&mut stream)?;
        let status = headers
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let value = serde_json::from_str(&body).unwrap_or(Value::Null);
        Ok((status, value))
    }
}

impl Drop for TestBridge {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop().expect("failed to stop bridge");
        }
    }
}

#[test]
fn lists_cameras_through_executable() -> Result<()> {
    let bridge = TestBridge::new()?;

    let (status, body) = bridge.request("GET", "/api/cameras")?;
    assert_eq!(status, 200);
    assert_eq!(body["total_cameras"], 1);
    assert_eq!(body["cameras"][0]["model"], "M4112");

    let seen = bridge.runner.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0][0], "--config");
    assert!(seen[0][1].ends_with("camera_config.json"));
    Ok(())
}

#[test]
fn capture_all_reports_system_info() -> Result<()> {
    let bridge = TestBridge::new()?;

    let (status, body) = bridge.request("POST", "/api/cameras/capture-all")?;
    assert_eq!(status, 200);
    assert_eq!(body["total_images"], 3);
    assert_eq!(body["system_info"]["config"], "camera_config.json");
    assert_eq!(
        body["system_info"]["data_directory"],
        bridge.dir.path().join("data").display().to_string()
    );
    Ok(())
}

#[test]
fn camera_parameters_and_missing_camera() -> Result<()> {
    let bridge = TestBridge::new()?;

    let (status, body) = bridge.request("GET", "/api/cameras/1")?;
    assert_eq!(status, 200);
    assert_eq!(body["exposure_us"], 8000);

    let (status, body) = bridge.request("GET", "/api/cameras/7")?;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], "Camera 7 not found");
    assert_eq!(body["operation"], "get_parameters");
    Ok(())
}

#[test]
fn failure_families_are_distinguishable() -> Result<()> {
    let bridge = TestBridge::new()?;

    let (status, ok) = bridge.request("POST", "/api/cameras/2/capture")?;
    assert_eq!(status, 200);
    assert_eq!(ok["path"], "img_0001.raw");

    let (timeout_status, timeout) = bridge.request("POST", "/api/cameras/slow/capture")?;
    let (failed_status, failed) = bridge.request("POST", "/api/cameras/broken/capture")?;
    let (invalid_status, invalid) = bridge.request("POST", "/api/cameras/chatty/capture")?;

    assert_eq!(timeout_status, 408);
    assert_eq!(timeout["error"], "timeout");

    assert_eq!(failed_status, 500);
    assert_eq!(failed["error"], "process_failure");
    assert_eq!(failed["detail"], "Capture failed for camera broken");

    assert_eq!(invalid_status, 500);
    assert_eq!(invalid["error"], "invalid_response");
    assert_eq!(invalid["detail"], "Invalid response from capture operation");

    for body in [&timeout, &failed, &invalid] {
        assert_eq!(body["operation"], "capture");
    }
    Ok(())
}

#[test]
fn status_endpoint_never_runs_executable() -> Result<()> {
    let bridge = TestBridge::new()?;

    let (status, body) = bridge.request("GET", "/api/system/status")?;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "operational");
    assert_eq!(body["executable_exists"], false);
    assert_eq!(body["config_exists"], false);
    assert!(bridge.runner.seen.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn unknown_routes_and_methods() -> Result<()> {
    let bridge = TestBridge::new()?;

    let (status, body) = bridge.request("GET", "/api/nothing")?;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], "Not Found");

    let (status, _) = bridge.request("DELETE", "/api/cameras/1")?;
    assert_eq!(status, 405);

    let (status, _) = bridge.request("GET", "/")?;
    assert_eq!(status, 404);

    assert!(bridge.runner.seen.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn serves_frontend_files() -> Result<()> {
    let bridge = TestBridge::new()?;
    let frontend = bridge.dir.path().join("frontend");
    std::fs::create_dir_all(&frontend)?;
    std::fs::write(frontend.join("index.html"), "<!doctype html><title>rig</title>")?;

    let addr = bridge.handle.as_ref().expect("bridge should be running").addr;
    let mut stream = TcpStream::connect(addr)?;
    stream.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")?;
    let (headers, body) = read_response(&mut stream)?;

    assert!(headers.starts_with("HTTP/1.1 200 OK"));
    assert!(headers.contains("Content-Type: text/html"));
    assert_eq!(body, "<!doctype html><title>rig</title>");
    Ok(())
}
