//! Bridge configuration.
//!
//! Built once at startup and shared read-only with every request handler.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{error, info};

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "refactored_capture.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "refactored_capture";

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const CAPTURE_ALL_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Camera-control executable invoked for every camera operation
    pub executable: PathBuf,
    /// Passed to the executable as `--config <path>`
    pub config_path: PathBuf,
    /// Working directory of the executable; captured images land here
    pub data_dir: PathBuf,
    /// Static dashboard files
    pub frontend_dir: PathBuf,
    pub addr: String,
    pub default_timeout: Duration,
    pub capture_all_timeout: Duration,
}

impl BridgeConfig {
    /// Standard layout below a system root:
    /// `backend/<executable>`, `config/camera_config.json`, `data/`, `frontend/`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            executable: root.join("backend").join(EXECUTABLE_NAME),
            config_path: root.join("config").join("camera_config.json"),
            data_dir: root.join("data"),
            frontend_dir: root.join("frontend"),
            addr: DEFAULT_ADDR.to_string(),
            default_timeout: DEFAULT_TIMEOUT,
            capture_all_timeout: CAPTURE_ALL_TIMEOUT,
        }
    }

    pub fn builder(root: impl AsRef<Path>) -> BridgeConfigBuilder {
        BridgeConfigBuilder {
            config: Self::from_root(root),
        }
    }

    /// Startup checks. Missing executable or config is logged, not fatal;
    /// the data directory is created when absent.
    pub fn prepare(&self) -> std::io::Result<()> {
        if self.executable.exists() {
            info!("Camera executable found: {}", self.executable.display());
        } else {
            error!("Camera executable not found: {}", self.executable.display());
        }

        if self.config_path.exists() {
            info!("Camera config found: {}", self.config_path.display());
        } else {
            error!("Camera config not found: {}", self.config_path.display());
        }

        if self.data_dir.exists() {
            info!("Data directory ready: {}", self.data_dir.display());
        } else {
            std::fs::create_dir_all(&self.data_dir)?;
            info!("Created data directory: {}", self.data_dir.display());
        }

        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::from_root(".")
    }
}

/// Builder for BridgeConfig, starting from the layout below a root.
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.executable = path.into();
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config_path = path.into();
        self
    }

    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn frontend_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.frontend_dir = path.into();
        self
    }

    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn capture_all_timeout(mut self, timeout: Duration) -> Self {
        self.config.capture_all_timeout = timeout;
        self
    }

    pub fn build(self) -> BridgeConfig {
        self.config
    }
}
