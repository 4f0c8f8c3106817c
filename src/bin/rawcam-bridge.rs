use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rawcam_rs::bridge::{BridgeConfig, BridgeServer};
use rawcam_rs::logger;

use tracing::info;

/// REST bridge between the dashboard and the camera-control executable.
#[derive(Parser, Debug)]
#[command(name = "rawcam-bridge", version)]
struct Cli {
    /// System root holding backend/, config/, data/ and frontend/
    #[arg(long, env = "RAWCAM_ROOT", default_value = ".")]
    root: PathBuf,

    /// Camera-control executable (default: <root>/backend/refactored_capture)
    #[arg(long, env = "RAWCAM_EXECUTABLE")]
    executable: Option<PathBuf>,

    /// Camera configuration passed as --config (default: <root>/config/camera_config.json)
    #[arg(long, env = "RAWCAM_CONFIG")]
    config: Option<PathBuf>,

    /// Working directory of the executable (default: <root>/data)
    #[arg(long, env = "RAWCAM_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Static dashboard files (default: <root>/frontend)
    #[arg(long, env = "RAWCAM_FRONTEND_DIR")]
    frontend_dir: Option<PathBuf>,

    #[arg(long, env = "RAWCAM_ADDR", default_value = "0.0.0.0:8080")]
    addr: String,

    /// Timeout for every operation except capture-all
    #[arg(long, env = "RAWCAM_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    #[arg(long, env = "RAWCAM_CAPTURE_ALL_TIMEOUT_SECS", default_value_t = 120)]
    capture_all_timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> BridgeConfig {
        let mut builder = BridgeConfig::builder(&self.root)
            .addr(self.addr)
            .default_timeout(Duration::from_secs(self.timeout_secs))
            .capture_all_timeout(Duration::from_secs(self.capture_all_timeout_secs));

        if let Some(path) = self.executable {
            builder = builder.executable(path);
        }
        if let Some(path) = self.config {
            builder = builder.config_path(path);
        }
        if let Some(path) = self.data_dir {
            builder = builder.data_dir(path);
        }
        if let Some(path) = self.frontend_dir {
            builder = builder.frontend_dir(path);
        }
        builder.build()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_with_level(logger::level_for(cli.verbose));

    let config = cli.into_config();
    info!("Starting camera bridge...");
    info!("Executable: {}", config.executable.display());
    info!("Config: {}", config.config_path.display());
    config
        .prepare()
        .with_context(|| format!("preparing data directory {}", config.data_dir.display()))?;

    let handle = BridgeServer::new(config).spawn()?;
    info!("Status endpoint: http://{}/api/system/status", handle.addr);
    handle.wait()
}
