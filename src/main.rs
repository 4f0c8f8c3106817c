use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rawcam_rs::image_pipeline::{
    BayerPattern, ConversionConfig, DecodeHints, RawToTiffPipeline, SampleDepth, TiffCompression,
    find_latest_raw,
};
use rawcam_rs::logger;

use tracing::{error, info, warn};

/// Convert headerless Bayer RAW captures to TIFF.
#[derive(Parser, Debug)]
#[command(name = "rawcam", version)]
struct Cli {
    /// RAW files to convert. Defaults to the newest capture in the dataset directory.
    files: Vec<PathBuf>,

    /// Expected frame width in pixels
    #[arg(long, default_value_t = 4112)]
    width: usize,

    /// Expected frame height in pixels
    #[arg(long, default_value_t = 3008)]
    height: usize,

    /// Meaningful bits per sample (8, 12 or 16)
    #[arg(long, default_value_t = 12)]
    bits: u32,

    /// Bayer pattern of the sensor (RGGB, BGGR, GRBG, GBRG)
    #[arg(long, default_value_t = BayerPattern::Rggb)]
    pattern: BayerPattern,

    /// Write the mosaic as 16-bit grayscale instead of demosaicing
    #[arg(long)]
    no_debayer: bool,

    /// none, lzw, deflate-fast, deflate-balanced or deflate-best
    #[arg(long, default_value = "none")]
    compression: TiffCompression,

    /// Directory for the TIFF outputs (default: next to each input)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Searched recursively for the newest RAW when no files are given
    #[arg(long, default_value = "neural_dataset/images")]
    dataset_dir: PathBuf,

    /// Debug logging, including span timings
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_with_level(logger::level_for(cli.verbose));

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    info!("Starting rawcam...");

    let depth = SampleDepth::try_from(cli.bits)?;
    let hints = DecodeHints::new(cli.width, cli.height, depth);

    let config = ConversionConfig::builder()
        .compression(cli.compression)
        .debayer(!cli.no_debayer)
        .pattern(cli.pattern)
        .build();
    let pipeline = RawToTiffPipeline::new(config, hints);

    info!("RAW to TIFF pipeline initialized");
    info!("Expected geometry: {}x{} @ {} bits", cli.width, cli.height, depth.bits());
    info!("Compression: {:?}", pipeline.config().compression);
    info!(
        "Debayering: {}",
        if pipeline.config().debayer {
            format!("enabled ({})", pipeline.config().pattern)
        } else {
            "disabled".to_string()
        }
    );

    let inputs = if cli.files.is_empty() {
        let latest = find_latest_raw(&cli.dataset_dir)
            .with_context(|| format!("searching {}", cli.dataset_dir.display()))?;
        match latest {
            Some(path) => {
                info!("Using latest RAW file: {}", path.display());
                vec![path]
            }
            None => bail!("no RAW files found in {}", cli.dataset_dir.display()),
        }
    } else {
        cli.files
    };

    if let Some(dir) = &cli.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let outcomes = pipeline.convert_batch(&inputs, cli.output_dir.as_deref());

    let mut failures = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                info!(
                    "{} -> {} ({}x{}, {} bits, {} byte(s)/sample, {:?}) in {:.2?}",
                    outcome.input.display(),
                    outcome.output.display(),
                    report.width,
                    report.height,
                    report.depth.bits(),
                    report.bytes_per_sample,
                    report.source,
                    report.timings.total_duration()
                );
                if let Some((min, max)) = report.sample_range {
                    info!("Data range: {} - {}", min, max);
                }
            }
            Err(e) => {
                failures += 1;
                warn!("{} skipped: {}", outcome.input.display(), e);
            }
        }
    }

    info!(
        "Converted {} of {} file(s)",
        outcomes.len() - failures,
        outcomes.len()
    );

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
