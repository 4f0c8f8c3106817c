use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, info, instrument};

use crate::image_pipeline::{
    common::error::{DecodeError, Result},
    common::timing::PipelineTimings,
    debayer::CpuDebayer,
    raw::{CandidateSource, DecodeHints, HeaderlessReader, RawImageReader, SampleDepth},
    tiff::{ConversionConfig, StandardTiffWriter, TiffWriter},
};

/// What a single conversion produced.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub width: usize,
    pub height: usize,
    pub depth: SampleDepth,
    pub bytes_per_sample: usize,
    pub source: CandidateSource,
    pub sample_range: Option<(u16, u16)>,
    pub debayered: bool,
    pub timings: PipelineTimings,
}

/// Outcome of one file in a batch. Failures are kept, not propagated.
#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<ConversionReport>,
}

pub struct RawToTiffPipeline<R: RawImageReader, W: TiffWriter> {
    reader: R,
    writer: W,
    debayer: CpuDebayer,
    config: ConversionConfig,
}

impl RawToTiffPipeline<HeaderlessReader, StandardTiffWriter> {
    pub fn new(config: ConversionConfig, hints: DecodeHints) -> Self {
        Self {
            reader: HeaderlessReader::new(hints),
            writer: StandardTiffWriter,
            debayer: CpuDebayer::new(),
            config,
        }
    }
}

impl<R: RawImageReader, W: TiffWriter> RawToTiffPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            debayer: CpuDebayer::new(),
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        let min = if self.config.debayer { 2 } else { 1 };
        if width < min || height < min {
            return Err(DecodeError::InvalidDimensions(width, height));
        }

        Ok(())
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<ConversionReport> {
        info!("Starting RAW to TIFF conversion");
        let mut timings = PipelineTimings::new();

        let frame = {
            let _span = tracing::info_span!("decode_raw").entered();
            timings.measure("decode", || self.reader.read_raw(input_data))?
        };

        let sample_range = frame.sample_range();
        if let Some((min, max)) = sample_range {
            info!(
                width = frame.width(),
                height = frame.height(),
                "RAW frame loaded, data range {} - {}",
                min,
                max
            );
        }

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = frame.width(),
                height = frame.height()
            ).entered();
            self.validate_dimensions(frame.width(), frame.height())?;
        }

        if self.config.debayer {
            let rgb = {
                let _span = tracing::info_span!("demosaic", pattern = %self.config.pattern).entered();
                timings.measure("demosaic", || self.debayer.demosaic(&frame, self.config.pattern))?
            };
            let _span = tracing::info_span!("encode_tiff").entered();
            timings.measure("encode", || self.writer.write_rgb_tiff(&rgb, output, &self.config))?;
        } else {
            let _span = tracing::info_span!("encode_tiff").entered();
            timings.measure("encode", || self.writer.write_raw_tiff(&frame, output, &self.config))?;
        }

        info!(
            width = frame.width(),
            height = frame.height(),
            "Conversion complete"
        );
        timings.log_summary();

        Ok(ConversionReport {
            width: frame.width(),
            height: frame.height(),
            depth: frame.depth(),
            bytes_per_sample: frame.bytes_per_sample(),
            source: frame.source(),
            sample_range,
            debayered: self.config.debayer,
            timings,
        })
    }

    /// Converts `input_path` into `output_path`.
    ///
    /// The output file is only created once the conversion succeeded, so a
    /// failed decode never leaves an empty TIFF behind.
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<ConversionReport> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path)?
        };

        let mut encoded = Vec::new();
        let report = self.convert(&input_data, &mut encoded)?;

        let mut output_file = std::fs::File::create(output_path).map_err(|e| {
            DecodeError::OutputWriteError(format!("{}: {}", output_path.display(), e))
        })?;
        output_file.write_all(&encoded).map_err(|e| {
            DecodeError::OutputWriteError(format!("{}: {}", output_path.display(), e))
        })?;

        Ok(report)
    }

    /// Converts every input, continuing past files that fail.
    pub fn convert_batch(&self, inputs: &[PathBuf], output_dir: Option<&Path>) -> Vec<BatchOutcome> {
        inputs
            .iter()
            .map(|input| {
                let output = self.output_path_for(input, output_dir);
                let result = self.convert_file(input, &output);
                if let Err(e) = &result {
                    error!(input = %input.display(), "Conversion failed: {}", e);
                }
                BatchOutcome {
                    input: input.clone(),
                    output,
                    result,
                }
            })
            .collect()
    }

    /// `<stem>_rgb.tiff` when debayering, `<stem>_raw.tiff` otherwise, next to
    /// the input unless `output_dir` is given.
    pub fn output_path_for(&self, input: &Path, output_dir: Option<&Path>) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());
        let suffix = if self.config.debayer { "rgb" } else { "raw" };
        let file_name = format!("{}_{}.tiff", stem, suffix);

        match output_dir {
            Some(dir) => dir.join(file_name),
            None => input.with_file_name(file_name),
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }
}
