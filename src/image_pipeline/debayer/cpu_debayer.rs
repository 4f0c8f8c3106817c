use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{DecodeError, Result};
use crate::image_pipeline::debayer::types::{BayerPattern, RgbImage};
use crate::image_pipeline::raw::types::RawFrame;

/// Bilinear demosaic on the CPU, producing 8-bit RGB for display.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuDebayer;

impl CpuDebayer {
    pub fn new() -> Self {
        Self
    }

    /// Same as [`CpuDebayer::demosaic`], with the pattern given by name.
    ///
    /// An unknown name fails before any sample is touched.
    pub fn demosaic_named(&self, frame: &RawFrame, pattern: &str) -> Result<RgbImage> {
        let pattern: BayerPattern = pattern.parse()?;
        self.demosaic(frame, pattern)
    }

    /// Interpolates a full RGB image from `frame`.
    ///
    /// Samples are truncated to their high byte first, so the result is an
    /// 8-bit preview, not a precision-preserving reconstruction.
    #[instrument(skip(self, frame), fields(width = frame.width(), height = frame.height()))]
    pub fn demosaic(&self, frame: &RawFrame, pattern: BayerPattern) -> Result<RgbImage> {
        let width = frame.width();
        let height = frame.height();

        // Bilinear interpolation needs at least one full 2x2 cell.
        if width < 2 || height < 2 {
            return Err(DecodeError::InvalidDimensions(width, height));
        }

        let bayer_bytes: Vec<u8> = frame.samples().iter().map(|&s| (s >> 8) as u8).collect();

        let mut output_buf = vec![0u8; width * height * 3];
        let mut cursor = Cursor::new(&bayer_bytes[..]);
        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth8, &mut output_buf);

        debug!("Running demosaic with CFA={}, algo=Linear", pattern);

        bayer::run_demosaic(
            &mut cursor,
            BayerDepth::Depth8,
            to_cfa(pattern),
            Demosaic::Linear,
            &mut output_raster,
        )
        .map_err(|e| DecodeError::DemosaicFailed(format!("{:?}", e)))?;

        Ok(RgbImage::new(width, height, output_buf))
    }
}

fn to_cfa(pattern: BayerPattern) -> CFA {
    match pattern {
        BayerPattern::Rggb => CFA::RGGB,
        BayerPattern::Bggr => CFA::BGGR,
        BayerPattern::Grbg => CFA::GRBG,
        BayerPattern::Gbrg => CFA::GBRG,
    }
}
