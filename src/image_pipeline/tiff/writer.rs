use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::debayer::types::RgbImage;
use crate::image_pipeline::raw::types::RawFrame;
use crate::image_pipeline::tiff::types::ConversionConfig;

pub trait TiffWriter {
    /// Writes the normalized Bayer samples as a single-channel 16-bit TIFF.
    fn write_raw_tiff(&self, frame: &RawFrame, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
    /// Writes a demosaiced image as an 8-bit RGB TIFF.
    fn write_rgb_tiff(&self, image: &RgbImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
}
