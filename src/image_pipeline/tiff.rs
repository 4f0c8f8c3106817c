//! TIFF output
//!
//! Decoded mosaics are written as 16-bit grayscale, demosaiced frames as
//! 8-bit RGB, both through the same compression settings.

pub mod types;
mod standard_tiff_writer;
mod writer;

pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{ConversionConfig, ConversionConfigBuilder, TiffCompression};
pub use writer::TiffWriter;
