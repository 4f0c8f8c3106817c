use std::io::{Cursor, Write};

use tiff::encoder::TiffEncoder;
use tiff::encoder::compression::DeflateLevel;
use tiff::tags::Predictor;
use tracing::debug;

use crate::image_pipeline::common::error::{DecodeError, Result};
use crate::image_pipeline::debayer::types::RgbImage;
use crate::image_pipeline::raw::types::RawFrame;
use crate::image_pipeline::tiff::types::{ConversionConfig, TiffCompression};
use crate::image_pipeline::tiff::writer::TiffWriter;

pub struct StandardTiffWriter;

fn encoder_for<'a>(
    buffer: &'a mut Vec<u8>,
    config: &ConversionConfig,
) -> Result<TiffEncoder<Cursor<&'a mut Vec<u8>>>> {
    let compression = match config.compression {
        TiffCompression::None => tiff::encoder::Compression::Uncompressed,
        TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
        TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(DeflateLevel::Fast),
        TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(DeflateLevel::Balanced),
        TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(DeflateLevel::Best),
    };

    let mut encoder = TiffEncoder::new(Cursor::new(buffer))
        .map_err(|e| DecodeError::EncodeError(e.to_string()))?
        .with_compression(compression);

    if let Some(predictor_val) = config.predictor {
        let predictor = match predictor_val {
            2 => Predictor::Horizontal,
            _ => Predictor::None,
        };
        encoder = encoder.with_predictor(predictor);
    }

    Ok(encoder)
}

impl TiffWriter for StandardTiffWriter {
    fn write_raw_tiff(&self, frame: &RawFrame, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        debug!("Encoding Gray16 TIFF: {}x{}", frame.width(), frame.height());

        let mut buffer = Vec::new();
        encoder_for(&mut buffer, config)?
            .write_image::<tiff::encoder::colortype::Gray16>(
                frame.width() as u32,
                frame.height() as u32,
                frame.samples(),
            )
            .map_err(|e| DecodeError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }

    fn write_rgb_tiff(&self, image: &RgbImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        debug!("Encoding RGB8 TIFF: {}x{}", image.width(), image.height());

        let mut buffer = Vec::new();
        encoder_for(&mut buffer, config)?
            .write_image::<tiff::encoder::colortype::RGB8>(
                image.width() as u32,
                image.height() as u32,
                image.data(),
            )
            .map_err(|e| DecodeError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }
}
