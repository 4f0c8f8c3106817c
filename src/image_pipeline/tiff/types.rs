//! Output settings for a conversion

use std::str::FromStr;

use crate::image_pipeline::debayer::types::BayerPattern;

/// Compression applied to the TIFF strips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    None,
    /// Slowest to write; predictor 2 helps a lot on 16-bit mosaics
    Lzw,
    DeflateFast,
    DeflateBest,
    DeflateBalanced,
}

impl FromStr for TiffCompression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(TiffCompression::None),
            "lzw" => Ok(TiffCompression::Lzw),
            "deflate-fast" => Ok(TiffCompression::DeflateFast),
            "deflate-balanced" | "deflate" => Ok(TiffCompression::DeflateBalanced),
            "deflate-best" => Ok(TiffCompression::DeflateBest),
            other => Err(format!(
                "unknown compression '{}' (none, lzw, deflate-fast, deflate-balanced, deflate-best)",
                other
            )),
        }
    }
}

/// How a decoded frame is turned into a TIFF
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub compression: TiffCompression,
    /// TIFF predictor tag (2 = horizontal differencing); `None` writes none
    pub predictor: Option<u16>,
    /// Reject frames too small for the selected output before encoding
    pub validate_dimensions: bool,
    /// RGB8 output when set, Gray16 mosaic otherwise
    pub debayer: bool,
    pub pattern: BayerPattern,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::None,
            predictor: None,
            validate_dimensions: true,
            debayer: true,
            pattern: BayerPattern::Rggb,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
    validate_dimensions: Option<bool>,
    debayer: Option<bool>,
    pattern: Option<BayerPattern>,
}

impl ConversionConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn debayer(mut self, enable: bool) -> Self {
        self.debayer = Some(enable);
        self
    }

    pub fn pattern(mut self, pattern: BayerPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            debayer: self.debayer.unwrap_or(default.debayer),
            pattern: self.pattern.unwrap_or(default.pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ConversionConfig::builder()
            .compression(TiffCompression::DeflateFast)
            .predictor(Some(2))
            .validate_dimensions(false)
            .pattern(BayerPattern::Gbrg)
            .build();

        assert_eq!(config.compression, TiffCompression::DeflateFast);
        assert_eq!(config.predictor, Some(2));
        assert!(!config.validate_dimensions);
        assert!(config.debayer);
        assert_eq!(config.pattern, BayerPattern::Gbrg);
    }

    #[test]
    fn test_compression_from_str() {
        assert_eq!("LZW".parse::<TiffCompression>(), Ok(TiffCompression::Lzw));
        assert_eq!(
            "deflate".parse::<TiffCompression>(),
            Ok(TiffCompression::DeflateBalanced)
        );
        assert!("zstd".parse::<TiffCompression>().is_err());
    }
}
