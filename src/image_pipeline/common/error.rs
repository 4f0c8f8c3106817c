use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unrecognized RAW format: no candidate geometry matches {len} bytes")]
    FormatUnrecognized { len: usize },

    #[error("Unsupported Bayer pattern: {0}")]
    UnsupportedPattern(String),

    #[error("Unsupported bit depth: {0} (expected 8, 12 or 16)")]
    UnsupportedBitDepth(u32),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Demosaic failed: {0}")]
    DemosaicFailed(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
