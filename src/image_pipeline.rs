//! Image processing pipeline module
//!
//! This module provides a structured approach to headerless RAW decoding,
//! with separate modules for RAW reading, demosaicing, TIFF writing, and
//! conversion orchestration.

pub mod raw;
pub mod debayer;
pub mod tiff;
pub mod conversions;
pub mod common;

pub use common::{
    DecodeError,
    Result,
};

pub use raw::{
    CandidateSource,
    DecodeHints,
    HeaderlessReader,
    RawFrame,
    RawImageReader,
    SampleDepth,
    decode,
};

pub use debayer::{
    BayerPattern,
    CpuDebayer,
    RgbImage,
};

pub use tiff::{
    TiffCompression,
    ConversionConfig,
    ConversionConfigBuilder,
    TiffWriter,
    StandardTiffWriter,
};

pub use conversions::{
    BatchOutcome,
    ConversionReport,
    RawToTiffPipeline,
    find_latest_raw,
};
