//! Pipeline conversions module
//!
//! This module contains orchestration logic for RAW to TIFF conversion and
//! locating RAW captures on disk.

mod discovery;
mod raw_to_tiff;

pub use discovery::{find_latest_raw, find_raw_files};
pub use raw_to_tiff::{BatchOutcome, ConversionReport, RawToTiffPipeline};
