//! RAW image reading module
//!
//! This module decodes headerless Bayer sensor dumps whose geometry is
//! inferred from the byte length.

pub mod format;
mod headerless_reader;
mod reader;
pub mod types;

pub use format::{FormatCandidate, detect};
pub use headerless_reader::{HeaderlessReader, decode};
pub use reader::RawImageReader;
pub use types::{CandidateSource, DecodeHints, RawFrame, SampleDepth};
