//! Headerless RAW reader.
//!
//! Sensor dumps written straight from the frame grabber have no header at
//! all: just `width * height` samples, row-major, in the host byte order.
//! Samples are stored in 1 byte (8-bit data) or 2 bytes (12- or 16-bit data).

use tracing::{debug, warn};

use crate::image_pipeline::common::error::{DecodeError, Result};
use crate::image_pipeline::raw::format::{self, FormatCandidate};
use crate::image_pipeline::raw::reader::RawImageReader;
use crate::image_pipeline::raw::types::{CandidateSource, DecodeHints, RawFrame, SampleDepth};

/// RAW reader for headerless sensor dumps, configured with the expected geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderlessReader {
    hints: DecodeHints,
}

impl HeaderlessReader {
    pub fn new(hints: DecodeHints) -> Self {
        Self { hints }
    }
}

impl RawImageReader for HeaderlessReader {
    /// Detects the geometry of `data` and decodes it into a normalized frame.
    ///
    /// Hinted dimensions are tried first, then the full/half/quarter reference
    /// resolutions. Samples are shifted onto the 16-bit scale: 8-bit by 8,
    /// 12-bit by 4, 16-bit unchanged.
    fn read_raw(&self, data: &[u8]) -> Result<RawFrame> {
        debug!("Decoding headerless RAW, {} bytes", data.len());

        let candidate = match format::detect(data.len(), &self.hints) {
            Some(c) => c,
            None => {
                warn!(
                    len = data.len(),
                    hint_width = self.hints.width,
                    hint_height = self.hints.height,
                    "No candidate geometry matches the buffer length"
                );
                return Err(DecodeError::FormatUnrecognized { len: data.len() });
            }
        };

        if candidate.source == CandidateSource::Fallback {
            debug!(
                "Hinted {}x{} did not match, auto-detected {}x{}",
                self.hints.width, self.hints.height, candidate.width, candidate.height
            );
        }

        let depth = stored_depth(&candidate, self.hints.bit_depth);
        let samples = normalize(data, candidate.bytes_per_sample, depth);

        debug!(
            "Detected {}x{} at {} byte(s)/sample, {}-bit",
            candidate.width,
            candidate.height,
            candidate.bytes_per_sample,
            depth.bits()
        );

        RawFrame::new(
            candidate.width,
            candidate.height,
            depth,
            candidate.bytes_per_sample,
            candidate.source,
            samples,
        )
    }
}

/// Decodes `data` with explicit hints.
pub fn decode(
    data: &[u8],
    hint_width: usize,
    hint_height: usize,
    hint_bit_depth: u32,
) -> Result<RawFrame> {
    let depth = SampleDepth::try_from(hint_bit_depth)?;
    HeaderlessReader::new(DecodeHints::new(hint_width, hint_height, depth)).read_raw(data)
}

/// Depth actually held in storage. One-byte samples can only be 8-bit;
/// two-byte samples are 12-bit when hinted so, otherwise treated as full 16-bit.
fn stored_depth(candidate: &FormatCandidate, hinted: SampleDepth) -> SampleDepth {
    match (candidate.bytes_per_sample, hinted) {
        (1, _) => SampleDepth::Eight,
        (_, SampleDepth::Twelve) => SampleDepth::Twelve,
        _ => SampleDepth::Sixteen,
    }
}

fn normalize(data: &[u8], bytes_per_sample: usize, depth: SampleDepth) -> Vec<u16> {
    let shift = depth.normalize_shift();
    match bytes_per_sample {
        1 => data.iter().map(|&v| u16::from(v) << shift).collect(),
        _ => data
            .chunks_exact(2)
            .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]) << shift)
            .collect(),
    }
}
