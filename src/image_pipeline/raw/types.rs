//! RAW image data types

use crate::image_pipeline::common::error::{DecodeError, Result};

/// Meaningful bits per stored sample, independent of storage width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDepth {
    Eight,
    Twelve,
    Sixteen,
}

impl SampleDepth {
    pub fn bits(self) -> u32 {
        match self {
            SampleDepth::Eight => 8,
            SampleDepth::Twelve => 12,
            SampleDepth::Sixteen => 16,
        }
    }

    /// Left shift that brings a sample of this depth onto the 16-bit scale.
    pub fn normalize_shift(self) -> u32 {
        16 - self.bits()
    }
}

impl TryFrom<u32> for SampleDepth {
    type Error = DecodeError;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            8 => Ok(SampleDepth::Eight),
            12 => Ok(SampleDepth::Twelve),
            16 => Ok(SampleDepth::Sixteen),
            other => Err(DecodeError::UnsupportedBitDepth(other)),
        }
    }
}

/// Which part of the candidate table accepted a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Hinted,
    Fallback,
}

/// Caller's expectation of the sensor geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeHints {
    pub width: usize,
    pub height: usize,
    pub bit_depth: SampleDepth,
}

impl DecodeHints {
    pub fn new(width: usize, height: usize, bit_depth: SampleDepth) -> Self {
        Self {
            width,
            height,
            bit_depth,
        }
    }
}

impl Default for DecodeHints {
    fn default() -> Self {
        Self {
            width: super::format::REFERENCE_WIDTH,
            height: super::format::REFERENCE_HEIGHT,
            bit_depth: SampleDepth::Twelve,
        }
    }
}

/// A decoded single-channel Bayer frame, normalized to the 16-bit scale.
///
/// Frames are immutable once built; samples are stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    width: usize,
    height: usize,
    depth: SampleDepth,
    bytes_per_sample: usize,
    source: CandidateSource,
    samples: Vec<u16>,
}

impl RawFrame {
    /// Builds a frame from already-normalized samples.
    pub fn new(
        width: usize,
        height: usize,
        depth: SampleDepth,
        bytes_per_sample: usize,
        source: CandidateSource,
        samples: Vec<u16>,
    ) -> Result<Self> {
        if width == 0 || height == 0 || width.checked_mul(height) != Some(samples.len()) {
            return Err(DecodeError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            depth,
            bytes_per_sample,
            source,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bytes_per_sample
    }

    pub fn source(&self) -> CandidateSource {
        self.source
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn sample(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y * self.width + x).copied()
    }

    /// Minimum and maximum normalized sample.
    pub fn sample_range(&self) -> Option<(u16, u16)> {
        let min = self.samples.iter().min()?;
        let max = self.samples.iter().max()?;
        Some((*min, *max))
    }
}
