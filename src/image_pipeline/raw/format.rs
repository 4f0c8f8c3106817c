//! Geometry detection for headerless RAW dumps.
//!
//! A headerless file carries no width, height or depth. The only signal is
//! its byte length, which is matched against an ordered list of candidate
//! geometries. The first exact match wins.

use crate::image_pipeline::raw::types::{CandidateSource, DecodeHints};

/// Full-resolution width of the reference sensor.
pub const REFERENCE_WIDTH: usize = 4112;
/// Full-resolution height of the reference sensor.
pub const REFERENCE_HEIGHT: usize = 3008;

/// Storage widths tried, in order: 16-bit containers before 8-bit.
pub const SAMPLE_SIZES: [usize; 2] = [2, 1];

/// Full, half and quarter reference resolutions, in tie-break order.
pub const FALLBACK_RESOLUTIONS: [(usize, usize); 3] = [
    (REFERENCE_WIDTH, REFERENCE_HEIGHT),
    (REFERENCE_WIDTH / 2, REFERENCE_HEIGHT / 2),
    (REFERENCE_WIDTH / 4, REFERENCE_HEIGHT / 4),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCandidate {
    pub width: usize,
    pub height: usize,
    pub bytes_per_sample: usize,
    pub source: CandidateSource,
}

impl FormatCandidate {
    /// Exact byte length a buffer needs for this geometry. `None` on overflow.
    pub fn expected_len(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.bytes_per_sample)
    }

    /// Zero-area geometries never match, even against an empty buffer.
    pub fn matches(&self, len: usize) -> bool {
        self.width > 0 && self.height > 0 && self.expected_len() == Some(len)
    }
}

/// Every candidate geometry for the given hints, in match order.
///
/// Hinted dimensions come first (2 then 1 bytes/sample). The fallback
/// section iterates sample size in the outer loop and resolution in the
/// inner loop, so every 16-bit fallback is tried before any 8-bit one.
pub fn candidates(hints: &DecodeHints) -> Vec<FormatCandidate> {
    let hinted = SAMPLE_SIZES.iter().map(|&bytes_per_sample| FormatCandidate {
        width: hints.width,
        height: hints.height,
        bytes_per_sample,
        source: CandidateSource::Hinted,
    });

    let fallback = SAMPLE_SIZES.iter().flat_map(|&bytes_per_sample| {
        FALLBACK_RESOLUTIONS
            .iter()
            .map(move |&(width, height)| FormatCandidate {
                width,
                height,
                bytes_per_sample,
                source: CandidateSource::Fallback,
            })
    });

    hinted.chain(fallback).collect()
}

/// First candidate whose expected length equals `len` exactly.
pub fn detect(len: usize, hints: &DecodeHints) -> Option<FormatCandidate> {
    candidates(hints).into_iter().find(|c| c.matches(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::raw::types::SampleDepth;

    fn hints(width: usize, height: usize) -> DecodeHints {
        DecodeHints::new(width, height, SampleDepth::Twelve)
    }

    #[test]
    fn test_candidate_order() {
        let list = candidates(&hints(10, 8));
        let summary: Vec<_> = list
            .iter()
            .map(|c| (c.width, c.height, c.bytes_per_sample))
            .collect();
        assert_eq!(
            summary,
            vec![
                (10, 8, 2),
                (10, 8, 1),
                (4112, 3008, 2),
                (2056, 1504, 2),
                (1028, 752, 2),
                (4112, 3008, 1),
                (2056, 1504, 1),
                (1028, 752, 1),
            ]
        );
    }

    #[test]
    fn test_hinted_geometry_preferred() {
        let found = detect(10 * 8 * 2, &hints(10, 8)).unwrap();
        assert_eq!(found.source, CandidateSource::Hinted);
        assert_eq!(found.bytes_per_sample, 2);

        let found = detect(10 * 8, &hints(10, 8)).unwrap();
        assert_eq!(found.source, CandidateSource::Hinted);
        assert_eq!(found.bytes_per_sample, 1);
    }

    #[test]
    fn test_fallback_resolutions() {
        let found = detect(1028 * 752 * 2, &hints(1, 1)).unwrap();
        assert_eq!((found.width, found.height, found.bytes_per_sample), (1028, 752, 2));
        assert_eq!(found.source, CandidateSource::Fallback);

        let found = detect(2056 * 1504, &hints(1, 1)).unwrap();
        assert_eq!((found.width, found.height, found.bytes_per_sample), (2056, 1504, 1));
    }

    #[test]
    fn test_ambiguous_length_resolves_to_first_match() {
        // A hinted 2056x752 frame at 2 bytes/sample has the same length as the
        // 8-bit half-resolution fallback.
        let len = 2056 * 1504;
        let found = detect(len, &hints(2056, 752)).unwrap();
        assert_eq!(found.source, CandidateSource::Hinted);
        assert_eq!((found.width, found.height, found.bytes_per_sample), (2056, 752, 2));

        // Hinted 8-bit geometry is tried before the equal-length fallback.
        let found = detect(len, &hints(1504, 2056)).unwrap();
        assert_eq!((found.width, found.height), (1504, 2056));
    }

    #[test]
    fn test_no_match() {
        assert!(detect(0, &hints(10, 8)).is_none());
        assert!(detect(10 * 8 * 2 - 1, &hints(10, 8)).is_none());
        assert!(detect(0, &hints(0, 0)).is_none());
        assert!(detect(0, &hints(0, 7)).is_none());
    }
}
