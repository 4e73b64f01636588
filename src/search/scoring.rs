//! Score normalization for nearest-neighbor results.
//!
//! Stores report similarity in one of two metrics, or not at all. This module
//! reconciles them into a single 0-100 relevance score so callers never have
//! to know which metric a given backend speaks.

/// Fallback score when the store reports no similarity metadata.
const UNKNOWN_SCORE: f64 = 85.0;

/// Similarity metadata a store can report for a matched entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Similarity {
    /// Similarity in [0, 1] where 1 means identical
    Certainty(f64),

    /// Cosine distance in [0, 2] where 0 means identical
    Distance(f64),

    /// The store reported no usable similarity metadata
    Unknown,
}

impl Similarity {
    /// Normalize to a 0-100 relevance score, rounded to two decimals.
    ///
    /// `Unknown` maps to a fixed placeholder rather than failing the request;
    /// it is distinguishable from a store-reported score only through this
    /// enum, which is why result shaping carries `Similarity` instead of a
    /// bare number until the last moment.
    pub fn score(self) -> f64 {
        let raw = match self {
            Similarity::Certainty(certainty) => certainty * 100.0,
            Similarity::Distance(distance) => (1.0 - distance) * 100.0,
            Similarity::Unknown => UNKNOWN_SCORE,
        };
        (raw.clamp(0.0, 100.0) * 100.0).round() / 100.0
    }
}
