//! Image similarity scoring
//!
//! Two strategies are available:
//! - [`Strategy::Combined`], the default: average hashes at two sizes blended with color histogram
//!   intersection, yields a similarity in `[0, 1]`, tolerant to heavy degradation
//! - [`Strategy::Phash`]: Hamming distance between DCT perceptual hashes, for near exact
//!   duplicate and reference matching
//!
//! Scoring is pure and synchronous, images are only read.

use std::{fmt, ptr};

use image::DynamicImage;

use crate::{fingerprint, histogram::ColorHistogram, perceptual_hash::PerceptualHash};

/// Scoring strategy
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    strum::EnumString,
    strum::VariantArray,
    strum::AsRefStr,
    strum::Display,
    serde::Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Average hashes and color histograms, similarity in `[0, 1]`
    #[default]
    Combined,
    /// DCT perceptual hash, Hamming distance
    Phash,
}

/// Result of scoring two images
#[derive(Debug, Copy, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    /// Similarity in `[0, 1]`, 1 is identical
    Similarity(f64),
    /// Hamming distance, 0 is identical
    Distance(u32),
}

impl Score {
    /// Return true if the score indicates the same artwork
    #[must_use]
    pub fn is_match(&self, thresholds: &Thresholds) -> bool {
        match self {
            Score::Similarity(similarity) => *similarity >= thresholds.min_similarity,
            Score::Distance(distance) => *distance <= thresholds.max_distance,
        }
    }

    /// Strategy that produced this score
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        match self {
            Score::Similarity(_) => Strategy::Combined,
            Score::Distance(_) => Strategy::Phash,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Similarity(similarity) => write!(f, "similarity {similarity:.4}"),
            Score::Distance(distance) => write!(f, "distance {distance}"),
        }
    }
}

/// Acceptance thresholds, one per strategy
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Thresholds {
    /// Minimum combined similarity for two images to be considered the same artwork
    pub min_similarity: f64,
    /// Maximum perceptual hash distance for two images to be considered the same artwork
    pub max_distance: u32,
}

impl Thresholds {
    /// Default minimum combined similarity
    pub const DEFAULT_MIN_SIMILARITY: f64 = 0.7;
    /// Default maximum perceptual hash distance
    pub const DEFAULT_MAX_DISTANCE: u32 = 2;
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_similarity: Self::DEFAULT_MIN_SIMILARITY,
            max_distance: Self::DEFAULT_MAX_DISTANCE,
        }
    }
}

/// Combine hash and histogram similarities
///
/// Agreement of both signals is trusted, and a strong hint of difference from either one pulls
/// the result down harder than a linear blend would.
fn combine(hash_similarity: f64, hist_similarity: f64) -> f64 {
    let combined = if hash_similarity > 0.8 && hist_similarity > 0.6 {
        hash_similarity * 0.7 + hist_similarity * 0.3
    } else if hash_similarity < 0.4 || hist_similarity < 0.3 {
        (hash_similarity * hist_similarity).sqrt()
    } else {
        hash_similarity * 0.8 + hist_similarity * 0.2
    };
    combined.clamp(0.0, 1.0)
}

/// Combined similarity of two images, in `[0, 1]`
#[must_use]
pub fn similarity(a: &DynamicImage, b: &DynamicImage) -> f64 {
    if ptr::eq(a, b) {
        return 1.0;
    }
    let hash_similarity = fingerprint::hash_similarity(a, b);
    let hist_similarity = ColorHistogram::new(a).intersection(&ColorHistogram::new(b));
    let combined = combine(hash_similarity, hist_similarity);
    log::trace!("hash={hash_similarity:.4} hist={hist_similarity:.4} combined={combined:.4}");
    combined
}

/// Perceptual hash distance of two images, in `0..=64`
#[must_use]
pub fn distance(a: &DynamicImage, b: &DynamicImage) -> u32 {
    PerceptualHash::from_image(a).distance(&PerceptualHash::from_image(b))
}

/// Score two images with given strategy
#[must_use]
pub fn score(a: &DynamicImage, b: &DynamicImage, strategy: Strategy) -> Score {
    match strategy {
        Strategy::Combined => Score::Similarity(similarity(a, b)),
        Strategy::Phash => Score::Distance(distance(a, b)),
    }
}
