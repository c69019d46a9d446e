//! Candidate artwork selection

use std::{
    cmp::{self, Reverse},
    fmt,
    path::{Path, PathBuf},
};

use image::DynamicImage;
use itertools::Itertools as _;
use typed_floats::PositiveFinite;

use crate::{
    artwork,
    cl::SelectionOptions,
    perceptual_hash::PerceptualHash,
    similarity::{self, Strategy, Thresholds},
};

/// Accepted aspect ratio range for squarish artwork
const SQUARISH_RATIO: std::ops::RangeInclusive<f64> = 0.9..=1.1;

/// A decoded candidate image
pub struct Candidate {
    /// Where the image comes from
    pub path: PathBuf,
    /// Decoded image
    pub image: DynamicImage,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        write!(f, "{} {}x{}", self.path.display(), width, height)
    }
}

impl Candidate {
    /// Read and decode candidate from file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.to_owned(),
            image: artwork::load(path)?,
        })
    }

    /// Width and height in pixels
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Pixel count
    #[must_use]
    pub fn resolution(&self) -> u64 {
        u64::from(self.image.width()) * u64::from(self.image.height())
    }

    /// Width divided by height, infinite or NaN for zero height
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.image.width()) / f64::from(self.image.height())
    }

    /// Distance to a perfect square aspect ratio
    fn squareness(&self) -> Option<PositiveFinite<f64>> {
        PositiveFinite::<f64>::try_from((self.aspect_ratio() - 1.0).abs()).ok()
    }

    /// Key to sort by preference, larger is better
    fn rank_key(&self) -> (u64, Option<Reverse<PositiveFinite<f64>>>) {
        (self.resolution(), self.squareness().map(Reverse))
    }
}

/// Compare two candidates, prefer higher resolution, then closest to square
pub fn compare(a: &Candidate, b: &Candidate) -> cmp::Ordering {
    a.rank_key()
        .cmp(&b.rank_key())
        .then_with(|| b.path.cmp(&a.path))
}

/// Keep candidates whose perceptual hash distance to the reference is within `max_distance`
#[must_use]
pub fn filter_by_reference(
    candidates: Vec<Candidate>,
    reference: &DynamicImage,
    max_distance: u32,
) -> Vec<Candidate> {
    let reference_hash = PerceptualHash::from_image(reference);
    log::debug!("Reference hash: {}", reference_hash.to_base64());
    candidates
        .into_iter()
        .filter(|candidate| {
            let distance = PerceptualHash::from_image(&candidate.image).distance(&reference_hash);
            let keep = distance <= max_distance;
            log::debug!(
                "{candidate}: distance to reference {distance}, {}",
                if keep { "kept" } else { "dropped" }
            );
            keep
        })
        .collect()
}

/// Keep candidates with a roughly square aspect ratio
pub fn retain_squarish(candidates: &mut Vec<Candidate>) {
    candidates.retain(|candidate| {
        let keep = SQUARISH_RATIO.contains(&candidate.aspect_ratio());
        if !keep {
            log::debug!("{candidate}: not square");
        }
        keep
    });
}

/// Drop candidates matching an already kept one, best candidates are considered first
#[must_use]
pub fn dedup(
    candidates: Vec<Candidate>,
    strategy: Strategy,
    thresholds: &Thresholds,
) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates.into_iter().sorted_by(|a, b| compare(b, a)) {
        let duplicate_of = kept.iter().find(|k| {
            similarity::score(&k.image, &candidate.image, strategy).is_match(thresholds)
        });
        if let Some(duplicate_of) = duplicate_of {
            log::debug!("{candidate}: duplicate of {duplicate_of}");
        } else {
            kept.push(candidate);
        }
    }
    kept
}

/// Full selection pipeline: reference filter, aspect ratio filter, de-duplication, then
/// keep the best candidates
#[must_use]
pub fn downselect(
    candidates: Vec<Candidate>,
    reference: Option<&DynamicImage>,
    opts: &SelectionOptions,
) -> Vec<Candidate> {
    let thresholds = opts.scoring.thresholds();
    let mut candidates = match reference {
        Some(reference) => filter_by_reference(candidates, reference, thresholds.max_distance),
        None => candidates,
    };
    if !opts.any_aspect_ratio {
        retain_squarish(&mut candidates);
    }
    let mut kept = dedup(candidates, opts.scoring.strategy, &thresholds);
    kept.truncate(opts.max_results);
    log::debug!("Selected:\n{}", kept.iter().join("\n"));
    kept
}
