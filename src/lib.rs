//! Cover art similarity scoring
//!
//! Internal API exposed for `coverdiff`/`coverdiff_r`/`coverdiff_degrade` binaries

use std::{
    path::{Path, PathBuf},
    process::{ExitCode, Termination},
    sync::{Arc, atomic::Ordering},
};

use anyhow::Context as _;
use image::DynamicImage;

use crate::{
    cl::{ScoringOptions, SelectionOptions},
    selection::Candidate,
    similarity::{Score, Strategy},
    walk::Stats,
};

pub mod artwork;
pub mod cl;
pub mod degrade;
pub mod fingerprint;
pub mod histogram;
pub mod perceptual_hash;
pub mod selection;
pub mod similarity;
#[cfg(test)]
mod testing;
pub mod walk;

/// Read and decode an image file on a blocking thread
pub async fn load_image(path: PathBuf) -> anyhow::Result<DynamicImage> {
    tokio::task::spawn_blocking(move || artwork::load(&path))
        .await
        .context("Image loading task failed")?
}

/// Outcome of comparing two images
pub enum CompareStatus {
    /// Images are the same artwork
    Match,
    /// Images are different artworks
    NoMatch,
}

impl Termination for CompareStatus {
    fn report(self) -> ExitCode {
        match self {
            CompareStatus::Match => ExitCode::SUCCESS,
            CompareStatus::NoMatch => ExitCode::FAILURE,
        }
    }
}

/// Comparison report, for JSON output
#[derive(Debug, serde::Serialize)]
pub struct CompareReport {
    /// First image path
    pub image_a: PathBuf,
    /// Second image path
    pub image_b: PathBuf,
    /// Strategy used
    pub strategy: Strategy,
    /// Score
    pub score: Score,
    /// Whether the score passes the threshold of the strategy
    pub is_match: bool,
}

impl CompareReport {
    /// Status for process exit code
    #[must_use]
    pub fn status(&self) -> CompareStatus {
        if self.is_match {
            CompareStatus::Match
        } else {
            CompareStatus::NoMatch
        }
    }
}

/// Decode two image files and score them
pub async fn compare_files(
    image_a: &Path,
    image_b: &Path,
    scoring: &ScoringOptions,
) -> anyhow::Result<CompareReport> {
    let (img_a, img_b) = futures::future::try_join(
        load_image(image_a.to_owned()),
        load_image(image_b.to_owned()),
    )
    .await?;

    let strategy = scoring.strategy;
    let score =
        tokio::task::spawn_blocking(move || similarity::score(&img_a, &img_b, strategy)).await?;
    let is_match = score.is_match(&scoring.thresholds());
    log::debug!("{image_a:?} vs {image_b:?}: {score}, match: {is_match}");

    Ok(CompareReport {
        image_a: image_a.to_owned(),
        image_b: image_b.to_owned(),
        strategy: score.strategy(),
        score,
        is_match,
    })
}

/// Selection report, for JSON output
#[derive(Debug, serde::Serialize)]
pub struct SelectionReport {
    /// Kept candidates, best first
    pub kept: Vec<SelectedCandidate>,
}

/// A kept candidate
#[derive(Debug, serde::Serialize)]
pub struct SelectedCandidate {
    /// Image path
    pub path: PathBuf,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl From<&Candidate> for SelectedCandidate {
    fn from(candidate: &Candidate) -> Self {
        let (width, height) = candidate.dimensions();
        Self {
            path: candidate.path.clone(),
            width,
            height,
        }
    }
}

/// Read and decode a candidate file on a blocking thread, updating stats
///
/// Candidates that fail to decode are logged and counted, `None` is returned for them.
pub async fn load_candidate(path: PathBuf, stats: &Stats) -> anyhow::Result<Option<Candidate>> {
    let res = tokio::task::spawn_blocking(move || Candidate::load(&path))
        .await
        .context("Candidate loading task failed")?;
    match res {
        Ok(candidate) => {
            stats.decoded.fetch_add(1, Ordering::Relaxed);
            Ok(Some(candidate))
        }
        Err(err) => {
            stats.decode_errors.fetch_add(1, Ordering::Relaxed);
            log::warn!("Skipping candidate: {err:#}");
            Ok(None)
        }
    }
}

/// Run the selection pipeline over decoded candidates, optionally against a reference image file
pub async fn select_candidates(
    candidates: Vec<Candidate>,
    reference: Option<&Path>,
    selection_opts: Arc<SelectionOptions>,
) -> anyhow::Result<SelectionReport> {
    let reference = match reference {
        Some(path) => Some(
            load_image(path.to_owned())
                .await
                .context("Failed to load reference image")?,
        ),
        None => None,
    };
    let candidate_count = candidates.len();
    let kept = tokio::task::spawn_blocking(move || {
        selection::downselect(candidates, reference.as_ref(), &selection_opts)
    })
    .await?;
    log::info!("Kept {} candidate(s) out of {}", kept.len(), candidate_count);
    Ok(SelectionReport {
        kept: kept.iter().map(SelectedCandidate::from).collect(),
    })
}
