//! Command line interface

use std::path::PathBuf;

use clap::Parser;
use strum::VariantArray as _;

use crate::{
    degrade::Degradation,
    similarity::{Strategy, Thresholds},
};

/// Command line arguments for `coverdiff` binary
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct CoverdiffArgs {
    /// First image file
    pub image_a: PathBuf,
    /// Second image file
    pub image_b: PathBuf,
    /// Scoring options
    #[clap(flatten)]
    pub scoring: ScoringOptions,
    /// Print a JSON report to stdout
    #[clap(short, long)]
    pub json: bool,
    /// Level of logging output
    #[clap(short, long, default_value_t = log::Level::Info)]
    pub verbosity: log::Level,
}

/// Command line arguments for `coverdiff_r` binary
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct CoverdiffRecursiveArgs {
    /// Directory to recursively scan for candidate images
    pub candidates_dir: PathBuf,
    /// Known good reference image, candidates not matching it are dropped
    #[clap(short, long)]
    pub reference: Option<PathBuf>,
    /// Selection options
    #[clap(flatten)]
    pub selection: SelectionOptions,
    /// Print a JSON report to stdout
    #[clap(short, long)]
    pub json: bool,
    /// Level of logging output
    #[clap(short, long, default_value_t = log::Level::Info)]
    pub verbosity: log::Level,
}

/// Command line arguments for `coverdiff_degrade` binary
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct DegradeArgs {
    /// Source image file
    pub input: PathBuf,
    /// Directory to write degraded variants to
    pub output_dir: PathBuf,
    /// Degradations to apply, if not set apply all of them.
    /// Use multiple times to apply several.
    #[clap(short, long, default_values_t = Degradation::VARIANTS.to_vec())]
    pub degradations: Vec<Degradation>,
    /// Level of logging output
    #[clap(short, long, default_value_t = log::Level::Info)]
    pub verbosity: log::Level,
}

/// Command line arguments related to scoring
#[derive(Parser, Debug, Clone)]
pub struct ScoringOptions {
    /// Scoring strategy
    #[clap(short, long, default_value_t = Strategy::default())]
    pub strategy: Strategy,
    /// Minimum similarity to consider two images the same artwork, for combined strategy
    #[clap(
        long,
        default_value_t = Thresholds::DEFAULT_MIN_SIMILARITY,
        value_parser = parse_similarity
    )]
    pub min_similarity: f64,
    /// Maximum hash distance to consider two images the same artwork, for phash strategy and
    /// reference matching
    #[clap(long, default_value_t = Thresholds::DEFAULT_MAX_DISTANCE)]
    pub max_distance: u32,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            strategy: Strategy::default(),
            min_similarity: thresholds.min_similarity,
            max_distance: thresholds.max_distance,
        }
    }
}

impl ScoringOptions {
    /// Acceptance thresholds from options
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_similarity: self.min_similarity,
            max_distance: self.max_distance,
        }
    }
}

/// Command line arguments related to candidate selection
#[derive(Parser, Debug, Clone)]
pub struct SelectionOptions {
    /// Scoring options
    #[clap(flatten)]
    pub scoring: ScoringOptions,
    /// Maximum number of candidates to keep
    #[clap(short = 'n', long, default_value_t = 5)]
    pub max_results: usize,
    /// Keep candidates that are not roughly square
    #[clap(short, long)]
    pub any_aspect_ratio: bool,
}

fn parse_similarity(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|err| format!("{err}"))?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("{v} is not in [0, 1]"))
    }
}
