//! Degraded artwork variants
//!
//! Reproduces what artwork typically goes through when scraped from various sites: crops,
//! repeated lossy recompression, downscaling and upscaling.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{
    DynamicImage, ImageFormat, ImageResult, codecs::jpeg::JpegEncoder, imageops::FilterType,
};

use crate::artwork::{self, Format};

/// A lossy transformation applied to artwork
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    strum::EnumIter,
    strum::EnumString,
    strum::VariantArray,
    strum::AsRefStr,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Degradation {
    /// Keep the central 80% of the width, full height
    CroppedNonSquare,
    /// JPEG quality 30, 10 times in a row
    #[strum(serialize = "lossy_10x")]
    Lossy10x,
    /// Downscale to 300x300
    #[strum(serialize = "low_res_300x300")]
    LowRes300,
    /// Downscale to 100x100, then upscale to 1024x1024
    ShrunkBlownUp,
    /// JPEG quality 5, once
    VeryLossy,
}

impl Degradation {
    /// Apply the transformation to an image, returning a new image
    pub fn apply(self, img: &DynamicImage) -> ImageResult<DynamicImage> {
        let degraded = match self {
            Degradation::CroppedNonSquare => {
                let crop_width = img.width() * 4 / 5;
                let left = (img.width() - crop_width) / 2;
                img.crop_imm(left, 0, crop_width, img.height())
            }
            Degradation::Lossy10x => recompress_jpeg(img, 30, 10)?,
            Degradation::LowRes300 => img.resize_exact(300, 300, FilterType::Lanczos3),
            Degradation::ShrunkBlownUp => img
                .resize_exact(100, 100, FilterType::Lanczos3)
                .resize_exact(1024, 1024, FilterType::Lanczos3),
            Degradation::VeryLossy => recompress_jpeg(img, 5, 1)?,
        };
        Ok(degraded)
    }
}

/// Encode and decode image as JPEG at given quality, `passes` times
pub fn recompress_jpeg(
    img: &DynamicImage,
    quality: u8,
    passes: usize,
) -> ImageResult<DynamicImage> {
    let mut cur = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    for _ in 0..passes {
        buf.clear();
        cur.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
        cur = image::load_from_memory_with_format(&buf, ImageFormat::Jpeg)?;
    }
    Ok(cur)
}

/// Losslessly recompress a PNG file in place
pub fn crunch_png(path: &Path) {
    log::debug!("Crunching PNG file {path:?}...");
    let options = oxipng::Options::from_preset(2);
    match oxipng::optimize(
        &oxipng::InFile::Path(path.to_owned()),
        &oxipng::OutFile::from_path(path.to_owned()),
        &options,
    ) {
        #[expect(clippy::cast_precision_loss)]
        Ok((size_before, size_after)) => {
            let size_delta = size_before.checked_sub(size_after).unwrap_or_default();
            log::debug!(
                "PNG crunching saved {} bytes ({:.02}%)",
                size_delta,
                100.0 * size_delta as f64 / size_before as f64
            );
        }
        Err(err) => {
            log::warn!("Failed to crunch PNG file {path:?}: {err}");
        }
    }
}

/// Write degraded variants of an image file to a directory, as PNG files named
/// `<source stem>_<degradation>.png`
pub fn write_variants(
    src: &Path,
    output_dir: &Path,
    degradations: &[Degradation],
) -> anyhow::Result<Vec<PathBuf>> {
    let img = artwork::load(src)?;
    let stem = src
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Invalid file name {src:?}"))?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory {output_dir:?}"))?;

    let mut outputs = Vec::with_capacity(degradations.len());
    for degradation in degradations {
        let degraded = degradation
            .apply(&img)
            .with_context(|| format!("Failed to apply {degradation} to {src:?}"))?;
        let output = output_dir.join(format!(
            "{stem}_{degradation}.{}",
            Format::Png.extension()
        ));
        degraded
            .save_with_format(&output, Format::Png.to_image_format())
            .with_context(|| format!("Failed to write {output:?}"))?;
        crunch_png(&output);
        log::info!(
            "Wrote {output:?} ({}x{})",
            degraded.width(),
            degraded.height()
        );
        outputs.push(output);
    }
    Ok(outputs)
}
