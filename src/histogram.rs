//! Color histograms

use image::DynamicImage;

/// Bucket count per channel
const BUCKETS: usize = 256;

/// Per channel RGB histogram of an image
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColorHistogram {
    /// Pixel count for each channel value, R then G then B
    channels: [[u64; BUCKETS]; 3],
    /// Total pixel count
    pixels: u64,
}

impl ColorHistogram {
    /// Compute histogram, image is converted to 8 bit RGB first
    #[must_use]
    pub fn new(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let mut channels = [[0; BUCKETS]; 3];
        for pixel in rgb.pixels() {
            for (channel, value) in channels.iter_mut().zip(pixel.0) {
                if let Some(count) = channel.get_mut(usize::from(value)) {
                    *count += 1;
                }
            }
        }
        Self {
            channels,
            pixels: u64::from(rgb.width()) * u64::from(rgb.height()),
        }
    }

    /// Intersection of normalized histograms, averaged over channels, in `[0, 1]`
    ///
    /// For each channel this is the sum of the per bucket minimums of both normalized
    /// histograms. A channel of an image without pixels scores 0.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> f64 {
        let total: f64 = self
            .channels
            .iter()
            .zip(&other.channels)
            .map(|(a, b)| channel_intersection(a, self.pixels, b, other.pixels))
            .sum();
        total / 3.0
    }
}

/// Normalized intersection computed on raw counts, `sum(min(a / na, b / nb))` is
/// `sum(min(a * nb, b * na)) / (na * nb)`, exact until the final division
#[expect(clippy::cast_precision_loss)]
fn channel_intersection(a: &[u64; BUCKETS], na: u64, b: &[u64; BUCKETS], nb: u64) -> f64 {
    if na == 0 || nb == 0 {
        return 0.0;
    }
    let (na, nb) = (u128::from(na), u128::from(nb));
    let common: u128 = a
        .iter()
        .zip(b)
        .map(|(ca, cb)| (u128::from(*ca) * nb).min(u128::from(*cb) * na))
        .sum();
    // both masses are 1 once normalized
    common as f64 / (na * nb) as f64
}
