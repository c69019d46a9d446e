//! Average hash fingerprints

use image::{DynamicImage, imageops::FilterType};

/// Fingerprint sizes used for combined scoring, coarse then fine
pub const SIZES: [u32; 2] = [8, 16];

/// Bit string derived from a downsampled grayscale image, one bit per pixel set if the pixel is
/// brighter than the image mean
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fingerprint {
    /// Bits, packed from least significant bit
    words: Vec<u64>,
    /// Number of valid bits
    len: usize,
}

impl Fingerprint {
    /// Compute fingerprint of `size`x`size` bits, aspect ratio is ignored
    #[must_use]
    pub fn new(img: &DynamicImage, size: u32) -> Self {
        let luma = img.resize_exact(size, size, FilterType::Lanczos3).to_luma8();
        let pixels = luma.as_raw();
        let sum: u64 = pixels.iter().copied().map(u64::from).sum();
        // mean comparison done as pixel * len > sum to stay exact
        let len = pixels.len();
        let len_u64 = len as u64;
        let mut words = vec![0; len.div_ceil(64)];
        for (i, word) in words.iter_mut().enumerate() {
            for (bit, pixel) in pixels.iter().skip(i * 64).take(64).enumerate() {
                if u64::from(*pixel) * len_u64 > sum {
                    *word |= 1 << bit;
                }
            }
        }
        Self { words, len }
    }

    /// Number of bits
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if fingerprint has no bits (empty image)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of differing bits, or the length of `self` if lengths differ
    #[must_use]
    pub fn distance(&self, other: &Self) -> usize {
        if self.len != other.len {
            return self.len;
        }
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum()
    }

    /// Similarity in `[0, 1]`, `1 - distance / len`
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn similarity(&self, other: &Self) -> f64 {
        if self.is_empty() {
            return if other.is_empty() { 1.0 } else { 0.0 };
        }
        1.0 - self.distance(other) as f64 / self.len() as f64
    }
}

/// Average of fingerprint similarities over all [`SIZES`]
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn hash_similarity(a: &DynamicImage, b: &DynamicImage) -> f64 {
    let total: f64 = SIZES
        .iter()
        .map(|size| Fingerprint::new(a, *size).similarity(&Fingerprint::new(b, *size)))
        .sum();
    total / SIZES.len() as f64
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, Rgb, RgbImage};

    use super::*;

    fn checkerboard(size: u32, cell: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(size, size, |x, y| {
            Luma([if (x / cell + y / cell) % 2 == 0 { 0 } else { 255 }])
        }))
    }

    #[test]
    fn bits() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(8, 8, |x, _| {
            Luma([if x < 4 { 10 } else { 200 }])
        }));
        let fp = Fingerprint::new(&img, 8);
        assert_eq!(fp.len(), 64);
        assert_eq!(fp.words, vec![0xF0F0_F0F0_F0F0_F0F0]);
    }

    #[test]
    fn flat_image_has_no_bit_set() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([90, 20, 200])));
        for size in SIZES {
            let fp = Fingerprint::new(&img, size);
            assert_eq!(fp.len(), (size * size) as usize);
            assert!(fp.words.iter().all(|w| *w == 0));
        }
    }

    #[test]
    fn large_fingerprint_spans_words() {
        let fp = Fingerprint::new(&checkerboard(64, 16), 16);
        assert_eq!(fp.len(), 256);
        assert_eq!(fp.words.len(), 4);
        assert_eq!(fp.words.iter().map(|w| w.count_ones()).sum::<u32>(), 128);
    }

    #[test]
    fn distance() {
        let a = Fingerprint::new(&checkerboard(64, 16), 8);
        let b = Fingerprint::new(&checkerboard(64, 16).fliph(), 8);
        assert_eq!(a.distance(&a), 0);
        assert_eq!(a.distance(&b), 64);
        assert_eq!(b.distance(&a), 64);
        assert!((a.similarity(&b)).abs() < f64::EPSILON);
        assert!((a.similarity(&a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_length_mismatch() {
        let img = checkerboard(64, 16);
        let small = Fingerprint::new(&img, 8);
        let large = Fingerprint::new(&img, 16);
        assert_eq!(small.distance(&large), 64);
        assert_eq!(large.distance(&small), 256);
        assert!(small.similarity(&large).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_size() {
        let fp = Fingerprint {
            words: Vec::new(),
            len: 0,
        };
        let other = Fingerprint::new(&checkerboard(64, 16), 8);
        assert!(fp.is_empty());
        assert_eq!(fp.distance(&fp), 0);
        assert!((fp.similarity(&fp) - 1.0).abs() < f64::EPSILON);
        assert!(fp.similarity(&other).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_image() {
        let empty = DynamicImage::new_rgb8(0, 0);
        let fp = Fingerprint::new(&empty, 8);
        assert_eq!(fp.len(), 64);
        assert!(!fp.is_empty());
        let other = Fingerprint::new(&checkerboard(64, 16), 8);
        let sim = fp.similarity(&other);
        assert!((0.0..=1.0).contains(&sim));
    }

    #[test]
    fn hash_similarity_bounds() {
        let a = checkerboard(64, 16);
        let b = a.fliph();
        assert!((hash_similarity(&a, &a) - 1.0).abs() < f64::EPSILON);
        let sim = hash_similarity(&a, &b);
        assert!((0.0..=1.0).contains(&sim));
        assert!((sim - hash_similarity(&b, &a)).abs() < f64::EPSILON);
    }
}
