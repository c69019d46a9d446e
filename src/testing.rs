//! Synthetic artwork corpus for tests
//!
//! `first` is banded grey artwork with a colored panel, an off-centre dark square and a bright
//! bar, `second` a dark gradient with a bright stripe. Both are built from flat 8x8 aligned blocks
//! so JPEG recompression stays mild, and colors vary along luma-neutral directions.

use std::{collections::HashMap, sync::LazyLock};

use image::{DynamicImage, Rgb, RgbImage};
use strum::IntoEnumIterator as _;

use crate::degrade::{self, Degradation};

const SIZE: u32 = 512;

/// Decoded test images and their degraded variants
pub(crate) struct Corpus {
    pub first: DynamicImage,
    pub second: DynamicImage,
    /// `first` recompressed once at JPEG quality 30
    pub first_lossy_1x: DynamicImage,
    first_variants: HashMap<Degradation, DynamicImage>,
    second_variants: HashMap<Degradation, DynamicImage>,
}

impl Corpus {
    pub(crate) fn first_variant(&self, degradation: Degradation) -> &DynamicImage {
        &self.first_variants[&degradation]
    }

    pub(crate) fn second_variant(&self, degradation: Degradation) -> &DynamicImage {
        &self.second_variants[&degradation]
    }
}

pub(crate) static CORPUS: LazyLock<Corpus> = LazyLock::new(|| {
    let first = first_artwork();
    let second = second_artwork();
    let degrade_all = |img: &DynamicImage| {
        Degradation::iter()
            .map(|d| (d, d.apply(img).unwrap()))
            .collect::<HashMap<_, _>>()
    };
    Corpus {
        first_lossy_1x: degrade::recompress_jpeg(&first, 30, 1).unwrap(),
        first_variants: degrade_all(&first),
        second_variants: degrade_all(&second),
        first,
        second,
    }
});

/// Blue offset that cancels a red offset in luma
fn luma_neutral_blue(red_delta: i32) -> i32 {
    (red_delta * 2945).div_euclid(1000)
}

fn channel(v: i32) -> u8 {
    u8::try_from(v).unwrap()
}

pub(crate) fn first_artwork() -> DynamicImage {
    const BANDS: [u8; 8] = [108, 148, 108, 148, 148, 108, 148, 108];
    DynamicImage::ImageRgb8(RgbImage::from_fn(SIZE, SIZE, |x, y| {
        let band = (y / 64) as usize;
        if (64..176).contains(&x) && (320..448).contains(&y) {
            Rgb([36, 36, 36])
        } else if (384..448).contains(&x) && (64..256).contains(&y) {
            Rgb([224, 224, 224])
        } else if band == 3 {
            let d = i32::try_from(x * 37 / SIZE).unwrap() - 18;
            Rgb([channel(236 + d), 132, channel(60 - luma_neutral_blue(d))])
        } else {
            let v = BANDS[band];
            Rgb([v, v, v])
        }
    }))
}

pub(crate) fn second_artwork() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(SIZE, SIZE, |x, y| {
        if (64..128).contains(&y) {
            Rgb([240, 250, 255])
        } else {
            let d = i32::try_from(x * 21 / SIZE).unwrap() - 10;
            Rgb([channel(12 + d), 2, channel(40 - luma_neutral_blue(d))])
        }
    }))
}
