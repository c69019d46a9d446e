//! Perceptual hash

use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig, ImageHash};

use crate::artwork::{self, DecodeError};

/// Hash size in bytes, 8x8 DCT coefficients
type PhashBytes = [u8; 8];

/// Number of bits in a perceptual hash
pub const HASH_BITS: u32 = 64;

/// Image perceptual hash, DCT based
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PerceptualHash(ImageHash<PhashBytes>);

impl PerceptualHash {
    /// Compute hash of a decoded image
    #[must_use]
    pub fn from_image(img: &DynamicImage) -> Self {
        let hasher = HasherConfig::with_bytes_type::<PhashBytes>()
            .hash_size(8, 8)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();
        Self(hasher.hash_image(img))
    }

    /// Compute hash from undecoded image buffer
    pub fn from_image_buffer(buf: &[u8]) -> Result<Self, DecodeError> {
        let img = artwork::decode(buf)?;
        Ok(Self::from_image(&img))
    }

    /// Hamming distance between two hashes, in `0..=HASH_BITS`
    #[must_use]
    pub fn distance(&self, other: &Self) -> u32 {
        self.0.dist(&other.0)
    }

    /// Base64 representation, for logging and reports
    #[must_use]
    pub fn to_base64(&self) -> String {
        self.0.to_base64()
    }

    #[cfg(test)]
    pub(crate) fn test_value1() -> Self {
        Self(ImageHash::from_bytes(&[0; 8]).unwrap())
    }

    #[cfg(test)]
    pub(crate) fn test_value2() -> Self {
        Self(ImageHash::from_bytes(&[0xFF; 8]).unwrap())
    }
}
