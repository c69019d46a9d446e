//! Artwork decoding

use std::{
    fs,
    io::Cursor,
    path::Path,
};

use anyhow::Context as _;
use image::DynamicImage;

/// Failure to turn bytes into a raster image
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// Content does not look like any image format
    #[error("Unable to guess image format")]
    UnknownFormat,
    /// Content looks like an image format we can not decode
    #[error("Unsupported image format {0:?}")]
    UnsupportedFormat(image::ImageFormat),
    /// Format was recognized but decoding failed
    #[error("Corrupt image data")]
    Corrupt(#[from] image::ImageError),
    /// Reading the underlying buffer failed
    #[error("Failed to read image data")]
    Io(#[from] std::io::Error),
}

/// Decode an image buffer, guessing its format from its content
pub fn decode(buf: &[u8]) -> Result<DynamicImage, DecodeError> {
    let reader = image::ImageReader::new(Cursor::new(buf)).with_guessed_format()?;
    let format = reader.format().ok_or(DecodeError::UnknownFormat)?;
    if Format::from_image_format(format).is_none() {
        return Err(DecodeError::UnsupportedFormat(format));
    }
    Ok(reader.decode()?)
}

/// Read and decode an image file
pub fn load(path: &Path) -> anyhow::Result<DynamicImage> {
    let buf = fs::read(path).with_context(|| format!("Failed to read {path:?}"))?;
    let img = decode(&buf).with_context(|| format!("Failed to decode {path:?}"))?;
    log::debug!(
        "Decoded {:?}: {}x{} {:?}",
        path,
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}

/// Image format
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, strum::EnumIter)]
pub enum Format {
    /// JPEG
    Jpeg,
    /// PNG
    Png,
}

impl Format {
    /// Guess format from extension (without dot)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Guess format from file path extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Get canonical extension for format
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Format::Jpeg => "jpg",
            Format::Png => "png",
        }
    }

    /// Get image format as the image crate type
    #[must_use]
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            Format::Jpeg => image::ImageFormat::Jpeg,
            Format::Png => image::ImageFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{Rgb, RgbImage};
    use strum::IntoEnumIterator as _;

    use super::*;

    fn encode(img: &DynamicImage, format: Format) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format.to_image_format()).unwrap();
        buf.into_inner()
    }

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(32, 24, |x, y| {
            Rgb([(x * 8) as u8, (y * 10) as u8, 128])
        }))
    }

    #[test]
    fn decode_png_is_lossless() {
        let img = sample();
        let decoded = decode(&encode(&img, Format::Png)).unwrap();
        assert_eq!(decoded.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn decode_jpeg_keeps_dimensions() {
        let decoded = decode(&encode(&sample(), Format::Jpeg)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 24));
    }

    #[test]
    fn decode_garbage() {
        assert!(matches!(
            decode(b"definitely not an image"),
            Err(DecodeError::UnknownFormat)
        ));
        assert!(matches!(decode(&[]), Err(DecodeError::UnknownFormat)));
    }

    #[test]
    fn decode_truncated() {
        let buf = encode(&sample(), Format::Png);
        assert!(matches!(
            decode(&buf[..buf.len() / 2]),
            Err(DecodeError::Corrupt(_))
        ));
    }

    #[test]
    fn decode_unsupported() {
        // GIF magic, recognized by the image crate but not enabled here
        assert!(matches!(
            decode(b"GIF89a\x01\x00\x01\x00\x00\x00\x00"),
            Err(DecodeError::UnsupportedFormat(image::ImageFormat::Gif))
        ));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("nope.png")).is_err());
    }

    #[test]
    fn format_extension() {
        assert_eq!(Format::from_extension("JPEG"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("jpg"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("Png"), Some(Format::Png));
        assert_eq!(Format::from_extension("webp"), None);
        assert_eq!(
            Format::from_path(Path::new("a/b/cover.JPG")),
            Some(Format::Jpeg)
        );
        assert_eq!(Format::from_path(Path::new("a/b/cover")), None);
        for format in Format::iter() {
            assert_eq!(Format::from_extension(format.extension()), Some(format));
        }
    }
}
