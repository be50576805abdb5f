//! Image Capture Module
//! Loads a skin photo, downscales it and encodes the JPEG that gets uploaded.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest edge sent to the service.
pub const MAX_EDGE: u32 = 1024;
const JPEG_QUALITY: u8 = 90;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to process image: {0}")]
    Image(#[from] image::ImageError),
}

/// A photo ready for upload, plus an RGBA preview.
pub struct CapturedImage {
    pub path: Option<PathBuf>,
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub preview_rgba: Vec<u8>,
}

impl CapturedImage {
    pub fn from_file(path: &Path, max_edge: u32) -> Result<Self, CaptureError> {
        let img = image::open(path)?;
        let mut captured = Self::from_image(img, max_edge)?;
        captured.path = Some(path.to_path_buf());
        Ok(captured)
    }

    pub fn from_image(img: DynamicImage, max_edge: u32) -> Result<Self, CaptureError> {
        let img = if img.width().max(img.height()) > max_edge {
            img.resize(max_edge, max_edge, FilterType::Triangle)
        } else {
            img
        };

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&img.to_rgb8())?;

        let rgba = img.to_rgba8();
        Ok(Self {
            path: None,
            jpeg,
            width: rgba.width(),
            height: rgba.height(),
            preview_rgba: rgba.into_raw(),
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "capture".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn large_images_are_downscaled() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2000, 1000, Rgb([200, 150, 120])));
        let captured = CapturedImage::from_image(img, MAX_EDGE).unwrap();

        assert_eq!((captured.width, captured.height), (1024, 512));
        assert_eq!(captured.preview_rgba.len(), 1024 * 512 * 4);
        assert_eq!(&captured.jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn small_images_keep_their_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(64, 48));
        let captured = CapturedImage::from_image(img, MAX_EDGE).unwrap();
        assert_eq!((captured.width, captured.height), (64, 48));
        assert_eq!(captured.file_name(), "capture");
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        RgbImage::from_pixel(32, 32, Rgb([10, 20, 30])).save(&path).unwrap();

        let captured = CapturedImage::from_file(&path, MAX_EDGE).unwrap();
        assert_eq!(captured.file_name(), "face.png");
        assert!(!captured.jpeg.is_empty());
    }
}
