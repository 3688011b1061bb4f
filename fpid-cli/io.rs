//! Image loading via the `image` crate.
//!
//! The decoder is picked from the file contents, so database entries without
//! a recognised extension still load.

use std::path::Path;

use fpid_core::Image;
use image::error::{ImageError, ImageResult, LimitError, LimitErrorKind};
use image::{GrayImage, ImageReader};

/// Loads an image from disk and converts it to 8-bit grayscale
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> ImageResult<GrayImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(img.to_luma8())
}

fn empty_image() -> ImageError {
    ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError))
}

/// Creates an owned core image from a grayscale image buffer
pub fn to_core_image(img: &GrayImage) -> ImageResult<Image> {
    Image::new(img.as_raw().clone(), img.width() as usize, img.height() as usize)
        .map_err(|_| empty_image())
}

/// Loads a file straight into a core image for extraction
pub fn load_core_image<P: AsRef<Path>>(path: P) -> ImageResult<Image> {
    let gray = load_gray_image(path)?;
    let (width, height) = gray.dimensions();
    Image::new(gray.into_raw(), width as usize, height as usize).map_err(|_| empty_image())
}

/// Loads a file as both the decoded buffer (for drawing) and a core image
/// (for extraction)
pub fn load_image_pair<P: AsRef<Path>>(path: P) -> ImageResult<(GrayImage, Image)> {
    let gray = load_gray_image(path)?;
    let core = to_core_image(&gray)?;
    Ok((gray, core))
}
