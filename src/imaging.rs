//! Image decoding and downscaling ahead of OCR

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError};

/// Decode an uploaded payload. The format is sniffed from the bytes, not the
/// filename or declared content type.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes)
}

/// Shrink `image` to fit inside `max_dimension` x `max_dimension`, keeping its
/// aspect ratio. Images already within bounds come back untouched.
pub fn downscale(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return image;
    }

    let resized = image.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    tracing::debug!(
        from = %format!("{}x{}", width, height),
        to = %format!("{}x{}", resized.width(), resized.height()),
        "Downscaled image for OCR"
    );
    resized
}

/// Decode, then downscale when a bound is configured
pub fn prepare(bytes: &[u8], max_dimension: Option<u32>) -> Result<DynamicImage, ImageError> {
    let image = decode(bytes)?;
    Ok(match max_dimension {
        Some(max) => downscale(image, max),
        None => image,
    })
}
