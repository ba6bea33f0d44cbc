//! Zoom: upscale, then center-crop back to the source canvas.
//!
//! The scaled size is `trunc(width * factor) x trunc(height * factor)`, and
//! the crop window starts at `(scaled - original) / 2` (integer floor) on
//! each axis. Because the window always has the original size, a zoomed
//! artifact is pixel-for-pixel the same size as its source.
//!
//! Factors below 1.0 would make the crop offsets negative. That boundary is
//! reported as [`TransformError::InvalidZoomFactor`] instead of being padded
//! or clamped into something the caller did not ask for. Factors are also
//! capped at [`MAX_ZOOM_FACTOR`], and the scaled raster at
//! [`MAX_ZOOM_PIXELS`].

use image::imageops::FilterType;

use super::TransformError;
use crate::decode::DecodedImage;

pub const MAX_ZOOM_FACTOR: f64 = 10.0;

/// Largest intermediate raster a zoom may allocate.
pub const MAX_ZOOM_PIXELS: u64 = 100_000_000;

/// Compute the intermediate (scaled) size for a zoom factor.
///
/// Truncates toward zero, so `zoom_dimensions(3, 3, 1.5)` is `(4, 4)`.
pub fn zoom_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    (
        (f64::from(width) * factor) as u32,
        (f64::from(height) * factor) as u32,
    )
}

/// Check `factor` against the limits for a `width x height` source.
pub fn check_zoom(width: u32, height: u32, factor: f64) -> Result<(), TransformError> {
    if !factor.is_finite() || !(1.0..=MAX_ZOOM_FACTOR).contains(&factor) {
        return Err(TransformError::InvalidZoomFactor(factor));
    }
    let (scaled_w, scaled_h) = zoom_dimensions(width, height, factor);
    if u64::from(scaled_w) * u64::from(scaled_h) > MAX_ZOOM_PIXELS {
        return Err(TransformError::ZoomTooLarge {
            factor,
            width,
            height,
        });
    }
    Ok(())
}

/// Bilinear resize to exact dimensions.
///
/// # Errors
///
/// Returns `TransformError::ResizeFailed` for a zero target size or a
/// malformed source buffer.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
) -> Result<DecodedImage, TransformError> {
    if width == 0 || height == 0 {
        return Err(TransformError::ResizeFailed { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or(TransformError::ResizeFailed { width, height })?;

    let resized = image::imageops::resize(&rgb_image, width, height, FilterType::Triangle);

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Cut a `width x height` window whose top-left corner is `(left, top)`.
///
/// The window must lie inside the image; callers compute it from sizes that
/// guarantee this.
pub fn crop(image: &DecodedImage, left: u32, top: u32, width: u32, height: u32) -> DecodedImage {
    debug_assert!(left + width <= image.width && top + height <= image.height);

    if left == 0 && top == 0 && width == image.width && height == image.height {
        return image.clone();
    }

    let row_bytes = (width as usize) * 3;
    let mut output = Vec::with_capacity(row_bytes * height as usize);

    // Copy pixel data row by row
    for y in 0..height {
        let start = image.offset(left, top + y);
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    DecodedImage::new(width, height, output)
}

/// Apply a zoom with the given factor.
///
/// # Errors
///
/// Returns `TransformError::InvalidZoomFactor` if `factor` is not finite or
/// is outside `1.0..=MAX_ZOOM_FACTOR`, and `TransformError::ZoomTooLarge` if
/// the scaled raster would exceed [`MAX_ZOOM_PIXELS`].
///
/// # Example
///
/// ```
/// use augmentor_core::decode::DecodedImage;
/// use augmentor_core::transform::apply_zoom;
///
/// let image = DecodedImage::black(100, 60);
/// let zoomed = apply_zoom(&image, 1.5).unwrap();
/// assert_eq!((zoomed.width, zoomed.height), (100, 60));
/// ```
pub fn apply_zoom(image: &DecodedImage, factor: f64) -> Result<DecodedImage, TransformError> {
    check_zoom(image.width, image.height, factor)?;

    let (scaled_w, scaled_h) = zoom_dimensions(image.width, image.height, factor);
    let scaled = resize(image, scaled_w, scaled_h)?;

    let left = (scaled_w - image.width) / 2;
    let top = (scaled_h - image.height) / 2;
    Ok(crop(&scaled, left, top, image.width, image.height))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
