//! Image rotation about the canvas center with bilinear interpolation.
//!
//! Unlike an editor rotation, an augmentation keeps the original canvas:
//! corners that leave the frame are clipped and the uncovered area is black.
//!
//! # Algorithm
//!
//! The rotation uses inverse mapping. With the pivot at `(cx, cy) =
//! (width / 2, height / 2)` (integer division) and θ the requested angle,
//! each destination pixel samples the source at:
//!
//! ```text
//! src_x =  cos θ * (dst_x - cx) - sin θ * (dst_y - cy) + cx
//! src_y =  sin θ * (dst_x - cx) + cos θ * (dst_y - cy) + cy
//! ```
//!
//! With y pointing down this turns the content counter-clockwise for a
//! positive angle. Samples that fall partly outside the source blend toward
//! black, so the clipped edge is antialiased.

use crate::decode::DecodedImage;

/// Returns true if the angle is a whole number of turns.
pub fn is_full_turn(angle_degrees: f64) -> bool {
    let rem = angle_degrees.rem_euclid(360.0);
    rem < 1e-9 || (360.0 - rem) < 1e-9
}

/// Rotate an image by `angle_degrees`, keeping the original canvas size.
///
/// Positive angles rotate counter-clockwise. Whole turns return an exact
/// copy of the source.
///
/// # Example
///
/// ```ignore
/// let rotated = apply_rotation(&image, 30.0);
/// assert_eq!((rotated.width, rotated.height), (image.width, image.height));
/// ```
pub fn apply_rotation(image: &DecodedImage, angle_degrees: f64) -> DecodedImage {
    if is_full_turn(angle_degrees) || image.is_empty() {
        return image.clone();
    }

    let (cos, sin) = {
        let rad = angle_degrees.to_radians();
        (rad.cos(), rad.sin())
    };
    let cx = f64::from(image.width / 2);
    let cy = f64::from(image.height / 2);

    let mut output = vec![0u8; image.pixels.len()];

    for dst_y in 0..image.height {
        let dy = f64::from(dst_y) - cy;
        for dst_x in 0..image.width {
            let dx = f64::from(dst_x) - cx;

            let src_x = cos * dx - sin * dy + cx;
            let src_y = sin * dx + cos * dy + cy;

            let dst_idx = image.offset(dst_x, dst_y);
            output[dst_idx..dst_idx + 3].copy_from_slice(&sample_bilinear(image, src_x, src_y));
        }
    }

    DecodedImage::new(image.width, image.height, output)
}

/// Get a pixel as [f64; 3], or black when outside the image.
#[inline]
fn get_pixel_or_black(image: &DecodedImage, px: i64, py: i64) -> [f64; 3] {
    if px < 0 || py < 0 || px >= i64::from(image.width) || py >= i64::from(image.height) {
        return [0.0; 3];
    }
    let [r, g, b] = image.pixel(px as u32, py as u32);
    [f64::from(r), f64::from(g), f64::from(b)]
}

/// Sample a pixel using bilinear interpolation over the 4 nearest pixels.
///
/// Neighbors outside the image count as black.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (f64::from(image.width), f64::from(image.height));
    if x <= -1.0 || y <= -1.0 || x >= w || y >= h {
        return [0, 0, 0];
    }

    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;
    let (x0, y0) = (x0f as i64, y0f as i64);

    let p00 = get_pixel_or_black(image, x0, y0);
    let p10 = get_pixel_or_black(image, x0 + 1, y0);
    let p01 = get_pixel_or_black(image, x0, y0 + 1);
    let p11 = get_pixel_or_black(image, x0 + 1, y0 + 1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: rotation never changes the canvas size.
        #[test]
        fn prop_canvas_size_preserved(
            (width, height) in (1u32..=30, 1u32..=30),
            angle in -720.0f64..=720.0,
        ) {
            let img = DecodedImage::new(width, height, vec![90; (width * height * 3) as usize]);
            let result = apply_rotation(&img, angle);

            prop_assert_eq!(result.width, width);
            prop_assert_eq!(result.height, height);
            prop_assert_eq!(result.pixels.len(), img.pixels.len());
        }

        /// Property: whole turns are exact copies.
        #[test]
        fn prop_whole_turns_identity(
            (width, height) in (1u32..=20, 1u32..=20),
            turns in -3i32..=3,
        ) {
            let pixels = (0..(width * height * 3)).map(|i| (i % 251) as u8).collect();
            let img = DecodedImage::new(width, height, pixels);
            let result = apply_rotation(&img, f64::from(turns) * 360.0);
            prop_assert_eq!(result, img);
        }

        /// Property: rotation is deterministic.
        #[test]
        fn prop_rotation_is_deterministic(angle in -360.0f64..=360.0) {
            let pixels = (0..(16 * 12 * 3)).map(|i| (i * 7 % 256) as u8).collect();
            let img = DecodedImage::new(16, 12, pixels);
            prop_assert_eq!(apply_rotation(&img, angle), apply_rotation(&img, angle));
        }
    }
}
