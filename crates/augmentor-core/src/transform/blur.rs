//! Separable Gaussian blur for the de-texturize and augmentation operations.
//!
//! Two parameterizations share one implementation:
//!
//! - **De-texturize** takes an odd kernel side `k` and derives
//!   `sigma = 0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
//! - **Augmentation** takes `sigma` and derives `k = round(6 * sigma + 1) | 1`.
//!
//! The kernel is quantized to Q16 fixed point and normalized to exactly
//! `1 << 16`, so flat regions come back unchanged. Borders are mirrored
//! without repeating the edge pixel (`dcb|abcd|cba`).

use super::TransformError;
use crate::decode::DecodedImage;

/// Largest accepted kernel side. Also bounds augmentation sigmas to 50.
pub const MAX_KERNEL_SIZE: u32 = 301;

/// Side length of a square Gaussian kernel. Always odd and positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KernelSize(u32);

impl KernelSize {
    /// Validate a kernel side length.
    ///
    /// Even sizes are rejected rather than rounded, so a request never
    /// silently produces a different blur than the one it named.
    pub fn new(size: u32) -> Result<Self, TransformError> {
        if size == 0 || size % 2 == 0 || size > MAX_KERNEL_SIZE {
            return Err(TransformError::InvalidKernelSize(f64::from(size)));
        }
        Ok(Self(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn radius(self) -> u32 {
        self.0 / 2
    }
}

impl TryFrom<f64> for KernelSize {
    type Error = TransformError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > f64::from(u32::MAX) {
            return Err(TransformError::InvalidKernelSize(value));
        }
        KernelSize::new(value as u32).map_err(|_| TransformError::InvalidKernelSize(value))
    }
}

/// Sigma implied by a kernel size when none is given.
pub fn sigma_for_kernel(size: KernelSize) -> f64 {
    0.3 * ((f64::from(size.get()) - 1.0) * 0.5 - 1.0) + 0.8
}

/// Kernel size implied by a sigma when none is given.
pub fn kernel_for_sigma(sigma: f64) -> Result<KernelSize, TransformError> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(TransformError::InvalidSigma(sigma));
    }
    let size = (sigma * 6.0 + 1.0).round();
    if size > f64::from(MAX_KERNEL_SIZE) {
        return Err(TransformError::InvalidSigma(sigma));
    }
    KernelSize::new((size as u32) | 1).map_err(|_| TransformError::InvalidSigma(sigma))
}

/// De-texturize: Gaussian blur with a user-chosen kernel size.
pub fn apply_blur(image: &DecodedImage, size: KernelSize) -> Result<DecodedImage, TransformError> {
    gaussian_blur(image, size, sigma_for_kernel(size))
}

/// Augmentation: Gaussian blur with a user-chosen sigma.
pub fn apply_augmentation(image: &DecodedImage, sigma: f64) -> Result<DecodedImage, TransformError> {
    let size = kernel_for_sigma(sigma)?;
    gaussian_blur(image, size, sigma)
}

/// Blur with an explicit kernel size and sigma.
pub fn gaussian_blur(
    image: &DecodedImage,
    size: KernelSize,
    sigma: f64,
) -> Result<DecodedImage, TransformError> {
    if size.get() == 1 || image.is_empty() {
        return Ok(image.clone());
    }

    let kernel = gaussian_kernel_q16(size.radius(), sigma)?;
    let mut tmp = vec![0u8; image.pixels.len()];
    let mut out = vec![0u8; image.pixels.len()];

    horizontal_pass(&image.pixels, &mut tmp, image.width, image.height, &kernel);
    vertical_pass(&tmp, &mut out, image.width, image.height, &kernel);
    Ok(DecodedImage::new(image.width, image.height, out))
}

fn gaussian_kernel_q16(radius: u32, sigma: f64) -> Result<Vec<u32>, TransformError> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(TransformError::InvalidSigma(sigma));
    }

    let r = radius as i64;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Put the rounding residue on the center tap.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

/// Mirror an out-of-range index back into `0..len` without repeating the edge.
#[inline]
fn reflect_101(mut i: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * (len - 1) - i;
        }
    }
    i as usize
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = width as usize;
    for y in 0..height as usize {
        let row = y * w;
        for x in 0..w {
            let mut acc = [0u64; 3];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = reflect_101(x as i64 + ki as i64 - radius, w as i64);
                let idx = (row + sx) * 3;
                for c in 0..3 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = (row + x) * 3;
            for c in 0..3 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = width as usize;
    let h = height as i64;
    for y in 0..height as usize {
        for x in 0..w {
            let mut acc = [0u64; 3];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = reflect_101(y as i64 + ki as i64 - radius, h);
                let idx = (sy * w + x) * 3;
                for c in 0..3 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = (y * w + x) * 3;
            for c in 0..3 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}


// ============================================================================
// Property-Based Tests
// ============================================================================
