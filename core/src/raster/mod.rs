//! raster
//! Image transforms tried when a harvested image does not read as-is.
//!
//! Industry notes:
//! - Each transform is a pure function from one grayscale raster to another,
//!   so the decoder can try them in any configured order and stop at the
//!   first one that yields a read.
//! - Contrast stretching and Otsu thresholding work on the raw luma histogram;
//!   upscaling uses nearest-neighbour sampling so module edges stay sharp.

use std::fmt;
use std::str::FromStr;

use image::{imageops, GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::constants::decode::{SMALL_IMAGE_EDGE, UPSCALE_FACTOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Stretch the luma range to 0..=255.
    ContrastBoost,
    /// Nearest-neighbour upscale of small images.
    Upscale,
    /// Global Otsu threshold to pure black and white.
    Binarize,
}

impl Transform {
    pub fn default_chain() -> Vec<Transform> {
        vec![Transform::ContrastBoost, Transform::Upscale, Transform::Binarize]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transform::ContrastBoost => "contrast_boost",
            Transform::Upscale => "upscale",
            Transform::Binarize => "binarize",
        }
    }

    /// `None` when the transform does not apply to this image.
    pub fn apply(&self, img: &GrayImage) -> Option<GrayImage> {
        match self {
            Transform::ContrastBoost => stretch_contrast(img),
            Transform::Upscale => upscale(img, SMALL_IMAGE_EDGE, UPSCALE_FACTOR),
            Transform::Binarize => Some(binarize(img, otsu_threshold(img))),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contrast_boost" | "contrast" => Ok(Transform::ContrastBoost),
            "upscale" => Ok(Transform::Upscale),
            "binarize" | "threshold" => Ok(Transform::Binarize),
            other => Err(format!("unknown transform {:?}", other)),
        }
    }
}

fn luma_range(img: &GrayImage) -> Option<(u8, u8)> {
    let mut pixels = img.pixels().map(|p| p[0]);
    let first = pixels.next()?;
    Some(pixels.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Linear stretch of `[min, max]` to `[0, 255]`. Flat or already full-range
/// images are left alone.
pub fn stretch_contrast(img: &GrayImage) -> Option<GrayImage> {
    let (lo, hi) = luma_range(img)?;
    if hi <= lo || (lo == 0 && hi == 255) {
        return None;
    }
    let span = u32::from(hi - lo);
    let mut out = img.clone();
    for p in out.pixels_mut() {
        let v = u32::from(p[0] - lo) * 255 / span;
        *p = Luma([v as u8]);
    }
    Some(out)
}

/// Scale up by `factor` when either edge is shorter than `min_edge`.
pub fn upscale(img: &GrayImage, min_edge: u32, factor: u32) -> Option<GrayImage> {
    if factor < 2 || (img.width() >= min_edge && img.height() >= min_edge) {
        return None;
    }
    Some(imageops::resize(
        img,
        img.width() * factor,
        img.height() * factor,
        imageops::FilterType::Nearest,
    ))
}

/// Otsu's between-class variance maximiser over the 256-bin histogram.
pub fn otsu_threshold(img: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for p in img.pixels() {
        histogram[p[0] as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 128;
    }
    let weighted_sum: f64 = histogram.iter().enumerate().map(|(i, &n)| i as f64 * n as f64).sum();

    let mut background = 0u64;
    let mut background_sum = 0f64;
    let mut best = (0f64, 128u8);
    for (t, &n) in histogram.iter().enumerate() {
        background += n;
        if background == 0 {
            continue;
        }
        let foreground = total - background;
        if foreground == 0 {
            break;
        }
        background_sum += t as f64 * n as f64;
        let mean_b = background_sum / background as f64;
        let mean_f = (weighted_sum - background_sum) / foreground as f64;
        let variance = background as f64 * foreground as f64 * (mean_b - mean_f).powi(2);
        if variance > best.0 {
            best = (variance, t as u8);
        }
    }
    best.1
}

/// Pixels at or below `threshold` become 0, the rest 255.
pub fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        *p = Luma([if p[0] <= threshold { 0 } else { 255 }]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn washed_out() -> GrayImage {
        GrayImage::from_fn(40, 10, |x, _| Luma([if (x / 4) % 2 == 0 { 110 } else { 150 }]))
    }

    #[test]
    fn contrast_stretch_reaches_full_range() {
        let out = stretch_contrast(&washed_out()).unwrap();
        assert_eq!(luma_range(&out), Some((0, 255)));
        assert!(stretch_contrast(&out).is_none());
    }

    #[test]
    fn otsu_splits_two_levels() {
        let t = otsu_threshold(&washed_out());
        assert!((110..150).contains(&t));
        let bw = binarize(&washed_out(), t);
        assert_eq!(bw.get_pixel(0, 0)[0], 0);
        assert_eq!(bw.get_pixel(4, 0)[0], 255);
    }

    #[test]
    fn upscale_only_touches_small_images() {
        let small = washed_out();
        let big = upscale(&small, 400, 2).unwrap();
        assert_eq!(big.dimensions(), (80, 20));
        let large = GrayImage::new(400, 400);
        assert!(upscale(&large, 400, 2).is_none());
    }

    #[test]
    fn names_parse_back() {
        for t in Transform::default_chain() {
            assert_eq!(t.name().parse::<Transform>().unwrap(), t);
        }
    }
}
