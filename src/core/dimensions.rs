//! Crop window sizing for a target aspect ratio.

use crate::utils::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default fraction of the largest fitting window that is actually used.
pub const DEFAULT_CROP_SCALE: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropDimensions {
    pub crop_w: u32,
    pub crop_h: u32,
    pub max_crop_w: u32,
    pub max_crop_h: u32,
    /// Horizontal movement range of the crop origin.
    pub max_x: u32,
    /// Vertical movement range of the crop origin.
    pub max_y: u32,
}

impl CropDimensions {
    pub fn to_ffmpeg_string(&self, x: u32, y: u32) -> String {
        format!("{}:{}:{}:{}", self.crop_w, self.crop_h, x, y)
    }
}

/// Parses an aspect ratio written as `W:H`, e.g. `9:16`.
pub fn parse_aspect_ratio(aspect: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = aspect.split(':').collect();
    if parts.len() != 2 {
        return Err(Error::validation(format!(
            "Invalid aspect ratio format: {} (expected 'width:height', e.g. '1:1' or '16:9')",
            aspect
        )));
    }

    let width: u32 = parts[0].trim().parse().map_err(|_| {
        Error::validation(format!(
            "Invalid aspect ratio values: {} (both values must be integers)",
            aspect
        ))
    })?;
    let height: u32 = parts[1].trim().parse().map_err(|_| {
        Error::validation(format!(
            "Invalid aspect ratio values: {} (both values must be integers)",
            aspect
        ))
    })?;

    if width == 0 || height == 0 {
        return Err(Error::validation(format!(
            "Invalid aspect ratio values: {} (both values must be positive)",
            aspect
        )));
    }

    Ok((width, height))
}

/// Computes the crop window for `aspect_w:aspect_h` inside a `video_width x video_height` frame.
///
/// The largest window of the target aspect that fits is scaled by `crop_scale`
/// and rounded down to even dimensions, which H.264/H.265 chroma subsampling requires.
pub fn calculate_crop_dimensions(
    video_width: u32,
    video_height: u32,
    aspect_w: u32,
    aspect_h: u32,
    crop_scale: f64,
) -> Result<CropDimensions> {
    if video_width == 0 || video_height == 0 {
        return Err(Error::validation(format!(
            "Video dimensions must be positive: {}x{}",
            video_width, video_height
        )));
    }
    if aspect_w == 0 || aspect_h == 0 {
        return Err(Error::validation(format!(
            "Aspect ratio components must be positive: {}:{}",
            aspect_w, aspect_h
        )));
    }
    if !(crop_scale > 0.0 && crop_scale <= 1.0) {
        return Err(Error::validation(format!(
            "Crop scale must be between 0 and 1: {}",
            crop_scale
        )));
    }

    let (vw, vh) = (video_width as u64, video_height as u64);
    let (aw, ah) = (aspect_w as u64, aspect_h as u64);

    let (max_crop_w, max_crop_h) = if vw < vh {
        let h = vw * ah / aw;
        if h > vh {
            (vh * aw / ah, vh)
        } else {
            (vw, h)
        }
    } else {
        let w = vh * aw / ah;
        if w > vw {
            (vw, vw * ah / aw)
        } else {
            (w, vh)
        }
    };

    let mut crop_w = (max_crop_w as f64 * crop_scale) as u64;
    let mut crop_h = (max_crop_h as f64 * crop_scale) as u64;
    crop_w -= crop_w % 2;
    crop_h -= crop_h % 2;

    Ok(CropDimensions {
        crop_w: crop_w as u32,
        crop_h: crop_h as u32,
        max_crop_w: max_crop_w as u32,
        max_crop_h: max_crop_h as u32,
        max_x: vw.saturating_sub(crop_w) as u32,
        max_y: vh.saturating_sub(crop_h) as u32,
    })
}
