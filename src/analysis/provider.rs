//! Boundary contracts with the tools that actually look at video frames.

use crate::core::dimensions::CropDimensions;
use crate::core::scoring::PositionMetrics;
use crate::scene::boring::PrimaryMetric;
use crate::scene::segment::Scene;
use crate::utils::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A crop rectangle in source-video pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_dimensions(dims: &CropDimensions, x: u32, y: u32) -> Self {
        Self::new(x, y, dims.crop_w, dims.crop_h)
    }

    /// ffmpeg `crop` filter expression, `crop=w:h:x:y`.
    pub fn to_filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// The four summary statistics for one crop rectangle, before they are tied to a position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMetrics {
    pub motion: f64,
    pub complexity: f64,
    pub edges: f64,
    pub saturation: f64,
}

impl RawMetrics {
    pub fn at(self, x: u32, y: u32) -> PositionMetrics {
        PositionMetrics::new(x, y, self.motion, self.complexity, self.edges, self.saturation)
    }
}

/// Measures a crop rectangle over a number of sampled frames.
///
/// Implementations are synchronous and may block on an external process;
/// callers that fan out across positions run them on blocking threads.
pub trait MetricsProvider: Send + Sync {
    fn measure(&self, rect: CropRect, sample_frames: u32) -> Result<RawMetrics>;
}

/// Measures a single metric for a crop rectangle within one scene's time range.
pub trait SceneMetricsProvider: Send + Sync {
    fn scene_metric(
        &self,
        rect: CropRect,
        scene: &Scene,
        metric: PrimaryMetric,
        sample_frames: u32,
    ) -> Result<f64>;
}

/// Writes a single still frame to `output` and returns the path it was written to.
pub trait FrameExtractor: Send + Sync {
    fn extract_frame(&self, timestamp: f64, rect: Option<CropRect>, output: &Path) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_rect_filter() {
        let rect = CropRect::new(120, 40, 606, 1080);
        assert_eq!(rect.to_filter(), "crop=606:1080:120:40");
    }

    #[test]
    fn test_raw_metrics_at_position() {
        let raw = RawMetrics {
            motion: 1.5,
            complexity: 20.0,
            edges: 8.0,
            saturation: 45.0,
        };
        let positioned = raw.at(10, 20);
        assert_eq!(positioned.x, 10);
        assert_eq!(positioned.y, 20);
        assert_eq!(positioned.saturation, 45.0);
    }
}
