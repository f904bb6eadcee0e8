use crate::core::candidates::{DEFAULT_MAX_CANDIDATES, DEFAULT_TOP_PER_STRATEGY};
use crate::core::dimensions::DEFAULT_CROP_SCALE;
use crate::scene::boring::DEFAULT_BORING_PERCENTILE;
use crate::scene::segment::{
    DEFAULT_MIN_SCENE_COUNT, DEFAULT_MIN_SCENE_DURATION, DEFAULT_SEGMENT_DURATION,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub show_timestamps: bool,
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_timestamps: false,
            colored_output: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Target aspect ratio, `W:H`.
    pub aspect_ratio: String,
    /// Fraction of the largest fitting window actually used, in `(0, 1]`.
    pub crop_scale: f64,
    /// Positions per axis; the grid has `grid_size²` positions.
    pub grid_size: u32,
    /// Frames sampled per position.
    pub sample_frames: u32,
    pub max_candidates: usize,
    pub top_per_strategy: usize,
    /// Upper bound on concurrent measurements; one per CPU when unset.
    pub max_workers: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: "1:1".to_string(),
            crop_scale: DEFAULT_CROP_SCALE,
            grid_size: 5,
            sample_frames: 50,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            top_per_strategy: DEFAULT_TOP_PER_STRATEGY,
            max_workers: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// ffmpeg scene-change score above which a frame starts a new scene.
    pub detection_threshold: f64,
    /// Fewer detected scenes than this falls back to fixed-length segments.
    pub min_scene_count: usize,
    pub segment_duration: f64,
    /// Shorter scenes are merged into a neighbor.
    pub min_scene_duration: f64,
    pub boring_percentile: f64,
    /// Frames sampled per scene when measuring its activity.
    pub sample_frames: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            detection_threshold: 0.3,
            min_scene_count: DEFAULT_MIN_SCENE_COUNT,
            segment_duration: DEFAULT_SEGMENT_DURATION,
            min_scene_duration: DEFAULT_MIN_SCENE_DURATION,
            boring_percentile: DEFAULT_BORING_PERCENTILE,
            sample_frames: 10,
        }
    }
}

/// Custom strategies as written in YAML: name to `{motion, complexity, edges, saturation}`.
pub type RawStrategies = HashMap<String, HashMap<String, f64>>;
