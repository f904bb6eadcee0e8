pub mod analysis;
pub mod cli;
pub mod config;
pub mod core;
pub mod processing;
pub mod scene;
pub mod utils;

pub use crate::analysis::{CropRect, FfmpegAnalyzer, FrameExtractor, MetricsProvider, SceneMetricsProvider};
pub use crate::config::Config;
pub use crate::core::{
    generate_candidates, CropDimensions, PositionMetrics, ScoredCandidate, SpatialRegion,
    WeightVector,
};
pub use crate::processing::{CropReport, SceneReport, SmartCropProcessor};
pub use crate::scene::{EnrichedScene, PrimaryMetric, Scene};
pub use crate::utils::{Error, FfmpegWrapper, Result};
