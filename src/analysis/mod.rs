pub mod ffmpeg;
pub mod parallel;
pub mod provider;

pub use ffmpeg::FfmpegAnalyzer;
pub use parallel::{analyze_positions, optimal_worker_count};
pub use provider::{CropRect, FrameExtractor, MetricsProvider, RawMetrics, SceneMetricsProvider};
