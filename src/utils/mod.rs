pub mod error;
pub mod ffmpeg;
pub mod logging;
pub mod progress;

pub use error::{Error, Result};
pub use ffmpeg::{FfmpegWrapper, VideoMetadata};
pub use logging::setup_logging;
pub use progress::AnalysisProgress;
