//! ffmpeg-backed metric measurement and frame extraction.
//!
//! Every measurement is a `showinfo` pass over a cropped stream; the per-frame
//! `mean:[..]` and `stdev:[..]` arrays ffmpeg prints on stderr are reduced to
//! the summary statistics the scorer works with.

use crate::analysis::provider::{
    CropRect, FrameExtractor, MetricsProvider, RawMetrics, SceneMetricsProvider,
};
use crate::scene::boring::PrimaryMetric;
use crate::scene::segment::Scene;
use crate::utils::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

static MEAN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"mean:\[([0-9. ]+)\]").unwrap());

static STDEV_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"stdev:\[([0-9. ]+)\]").unwrap());

const EDGE_DETECT_FILTER: &str = "edgedetect=low=0.3:high=0.4:mode=colormix";

/// Scenes shorter than this are not worth sampling.
const MIN_SCENE_SAMPLE_DURATION: f64 = 0.1;

/// Per-frame values of one showinfo statistic, one `Vec` per frame.
fn showinfo_arrays(output: &str, regex: &Regex) -> Vec<Vec<f64>> {
    regex
        .captures_iter(output)
        .map(|caps| {
            caps[1]
                .split_whitespace()
                .filter_map(|v| v.parse::<f64>().ok())
                .collect::<Vec<f64>>()
        })
        .filter(|values| !values.is_empty())
        .collect()
}

/// First value (the luma plane) of every `mean:[..]` array.
pub fn extract_means(output: &str) -> Vec<f64> {
    showinfo_arrays(output, &MEAN_REGEX)
        .into_iter()
        .map(|values| values[0])
        .collect()
}

/// First value (the luma plane) of every `stdev:[..]` array.
pub fn extract_stdevs(output: &str) -> Vec<f64> {
    showinfo_arrays(output, &STDEV_REGEX)
        .into_iter()
        .map(|values| values[0])
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Mean absolute difference between consecutive frame means. Needs at least two frames.
pub fn motion_from_means(means: &[f64]) -> f64 {
    if means.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f64> = means.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    mean(&diffs)
}

/// Mean over frames of the sum of the first three channel standard deviations.
/// Frames reporting fewer than three channels are ignored.
pub fn saturation_from_output(output: &str) -> f64 {
    let sums: Vec<f64> = showinfo_arrays(output, &STDEV_REGEX)
        .into_iter()
        .filter(|values| values.len() >= 3)
        .map(|values| values[..3].iter().sum())
        .collect();
    mean(&sums)
}

/// Reduces the two showinfo passes (plain and edge-detected) to raw metrics.
pub fn metrics_from_outputs(stats_output: &str, edge_output: &str) -> RawMetrics {
    RawMetrics {
        motion: motion_from_means(&extract_means(stats_output)),
        complexity: mean(&extract_stdevs(stats_output)),
        edges: mean(&extract_means(edge_output)),
        saturation: saturation_from_output(stats_output),
    }
}

/// Number of frames to sample from a scene, or `None` when it is too short to measure.
pub fn scene_sample_count(scene: &Scene, sample_frames: u32) -> Option<u32> {
    if scene.duration() < MIN_SCENE_SAMPLE_DURATION || scene.frame_count() < 1 {
        return None;
    }
    let available = scene.frame_count().min(u32::MAX as u64) as u32;
    Some(sample_frames.min(available.max(1)))
}

#[derive(Debug, Clone)]
pub struct FfmpegAnalyzer {
    ffmpeg_path: String,
    input: PathBuf,
}

impl FfmpegAnalyzer {
    pub fn new<P: AsRef<Path>>(ffmpeg_path: String, input: P) -> Self {
        Self {
            ffmpeg_path,
            input: input.as_ref().to_path_buf(),
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Runs ffmpeg and returns its stderr, where `showinfo` writes.
    fn run(&self, args: &[String]) -> Result<String> {
        debug!("Running ffmpeg with args: {:?}", args);

        let output = Command::new(&self.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::ffmpeg(format!("Failed to run ffmpeg: {}", e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            return Err(Error::ffmpeg(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
            )));
        }

        Ok(stderr)
    }

    fn showinfo_args(&self, filter: String, frames: u32, window: Option<(f64, f64)>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some((start, duration)) = window {
            args.extend(["-ss".to_string(), start.to_string(), "-t".to_string(), duration.to_string()]);
        }
        args.extend([
            "-i".to_string(),
            self.input.to_string_lossy().to_string(),
            "-vf".to_string(),
            filter,
            "-frames:v".to_string(),
            frames.to_string(),
            "-f".to_string(),
            "null".to_string(),
            "-".to_string(),
        ]);
        args
    }

    fn stats_filter(rect: CropRect) -> String {
        format!("{},showinfo", rect.to_filter())
    }

    fn edge_filter(rect: CropRect) -> String {
        format!("{},{},showinfo", rect.to_filter(), EDGE_DETECT_FILTER)
    }
}

impl MetricsProvider for FfmpegAnalyzer {
    fn measure(&self, rect: CropRect, sample_frames: u32) -> Result<RawMetrics> {
        let stats_output = self.run(&self.showinfo_args(Self::stats_filter(rect), sample_frames, None))?;
        let edge_output = self.run(&self.showinfo_args(Self::edge_filter(rect), sample_frames, None))?;

        let metrics = metrics_from_outputs(&stats_output, &edge_output);
        debug!(
            "Position ({}, {}): motion={:.2} complexity={:.2} edges={:.2} saturation={:.2}",
            rect.x, rect.y, metrics.motion, metrics.complexity, metrics.edges, metrics.saturation
        );
        Ok(metrics)
    }
}

impl SceneMetricsProvider for FfmpegAnalyzer {
    fn scene_metric(
        &self,
        rect: CropRect,
        scene: &Scene,
        metric: PrimaryMetric,
        sample_frames: u32,
    ) -> Result<f64> {
        let sample_count = match scene_sample_count(scene, sample_frames) {
            Some(count) => count,
            None => return Ok(0.0),
        };
        let window = Some((scene.start_time, scene.duration()));

        let value = match metric {
            PrimaryMetric::Motion => {
                let output = self.run(&self.showinfo_args(Self::stats_filter(rect), sample_count, window))?;
                motion_from_means(&extract_means(&output))
            }
            PrimaryMetric::Complexity => {
                let output = self.run(&self.showinfo_args(Self::stats_filter(rect), sample_count, window))?;
                mean(&extract_stdevs(&output))
            }
            PrimaryMetric::Edges => {
                let output = self.run(&self.showinfo_args(Self::edge_filter(rect), sample_count, window))?;
                mean(&extract_means(&output))
            }
        };

        Ok(value)
    }
}

impl FrameExtractor for FfmpegAnalyzer {
    fn extract_frame(&self, timestamp: f64, rect: Option<CropRect>, output: &Path) -> Result<PathBuf> {
        let mut args = vec![
            "-ss".to_string(),
            timestamp.to_string(),
            "-i".to_string(),
            self.input.to_string_lossy().to_string(),
        ];
        if let Some(rect) = rect {
            args.extend(["-vf".to_string(), rect.to_filter()]);
        }
        args.extend([
            "-vframes".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            output.to_string_lossy().to_string(),
            "-y".to_string(),
        ]);

        self.run(&args)?;
        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS_OUTPUT: &str = "\
[Parsed_showinfo_1 @ 0x5581] n:   0 pts:      0 pts_time:0       mean:[100 128 128] stdev:[10.0 2.0 3.0]
[Parsed_showinfo_1 @ 0x5581] n:   1 pts:   1001 pts_time:0.0417  mean:[104 128 128] stdev:[12.0 2.0 1.0]
[Parsed_showinfo_1 @ 0x5581] n:   2 pts:   2002 pts_time:0.0834  mean:[102 128 128] stdev:[14.0 4.0 3.0]
";

    const EDGE_OUTPUT: &str = "\
[Parsed_showinfo_2 @ 0x5581] n:   0 pts:      0 pts_time:0       mean:[20 128 128] stdev:[30.0 0.0 0.0]
[Parsed_showinfo_2 @ 0x5581] n:   1 pts:   1001 pts_time:0.0417  mean:[30 128 128] stdev:[31.0 0.0 0.0]
";

    #[test]
    fn test_extract_first_channel() {
        assert_eq!(extract_means(STATS_OUTPUT), vec![100.0, 104.0, 102.0]);
        assert_eq!(extract_stdevs(STATS_OUTPUT), vec![10.0, 12.0, 14.0]);
        assert!(extract_means("no showinfo here").is_empty());
    }

    #[test]
    fn test_motion_from_means() {
        assert_eq!(motion_from_means(&[100.0, 104.0, 102.0]), 3.0);
        assert_eq!(motion_from_means(&[100.0]), 0.0);
        assert_eq!(motion_from_means(&[]), 0.0);
    }

    #[test]
    fn test_saturation_skips_short_arrays() {
        let output = "stdev:[1.0 2.0 3.0] stdev:[5.0] stdev:[2.0 2.0 2.0 9.0]";
        assert_eq!(saturation_from_output(output), 6.0);
        assert_eq!(saturation_from_output("stdev:[5.0]"), 0.0);
    }

    #[test]
    fn test_metrics_from_outputs() {
        let metrics = metrics_from_outputs(STATS_OUTPUT, EDGE_OUTPUT);
        assert_eq!(metrics.motion, 3.0);
        assert_eq!(metrics.complexity, 12.0);
        assert_eq!(metrics.edges, 25.0);
        // (15 + 15 + 21) / 3
        assert_eq!(metrics.saturation, 17.0);
    }

    #[test]
    fn test_scene_sample_count() {
        let scene = Scene::new(0.0, 5.0, 0, 150);
        assert_eq!(scene_sample_count(&scene, 10), Some(10));

        let short_frames = Scene::new(0.0, 0.5, 0, 4);
        assert_eq!(scene_sample_count(&short_frames, 10), Some(4));

        let too_short = Scene::new(1.0, 1.05, 30, 31);
        assert_eq!(scene_sample_count(&too_short, 10), None);

        let no_frames = Scene::new(1.0, 2.0, 30, 30);
        assert_eq!(scene_sample_count(&no_frames, 10), None);
    }

    #[test]
    fn test_showinfo_args_with_window() {
        let analyzer = FfmpegAnalyzer::new("ffmpeg".to_string(), "clip.mp4");
        let rect = CropRect::new(10, 20, 300, 400);
        let args = analyzer.showinfo_args(FfmpegAnalyzer::edge_filter(rect), 5, Some((2.5, 4.0)));
        assert_eq!(
            args,
            vec![
                "-ss", "2.5", "-t", "4", "-i", "clip.mp4", "-vf",
                "crop=300:400:10:20,edgedetect=low=0.3:high=0.4:mode=colormix,showinfo",
                "-frames:v", "5", "-f", "null", "-",
            ]
        );
    }

    #[test]
    fn test_missing_binary_is_ffmpeg_error() {
        let analyzer = FfmpegAnalyzer::new("/nonexistent/ffmpeg-binary".to_string(), "clip.mp4");
        let err = analyzer.measure(CropRect::new(1, 1, 10, 10), 5).unwrap_err();
        assert!(matches!(err, Error::Ffmpeg { .. }));
    }
}
