//! Partitioning a video timeline into scenes.

use crate::utils::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static PTS_TIME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"pts_time:([0-9.]+)").unwrap());

static FRAME_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bn:\s*(\d+)").unwrap());

/// Cut-based segmentation yielding fewer scenes than this falls back to fixed intervals.
pub const DEFAULT_MIN_SCENE_COUNT: usize = 3;
pub const DEFAULT_SEGMENT_DURATION: f64 = 5.0;
pub const DEFAULT_MIN_SCENE_DURATION: f64 = 0.5;

const END_TIME_TOLERANCE: f64 = 0.001;

/// A contiguous segment of the video timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub start_time: f64,
    pub end_time: f64,
    pub start_frame: u64,
    pub end_frame: u64,
    /// Activity measurement used for ranking; 0.0 until the scene is analyzed.
    pub metric_value: f64,
}

impl Scene {
    pub fn new(start_time: f64, end_time: f64, start_frame: u64, end_frame: u64) -> Self {
        Self {
            start_time,
            end_time,
            start_frame,
            end_frame,
            metric_value: 0.0,
        }
    }

    pub fn with_metric_value(self, metric_value: f64) -> Self {
        Self {
            metric_value,
            ..self
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn frame_count(&self) -> u64 {
        self.end_frame.saturating_sub(self.start_frame)
    }

    fn joined(&self, later: &Scene) -> Scene {
        Scene {
            start_time: self.start_time,
            end_time: later.end_time,
            start_frame: self.start_frame,
            end_frame: later.end_frame,
            metric_value: self.metric_value.max(later.metric_value),
        }
    }
}

fn validate_timeline(video_duration: f64, total_frames: u64) -> Result<()> {
    if !(video_duration > 0.0) {
        return Err(Error::scene(format!(
            "video_duration must be > 0, got {}",
            video_duration
        )));
    }
    if total_frames == 0 {
        return Err(Error::scene("total_frames must be > 0, got 0"));
    }
    Ok(())
}

fn validate_min_duration(min_duration: f64) -> Result<()> {
    if !(min_duration >= 0.0) {
        return Err(Error::scene(format!(
            "min_duration must be >= 0, got {}",
            min_duration
        )));
    }
    Ok(())
}

/// Extracts `(pts_time, frame_number)` pairs from ffmpeg `showinfo` output.
///
/// Lines lacking either field are skipped. Order of appearance is kept.
pub fn parse_scene_timestamps(showinfo_output: &str) -> Vec<(f64, u64)> {
    showinfo_output
        .lines()
        .filter(|line| line.contains("pts_time"))
        .filter_map(|line| {
            let time = PTS_TIME_REGEX.captures(line)?[1].parse::<f64>().ok()?;
            let frame = FRAME_NUMBER_REGEX.captures(line)?[1].parse::<u64>().ok()?;
            Some((time, frame))
        })
        .collect()
}

/// Replaces the frame numbers of parsed cut points with `floor(pts_time * fps)`.
///
/// When `showinfo` runs after a `select` filter its `n:` counter only counts
/// the selected frames, so source frame numbers have to come from the timestamps.
pub fn cut_points_at_fps(cuts: &[(f64, u64)], fps: f64) -> Result<Vec<(f64, u64)>> {
    if !(fps > 0.0) {
        return Err(Error::scene(format!("fps must be > 0, got {}", fps)));
    }
    Ok(cuts
        .iter()
        .map(|&(time, _)| (time, (time * fps).floor() as u64))
        .collect())
}

/// Builds scenes between consecutive cut points.
///
/// Implicit boundaries at `(0.0, 0)` and `(video_duration, total_frames)` are
/// always added. Cuts outside the open interval `(0, video_duration)` and
/// repeated timestamps are ignored, so the result is a gapless partition.
pub fn scenes_from_cuts(
    cuts: &[(f64, u64)],
    video_duration: f64,
    total_frames: u64,
) -> Result<Vec<Scene>> {
    validate_timeline(video_duration, total_frames)?;

    let mut boundaries: Vec<(f64, u64)> = Vec::with_capacity(cuts.len() + 2);
    boundaries.push((0.0, 0));
    boundaries.extend(
        cuts.iter()
            .copied()
            .filter(|&(t, _)| t > 0.0 && t < video_duration),
    );
    boundaries.push((video_duration, total_frames));

    boundaries.sort_by(|a, b| a.0.total_cmp(&b.0));
    boundaries.dedup_by(|later, earlier| later.0 == earlier.0);

    let scenes: Vec<Scene> = boundaries
        .windows(2)
        .map(|pair| Scene::new(pair[0].0, pair[1].0, pair[0].1, pair[1].1))
        .collect();

    debug!("Built {} scene(s) from {} cut point(s)", scenes.len(), cuts.len());
    Ok(scenes)
}

/// Splits the video into back-to-back segments of `segment_duration` seconds.
/// The final segment ends exactly at `video_duration` and may be shorter.
pub fn fixed_segments(video_duration: f64, fps: f64, segment_duration: f64) -> Result<Vec<Scene>> {
    if !(video_duration > 0.0) {
        return Err(Error::scene(format!(
            "video_duration must be > 0, got {}",
            video_duration
        )));
    }
    if !(fps > 0.0) {
        return Err(Error::scene(format!("fps must be > 0, got {}", fps)));
    }
    if !(segment_duration > 0.0) {
        return Err(Error::scene(format!(
            "segment_duration must be > 0, got {}",
            segment_duration
        )));
    }

    let mut scenes = Vec::new();
    let mut current_time = 0.0;
    let mut current_frame = 0u64;

    while current_time < video_duration {
        let end_time = (current_time + segment_duration).min(video_duration);
        let end_frame = (end_time * fps).floor() as u64;

        scenes.push(Scene::new(current_time, end_time, current_frame, end_frame));

        current_time = end_time;
        current_frame = end_frame;
    }

    Ok(scenes)
}

/// Prefers detected cuts, falling back to fixed segments when they yield
/// fewer than `min_scene_count` scenes.
pub fn segment_video(
    cuts: &[(f64, u64)],
    video_duration: f64,
    total_frames: u64,
    fps: f64,
    segment_duration: f64,
    min_scene_count: usize,
) -> Result<Vec<Scene>> {
    let scenes = scenes_from_cuts(cuts, video_duration, total_frames)?;
    if scenes.len() >= min_scene_count {
        return Ok(scenes);
    }

    warn!(
        "Scene detection found only {} scene(s), using {:.1}s segments instead",
        scenes.len(),
        segment_duration
    );
    fixed_segments(video_duration, fps, segment_duration)
}

/// Drops scenes shorter than `min_duration`.
pub fn filter_short(scenes: &[Scene], min_duration: f64) -> Result<Vec<Scene>> {
    validate_min_duration(min_duration)?;
    Ok(scenes
        .iter()
        .filter(|s| s.duration() >= min_duration)
        .copied()
        .collect())
}

/// Folds scenes shorter than `min_duration` into their neighbours instead of
/// dropping them, keeping the timeline gapless.
///
/// A short scene is joined with its immediate successor and the pair is
/// emitted as is, even if still short. A trailing short scene joins its
/// predecessor. A lone short scene is returned unchanged.
pub fn merge_short(scenes: &[Scene], min_duration: f64) -> Result<Vec<Scene>> {
    validate_min_duration(min_duration)?;

    let mut merged: Vec<Scene> = Vec::with_capacity(scenes.len());
    let mut i = 0;

    while i < scenes.len() {
        let current = scenes[i];

        if current.duration() >= min_duration {
            merged.push(current);
            i += 1;
        } else if let Some(next) = scenes.get(i + 1) {
            merged.push(current.joined(next));
            i += 2;
        } else {
            match merged.pop() {
                Some(previous) => merged.push(previous.joined(&current)),
                None => merged.push(current),
            }
            i += 1;
        }
    }

    Ok(merged)
}

/// Finds the scene with `start_time <= timestamp < end_time`. The end of the
/// final scene also matches, within a millisecond.
pub fn scene_at(scenes: &[Scene], timestamp: f64) -> Option<&Scene> {
    scenes
        .iter()
        .find(|s| s.start_time <= timestamp && timestamp < s.end_time)
        .or_else(|| {
            scenes
                .last()
                .filter(|last| (last.end_time - timestamp).abs() < END_TIME_TOLERANCE)
        })
}
