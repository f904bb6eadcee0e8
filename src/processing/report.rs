use crate::core::{CropDimensions, ScoredCandidate};
use crate::scene::{EnrichedScene, PrimaryMetric};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct CropReport {
    pub run_id: String,
    pub input: PathBuf,
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub fps: f64,
    pub aspect_ratio: String,
    pub crop: CropDimensions,
    pub candidates: Vec<ScoredCandidate>,
    pub selected: Option<ScoredCandidate>,
    /// `crop=w:h:x:y` for the selected candidate.
    pub crop_filter: Option<String>,
    pub scenes: Option<SceneReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneReport {
    pub metric: PrimaryMetric,
    pub threshold: Option<f64>,
    pub scenes: Vec<EnrichedScene>,
    /// Recommended speedups keyed by 1-based scene number.
    pub recommended: BTreeMap<usize, f64>,
    /// Speedups actually chosen, either the recommendations or an explicit override.
    pub accelerations: BTreeMap<usize, f64>,
}

impl SceneReport {
    pub fn total_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.scene.duration()).sum()
    }

    /// Duration of the video once the chosen accelerations are applied.
    pub fn accelerated_duration(&self) -> f64 {
        self.scenes
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let factor = self.accelerations.get(&(i + 1)).copied().unwrap_or(1.0);
                if factor > 0.0 {
                    s.scene.duration() / factor
                } else {
                    s.scene.duration()
                }
            })
            .sum()
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

pub fn format_candidate_table(candidates: &[ScoredCandidate], selected: Option<&ScoredCandidate>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Crop candidates:");
    let _ = writeln!(out, "{:-<72}", "");
    let _ = writeln!(
        out,
        "{:<4} {:<3} {:>7} {:>7} {:>8}  {:<30}",
        "#", "", "X", "Y", "Score", "Strategy"
    );
    let _ = writeln!(out, "{:-<72}", "");

    for (i, candidate) in candidates.iter().enumerate() {
        let marker = if selected == Some(candidate) { "→" } else { "" };
        let _ = writeln!(
            out,
            "{:<4} {:<3} {:>7} {:>7} {:>8.1}  {:<30}",
            i + 1,
            marker,
            candidate.x,
            candidate.y,
            candidate.score,
            truncate(&candidate.strategy, 30)
        );
    }

    let _ = writeln!(out, "{:-<72}", "");
    let spatial = candidates.iter().filter(|c| c.is_spatial()).count();
    if spatial > 0 {
        let _ = writeln!(
            out,
            "{} of {} candidates are spatial picks covering different regions of the frame",
            spatial,
            candidates.len()
        );
    }
    out
}

pub fn format_scene_table(report: &SceneReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Scenes (ranked by {}):", report.metric);
    let _ = writeln!(out, "{:-<72}", "");
    let _ = writeln!(
        out,
        "{:<4} {:>9} {:>9} {:>8} {:>10} {:>9}",
        "#", "Start", "End", "Length", "Activity", "Speedup"
    );
    let _ = writeln!(out, "{:-<72}", "");

    for (i, enriched) in report.scenes.iter().enumerate() {
        let scene = &enriched.scene;
        let speedup = match report.accelerations.get(&(i + 1)) {
            Some(factor) => format!("{:.2}x", factor),
            None => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<4} {:>8.2}s {:>8.2}s {:>7.2}s {:>10.3} {:>9}",
            i + 1,
            scene.start_time,
            scene.end_time,
            scene.duration(),
            enriched.metric_value(),
            speedup
        );
    }

    let _ = writeln!(out, "{:-<72}", "");
    if let Some(threshold) = report.threshold {
        let _ = writeln!(out, "Boring threshold: {:.3}", threshold);
    }
    let _ = writeln!(
        out,
        "Duration: {:.1}s -> {:.1}s with {} accelerated scene(s)",
        report.total_duration(),
        report.accelerated_duration(),
        report.accelerations.len()
    );
    out
}
