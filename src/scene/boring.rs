//! Finding low-activity scenes worth speeding up.

use crate::core::candidates::SPATIAL_PREFIX;
use crate::core::scoring::{
    BALANCED, COLOR_FOCUS, MOTION_PRIORITY, SUBJECT_DETECTION, VISUAL_DETAIL,
};
use crate::scene::segment::Scene;
use crate::utils::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const DEFAULT_BORING_PERCENTILE: f64 = 30.0;
pub const MIN_SPEEDUP: f64 = 2.0;
pub const MAX_SPEEDUP: f64 = 4.0;

/// The single metric measured per scene when only one is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryMetric {
    Motion,
    Complexity,
    Edges,
}

impl PrimaryMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motion => "motion",
            Self::Complexity => "complexity",
            Self::Edges => "edges",
        }
    }
}

impl fmt::Display for PrimaryMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps the strategy that picked the crop to the metric that should drive scene ranking.
pub fn determine_primary_metric(strategy: &str) -> PrimaryMetric {
    if strategy.starts_with(SPATIAL_PREFIX) {
        return PrimaryMetric::Motion;
    }

    match strategy {
        SUBJECT_DETECTION => PrimaryMetric::Edges,
        MOTION_PRIORITY => PrimaryMetric::Motion,
        VISUAL_DETAIL => PrimaryMetric::Complexity,
        BALANCED => PrimaryMetric::Motion,
        // saturation is never sampled per scene; edges track color detail closely enough
        COLOR_FOCUS => PrimaryMetric::Edges,
        _ => PrimaryMetric::Motion,
    }
}

/// Linear speedup between `min_speedup` (at the threshold) and `max_speedup` (at zero activity).
pub fn calculate_speedup_factor(
    metric_value: f64,
    threshold: f64,
    min_speedup: f64,
    max_speedup: f64,
) -> f64 {
    if threshold <= 0.0 {
        return (min_speedup + max_speedup) / 2.0;
    }

    let ratio = metric_value / threshold;
    let speedup = min_speedup + (max_speedup - min_speedup) * (1.0 - ratio);
    speedup.min(max_speedup)
}

/// Value at index `floor(N * percentile / 100)` of the ascending metric values,
/// or the smallest value when that index runs past the end.
pub fn percentile_threshold(scenes: &[Scene], percentile: f64) -> Option<f64> {
    if scenes.is_empty() {
        return None;
    }

    let mut values: Vec<f64> = scenes.iter().map(|s| s.metric_value).collect();
    values.sort_by(f64::total_cmp);

    let index = (values.len() as f64 * (percentile / 100.0)).floor() as usize;
    Some(values.get(index).copied().unwrap_or(values[0]))
}

/// Returns `(scene_index, speedup_factor)` for every scene whose metric is
/// strictly below the percentile threshold. Indices are 0-based.
pub fn identify_boring(scenes: &[Scene], percentile: f64) -> Result<Vec<(usize, f64)>> {
    if !(0.0..=100.0).contains(&percentile) {
        return Err(Error::validation(format!(
            "percentile_threshold must be between 0 and 100, got {}",
            percentile
        )));
    }

    let threshold = match percentile_threshold(scenes, percentile) {
        Some(t) => t,
        None => return Ok(Vec::new()),
    };
    debug!(
        "Boring-scene threshold at {:.0}th percentile: {:.3}",
        percentile, threshold
    );

    Ok(scenes
        .iter()
        .enumerate()
        .filter(|(_, scene)| scene.metric_value < threshold)
        .map(|(i, scene)| {
            (
                i,
                calculate_speedup_factor(scene.metric_value, threshold, MIN_SPEEDUP, MAX_SPEEDUP),
            )
        })
        .collect())
}
