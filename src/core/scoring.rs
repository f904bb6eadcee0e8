//! Metric normalization and strategy-weighted scoring of crop positions.

use crate::utils::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub const SUBJECT_DETECTION: &str = "Subject Detection";
pub const MOTION_PRIORITY: &str = "Motion Priority";
pub const VISUAL_DETAIL: &str = "Visual Detail";
pub const BALANCED: &str = "Balanced";
pub const COLOR_FOCUS: &str = "Color Focus";

const WEIGHT_KEYS: [&str; 4] = ["motion", "complexity", "edges", "saturation"];
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Summary statistics measured for one crop position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionMetrics {
    pub x: u32,
    pub y: u32,
    /// Mean absolute frame-to-frame change of average luma.
    pub motion: f64,
    /// Mean per-frame luma standard deviation.
    pub complexity: f64,
    /// Mean luma of the edge-filtered frames.
    pub edges: f64,
    /// Mean sum of the first three channel standard deviations. A color
    /// variance proxy, not HSV saturation; the strategy weights are tuned to it.
    pub saturation: f64,
}

impl PositionMetrics {
    pub fn new(x: u32, y: u32, motion: f64, complexity: f64, edges: f64, saturation: f64) -> Self {
        Self {
            x,
            y,
            motion,
            complexity,
            edges,
            saturation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        values.fold(
            Self {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |range, v| Self {
                min: range.min.min(v),
                max: range.max.max(v),
            },
        )
    }

    pub fn normalize(&self, value: f64) -> f64 {
        normalize(value, self.min, self.max)
    }
}

/// Per-metric min/max over a set of analyzed positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationBounds {
    pub motion: MetricRange,
    pub complexity: MetricRange,
    pub edges: MetricRange,
    pub saturation: MetricRange,
}

impl NormalizationBounds {
    pub fn from_positions(positions: &[PositionMetrics]) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::validation(
                "Cannot calculate normalization bounds from an empty positions list",
            ));
        }

        Ok(Self {
            motion: MetricRange::of(positions.iter().map(|p| p.motion)),
            complexity: MetricRange::of(positions.iter().map(|p| p.complexity)),
            edges: MetricRange::of(positions.iter().map(|p| p.edges)),
            saturation: MetricRange::of(positions.iter().map(|p| p.saturation)),
        })
    }
}

/// Linearly rescales `value` from `[min_val, max_val]` to `[0, 100]`.
///
/// A degenerate range (`max_val - min_val <= 0`) maps everything to the neutral 50.0.
/// Values outside the range are clamped.
pub fn normalize(value: f64, min_val: f64, max_val: f64) -> f64 {
    let range = max_val - min_val;
    if range > 0.0 {
        (((value - min_val) / range) * 100.0).clamp(0.0, 100.0)
    } else {
        50.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub motion: f64,
    pub complexity: f64,
    pub edges: f64,
    pub saturation: f64,
}

impl WeightVector {
    pub const fn new(motion: f64, complexity: f64, edges: f64, saturation: f64) -> Self {
        Self {
            motion,
            complexity,
            edges,
            saturation,
        }
    }

    /// Builds a weight vector from a name-keyed table, requiring exactly the four metric keys.
    pub fn from_map(weights: &HashMap<String, f64>) -> Result<Self> {
        let expected: BTreeSet<&str> = WEIGHT_KEYS.iter().copied().collect();
        let got: BTreeSet<&str> = weights.keys().map(String::as_str).collect();
        if got != expected {
            return Err(Error::invalid_weights(format!(
                "weights must have exactly these keys: {:?}, got: {:?}",
                expected, got
            )));
        }

        let vector = Self::new(
            weights["motion"],
            weights["complexity"],
            weights["edges"],
            weights["saturation"],
        );
        vector.validate()?;
        Ok(vector)
    }

    pub fn sum(&self) -> f64 {
        self.motion + self.complexity + self.edges + self.saturation
    }

    pub fn validate(&self) -> Result<()> {
        let named = [
            ("motion", self.motion),
            ("complexity", self.complexity),
            ("edges", self.edges),
            ("saturation", self.saturation),
        ];
        for (key, value) in named {
            if !(value >= 0.0) {
                return Err(Error::invalid_weights(format!(
                    "weight for '{}' must be non-negative, got {}",
                    key, value
                )));
            }
        }

        let total = self.sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::invalid_weights(format!(
                "weights must sum to 1.0 (got {:.3}): {:?}",
                total, self
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: &'static str,
    pub weights: WeightVector,
    pub description: &'static str,
    pub use_case: &'static str,
}

static STRATEGIES: Lazy<Vec<Strategy>> = Lazy::new(|| {
    let table = vec![
        Strategy {
            name: SUBJECT_DETECTION,
            weights: WeightVector::new(0.05, 0.25, 0.40, 0.30),
            description: "Finds people/objects (40% edges, 30% saturation)",
            use_case: "Best for videos with people or distinct subjects",
        },
        Strategy {
            name: MOTION_PRIORITY,
            weights: WeightVector::new(0.50, 0.15, 0.25, 0.10),
            description: "Tracks movement (50% motion, 25% edges)",
            use_case: "Best for action videos or when following moving subjects",
        },
        Strategy {
            name: VISUAL_DETAIL,
            weights: WeightVector::new(0.05, 0.50, 0.30, 0.15),
            description: "Identifies complex areas (50% complexity, 30% edges)",
            use_case: "Best for detailed scenes, architecture, or texture-rich content",
        },
        Strategy {
            name: BALANCED,
            weights: WeightVector::new(0.25, 0.25, 0.25, 0.25),
            description: "Equal weights (25% each metric)",
            use_case: "General purpose, no specific priority",
        },
        Strategy {
            name: COLOR_FOCUS,
            weights: WeightVector::new(0.05, 0.20, 0.30, 0.45),
            description: "Colorful subjects (45% saturation, 30% edges)",
            use_case: "Best for vibrant, colorful content",
        },
    ];

    for strategy in &table {
        if let Err(e) = strategy.weights.validate() {
            panic!(
                "Built-in strategy '{}' has invalid weights: {}",
                strategy.name, e
            );
        }
    }

    table
});

/// Forces construction and validation of the built-in strategy table.
pub fn init_strategies() -> usize {
    STRATEGIES.len()
}

pub fn builtin_strategies() -> &'static [Strategy] {
    &STRATEGIES
}

pub fn available_strategies() -> Vec<&'static str> {
    STRATEGIES.iter().map(|s| s.name).collect()
}

pub fn strategy(name: &str) -> Result<&'static Strategy> {
    STRATEGIES
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| Error::unknown_strategy(name, &available_strategies()))
}

fn weighted_score(metrics: &PositionMetrics, bounds: &NormalizationBounds, w: &WeightVector) -> f64 {
    let score = bounds.motion.normalize(metrics.motion) * w.motion
        + bounds.complexity.normalize(metrics.complexity) * w.complexity
        + bounds.edges.normalize(metrics.edges) * w.edges
        + bounds.saturation.normalize(metrics.saturation) * w.saturation;
    score.clamp(0.0, 100.0)
}

/// Scores a position in `[0, 100]` using a built-in strategy.
pub fn score_position(
    metrics: &PositionMetrics,
    bounds: &NormalizationBounds,
    strategy_name: &str,
) -> Result<f64> {
    let strategy = strategy(strategy_name)?;
    Ok(weighted_score(metrics, bounds, &strategy.weights))
}

/// Scores a position against an explicit weight vector, validating it first.
pub fn score_with_weights(
    metrics: &PositionMetrics,
    bounds: &NormalizationBounds,
    weights: &WeightVector,
) -> Result<f64> {
    weights.validate()?;
    Ok(weighted_score(metrics, bounds, weights))
}
