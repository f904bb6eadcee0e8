//! Shortlisting of crop candidates.
//!
//! Candidates come from two passes over the analyzed positions:
//! - the top positions of every built-in strategy
//! - the best Balanced position in each spatial region, so the shortlist is
//!   not dominated by one corner of the frame
//!
//! Both passes are merged, deduplicated by position and truncated to the
//! requested size, highest score first.

use crate::core::scoring::{
    available_strategies, score_position, score_with_weights, NormalizationBounds,
    PositionMetrics, WeightVector, BALANCED,
};
use crate::utils::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

pub const DEFAULT_MAX_CANDIDATES: usize = 10;
pub const DEFAULT_TOP_PER_STRATEGY: usize = 5;
pub const SPATIAL_PREFIX: &str = "Spatial:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub x: u32,
    pub y: u32,
    pub score: f64,
    /// Strategy name, or `Spatial:<Region>` for spatial picks.
    pub strategy: String,
}

impl ScoredCandidate {
    pub fn new(x: u32, y: u32, score: f64, strategy: impl Into<String>) -> Self {
        Self {
            x,
            y,
            score,
            strategy: strategy.into(),
        }
    }

    pub fn is_spatial(&self) -> bool {
        self.strategy.starts_with(SPATIAL_PREFIX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialRegion {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl SpatialRegion {
    pub const ALL: [SpatialRegion; 5] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::Center,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "Top-Left",
            Self::TopRight => "Top-Right",
            Self::BottomLeft => "Bottom-Left",
            Self::BottomRight => "Bottom-Right",
            Self::Center => "Center",
        }
    }

    pub fn label(&self) -> String {
        format!("{}{}", SPATIAL_PREFIX, self.as_str())
    }

    /// Positions on the center lines fall on the right/bottom side.
    pub fn contains(&self, x: u32, y: u32, video_width: u32, video_height: u32) -> bool {
        let cx = (video_width / 2) as i64;
        let cy = (video_height / 2) as i64;
        let (x, y) = (x as i64, y as i64);
        match self {
            Self::TopLeft => x < cx && y < cy,
            Self::TopRight => x >= cx && y < cy,
            Self::BottomLeft => x < cx && y >= cy,
            Self::BottomRight => x >= cx && y >= cy,
            Self::Center => {
                (x - cx).abs() < (video_width / 4) as i64
                    && (y - cy).abs() < (video_height / 4) as i64
            }
        }
    }
}

fn sort_by_score_desc(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

fn validate_dimensions(video_width: u32, video_height: u32) -> Result<()> {
    if video_width == 0 || video_height == 0 {
        return Err(Error::validation(format!(
            "Invalid video dimensions: {}x{}",
            video_width, video_height
        )));
    }
    Ok(())
}

/// Top `top_n` positions under one strategy, highest score first.
pub fn generate_strategy_candidates(
    positions: &[PositionMetrics],
    bounds: &NormalizationBounds,
    strategy: &str,
    top_n: usize,
) -> Result<Vec<ScoredCandidate>> {
    if positions.is_empty() {
        return Err(Error::validation(
            "Cannot generate candidates from an empty positions list",
        ));
    }
    if top_n < 1 {
        return Err(Error::validation(format!(
            "top_per_strategy must be at least 1, got {}",
            top_n
        )));
    }

    let mut scored = positions
        .iter()
        .map(|p| Ok(ScoredCandidate::new(p.x, p.y, score_position(p, bounds, strategy)?, strategy)))
        .collect::<Result<Vec<_>>>()?;

    sort_by_score_desc(&mut scored);
    scored.truncate(top_n);
    Ok(scored)
}

/// Best Balanced position in each non-empty spatial region.
pub fn generate_spatial_candidates(
    positions: &[PositionMetrics],
    bounds: &NormalizationBounds,
    video_width: u32,
    video_height: u32,
) -> Result<Vec<ScoredCandidate>> {
    if positions.is_empty() {
        return Err(Error::validation(
            "Cannot generate spatial candidates from an empty positions list",
        ));
    }
    validate_dimensions(video_width, video_height)?;

    let mut candidates = Vec::new();
    for region in SpatialRegion::ALL {
        let mut best: Option<ScoredCandidate> = None;
        for p in positions
            .iter()
            .filter(|p| region.contains(p.x, p.y, video_width, video_height))
        {
            let score = score_position(p, bounds, BALANCED)?;
            // strict comparison keeps the first of equal scores
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(ScoredCandidate::new(p.x, p.y, score, region.label()));
            }
        }

        match best {
            Some(candidate) => candidates.push(candidate),
            None => debug!("No analyzed positions in region {}", region.as_str()),
        }
    }

    Ok(candidates)
}

/// Keeps the highest-scored entry per position, dropping edge origins
/// (`x == 0` or `y == 0`), and returns at most `max_candidates` of them.
pub fn deduplicate_candidates(
    candidates: &[ScoredCandidate],
    max_candidates: usize,
) -> Result<Vec<ScoredCandidate>> {
    if max_candidates < 1 {
        return Err(Error::validation(format!(
            "max_candidates must be at least 1, got {}",
            max_candidates
        )));
    }

    let mut sorted = candidates.to_vec();
    sort_by_score_desc(&mut sorted);

    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut unique = Vec::with_capacity(max_candidates.min(sorted.len()));
    for candidate in sorted {
        if candidate.x == 0 || candidate.y == 0 {
            continue;
        }
        if !seen.insert((candidate.x, candidate.y)) {
            continue;
        }
        unique.push(candidate);
        if unique.len() >= max_candidates {
            break;
        }
    }

    Ok(unique)
}

/// Top `top_n` positions under a named custom weight vector.
pub fn generate_weighted_candidates(
    positions: &[PositionMetrics],
    bounds: &NormalizationBounds,
    name: &str,
    weights: &WeightVector,
    top_n: usize,
) -> Result<Vec<ScoredCandidate>> {
    if top_n < 1 {
        return Err(Error::validation(format!(
            "top_per_strategy must be at least 1, got {}",
            top_n
        )));
    }

    let mut scored = positions
        .iter()
        .map(|p| Ok(ScoredCandidate::new(p.x, p.y, score_with_weights(p, bounds, weights)?, name)))
        .collect::<Result<Vec<_>>>()?;

    sort_by_score_desc(&mut scored);
    scored.truncate(top_n);
    Ok(scored)
}

/// Builds the ranked, position-unique candidate shortlist for a set of analyzed positions.
pub fn generate_candidates(
    positions: &[PositionMetrics],
    video_width: u32,
    video_height: u32,
    max_candidates: usize,
    top_per_strategy: usize,
) -> Result<Vec<ScoredCandidate>> {
    generate_candidates_with_custom(
        positions,
        video_width,
        video_height,
        max_candidates,
        top_per_strategy,
        &[],
    )
}

/// [`generate_candidates`] with extra named weight vectors joining the strategy pass.
pub fn generate_candidates_with_custom(
    positions: &[PositionMetrics],
    video_width: u32,
    video_height: u32,
    max_candidates: usize,
    top_per_strategy: usize,
    custom: &[(String, WeightVector)],
) -> Result<Vec<ScoredCandidate>> {
    if positions.is_empty() {
        return Err(Error::validation(
            "Cannot generate candidates from an empty positions list",
        ));
    }
    validate_dimensions(video_width, video_height)?;
    if max_candidates < 1 {
        return Err(Error::validation(format!(
            "max_candidates must be at least 1, got {}",
            max_candidates
        )));
    }
    if top_per_strategy < 1 {
        return Err(Error::validation(format!(
            "top_per_strategy must be at least 1, got {}",
            top_per_strategy
        )));
    }

    let bounds = NormalizationBounds::from_positions(positions)?;

    let mut all = Vec::new();
    for strategy in available_strategies() {
        all.extend(generate_strategy_candidates(
            positions,
            &bounds,
            strategy,
            top_per_strategy,
        )?);
    }
    for (name, weights) in custom {
        all.extend(generate_weighted_candidates(
            positions,
            &bounds,
            name,
            weights,
            top_per_strategy,
        )?);
    }
    all.extend(generate_spatial_candidates(
        positions,
        &bounds,
        video_width,
        video_height,
    )?);

    debug!("Collected {} raw candidates before deduplication", all.len());
    deduplicate_candidates(&all, max_candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::{COLOR_FOCUS, MOTION_PRIORITY, VISUAL_DETAIL};
    use pretty_assertions::assert_eq;

    fn sample_positions() -> Vec<PositionMetrics> {
        vec![
            PositionMetrics::new(100, 100, 10.0, 5.0, 8.0, 7.0),
            PositionMetrics::new(200, 200, 5.0, 10.0, 6.0, 8.0),
            PositionMetrics::new(300, 300, 8.0, 8.0, 9.0, 9.0),
        ]
    }

    fn quadrant_positions() -> Vec<PositionMetrics> {
        vec![
            PositionMetrics::new(100, 100, 10.0, 5.0, 8.0, 7.0),
            PositionMetrics::new(1500, 100, 5.0, 10.0, 6.0, 8.0),
            PositionMetrics::new(100, 900, 8.0, 8.0, 9.0, 9.0),
            PositionMetrics::new(1500, 900, 7.0, 7.0, 7.0, 7.0),
            PositionMetrics::new(960, 540, 6.0, 6.0, 6.0, 6.0),
        ]
    }

    /// 5x5 grid spanning all quadrants of a 1920x1080 frame with metrics
    /// increasing linearly in grid index.
    fn full_frame_grid() -> Vec<PositionMetrics> {
        let mut positions = Vec::new();
        for j in 0..5u32 {
            for i in 0..5u32 {
                let k = (j * 5 + i) as f64;
                positions.push(PositionMetrics::new(
                    100 + i * 400,
                    100 + j * 220,
                    i as f64,
                    j as f64,
                    k,
                    24.0 - k,
                ));
            }
        }
        positions
    }

    #[test]
    fn test_strategy_candidates_sorted_and_tagged() {
        let positions = sample_positions();
        let bounds = NormalizationBounds::from_positions(&positions).unwrap();
        let candidates =
            generate_strategy_candidates(&positions, &bounds, MOTION_PRIORITY, 5).unwrap();

        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.strategy == MOTION_PRIORITY));
        for pair in candidates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        // strong edges and saturation outweigh pure motion here
        assert_eq!((candidates[0].x, candidates[0].y), (300, 300));
        assert!((candidates[0].score - 74.0).abs() < 1e-9);
    }

    #[test]
    fn test_strategy_candidates_top_n() {
        let positions: Vec<_> = (1..=10)
            .map(|i| PositionMetrics::new(i, i, i as f64, i as f64, i as f64, i as f64))
            .collect();
        let bounds = NormalizationBounds::from_positions(&positions).unwrap();
        let candidates = generate_strategy_candidates(&positions, &bounds, BALANCED, 3).unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].x, 10);
    }

    #[test]
    fn test_strategies_disagree() {
        let positions = vec![
            PositionMetrics::new(100, 100, 50.0, 1.0, 5.0, 5.0),
            PositionMetrics::new(200, 200, 1.0, 50.0, 5.0, 5.0),
        ];
        let bounds = NormalizationBounds::from_positions(&positions).unwrap();
        let motion = generate_strategy_candidates(&positions, &bounds, MOTION_PRIORITY, 1).unwrap();
        let detail = generate_strategy_candidates(&positions, &bounds, VISUAL_DETAIL, 1).unwrap();
        assert_eq!(motion[0].x, 100);
        assert_eq!(detail[0].x, 200);
    }

    #[test]
    fn test_strategy_candidates_invalid_input() {
        let positions = sample_positions();
        let bounds = NormalizationBounds::from_positions(&positions).unwrap();
        assert!(generate_strategy_candidates(&[], &bounds, BALANCED, 5).is_err());
        assert!(generate_strategy_candidates(&positions, &bounds, BALANCED, 0).is_err());
        assert!(generate_strategy_candidates(&positions, &bounds, "Bogus", 5).is_err());
    }

    #[test]
    fn test_all_spatial_regions_covered() {
        let positions = quadrant_positions();
        let bounds = NormalizationBounds::from_positions(&positions).unwrap();
        let candidates = generate_spatial_candidates(&positions, &bounds, 1920, 1080).unwrap();

        let labels: Vec<&str> = candidates.iter().map(|c| c.strategy.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Spatial:Top-Left",
                "Spatial:Top-Right",
                "Spatial:Bottom-Left",
                "Spatial:Bottom-Right",
                "Spatial:Center",
            ]
        );
        assert!(candidates.iter().all(|c| c.is_spatial()));
        let center = candidates.last().unwrap();
        assert_eq!((center.x, center.y), (960, 540));
    }

    #[test]
    fn test_empty_regions_skipped() {
        let positions = vec![
            PositionMetrics::new(100, 100, 10.0, 5.0, 8.0, 7.0),
            PositionMetrics::new(200, 200, 5.0, 10.0, 6.0, 8.0),
        ];
        let bounds = NormalizationBounds::from_positions(&positions).unwrap();
        let candidates = generate_spatial_candidates(&positions, &bounds, 1920, 1080).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].strategy, "Spatial:Top-Left");
    }

    #[test]
    fn test_best_position_per_region() {
        let positions = vec![
            PositionMetrics::new(100, 100, 1.0, 1.0, 1.0, 1.0),
            PositionMetrics::new(200, 200, 10.0, 10.0, 10.0, 10.0),
        ];
        let bounds = NormalizationBounds::from_positions(&positions).unwrap();
        let candidates = generate_spatial_candidates(&positions, &bounds, 1920, 1080).unwrap();
        assert_eq!((candidates[0].x, candidates[0].y), (200, 200));
        assert_eq!(candidates[0].score, 100.0);
    }

    #[test]
    fn test_region_boundaries() {
        let (w, h) = (1920, 1080);
        assert!(SpatialRegion::TopRight.contains(960, 0, w, h));
        assert!(!SpatialRegion::TopLeft.contains(960, 0, w, h));
        assert!(SpatialRegion::BottomLeft.contains(0, 540, w, h));
        assert!(SpatialRegion::BottomRight.contains(960, 540, w, h));
        assert!(SpatialRegion::Center.contains(960, 540, w, h));
        assert!(!SpatialRegion::Center.contains(480, 540, w, h));
        assert!(SpatialRegion::Center.contains(481, 271, w, h));
    }

    #[test]
    fn test_spatial_invalid_dimensions() {
        let positions = sample_positions();
        let bounds = NormalizationBounds::from_positions(&positions).unwrap();
        assert!(generate_spatial_candidates(&positions, &bounds, 0, 1080).is_err());
        assert!(generate_spatial_candidates(&[], &bounds, 1920, 1080).is_err());
    }

    #[test]
    fn test_deduplicate_keeps_highest() {
        let candidates = vec![
            ScoredCandidate::new(100, 100, 90.0, BALANCED),
            ScoredCandidate::new(100, 100, 95.0, MOTION_PRIORITY),
            ScoredCandidate::new(200, 200, 85.0, VISUAL_DETAIL),
        ];
        let unique = deduplicate_candidates(&candidates, 10).unwrap();
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], ScoredCandidate::new(100, 100, 95.0, MOTION_PRIORITY));
        assert_eq!(unique[1].x, 200);
    }

    #[test]
    fn test_deduplicate_rejects_edge_positions() {
        let candidates = vec![
            ScoredCandidate::new(0, 100, 99.0, BALANCED),
            ScoredCandidate::new(100, 0, 98.0, BALANCED),
            ScoredCandidate::new(0, 0, 97.0, BALANCED),
            ScoredCandidate::new(50, 50, 10.0, COLOR_FOCUS),
        ];
        let unique = deduplicate_candidates(&candidates, 10).unwrap();
        assert_eq!(unique, vec![ScoredCandidate::new(50, 50, 10.0, COLOR_FOCUS)]);
    }

    #[test]
    fn test_deduplicate_limit_and_order() {
        let candidates: Vec<_> = (1..=20)
            .map(|i| ScoredCandidate::new(i, i, i as f64, BALANCED))
            .collect();
        let unique = deduplicate_candidates(&candidates, 5).unwrap();
        assert_eq!(unique.len(), 5);
        assert_eq!(unique[0].score, 20.0);
        assert_eq!(unique[4].score, 16.0);
    }

    #[test]
    fn test_deduplicate_edge_cases() {
        assert!(deduplicate_candidates(&[], 10).unwrap().is_empty());
        assert!(deduplicate_candidates(&[], 0).is_err());

        let dupes = vec![ScoredCandidate::new(5, 5, 1.0, BALANCED); 4];
        assert_eq!(deduplicate_candidates(&dupes, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_generate_candidates_full_frame() {
        let positions = full_frame_grid();
        let candidates = generate_candidates(
            &positions,
            1920,
            1080,
            DEFAULT_MAX_CANDIDATES,
            DEFAULT_TOP_PER_STRATEGY,
        )
        .unwrap();

        assert_eq!(candidates.len(), 10);

        let unique: HashSet<(u32, u32)> = candidates.iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(unique.len(), candidates.len());

        for pair in candidates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }

        assert!(candidates.iter().any(|c| c.is_spatial()));
        assert!(candidates.iter().all(|c| (0.0..=100.0).contains(&c.score)));
        assert_eq!((candidates[0].x, candidates[0].y), (1700, 980));
    }

    #[test]
    fn test_generate_candidates_respects_limit() {
        let positions = full_frame_grid();
        for max in 1..=12 {
            let candidates = generate_candidates(&positions, 1920, 1080, max, 5).unwrap();
            assert!(candidates.len() <= max);
        }
    }

    #[test]
    fn test_generate_candidates_invalid_input() {
        let positions = sample_positions();
        assert!(generate_candidates(&[], 1920, 1080, 10, 5).is_err());
        assert!(generate_candidates(&positions, 0, 1080, 10, 5).is_err());
        assert!(generate_candidates(&positions, 1920, 0, 10, 5).is_err());
        assert!(generate_candidates(&positions, 1920, 1080, 0, 5).is_err());
        assert!(generate_candidates(&positions, 1920, 1080, 10, 0).is_err());
    }

    #[test]
    fn test_custom_weights_join_strategy_pass() {
        let positions = sample_positions();
        let custom = vec![("Pure Motion".to_string(), WeightVector::new(1.0, 0.0, 0.0, 0.0))];
        let candidates =
            generate_candidates_with_custom(&positions, 1920, 1080, 10, 1, &custom).unwrap();

        assert_eq!(candidates[0].strategy, "Pure Motion");
        assert_eq!((candidates[0].x, candidates[0].y), (100, 100));
        assert_eq!(candidates[0].score, 100.0);
    }

    #[test]
    fn test_custom_weights_validated() {
        let positions = sample_positions();
        let custom = vec![("Broken".to_string(), WeightVector::new(0.5, 0.5, 0.5, 0.0))];
        let result = generate_candidates_with_custom(&positions, 1920, 1080, 10, 5, &custom);
        assert!(matches!(result, Err(Error::InvalidWeights { .. })));
    }

    #[test]
    fn test_generate_candidates_single_origin_position() {
        // a crop that fills the frame only ever yields (0, 0), which is never a valid origin
        let positions = vec![PositionMetrics::new(0, 0, 1.0, 1.0, 1.0, 1.0)];
        let candidates = generate_candidates(&positions, 1920, 1080, 10, 5).unwrap();
        assert!(candidates.is_empty());
    }
}
