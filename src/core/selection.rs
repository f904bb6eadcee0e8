//! Interpreting a caller's choice among the presented options.
//!
//! Crop candidates and scenes are shown with 1-based option numbers.

use crate::core::candidates::ScoredCandidate;
use crate::utils::{Error, Result};
use std::collections::BTreeMap;

/// Resolves a 1-based crop choice against the ranked candidate list.
pub fn select_candidate(candidates: &[ScoredCandidate], choice: usize) -> Result<&ScoredCandidate> {
    if candidates.is_empty() {
        return Err(Error::selection("No candidates available to choose from"));
    }
    if choice == 0 || choice > candidates.len() {
        return Err(Error::selection(format!(
            "Choice {} is out of range (valid: 1-{})",
            choice,
            candidates.len()
        )));
    }
    Ok(&candidates[choice - 1])
}

/// Parses acceleration choices written as `scene:factor` pairs, e.g. `2:3.0,5:2.5`.
///
/// Scene numbers are 1-based and must exist. Factors are taken as given.
pub fn parse_acceleration_choices(input: &str, scene_count: usize) -> Result<BTreeMap<usize, f64>> {
    let mut choices = BTreeMap::new();

    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (scene, factor) = entry.split_once(':').ok_or_else(|| {
            Error::selection(format!(
                "Invalid acceleration entry '{}' (expected 'scene:factor')",
                entry
            ))
        })?;

        let scene: usize = scene
            .trim()
            .parse()
            .map_err(|_| Error::selection(format!("Invalid scene number in '{}'", entry)))?;
        if scene == 0 || scene > scene_count {
            return Err(Error::selection(format!(
                "Scene {} is out of range (valid: 1-{})",
                scene, scene_count
            )));
        }

        let factor: f64 = factor
            .trim()
            .parse()
            .map_err(|_| Error::selection(format!("Invalid speedup factor in '{}'", entry)))?;

        choices.insert(scene, factor);
    }

    Ok(choices)
}

/// Converts 0-based boring-section recommendations to a 1-based choice map.
pub fn recommendations_to_choices(recommendations: &[(usize, f64)]) -> BTreeMap<usize, f64> {
    recommendations
        .iter()
        .map(|&(index, factor)| (index + 1, factor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<ScoredCandidate> {
        vec![
            ScoredCandidate::new(10, 10, 90.0, "Balanced"),
            ScoredCandidate::new(20, 20, 80.0, "Spatial:Center"),
        ]
    }

    #[test]
    fn test_select_candidate() {
        let c = candidates();
        assert_eq!(select_candidate(&c, 1).unwrap().x, 10);
        assert_eq!(select_candidate(&c, 2).unwrap().x, 20);
        assert!(select_candidate(&c, 0).is_err());
        assert!(select_candidate(&c, 3).is_err());
        assert!(select_candidate(&[], 1).is_err());
    }

    #[test]
    fn test_parse_acceleration_choices() {
        let choices = parse_acceleration_choices("2:3.0, 5:2.5", 6).unwrap();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[&2], 3.0);
        assert_eq!(choices[&5], 2.5);

        assert!(parse_acceleration_choices("", 3).unwrap().is_empty());
        assert!(parse_acceleration_choices("7:2.0", 6).is_err());
        assert!(parse_acceleration_choices("0:2.0", 6).is_err());
        assert!(parse_acceleration_choices("2-2.0", 6).is_err());
        assert!(parse_acceleration_choices("2:fast", 6).is_err());
    }

    #[test]
    fn test_override_factor_not_bounded() {
        let choices = parse_acceleration_choices("1:8.0", 1).unwrap();
        assert_eq!(choices[&1], 8.0);
    }

    #[test]
    fn test_recommendations_to_choices() {
        let choices = recommendations_to_choices(&[(0, 4.0), (3, 2.5)]);
        assert_eq!(choices.get(&1), Some(&4.0));
        assert_eq!(choices.get(&4), Some(&2.5));
    }
}
