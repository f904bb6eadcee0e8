use super::types::*;
use crate::core::dimensions::parse_aspect_ratio;
use crate::core::scoring::{available_strategies, WeightVector};
use crate::core::candidates::SPATIAL_PREFIX;
use crate::utils::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_FILE: &str = "config.default.yaml";
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub logging: LoggingConfig,
    pub analysis: AnalysisConfig,
    pub scenes: SceneConfig,
    pub strategies: RawStrategies,
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `config_path` if it exists, otherwise the first existing default
    /// location, otherwise built-in defaults.
    pub fn load_with_fallback<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        Self::load_first_existing(config_path.as_ref(), &Self::default_locations())
    }

    /// Places searched when the requested config file is missing.
    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("smart-crop").join("config.yaml"));
        }
        locations
    }

    fn load_first_existing(config_path: &Path, fallbacks: &[PathBuf]) -> Result<Self> {
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            return Self::load(config_path);
        }

        for candidate in fallbacks {
            if candidate.exists() {
                debug!("Loading configuration from {}", candidate.display());
                return Self::load(candidate);
            }
        }

        debug!("No configuration file found, using built-in defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Custom strategies as validated weight vectors, sorted by name.
    pub fn custom_strategies(&self) -> Result<Vec<(String, WeightVector)>> {
        let mut strategies = self
            .strategies
            .iter()
            .map(|(name, weights)| {
                WeightVector::from_map(weights)
                    .map(|vector| (name.clone(), vector))
                    .map_err(|e| match e {
                        Error::InvalidWeights { message } => Error::invalid_weights(format!(
                            "custom strategy '{}': {}",
                            name, message
                        )),
                        other => other,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        strategies.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(strategies)
    }

    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::validation(format!(
                "Invalid logging level: {} (must be one of {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        self.validate_analysis()?;
        self.validate_scenes()?;

        for name in self.strategies.keys() {
            if available_strategies().contains(&name.as_str()) {
                return Err(Error::validation(format!(
                    "Custom strategy '{}' shadows a built-in strategy",
                    name
                )));
            }
            if name.starts_with(SPATIAL_PREFIX) {
                return Err(Error::validation(format!(
                    "Custom strategy '{}' must not use the reserved '{}' prefix",
                    name, SPATIAL_PREFIX
                )));
            }
        }
        self.custom_strategies()?;

        Ok(())
    }

    fn validate_analysis(&self) -> Result<()> {
        let analysis = &self.analysis;
        parse_aspect_ratio(&analysis.aspect_ratio)?;

        if !(analysis.crop_scale > 0.0 && analysis.crop_scale <= 1.0) {
            return Err(Error::validation(format!(
                "crop_scale must be in (0, 1], got {}",
                analysis.crop_scale
            )));
        }

        let positive = [
            ("grid_size", analysis.grid_size as usize),
            ("sample_frames", analysis.sample_frames as usize),
            ("max_candidates", analysis.max_candidates),
            ("top_per_strategy", analysis.top_per_strategy),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(Error::validation(format!(
                    "analysis.{} must be greater than 0",
                    name
                )));
            }
        }

        if analysis.max_workers == Some(0) {
            return Err(Error::validation("analysis.max_workers must be greater than 0"));
        }

        Ok(())
    }

    fn validate_scenes(&self) -> Result<()> {
        let scenes = &self.scenes;

        if !(scenes.detection_threshold > 0.0 && scenes.detection_threshold <= 1.0) {
            return Err(Error::validation(format!(
                "scenes.detection_threshold must be in (0, 1], got {}",
                scenes.detection_threshold
            )));
        }

        if scenes.min_scene_count == 0 {
            return Err(Error::validation("scenes.min_scene_count must be greater than 0"));
        }

        if !(scenes.segment_duration > 0.0) {
            return Err(Error::validation(format!(
                "scenes.segment_duration must be positive, got {}",
                scenes.segment_duration
            )));
        }

        if !(scenes.min_scene_duration >= 0.0) {
            return Err(Error::validation(format!(
                "scenes.min_scene_duration must not be negative, got {}",
                scenes.min_scene_duration
            )));
        }

        if !(0.0..=100.0).contains(&scenes.boring_percentile) {
            return Err(Error::validation(format!(
                "scenes.boring_percentile must be between 0 and 100, got {}",
                scenes.boring_percentile
            )));
        }

        if scenes.sample_frames == 0 {
            return Err(Error::validation("scenes.sample_frames must be greater than 0"));
        }

        Ok(())
    }
}
