use crate::config::Config;
use crate::utils::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(name = "smart-crop")]
#[command(about = "Find the most interesting crop window for reframing a video to a new aspect ratio")]
#[command(long_about = "
Samples visual activity (motion, detail, edges, color variance) over a grid of crop
positions, scores every position under several weighting strategies and prints a
ranked, spatially diverse shortlist of crop candidates. Optionally splits the video
into scenes and recommends speedups for the least active ones.

EXAMPLES:
  # Square crop candidates
  smart-crop -i input.mp4 --aspect 1:1

  # Vertical crop on a finer grid, pick the second candidate
  smart-crop -i input.mp4 --aspect 9:16 --grid-size 7 --choice 2

  # Also segment scenes and suggest accelerations for the boring ones
  smart-crop -i input.mp4 --aspect 9:16 --choice 1 --scenes

  # Override the suggested speedups and write scene thumbnails
  smart-crop -i input.mp4 --scenes --accelerate 2:3.0,5:2.5 --thumbnails ./previews
")]
pub struct CliArgs {
    /// Input video file
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Configuration file path
    #[arg(long, default_value = "config.yaml", value_name = "FILE")]
    pub config: PathBuf,

    /// Target aspect ratio as W:H (overrides config)
    #[arg(short, long, value_name = "W:H")]
    pub aspect: Option<String>,

    /// Positions per axis of the analysis grid (overrides config)
    #[arg(short, long, value_name = "N")]
    pub grid_size: Option<u32>,

    /// Frames sampled per position (overrides config)
    #[arg(long, value_name = "N")]
    pub sample_frames: Option<u32>,

    /// Number of candidates to present (overrides config)
    #[arg(long, value_name = "N")]
    pub max_candidates: Option<usize>,

    /// Maximum concurrent position measurements (overrides config)
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Pick candidate N (1-based) from the ranked list
    #[arg(short, long, value_name = "N")]
    pub choice: Option<usize>,

    /// Segment the video into scenes and identify boring ones
    #[arg(long)]
    pub scenes: bool,

    /// Speedups per scene as scene:factor pairs, replacing the recommendations
    #[arg(long, value_name = "LIST", requires = "scenes")]
    pub accelerate: Option<String>,

    /// Write first/last frame thumbnails of every scene into this directory
    #[arg(long, value_name = "DIR", requires = "scenes")]
    pub thumbnails: Option<PathBuf>,

    /// Print the full report as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// List the built-in and configured scoring strategies
    #[arg(long)]
    pub list_strategies: bool,

    /// Validate configuration file
    #[arg(long)]
    pub validate_config: bool,
}

impl CliArgs {
    pub fn get_log_level<'a>(&self, config_level: &'a str) -> &'a str {
        if self.debug {
            "debug"
        } else if self.verbose && matches!(config_level, "info" | "warn" | "warning" | "error") {
            "info"
        } else {
            config_level
        }
    }

    pub fn should_use_color(&self) -> bool {
        !self.no_color
    }

    pub fn is_info_command(&self) -> bool {
        self.list_strategies || self.validate_config
    }

    pub fn should_analyze(&self) -> bool {
        !self.is_info_command() && self.input.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(input) = &self.input {
            if self.should_analyze() && !input.is_file() {
                return Err(Error::validation(format!(
                    "Input file does not exist: {}",
                    input.display()
                )));
            }
        }

        if self.choice == Some(0) {
            return Err(Error::validation("--choice is 1-based and must be at least 1"));
        }

        Ok(())
    }

    /// Applies command-line overrides on top of the loaded configuration and
    /// re-validates the result.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(aspect) = &self.aspect {
            config.analysis.aspect_ratio = aspect.clone();
        }
        if let Some(grid_size) = self.grid_size {
            config.analysis.grid_size = grid_size;
        }
        if let Some(sample_frames) = self.sample_frames {
            config.analysis.sample_frames = sample_frames;
        }
        if let Some(max_candidates) = self.max_candidates {
            config.analysis.max_candidates = max_candidates;
        }
        if let Some(workers) = self.workers {
            config.analysis.max_workers = Some(workers);
        }

        config.validate()
    }
}
