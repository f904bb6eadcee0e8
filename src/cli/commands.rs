use crate::{
    cli::CliArgs,
    config::Config,
    core::{available_strategies, scoring::builtin_strategies, WeightVector},
    utils::Result,
};
use std::path::Path;

pub async fn handle_commands(args: &CliArgs, config: &Config) -> Result<bool> {
    if args.list_strategies {
        list_strategies(config)?;
        return Ok(true);
    }

    if args.validate_config {
        validate_config(&args.config).await?;
        return Ok(true);
    }

    Ok(false)
}

fn format_weights(weights: &WeightVector) -> String {
    format!(
        "{:>4.0}% {:>4.0}% {:>4.0}% {:>4.0}%",
        weights.motion * 100.0,
        weights.complexity * 100.0,
        weights.edges * 100.0,
        weights.saturation * 100.0
    )
}

fn strategy_table(custom: &[(String, WeightVector)]) -> String {
    let mut lines = vec![
        "Available scoring strategies:".to_string(),
        format!("{:-<80}", ""),
        format!(
            "{:<20} {:>5} {:>5} {:>5} {:>5}  {}",
            "Name", "Mot", "Cplx", "Edge", "Sat", "Use case"
        ),
        format!("{:-<80}", ""),
    ];

    for strategy in builtin_strategies() {
        lines.push(format!(
            "{:<20} {}  {}",
            strategy.name,
            format_weights(&strategy.weights),
            strategy.use_case
        ));
    }

    if !custom.is_empty() {
        lines.push(format!("{:-<80}", ""));
        for (name, weights) in custom {
            lines.push(format!(
                "{:<20} {}  (custom)",
                name,
                format_weights(weights)
            ));
        }
    }

    lines.push(format!("{:-<80}", ""));
    lines.push(
        "Spatial candidates (Spatial:<Region>) are added for Top-Left, Top-Right, Center, Bottom-Left and Bottom-Right."
            .to_string(),
    );
    lines.join("\n")
}

fn list_strategies(config: &Config) -> Result<()> {
    let custom = config.custom_strategies()?;
    println!("{}", strategy_table(&custom));
    Ok(())
}

async fn validate_config(config_path: &Path) -> Result<()> {
    match Config::load(config_path) {
        Ok(config) => {
            println!("✓ Configuration file is valid: {}", config_path.display());
            println!();

            println!("Configuration Summary:");
            println!("{:-<40}", "");
            println!("Aspect ratio: {}", config.analysis.aspect_ratio);
            println!(
                "Grid: {}x{} positions, {} frames each",
                config.analysis.grid_size, config.analysis.grid_size, config.analysis.sample_frames
            );
            println!(
                "Scene detection threshold: {}",
                config.scenes.detection_threshold
            );
            println!("Built-in strategies: {}", available_strategies().len());

            match config.custom_strategies() {
                Ok(custom) => {
                    println!("✓ {} custom strategies loaded successfully", custom.len());
                }
                Err(e) => {
                    println!("✗ Strategy validation failed: {}", e);
                    return Err(e);
                }
            }

            Ok(())
        }
        Err(e) => {
            println!("✗ Configuration validation failed: {}", e);
            println!();
            println!("Common issues:");
            println!("  - Check YAML syntax and indentation");
            println!("  - Aspect ratio must look like 9:16");
            println!("  - Strategy weights must be non-negative and sum to 1.0");
            Err(e)
        }
    }
}
