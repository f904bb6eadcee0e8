use clap::Parser;

use smart_crop::{
    cli::{handle_commands, CliArgs},
    config::Config,
    core::scoring::init_strategies,
    processing::{print_report, SmartCropProcessor},
    utils::{setup_logging, Error, FfmpegWrapper, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    if !args.is_info_command() && args.input.is_none() {
        use clap::CommandFactory;
        let mut cmd = CliArgs::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    }

    args.validate()?;

    let mut config = Config::load_with_fallback(&args.config)?;
    args.apply_overrides(&mut config)?;

    setup_logging(
        args.get_log_level(&config.logging.level),
        config.logging.show_timestamps,
        config.logging.colored_output && args.should_use_color(),
    )?;

    init_strategies();

    if handle_commands(&args, &config).await? {
        return Ok(());
    }

    if args.should_analyze() {
        handle_analysis(&args, &config).await
    } else {
        Ok(())
    }
}

async fn handle_analysis(args: &CliArgs, config: &Config) -> Result<()> {
    let ffmpeg = FfmpegWrapper::new(config.tools.ffmpeg.clone(), config.tools.ffprobe.clone());

    ffmpeg
        .check_availability()
        .await
        .map_err(|e| Error::ffmpeg(format!("FFmpeg tools not available: {}", e)))?;

    let input_path = args
        .input
        .as_deref()
        .ok_or_else(|| Error::validation("An input video is required for analysis"))?;

    let mut processor = SmartCropProcessor::new(&ffmpeg, args, config, input_path)?;
    let report = processor.run().await?;
    print_report(&report, args.json)
}
