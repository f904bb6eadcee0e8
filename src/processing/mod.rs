pub mod report;

pub use report::{format_candidate_table, format_scene_table, CropReport, SceneReport};

use crate::{
    analysis::{analyze_positions, CropRect, FfmpegAnalyzer},
    cli::CliArgs,
    config::Config,
    core::{
        calculate_crop_dimensions, center_position, generate_candidates_with_custom, generate_grid,
        parse_acceleration_choices, parse_aspect_ratio, recommendations_to_choices,
        select_candidate, CropDimensions, ScoredCandidate,
    },
    scene::{
        boring::percentile_threshold, determine_primary_metric, extract_thumbnails,
        identify_boring, measure_scenes, merge_short, segment_video, EnrichedScene, Scene,
    },
    utils::{ffmpeg::VideoMetadata, AnalysisProgress, Error, FfmpegWrapper, Result},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SmartCropProcessor<'a> {
    ffmpeg: &'a FfmpegWrapper,
    args: &'a CliArgs,
    config: &'a Config,
    input_path: &'a Path,
    analyzer: Arc<FfmpegAnalyzer>,
    run_id: String,
}

impl<'a> SmartCropProcessor<'a> {
    pub fn new(
        ffmpeg: &'a FfmpegWrapper,
        args: &'a CliArgs,
        config: &'a Config,
        input_path: &'a Path,
    ) -> Result<Self> {
        if !input_path.is_file() {
            return Err(Error::validation(format!(
                "Input file does not exist: {}",
                input_path.display()
            )));
        }

        let analyzer = Arc::new(FfmpegAnalyzer::new(
            ffmpeg.ffmpeg_path().to_string(),
            input_path,
        ));

        Ok(Self {
            ffmpeg,
            args,
            config,
            input_path,
            analyzer,
            run_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    pub async fn run(&mut self) -> Result<CropReport> {
        info!("Processing video: {}", self.input_path.display());
        let metadata = self.get_metadata().await?;

        let dims = self.crop_dimensions(&metadata)?;
        let candidates = self.find_candidates(&metadata, &dims).await?;

        let selected = match self.args.choice {
            Some(choice) => {
                let candidate = select_candidate(&candidates, choice)?.clone();
                info!(
                    "Selected candidate {}: ({}, {}) from {}",
                    choice, candidate.x, candidate.y, candidate.strategy
                );
                Some(candidate)
            }
            None => None,
        };
        let crop_filter = selected
            .as_ref()
            .map(|c| format!("crop={}", dims.to_ffmpeg_string(c.x, c.y)));

        let scenes = if self.args.scenes {
            let basis = match selected.as_ref().or_else(|| candidates.first()) {
                Some(candidate) => candidate.clone(),
                None => return Err(Error::selection("No candidate available for scene analysis")),
            };
            Some(self.analyze_scenes(&metadata, &dims, &basis).await?)
        } else {
            None
        };

        info!("Processing complete");

        Ok(CropReport {
            run_id: self.run_id.clone(),
            input: self.input_path.to_path_buf(),
            width: metadata.width,
            height: metadata.height,
            duration: metadata.duration,
            fps: metadata.fps,
            aspect_ratio: self.config.analysis.aspect_ratio.clone(),
            crop: dims,
            candidates,
            selected,
            crop_filter,
            scenes,
        })
    }

    async fn get_metadata(&self) -> Result<VideoMetadata> {
        let metadata = self.ffmpeg.get_video_metadata(self.input_path).await?;
        info!(
            "Video metadata: {}x{}, {:.2}s @ {:.3} fps, codec {}",
            metadata.width,
            metadata.height,
            metadata.duration,
            metadata.fps,
            metadata.codec.as_deref().unwrap_or("unknown")
        );
        Ok(metadata)
    }

    fn crop_dimensions(&self, metadata: &VideoMetadata) -> Result<CropDimensions> {
        let (aspect_w, aspect_h) = parse_aspect_ratio(&self.config.analysis.aspect_ratio)?;
        let dims = calculate_crop_dimensions(
            metadata.width,
            metadata.height,
            aspect_w,
            aspect_h,
            self.config.analysis.crop_scale,
        )?;
        info!(
            "Crop window {}x{} ({}), movement range {}x{}",
            dims.crop_w, dims.crop_h, self.config.analysis.aspect_ratio, dims.max_x, dims.max_y
        );
        Ok(dims)
    }

    async fn find_candidates(
        &self,
        metadata: &VideoMetadata,
        dims: &CropDimensions,
    ) -> Result<Vec<ScoredCandidate>> {
        let analysis = &self.config.analysis;
        let positions = generate_grid(dims.max_x, dims.max_y, analysis.grid_size)?;
        info!(
            "Grid of {} positions ({}x{})",
            positions.len(),
            analysis.grid_size,
            analysis.grid_size
        );

        let progress = AnalysisProgress::new(positions.len(), "Analyzing positions");
        let metrics = analyze_positions(
            Arc::clone(&self.analyzer),
            &positions,
            dims.crop_w,
            dims.crop_h,
            analysis.sample_frames,
            analysis.max_workers,
            |completed, total| progress.update(completed, total),
        )
        .await?;
        progress.finish();

        info!("Generating crop candidates");
        let custom = self.config.custom_strategies()?;
        let candidates = generate_candidates_with_custom(
            &metrics,
            metadata.width,
            metadata.height,
            analysis.max_candidates,
            analysis.top_per_strategy,
            &custom,
        )?;

        if candidates.is_empty() {
            let center = center_position(dims.max_x, dims.max_y);
            warn!(
                "No usable crop positions, falling back to the center ({}, {})",
                center.x, center.y
            );
            return Ok(vec![ScoredCandidate::new(center.x, center.y, 0.0, "Center")]);
        }

        info!("Found {} crop candidates", candidates.len());
        Ok(candidates)
    }

    async fn analyze_scenes(
        &self,
        metadata: &VideoMetadata,
        dims: &CropDimensions,
        candidate: &ScoredCandidate,
    ) -> Result<SceneReport> {
        let scene_config = &self.config.scenes;

        info!("Segmenting scenes");
        let cuts = self
            .ffmpeg
            .detect_scene_cuts(self.input_path, scene_config.detection_threshold, metadata.fps)
            .await?;
        info!("Found {} scene cuts", cuts.len());

        let scenes = segment_video(
            &cuts,
            metadata.duration,
            metadata.frame_count(),
            metadata.fps,
            scene_config.segment_duration,
            scene_config.min_scene_count,
        )?;
        let scenes = merge_short(&scenes, scene_config.min_scene_duration)?;

        let metric = determine_primary_metric(&candidate.strategy);
        let rect = CropRect::from_dimensions(dims, candidate.x, candidate.y);

        let progress = AnalysisProgress::new(scenes.len(), "Measuring scenes");
        let analyzer = Arc::clone(&self.analyzer);
        let sample_frames = scene_config.sample_frames;
        let bar = progress.clone();
        let measured = tokio::task::spawn_blocking(move || {
            measure_scenes(&*analyzer, &scenes, rect, metric, sample_frames, |done, total| {
                bar.update(done, total)
            })
        })
        .await
        .map_err(|e| Error::analysis(format!("Scene measurement task failed: {}", e)))?;
        progress.finish();

        info!("Identifying boring scenes");
        let threshold = percentile_threshold(&measured, scene_config.boring_percentile);
        let boring = identify_boring(&measured, scene_config.boring_percentile)?;
        let recommended = recommendations_to_choices(&boring);
        info!(
            "Found {} boring scene(s) out of {}",
            recommended.len(),
            measured.len()
        );

        let accelerations = match &self.args.accelerate {
            Some(choices) => parse_acceleration_choices(choices, measured.len())?,
            None => recommended.clone(),
        };

        let scenes = match &self.args.thumbnails {
            Some(dir) => self.scene_thumbnails(measured, rect, dir).await?,
            None => measured.into_iter().map(EnrichedScene::from).collect(),
        };
        let scenes = scenes
            .into_iter()
            .map(|s| {
                let value = s.metric_value();
                s.with_metric(metric, value)
            })
            .collect();

        Ok(SceneReport {
            metric,
            threshold,
            scenes,
            recommended,
            accelerations,
        })
    }

    async fn scene_thumbnails(
        &self,
        scenes: Vec<Scene>,
        rect: CropRect,
        output_dir: &Path,
    ) -> Result<Vec<EnrichedScene>> {
        info!("Extracting thumbnails into {}", output_dir.display());
        tokio::fs::create_dir_all(output_dir).await?;

        let base_name = self
            .input_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());

        let progress = AnalysisProgress::new(scenes.len() * 2, "Extracting thumbnails");
        let bar = progress.clone();
        let analyzer = Arc::clone(&self.analyzer);
        let output_dir = output_dir.to_path_buf();
        let enriched = tokio::task::spawn_blocking(move || {
            extract_thumbnails(
                &*analyzer,
                &scenes,
                Some(rect),
                &output_dir,
                &base_name,
                |done, total| bar.update(done, total),
            )
        })
        .await
        .map_err(|e| Error::analysis(format!("Thumbnail task failed: {}", e)))??;
        progress.finish();

        Ok(enriched)
    }
}

/// Prints the report as tables, or as pretty JSON when `json` is set.
pub fn print_report(report: &CropReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    print!(
        "{}",
        format_candidate_table(&report.candidates, report.selected.as_ref())
    );

    match (&report.selected, &report.crop_filter) {
        (Some(selected), Some(filter)) => {
            println!(
                "Selected: {} at ({}, {}), score {:.1}",
                selected.strategy, selected.x, selected.y, selected.score
            );
            println!("FFmpeg filter: -vf \"{}\"", filter);
        }
        _ => println!("Use --choice N to pick a candidate."),
    }

    if let Some(scenes) = &report.scenes {
        println!();
        print!("{}", format_scene_table(scenes));
    }

    Ok(())
}
