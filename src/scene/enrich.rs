//! Attaching measured activity and preview frames to segmented scenes.
//!
//! Segmentation produces plain [`Scene`] values. Enrichment never mutates them;
//! it builds new scenes carrying a metric value and wraps them in
//! [`EnrichedScene`] once thumbnails exist.

use crate::analysis::provider::{CropRect, FrameExtractor, SceneMetricsProvider};
use crate::scene::boring::PrimaryMetric;
use crate::scene::segment::Scene;
use crate::utils::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Offset from the scene end used for the last thumbnail, avoiding black transition frames.
const LAST_FRAME_OFFSET: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedScene {
    pub scene: Scene,
    pub metric: Option<PrimaryMetric>,
    pub first_frame: Option<PathBuf>,
    pub last_frame: Option<PathBuf>,
}

impl From<Scene> for EnrichedScene {
    fn from(scene: Scene) -> Self {
        Self {
            scene,
            metric: None,
            first_frame: None,
            last_frame: None,
        }
    }
}

impl EnrichedScene {
    pub fn with_metric(mut self, metric: PrimaryMetric, value: f64) -> Self {
        self.scene = self.scene.with_metric_value(value);
        self.metric = Some(metric);
        self
    }

    pub fn with_frames(mut self, first: PathBuf, last: PathBuf) -> Self {
        self.first_frame = Some(first);
        self.last_frame = Some(last);
        self
    }

    pub fn metric_value(&self) -> f64 {
        self.scene.metric_value
    }
}

/// Timestamps for a scene's first and last thumbnails.
pub fn thumbnail_timestamps(scene: &Scene) -> (f64, f64) {
    let last = (scene.end_time - LAST_FRAME_OFFSET).max(scene.start_time);
    (scene.start_time, last)
}

/// Output paths for the thumbnails of the scene at 0-based `index`.
pub fn thumbnail_paths(output_dir: &Path, base_name: &str, index: usize) -> (PathBuf, PathBuf) {
    (
        output_dir.join(format!(".{}_scene_{}_first.jpg", base_name, index + 1)),
        output_dir.join(format!(".{}_scene_{}_last.jpg", base_name, index + 1)),
    )
}

/// Measures `metric` for every scene. A scene whose measurement fails is
/// logged and scored 0.0 rather than aborting the whole pass.
pub fn measure_scenes<P, F>(
    provider: &P,
    scenes: &[Scene],
    rect: CropRect,
    metric: PrimaryMetric,
    sample_frames: u32,
    mut on_progress: F,
) -> Vec<Scene>
where
    P: SceneMetricsProvider + ?Sized,
    F: FnMut(usize, usize),
{
    info!("Measuring {} for {} scenes", metric, scenes.len());

    scenes
        .iter()
        .enumerate()
        .map(|(i, scene)| {
            let value = match provider.scene_metric(rect, scene, metric, sample_frames) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Scene {} analysis failed, scoring it 0: {}", i + 1, e);
                    0.0
                }
            };
            debug!(
                "Scene {} ({:.2}s - {:.2}s): {}={:.3}",
                i + 1,
                scene.start_time,
                scene.end_time,
                metric,
                value
            );
            on_progress(i + 1, scenes.len());
            scene.with_metric_value(value)
        })
        .collect()
}

/// Extracts first and last frame thumbnails for every scene into `output_dir`.
pub fn extract_thumbnails<E, F>(
    extractor: &E,
    scenes: &[Scene],
    rect: Option<CropRect>,
    output_dir: &Path,
    base_name: &str,
    mut on_progress: F,
) -> Result<Vec<EnrichedScene>>
where
    E: FrameExtractor + ?Sized,
    F: FnMut(usize, usize),
{
    let total = scenes.len() * 2;
    let mut enriched = Vec::with_capacity(scenes.len());

    for (i, scene) in scenes.iter().enumerate() {
        let (first_at, last_at) = thumbnail_timestamps(scene);
        let (first_path, last_path) = thumbnail_paths(output_dir, base_name, i);

        let first = extractor.extract_frame(first_at, rect, &first_path)?;
        on_progress(i * 2 + 1, total);
        let last = extractor.extract_frame(last_at, rect, &last_path)?;
        on_progress(i * 2 + 2, total);

        enriched.push(EnrichedScene::from(*scene).with_frames(first, last));
    }

    info!("Extracted thumbnails for {} scenes", scenes.len());
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Error;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct DurationProvider;

    impl SceneMetricsProvider for DurationProvider {
        fn scene_metric(
            &self,
            _rect: CropRect,
            scene: &Scene,
            metric: PrimaryMetric,
            _sample_frames: u32,
        ) -> Result<f64> {
            match metric {
                PrimaryMetric::Edges => Err(Error::ffmpeg("edge pass failed")),
                _ => Ok(scene.duration() * 2.0),
            }
        }
    }

    struct RecordingExtractor {
        calls: Mutex<Vec<f64>>,
    }

    impl FrameExtractor for RecordingExtractor {
        fn extract_frame(&self, timestamp: f64, _rect: Option<CropRect>, output: &Path) -> Result<PathBuf> {
            self.calls.lock().unwrap().push(timestamp);
            Ok(output.to_path_buf())
        }
    }

    fn scenes() -> Vec<Scene> {
        vec![Scene::new(0.0, 5.0, 0, 150), Scene::new(5.0, 7.5, 150, 225)]
    }

    #[test]
    fn test_builder_leaves_source_untouched() {
        let scene = Scene::new(0.0, 5.0, 0, 150);
        let enriched = EnrichedScene::from(scene)
            .with_metric(PrimaryMetric::Motion, 3.5)
            .with_frames(PathBuf::from("a.jpg"), PathBuf::from("b.jpg"));

        assert_eq!(scene.metric_value, 0.0);
        assert_eq!(enriched.metric_value(), 3.5);
        assert_eq!(enriched.metric, Some(PrimaryMetric::Motion));
        assert_eq!(enriched.first_frame, Some(PathBuf::from("a.jpg")));
        assert_eq!(enriched.scene.start_frame, 0);
        assert_eq!(enriched.scene.end_frame, 150);
    }

    #[test]
    fn test_measure_scenes() {
        let source = scenes();
        let mut progress = Vec::new();
        let measured = measure_scenes(
            &DurationProvider,
            &source,
            CropRect::new(1, 1, 100, 100),
            PrimaryMetric::Motion,
            10,
            |done, total| progress.push((done, total)),
        );

        assert_eq!(measured[0].metric_value, 10.0);
        assert_eq!(measured[1].metric_value, 5.0);
        assert_eq!(source[0].metric_value, 0.0);
        assert_eq!(progress, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_failed_measurement_scores_zero() {
        let measured = measure_scenes(
            &DurationProvider,
            &scenes(),
            CropRect::new(1, 1, 100, 100),
            PrimaryMetric::Edges,
            10,
            |_, _| {},
        );
        assert!(measured.iter().all(|s| s.metric_value == 0.0));
    }

    #[test]
    fn test_extract_thumbnails() {
        let extractor = RecordingExtractor {
            calls: Mutex::new(Vec::new()),
        };
        let dir = Path::new("/tmp/previews");
        let enriched = extract_thumbnails(&extractor, &scenes(), None, dir, "clip", |_, _| {}).unwrap();

        assert_eq!(enriched.len(), 2);
        assert_eq!(
            enriched[1].first_frame,
            Some(PathBuf::from("/tmp/previews/.clip_scene_2_first.jpg"))
        );
        assert_eq!(
            enriched[1].last_frame,
            Some(PathBuf::from("/tmp/previews/.clip_scene_2_last.jpg"))
        );

        let calls = extractor.calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], 0.0);
        assert!((calls[1] - 4.9).abs() < 1e-9);
        assert_eq!(calls[2], 5.0);
        assert!((calls[3] - 7.4).abs() < 1e-9);
    }

    #[test]
    fn test_thumbnail_timestamps_short_scene() {
        let tiny = Scene::new(5.0, 5.05, 150, 151);
        assert_eq!(thumbnail_timestamps(&tiny), (5.0, 5.0));
    }
}
