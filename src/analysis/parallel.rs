//! Fan-out of per-position measurement across a bounded pool of blocking workers.

use crate::analysis::provider::{CropRect, MetricsProvider};
use crate::core::grid::Position;
use crate::core::scoring::PositionMetrics;
use crate::utils::{Error, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Worker count for `num_positions` independent measurements.
///
/// Tiny grids do not get a pool: one worker for a single position and at most
/// two for up to three. Otherwise one worker per CPU, never more than there are
/// positions, capped by `max_workers` and never below one.
pub fn optimal_worker_count(num_positions: usize, max_workers: Option<usize>) -> usize {
    let cpus = available_cpus();

    let workers = if num_positions <= 1 {
        1
    } else if num_positions <= 3 {
        cpus.min(2)
    } else {
        cpus.min(num_positions)
    };

    let workers = match max_workers {
        Some(max) => workers.min(max),
        None => workers,
    };
    workers.max(1)
}

/// Measures every position and returns the metrics in the same order as `positions`.
///
/// `on_progress(completed, total)` is called once per finished position with a
/// strictly increasing `completed`, whatever order the workers finish in. Zero
/// or one position is measured inline without spawning workers.
pub async fn analyze_positions<P, F>(
    provider: Arc<P>,
    positions: &[Position],
    crop_w: u32,
    crop_h: u32,
    sample_frames: u32,
    max_workers: Option<usize>,
    mut on_progress: F,
) -> Result<Vec<PositionMetrics>>
where
    P: MetricsProvider + 'static,
    F: FnMut(usize, usize),
{
    let total = positions.len();
    if total <= 1 {
        let mut results = Vec::with_capacity(total);
        for (i, position) in positions.iter().enumerate() {
            let rect = CropRect::new(position.x, position.y, crop_w, crop_h);
            results.push(provider.measure(rect, sample_frames)?.at(position.x, position.y));
            on_progress(i + 1, total);
        }
        return Ok(results);
    }

    let workers = optimal_worker_count(total, max_workers);
    info!("Analyzing {} positions with {} workers", total, workers);

    let mut results: Vec<Option<PositionMetrics>> = vec![None; total];
    let mut completions = stream::iter(positions.iter().copied().enumerate())
        .map(|(index, position)| {
            let provider = Arc::clone(&provider);
            async move {
                let rect = CropRect::new(position.x, position.y, crop_w, crop_h);
                let joined =
                    tokio::task::spawn_blocking(move || provider.measure(rect, sample_frames))
                        .await;
                match joined {
                    Ok(measured) => measured.map(|raw| (index, raw.at(position.x, position.y))),
                    Err(e) => Err(Error::analysis(format!(
                        "Worker for position ({}, {}) failed: {}",
                        position.x, position.y, e
                    ))),
                }
            }
        })
        .buffer_unordered(workers);

    let mut completed = 0;
    while let Some(outcome) = completions.next().await {
        let (index, metrics) = outcome?;
        debug!("Position {} of {} measured", index + 1, total);
        results[index] = Some(metrics);
        completed += 1;
        on_progress(completed, total);
    }

    results
        .into_iter()
        .enumerate()
        .map(|(i, metrics)| {
            metrics.ok_or_else(|| Error::analysis(format!("No metrics collected for position {}", i)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::provider::RawMetrics;
    use crate::core::grid::generate_grid;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Metrics derived from the position; later positions finish first.
    struct SlowFirstProvider {
        calls: AtomicUsize,
    }

    impl SlowFirstProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MetricsProvider for SlowFirstProvider {
        fn measure(&self, rect: CropRect, sample_frames: u32) -> Result<RawMetrics> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(((1000 - rect.x.min(1000)) / 100) as u64));
            Ok(RawMetrics {
                motion: rect.x as f64,
                complexity: rect.y as f64,
                edges: rect.width as f64,
                saturation: sample_frames as f64,
            })
        }
    }

    struct FailingProvider;

    impl MetricsProvider for FailingProvider {
        fn measure(&self, rect: CropRect, _sample_frames: u32) -> Result<RawMetrics> {
            if rect.x > 200 {
                Err(Error::ffmpeg("decoder blew up"))
            } else {
                Ok(RawMetrics::default())
            }
        }
    }

    #[test]
    fn test_optimal_worker_count() {
        assert_eq!(optimal_worker_count(0, None), 1);
        assert_eq!(optimal_worker_count(1, None), 1);
        assert!(optimal_worker_count(3, None) <= 2);
        assert!(optimal_worker_count(100, None) >= 1);
        assert!(optimal_worker_count(100, None) <= 100);
        assert!(optimal_worker_count(5, None) <= 5);
        assert_eq!(optimal_worker_count(100, Some(1)), 1);
        assert_eq!(optimal_worker_count(100, Some(0)), 1);
        assert!(optimal_worker_count(100, Some(4)) <= 4);
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let positions = generate_grid(800, 600, 3).unwrap();
        let provider = Arc::new(SlowFirstProvider::new());

        let metrics = analyze_positions(provider.clone(), &positions, 640, 360, 7, Some(4), |_, _| {})
            .await
            .unwrap();

        assert_eq!(metrics.len(), positions.len());
        for (position, measured) in positions.iter().zip(&metrics) {
            assert_eq!((measured.x, measured.y), (position.x, position.y));
            assert_eq!(measured.motion, position.x as f64);
            assert_eq!(measured.complexity, position.y as f64);
            assert_eq!(measured.edges, 640.0);
            assert_eq!(measured.saturation, 7.0);
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 9);
    }

    #[tokio::test]
    async fn test_progress_called_once_per_position() {
        let positions = generate_grid(400, 300, 4).unwrap();
        let provider = Arc::new(SlowFirstProvider::new());
        let mut seen = Vec::new();

        analyze_positions(provider, &positions, 100, 100, 3, None, |done, total| {
            seen.push((done, total));
        })
        .await
        .unwrap();

        let expected: Vec<(usize, usize)> = (1..=16).map(|i| (i, 16)).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_single_position_runs_inline() {
        let positions = generate_grid(0, 0, 5).unwrap();
        let provider = Arc::new(SlowFirstProvider::new());
        let mut progress = Vec::new();

        let metrics = analyze_positions(provider, &positions, 1920, 1080, 10, None, |done, total| {
            progress.push((done, total));
        })
        .await
        .unwrap();

        assert_eq!(metrics, vec![PositionMetrics::new(0, 0, 0.0, 0.0, 1920.0, 10.0)]);
        assert_eq!(progress, vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_empty_positions() {
        let provider = Arc::new(SlowFirstProvider::new());
        let metrics = analyze_positions(provider, &[], 100, 100, 3, None, |_, _| {})
            .await
            .unwrap();
        assert!(metrics.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let positions = generate_grid(400, 300, 3).unwrap();
        let result =
            analyze_positions(Arc::new(FailingProvider), &positions, 100, 100, 3, Some(2), |_, _| {})
                .await;
        assert!(matches!(result, Err(Error::Ffmpeg { .. })));
    }
}
