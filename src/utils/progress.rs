use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Progress bar for a fixed number of independent work items
/// (grid positions, scenes, thumbnails).
#[derive(Clone)]
pub struct AnalysisProgress {
    progress_bar: ProgressBar,
    start_time: Instant,
    label: String,
}

impl AnalysisProgress {
    pub fn new(total: usize, label: &str) -> Self {
        let progress_bar = ProgressBar::new(total as u64);

        progress_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos:>3}/{len:3} | {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        progress_bar.set_message(label.to_string());

        Self {
            progress_bar,
            start_time: Instant::now(),
            label: label.to_string(),
        }
    }

    /// A bar that draws nothing, for quiet or non-interactive runs.
    pub fn hidden(total: usize, label: &str) -> Self {
        let progress = Self::new(total, label);
        progress.progress_bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        progress
    }

    pub fn update(&self, completed: usize, total: usize) {
        self.progress_bar.set_length(total as u64);
        self.progress_bar.set_position(completed as u64);

        if completed > 0 && completed < total {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let remaining = elapsed / completed as f64 * (total - completed) as f64;
            self.progress_bar.set_message(format!(
                "{} • ETA {}",
                self.label,
                format_duration(Duration::from_secs_f64(remaining))
            ));
        }
    }

    pub fn position(&self) -> u64 {
        self.progress_bar.position()
    }

    pub fn finish(&self) {
        let duration = self.start_time.elapsed();
        self.progress_bar.finish_with_message(format!(
            "{} completed in {}",
            self.label,
            format_duration(duration)
        ));
    }
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
