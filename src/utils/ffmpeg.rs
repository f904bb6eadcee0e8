use crate::scene::segment::{cut_points_at_fps, parse_scene_timestamps};
use crate::utils::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use tracing::debug;

static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration: (\d{2}):(\d{2}):(\d{2})\.(\d{2})").unwrap()
});

#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub fps: f64,
    pub codec: Option<String>,
}

impl VideoMetadata {
    /// Estimated from duration and frame rate, never below one.
    pub fn frame_count(&self) -> u64 {
        ((self.duration * self.fps).floor() as u64).max(1)
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegWrapper {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegWrapper {
    pub fn new(ffmpeg_path: String, ffprobe_path: String) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    pub async fn get_video_metadata<P: AsRef<Path>>(&self, input_path: P) -> Result<VideoMetadata> {
        let input_path = input_path.as_ref().to_string_lossy();

        let output = TokioCommand::new(&self.ffprobe_path)
            .args([
                "-v", "error",
                "-select_streams", "v:0",
                "-print_format", "json",
                "-show_format",
                "-show_streams",
                &*input_path,
            ])
            .output()
            .await?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ffmpeg(format!("ffprobe failed: {}", error_msg)));
        }

        let json_output = String::from_utf8_lossy(&output.stdout);
        let probe_data: serde_json::Value = serde_json::from_str(&json_output)
            .map_err(|e| Error::parse(format!("Failed to parse ffprobe output: {}", e)))?;

        let metadata = parse_video_metadata(&probe_data)?;
        let metadata = match metadata.duration {
            d if d > 0.0 => metadata,
            _ => {
                debug!("Duration not found in JSON, attempting text fallback");
                VideoMetadata {
                    duration: self.extract_duration_with_regex(&input_path).await?,
                    ..metadata
                }
            }
        };

        debug!(
            "Video metadata: {}x{}, {:.2}s @ {:.3} fps",
            metadata.width, metadata.height, metadata.duration, metadata.fps
        );
        Ok(metadata)
    }

    /// Runs ffmpeg's scene-change selector over the whole input and returns
    /// `(timestamp, frame_number)` for every detected cut, with frame numbers
    /// derived from the timestamp at `fps`.
    pub async fn detect_scene_cuts<P: AsRef<Path>>(
        &self,
        input_path: P,
        threshold: f64,
        fps: f64,
    ) -> Result<Vec<(f64, u64)>> {
        let input_path = input_path.as_ref().to_string_lossy();
        let filter = format!("select='gt(scene,{})',showinfo", threshold);

        debug!("Detecting scene cuts with threshold {}", threshold);
        let output = TokioCommand::new(&self.ffmpeg_path)
            .args(["-i", &*input_path, "-vf", filter.as_str(), "-f", "null", "-"])
            .stdin(Stdio::null())
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(Error::ffmpeg(format!(
                "Scene detection failed with {}",
                output.status
            )));
        }

        let cuts = cut_points_at_fps(&parse_scene_timestamps(&stderr), fps)?;
        debug!("Found {} scene cuts", cuts.len());
        Ok(cuts)
    }

    pub async fn check_availability(&self) -> Result<()> {
        let ffmpeg_check = TokioCommand::new(&self.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| Error::ffmpeg(format!("FFmpeg is not available: {}", e)))?;

        if !ffmpeg_check.status.success() {
            return Err(Error::ffmpeg("FFmpeg is not available or not executable"));
        }

        let ffprobe_check = TokioCommand::new(&self.ffprobe_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| Error::ffmpeg(format!("FFprobe is not available: {}", e)))?;

        if !ffprobe_check.status.success() {
            return Err(Error::ffmpeg("FFprobe is not available or not executable"));
        }

        Ok(())
    }

    async fn extract_duration_with_regex(&self, input_path: &str) -> Result<f64> {
        // ffprobe prints the container banner (with Duration:) on stderr when not quiet
        let output = TokioCommand::new(&self.ffprobe_path)
            .args(["-hide_banner", input_path])
            .output()
            .await?;

        let text_output = String::from_utf8_lossy(&output.stderr);
        parse_duration_line(&text_output)
            .ok_or_else(|| Error::parse("Could not extract duration from ffprobe output"))
    }
}

fn parse_video_metadata(data: &serde_json::Value) -> Result<VideoMetadata> {
    let streams = data["streams"].as_array()
        .ok_or_else(|| Error::parse("No streams found in ffprobe output"))?;

    let video_stream = streams.iter()
        .find(|s| s["codec_type"].as_str() == Some("video"))
        .ok_or_else(|| Error::parse("No video stream found"))?;

    let width = video_stream["width"].as_u64()
        .ok_or_else(|| Error::parse("Video width not found"))? as u32;

    let height = video_stream["height"].as_u64()
        .ok_or_else(|| Error::parse("Video height not found"))? as u32;

    let duration = data["format"]["duration"].as_str()
        .or_else(|| video_stream["duration"].as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fps_str = video_stream["r_frame_rate"].as_str()
        .or_else(|| video_stream["avg_frame_rate"].as_str())
        .ok_or_else(|| Error::parse("Frame rate not found"))?;
    let fps = parse_fraction_to_float(fps_str)
        .ok_or_else(|| Error::parse(format!("Invalid frame rate format: {}", fps_str)))?;

    let codec = video_stream["codec_name"].as_str().map(|s| s.to_string());

    Ok(VideoMetadata {
        width,
        height,
        duration,
        fps,
        codec,
    })
}

fn parse_fraction_to_float(fraction: &str) -> Option<f64> {
    let parts: Vec<&str> = fraction.split('/').collect();
    if parts.len() == 2 {
        let numerator: f64 = parts[0].parse().ok()?;
        let denominator: f64 = parts[1].parse().ok()?;
        if denominator != 0.0 {
            Some(numerator / denominator)
        } else {
            None
        }
    } else {
        fraction.parse().ok()
    }
}

fn parse_duration_line(text: &str) -> Option<f64> {
    let captures = DURATION_REGEX.captures(text)?;
    let hours: f64 = captures[1].parse().ok()?;
    let minutes: f64 = captures[2].parse().ok()?;
    let seconds: f64 = captures[3].parse().ok()?;
    let centiseconds: f64 = captures[4].parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds + centiseconds / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_fraction_to_float() {
        assert_eq!(parse_fraction_to_float("30/1"), Some(30.0));
        assert!((parse_fraction_to_float("24000/1001").unwrap() - 23.976).abs() < 0.001);
        assert_eq!(parse_fraction_to_float("29.97"), Some(29.97));
        assert_eq!(parse_fraction_to_float("30/0"), None);
        assert_eq!(parse_fraction_to_float("invalid"), None);
    }

    #[test]
    fn test_parse_video_metadata() {
        let probe = json!({
            "streams": [
                {"codec_type": "audio", "codec_name": "aac"},
                {
                    "codec_type": "video",
                    "codec_name": "h264",
                    "width": 1920,
                    "height": 1080,
                    "r_frame_rate": "30000/1001"
                }
            ],
            "format": {"duration": "12.500000"}
        });

        let metadata = parse_video_metadata(&probe).unwrap();
        assert_eq!(metadata.width, 1920);
        assert_eq!(metadata.height, 1080);
        assert_eq!(metadata.duration, 12.5);
        assert_eq!(metadata.codec.as_deref(), Some("h264"));
        // 12.5 * 29.97 = 374.6
        assert_eq!(metadata.frame_count(), 374);
    }

    #[test]
    fn test_parse_video_metadata_missing_video() {
        let probe = json!({"streams": [{"codec_type": "audio"}], "format": {}});
        assert!(parse_video_metadata(&probe).is_err());
    }

    #[test]
    fn test_frame_count_never_zero() {
        let metadata = VideoMetadata {
            width: 10,
            height: 10,
            duration: 0.0,
            fps: 30.0,
            codec: None,
        };
        assert_eq!(metadata.frame_count(), 1);
    }

    #[test]
    fn test_parse_duration_line() {
        let text = "  Duration: 01:02:03.45, start: 0.000000, bitrate: 1205 kb/s";
        assert!((parse_duration_line(text).unwrap() - 3723.45).abs() < 1e-9);
        assert_eq!(parse_duration_line("nothing here"), None);
    }
}
