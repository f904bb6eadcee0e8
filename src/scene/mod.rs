pub mod boring;
pub mod enrich;
pub mod segment;

pub use boring::{
    calculate_speedup_factor, determine_primary_metric, identify_boring, PrimaryMetric,
    DEFAULT_BORING_PERCENTILE,
};
pub use enrich::{extract_thumbnails, measure_scenes, EnrichedScene};
pub use segment::{
    cut_points_at_fps, filter_short, fixed_segments, merge_short, parse_scene_timestamps,
    scene_at, scenes_from_cuts, segment_video, Scene,
};
