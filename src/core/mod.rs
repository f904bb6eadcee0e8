pub mod candidates;
pub mod dimensions;
pub mod grid;
pub mod scoring;
pub mod selection;

pub use candidates::{
    generate_candidates, generate_candidates_with_custom, ScoredCandidate, SpatialRegion,
};
pub use dimensions::{calculate_crop_dimensions, parse_aspect_ratio, CropDimensions};
pub use grid::{center_position, corner_positions, generate_grid, Position};
pub use scoring::{
    available_strategies, normalize, score_position, score_with_weights, NormalizationBounds,
    PositionMetrics, Strategy, WeightVector,
};
pub use selection::{parse_acceleration_choices, recommendations_to_choices, select_candidate};
