/// Where a message sits in the pipeline's output hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingLevel {
    Root,   // The video being processed
    Stage,  // Pipeline stages
    Step,   // Results within a stage
    Detail, // Per-position / per-scene chatter
}

const ROOT_PREFIXES: &[&str] = &["Processing video"];

const STAGE_PREFIXES: &[&str] = &[
    "Analyzing",
    "Generating",
    "Segmenting",
    "Identifying",
    "Measuring",
    "Extracting thumbnails",
];

const STEP_PREFIXES: &[&str] = &[
    "Video metadata",
    "Crop window",
    "Grid of",
    "Found",
    "Selected",
    "Extracted thumbnails",
    "Using fixed",
    "Boring-scene threshold",
];

/// Classifies a message by its leading words.
pub fn determine_processing_level(message: &str) -> ProcessingLevel {
    let starts_with_any = |prefixes: &[&str]| prefixes.iter().any(|p| message.starts_with(p));

    if starts_with_any(ROOT_PREFIXES) {
        ProcessingLevel::Root
    } else if starts_with_any(STAGE_PREFIXES) {
        ProcessingLevel::Stage
    } else if starts_with_any(STEP_PREFIXES) || message.ends_with("complete") {
        ProcessingLevel::Step
    } else {
        ProcessingLevel::Detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(
            determine_processing_level("Processing video: clip.mp4"),
            ProcessingLevel::Root
        );
        assert_eq!(
            determine_processing_level("Analyzing 25 positions with 8 workers"),
            ProcessingLevel::Stage
        );
        assert_eq!(
            determine_processing_level("Measuring motion for 12 scenes"),
            ProcessingLevel::Stage
        );
        assert_eq!(
            determine_processing_level("Found 14 scene cuts"),
            ProcessingLevel::Step
        );
        assert_eq!(
            determine_processing_level("Position analysis complete"),
            ProcessingLevel::Step
        );
        assert_eq!(
            determine_processing_level("Position 3 of 25 measured"),
            ProcessingLevel::Detail
        );
    }
}
