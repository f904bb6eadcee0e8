/// ffmpeg chatter that occasionally leaks into log messages via error text.
const NOISE_PATTERNS: &[&str] = &[
    "Parsed_showinfo",
    "Consider increasing the value for the 'analyzeduration'",
    "Could not find codec parameters for stream",
    "deprecated pixel format used",
];

pub fn should_show_message(message: &str) -> bool {
    !NOISE_PATTERNS.iter().any(|pattern| message.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_showinfo_noise() {
        assert!(should_show_message("Analyzing 25 positions with 4 workers"));
        assert!(!should_show_message(
            "[Parsed_showinfo_1 @ 0x55] n:0 pts:0 mean:[16 128 128]"
        ));
        assert!(!should_show_message("[swscaler] deprecated pixel format used"));
    }
}
