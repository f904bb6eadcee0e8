use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg error: {message}")]
    Ffmpeg { message: String },

    #[error("Video analysis error: {message}")]
    Analysis { message: String },

    #[error("Unknown strategy: '{name}'. Valid strategies are: {valid}")]
    UnknownStrategy { name: String, valid: String },

    #[error("Invalid strategy weights: {message}")]
    InvalidWeights { message: String },

    #[error("Scene error: {message}")]
    Scene { message: String },

    #[error("Selection error: {message}")]
    Selection { message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl Error {
    pub fn ffmpeg<T: Into<String>>(message: T) -> Self {
        Self::Ffmpeg {
            message: message.into(),
        }
    }

    pub fn analysis<T: Into<String>>(message: T) -> Self {
        Self::Analysis {
            message: message.into(),
        }
    }

    pub fn unknown_strategy<T: Into<String>>(name: T, valid: &[&str]) -> Self {
        Self::UnknownStrategy {
            name: name.into(),
            valid: valid.join(", "),
        }
    }

    pub fn invalid_weights<T: Into<String>>(message: T) -> Self {
        Self::InvalidWeights {
            message: message.into(),
        }
    }

    pub fn scene<T: Into<String>>(message: T) -> Self {
        Self::Scene {
            message: message.into(),
        }
    }

    pub fn selection<T: Into<String>>(message: T) -> Self {
        Self::Selection {
            message: message.into(),
        }
    }

    pub fn parse<T: Into<String>>(message: T) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
