use thiserror::Error;

pub type Result<T> = std::result::Result<T, AiParseError>;

#[derive(Error, Debug)]
pub enum AiParseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to read image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("No players given")]
    NoPlayers,

    #[error("Image is empty")]
    EmptyImage,

    #[error("Could not determine file type")]
    UnknownFileType,

    #[error("No response from AI")]
    NoResponse,

    #[error("Model response is not a JSON object")]
    NotAnObject,

    #[error("Invalid score for {player}: {value}")]
    InvalidScore { player: String, value: String },
}

impl AiParseError {
    /// Errors caused by the caller's input rather than the model.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, AiParseError::NoPlayers | AiParseError::EmptyImage)
    }
}
