use thiserror::Error;

/// Detailed error types for the LLM integration
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned an empty completion")]
    EmptyCompletion,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type LlmResult<T> = Result<T, LlmError>;
