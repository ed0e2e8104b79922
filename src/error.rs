use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load detection model `{model_id}`: {message}")]
    ModelLoad { model_id: String, message: String },

    #[error("detection failed: {0}")]
    Detection(String),

    #[error("frame unavailable: {0}")]
    Frame(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
