//! Типы ошибок конвейера voxmix.

use thiserror::Error;

/// Ошибки, возникающие при сборке ремикса
#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Mux error: {0}")]
    Mux(String),

    #[error("Concatenation error: {0}")]
    Concat(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;
