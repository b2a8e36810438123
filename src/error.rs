use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Errors raised by the color summarizer itself

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Image has no pixels")]
    InvalidImage,
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Summarize(#[from] SummarizeError),
    #[error("No file uploaded")]
    MissingUpload,
    #[error("Malformed upload: {message}")]
    Multipart { status: StatusCode, message: String },
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
    #[error("Failed to bind to port {1}: {0}")]
    Bind(std::io::Error, u16),
    #[error("Background task failed: {0}")]
    Task(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Summarize(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MissingUpload => StatusCode::BAD_REQUEST,
            AppError::Multipart { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        AppError::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Task(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
