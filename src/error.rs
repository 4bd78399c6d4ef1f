//! Error types for the application

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::decode::BandRole;

/// Recoverable scan and decode failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Frame too small: a {fraction} strip of {height} rows is empty")]
    InsufficientResolution { height: u32, fraction: f64 },

    #[error("Band fraction must be in (0, 1], got {0}")]
    InvalidBandFraction(f64),

    #[error("Need at least 3 bands, found {found}")]
    InsufficientBands { found: usize },

    #[error("Band {position} ({color}) has no {role} value")]
    AmbiguousBand {
        position: usize,
        role: BandRole,
        color: String,
    },

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Resistance out of encodable range: {0}")]
    ValueOutOfRange(f64),
}

impl ScanError {
    /// Stable identifier for API consumers
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::InsufficientResolution { .. } => "insufficient_resolution",
            ScanError::InvalidBandFraction(_) => "invalid_band_fraction",
            ScanError::InsufficientBands { .. } => "insufficient_bands",
            ScanError::AmbiguousBand { .. } => "ambiguous_band",
            ScanError::UnknownColor(_) => "unknown_color",
            ScanError::ValueOutOfRange(_) => "value_out_of_range",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            AppError::Scan(ScanError::InvalidBandFraction(_))
            | AppError::Scan(ScanError::UnknownColor(_))
            | AppError::Scan(ScanError::ValueOutOfRange(_)) => StatusCode::BAD_REQUEST,
            AppError::Scan(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ImageProcessing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalApi(_) | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
        };

        (status, self.to_string()).into_response()
    }
}
