//! Error type shared by the matching core and the exporters.

use thiserror::Error;

/// Errors raised while loading traffic data, matching it onto the graph or
/// writing an export.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required column is absent from the input dataset.
    #[error("missing field: {field}")]
    MissingField { field: String },

    /// The dataset or the graph has nothing to work with.
    #[error("no data: {0}")]
    NoData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl PipelineError {
    pub fn missing_field(field: &str) -> Self {
        PipelineError::MissingField {
            field: field.to_string(),
        }
    }
}

/// Alias for `Result<T, PipelineError>`.
pub type PipelineResult<T> = Result<T, PipelineError>;
