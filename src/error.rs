use std::path::PathBuf;
use thiserror::Error;

/// Result type alias used throughout the annotator.
pub type Result<T> = std::result::Result<T, AnnotatorError>;

/// Everything that can stop a batch run.
#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("{0} not found: {1:?}")]
    PathNotFound(&'static str, PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to create bounding box: {0}")]
    InvalidBox(String),

    #[error("Unexpected model output: {0}")]
    ModelOutput(String),

    #[error("Failed to read image {path:?}: {source}")]
    ImageRead {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}
