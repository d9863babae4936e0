use thiserror::Error;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Protobuf parsing error: {0}")]
    ProtobufError(#[from] prost::DecodeError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Tensor shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    #[error("Invalid network config: {0}")]
    InvalidConfig(String),

    #[error("Invalid graph structure: {0}")]
    InvalidGraph(String),

    #[error("No layer spec for node: {0}")]
    MissingSpec(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Parameter not found: {0}")]
    MissingParameter(String),

    #[error("Malformed parameter {0}: {1}")]
    InvalidParameter(String, String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Unsupported activation: {0}")]
    UnsupportedActivation(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Failed to load model from {0}: {1}")]
    ModelLoadError(PathBuf, String),

    #[error("Logger initialization failed: {0}")]
    LoggerError(String),
}
