//! Error types for the classification service.
//!
//! This module defines the error enum shared across the inference path,
//! along with helper constructors for building errors with appropriate
//! context and error chaining.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stage of the inference pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during tensor construction or reshaping.
    TensorOperation,
    /// Error occurred during image normalization.
    Normalization,
    /// Error occurred during image resizing.
    Resize,
    /// Error occurred during post-processing.
    PostProcessing,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
        }
    }
}

/// Errors that can occur while loading the model or classifying an image.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The uploaded bytes could not be decoded into an image.
    #[error("image decode")]
    ImageDecode(#[source] image::ImageError),

    /// Error occurred in a preprocessing or postprocessing stage.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of the pipeline where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The model artifact could not be loaded at startup.
    #[error("failed to load model from {}: {context}", path.display())]
    ModelLoad {
        /// Path of the model artifact.
        path: PathBuf,
        /// Additional context about the failure.
        context: String,
        /// The underlying ONNX Runtime error.
        #[source]
        source: ort::Error,
    },

    /// A forward pass through the model failed.
    #[error("inference with model '{model_name}' failed: {context}")]
    Inference {
        /// Name of the model being evaluated.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The model output width does not match the label table.
    #[error("model output width {actual} does not match label table length {expected}")]
    LabelMismatch {
        /// Number of labels the service was built with.
        expected: usize,
        /// Width of the score vector the model produced.
        actual: usize,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl ClassifyError {
    /// Creates a ClassifyError for tensor operations.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::TensorOperation,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifyError for normalization operations.
    pub fn normalization(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Normalization,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifyError for post-processing operations.
    pub fn post_processing(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::PostProcessing,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifyError for a failed model load.
    pub fn model_load(path: &Path, context: &str, source: ort::Error) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            context: context.to_string(),
            source,
        }
    }

    /// Creates a ClassifyError for a failed forward pass.
    pub fn inference(
        model_name: &str,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifyError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a ClassifyError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for ClassifyError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageDecode(error)
    }
}

/// Convenient result alias for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;
