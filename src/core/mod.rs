//! Core building blocks of the classification service.
//!
//! This module contains the error types, tensor aliases, and the ONNX
//! Runtime inference engine, plus the tracing initialization used by the
//! server binary.

pub mod errors;
pub mod inference;

pub use errors::{ClassifyError, ClassifyResult, ProcessingStage};
pub use inference::{OrtInfer, load_session};

/// 2D tensor of f32 values (rows x columns).
pub type Tensor2D = ndarray::Array2<f32>;

/// 4D tensor of f32 values (batch x channels x height x width).
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
