//! ONNX Runtime inference engine for the classification model.
//!
//! The engine owns a small pool of sessions selected round-robin so that
//! concurrent requests serialize on a session lock rather than on the whole
//! process. The model itself is read-only after load.

use crate::core::errors::ClassifyError;
use crate::core::{Tensor2D, Tensor4D};
use ort::logging::LogLevel;
use ort::session::{Session, SessionInputs};
use ort::value::TensorRef;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

const SESSION_CREATION_FAILURE: &str = "failed to create ONNX session";

/// Loads a session with default logging configuration.
pub fn load_session(model_path: impl AsRef<Path>) -> Result<Session, ClassifyError> {
    let path = model_path.as_ref();
    let builder = Session::builder()?;
    let mut builder = builder
        .with_log_level(LogLevel::Error)
        .map_err(ort::Error::<()>::from)?;
    let session = builder
        .commit_from_file(path)
        .map_err(|e| ClassifyError::model_load(path, SESSION_CREATION_FAILURE, e))?;
    Ok(session)
}

/// ONNX Runtime inference engine wrapping a pool of sessions.
pub struct OrtInfer {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    input_name: String,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Creates a new OrtInfer instance with a single session.
    pub fn new(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
    ) -> Result<Self, ClassifyError> {
        Self::with_pool(model_path, input_name, None, 1)
    }

    /// Creates a new OrtInfer instance with `pool_size` sessions over the
    /// same artifact.
    ///
    /// Each session is an independent ONNX Runtime instance; requests pick
    /// one round-robin and hold its lock only for the duration of a forward
    /// pass.
    pub fn with_pool(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
        model_name: Option<&str>,
        pool_size: usize,
    ) -> Result<Self, ClassifyError> {
        if pool_size == 0 {
            return Err(ClassifyError::config_error(
                "session pool size must be at least 1",
            ));
        }

        let path = model_path.as_ref();
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            sessions.push(Mutex::new(load_session(path)?));
        }

        Ok(OrtInfer {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_name: input_name.unwrap_or("input").to_string(),
            model_path: path.to_path_buf(),
            model_name: model_name.unwrap_or("unknown_model").to_string(),
        })
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Runs a forward pass on a 4D image batch and returns the 2D score
    /// matrix (batch_size x num_classes).
    ///
    /// The engine makes no assumption about the semantic meaning of the
    /// scores; interpreting them (softmax, argmax, label lookup) is the
    /// caller's responsibility.
    pub fn infer_2d(&self, batch: &Tensor4D) -> Result<Tensor2D, ClassifyError> {
        let dims: Vec<i64> = batch.shape().iter().map(|&d| d as i64).collect();
        let data = batch.as_slice().ok_or_else(|| ClassifyError::InvalidInput {
            message: "input tensor is not contiguous in memory".to_string(),
        })?;
        let tensor_ref =
            TensorRef::from_array_view((dims, data)).map_err(|e| ClassifyError::InvalidInput {
                message: format!("failed to create input TensorRef: {}", e),
            })?;

        // Acquire session lock (round-robin)
        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session_guard =
            self.sessions[idx]
                .lock()
                .map_err(|_| ClassifyError::InvalidInput {
                    message: format!(
                        "Model '{}': Failed to acquire session lock for session {}/{}",
                        self.model_name,
                        idx,
                        self.sessions.len()
                    ),
                })?;

        // Collect declared output names before running
        let output_names: Vec<String> = session_guard
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();

        let inputs: SessionInputs<'_, '_, 0> = SessionInputs::ValueMap(vec![(
            Cow::Borrowed(self.input_name.as_str()),
            tensor_ref.into(),
        )]);
        let outputs = session_guard.run(inputs).map_err(|e| {
            ClassifyError::inference(
                &self.model_name,
                format!(
                    "forward pass failed for input '{}' with shape {:?}",
                    self.input_name,
                    batch.shape()
                ),
                e,
            )
        })?;

        let first_output = output_names
            .first()
            .ok_or_else(|| ClassifyError::InvalidInput {
                message: format!("Model '{}' declares no outputs", self.model_name),
            })?;
        let value = &outputs[first_output.as_str()];
        let (shape, data) =
            value
                .try_extract_tensor::<f32>()
                .map_err(|e| ClassifyError::InvalidInput {
                    message: format!(
                        "Model '{}': output '{}' is not an f32 tensor: {}",
                        self.model_name, first_output, e
                    ),
                })?;

        if shape.len() != 2 {
            return Err(ClassifyError::InvalidInput {
                message: format!(
                    "Model '{}': expected 2D output, got {}D with shape {:?}",
                    self.model_name,
                    shape.len(),
                    shape
                ),
            });
        }

        let rows = shape[0] as usize;
        let cols = shape[1] as usize;
        Tensor2D::from_shape_vec((rows, cols), data.to_vec()).map_err(ClassifyError::Tensor)
    }
}
