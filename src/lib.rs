//! # Animal Classifier
//!
//! An HTTP service that classifies animal photos with a pretrained ONNX
//! model. A client uploads an image to `POST /predict`; the service decodes
//! it, applies the training-time preprocessing (resize to 224x224, scale to
//! [0,1], per-channel mean/std normalization), runs a forward pass, and
//! returns the winning class in Italian and English together with the
//! softmax confidence.
//!
//! ## Modules
//!
//! * [`core`] - Error types, tensor aliases, and the ONNX Runtime engine
//! * [`processors`] - Image normalization and score post-processing
//! * [`classifier`] - The classifier, its configuration, and builder
//! * [`labels`] - The fixed bilingual label table
//! * [`server`] - Axum router, CORS policy, and request handlers
//! * [`utils`] - Image decoding helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use animal_classifier::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), ClassifyError> {
//! let classifier = AnimalClassifierBuilder::new()
//!     .model_name("animal_classifier")
//!     .build(Path::new("animal_classifier.onnx"))?;
//!
//! let bytes = std::fs::read("cat.jpg")?;
//! let prediction = classifier.classify_bytes(&bytes)?;
//! println!("{} / {} ({:.3})", prediction.class_it, prediction.class_en, prediction.confidence);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod core;
pub mod labels;
pub mod processors;
pub mod server;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::classifier::{
        AnimalClassifier, AnimalClassifierBuilder, AnimalClassifierConfig, Classify, Prediction,
    };
    pub use crate::core::{ClassifyError, ClassifyResult};
    pub use crate::labels::{CLASS_LABELS_EN, CLASS_LABELS_IT, NUM_CLASSES};
    pub use crate::server::{ServerConfig, build_app, serve};
}
