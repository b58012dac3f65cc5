//! Animal image classifier.
//!
//! Wraps the pretrained ONNX model behind a single inference path:
//! decode -> resize -> normalize -> forward pass -> softmax -> argmax ->
//! bilingual label lookup. The classifier is read-only after construction
//! and is shared across requests.

use crate::core::{ClassifyError, OrtInfer, Tensor4D};
use crate::labels::{self, NUM_CLASSES};
use crate::processors::{NormalizeImage, argmax, softmax};
use crate::utils::decode_image;
use image::{RgbImage, imageops::FilterType};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration for the animal classifier.
#[derive(Debug, Clone)]
pub struct AnimalClassifierConfig {
    /// Path to the ONNX model artifact
    pub model_path: PathBuf,
    /// Name used in logs and error messages
    pub model_name: String,
    /// Name of the model's input tensor
    pub input_name: Option<String>,
    /// Input shape (height, width)
    pub input_shape: (u32, u32),
    /// Resizing filter to use
    pub resize_filter: FilterType,
    /// Scaling factor applied before normalization (defaults to 1.0 / 255.0)
    pub normalize_scale: f32,
    /// Mean values for normalization (RGB order)
    pub normalize_mean: Vec<f32>,
    /// Standard deviation values for normalization (RGB order)
    pub normalize_std: Vec<f32>,
    /// Number of pooled ONNX Runtime sessions
    pub session_pool_size: usize,
    /// Run a warmup forward pass at build time and assert the output width
    /// matches the label table
    pub warmup: bool,
}

impl Default for AnimalClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("animal_classifier.onnx"),
            model_name: "animal_classifier".to_string(),
            input_name: None,
            input_shape: (224, 224),
            // Bilinear, matching the training-time resize
            resize_filter: FilterType::Triangle,
            normalize_scale: 1.0 / 255.0,
            normalize_mean: vec![0.485, 0.456, 0.406],
            normalize_std: vec![0.229, 0.224, 0.225],
            session_pool_size: 1,
            warmup: true,
        }
    }
}

impl AnimalClassifierConfig {
    /// Validates the configuration.
    ///
    /// The normalization statistics are validated separately when the
    /// normalizer is constructed.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        let (height, width) = self.input_shape;
        if height == 0 || width == 0 {
            return Err(ClassifyError::config_error(format!(
                "input shape must be non-zero, got {height}x{width}"
            )));
        }
        if self.session_pool_size == 0 {
            return Err(ClassifyError::config_error(
                "session pool size must be at least 1",
            ));
        }
        if self.model_name.is_empty() {
            return Err(ClassifyError::config_error("model name must not be empty"));
        }
        Ok(())
    }
}

/// A single classification result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Index of the winning class in the model output
    pub class_id: usize,
    /// Italian label (training dataset order)
    pub class_it: &'static str,
    /// English label
    pub class_en: &'static str,
    /// Maximum softmax probability, in [0, 1]
    pub confidence: f32,
}

/// Anything that can turn uploaded image bytes into a [`Prediction`].
///
/// The HTTP layer depends on this trait rather than on the concrete model,
/// so it can be exercised without a model artifact on disk.
pub trait Classify: Send + Sync {
    /// Classifies an in-memory encoded image.
    fn classify_bytes(&self, bytes: &[u8]) -> Result<Prediction, ClassifyError>;
}

/// Pretrained animal classifier backed by ONNX Runtime.
#[derive(Debug)]
pub struct AnimalClassifier {
    /// ONNX Runtime inference engine
    infer: OrtInfer,
    /// Image normalizer for preprocessing
    normalize: NormalizeImage,
    /// Input shape (height, width)
    input_shape: (u32, u32),
    /// Resizing filter
    resize_filter: FilterType,
}

impl AnimalClassifier {
    /// Creates a new classifier from a validated configuration.
    ///
    /// Loads the model artifact; with `warmup` enabled, also runs one
    /// forward pass on a zero tensor and fails if the model output width
    /// diverges from the label table, so a mismatched artifact is rejected
    /// before the service accepts traffic.
    pub fn new(config: AnimalClassifierConfig) -> Result<Self, ClassifyError> {
        config.validate()?;

        let infer = OrtInfer::with_pool(
            &config.model_path,
            config.input_name.as_deref(),
            Some(&config.model_name),
            config.session_pool_size,
        )?;

        let normalize = NormalizeImage::new(
            Some(config.normalize_scale),
            Some(config.normalize_mean.clone()),
            Some(config.normalize_std.clone()),
            None,
        )?;

        let classifier = Self {
            infer,
            normalize,
            input_shape: config.input_shape,
            resize_filter: config.resize_filter,
        };

        if config.warmup {
            classifier.warmup()?;
        }

        Ok(classifier)
    }

    /// Runs one forward pass on a zero tensor and asserts the output width
    /// matches the label table length.
    fn warmup(&self) -> Result<(), ClassifyError> {
        let (height, width) = self.input_shape;
        let zeros = Tensor4D::zeros((1, 3, height as usize, width as usize));
        let scores = self.infer.infer_2d(&zeros)?;

        let actual = scores.ncols();
        if actual != NUM_CLASSES {
            return Err(ClassifyError::LabelMismatch {
                expected: NUM_CLASSES,
                actual,
            });
        }

        info!(
            model = self.infer.model_name(),
            classes = NUM_CLASSES,
            "model warmed up, output width verified"
        );
        Ok(())
    }

    /// Resizes and normalizes a decoded image into the model input tensor.
    fn preprocess(&self, img: &RgbImage) -> Result<Tensor4D, ClassifyError> {
        let (height, width) = self.input_shape;
        let resized = image::imageops::resize(img, width, height, self.resize_filter);
        self.normalize.normalize_to(&resized)
    }

    /// Classifies an already-decoded RGB image.
    pub fn classify_image(&self, img: &RgbImage) -> Result<Prediction, ClassifyError> {
        let batch = self.preprocess(img)?;
        let scores = self.infer.infer_2d(&batch)?;

        let row: Vec<f32> = scores
            .outer_iter()
            .next()
            .ok_or_else(|| ClassifyError::invalid_input("model returned an empty batch"))?
            .to_vec();
        prediction_from_scores(&row)
    }
}

impl Classify for AnimalClassifier {
    fn classify_bytes(&self, bytes: &[u8]) -> Result<Prediction, ClassifyError> {
        let img = decode_image(bytes)?;
        debug!(
            width = img.width(),
            height = img.height(),
            "decoded uploaded image"
        );
        self.classify_image(&img)
    }
}

/// Maps a raw score vector to a [`Prediction`].
///
/// Applies softmax, selects the maximum probability, and resolves the
/// bilingual label pair. The score width is checked against the label table
/// on every call; a mismatched artifact fails loudly instead of indexing
/// out of range.
pub fn prediction_from_scores(scores: &[f32]) -> Result<Prediction, ClassifyError> {
    if scores.len() != NUM_CLASSES {
        return Err(ClassifyError::LabelMismatch {
            expected: NUM_CLASSES,
            actual: scores.len(),
        });
    }

    let probs = softmax(scores);
    let (class_id, confidence) = argmax(&probs)
        .ok_or_else(|| ClassifyError::invalid_input("empty probability distribution"))?;
    let (class_it, class_en) = labels::label_pair(class_id).ok_or(ClassifyError::LabelMismatch {
        expected: NUM_CLASSES,
        actual: class_id + 1,
    })?;

    Ok(Prediction {
        class_id,
        class_it,
        class_en,
        confidence,
    })
}

/// Builder for the animal classifier.
#[derive(Debug, Default)]
pub struct AnimalClassifierBuilder {
    config: AnimalClassifierConfig,
}

impl AnimalClassifierBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path to the ONNX model artifact.
    pub fn model_path(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.config.model_path = model_path.into();
        self
    }

    /// Sets the model name used in logs and errors.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.config.model_name = model_name.into();
        self
    }

    /// Sets the name of the model's input tensor.
    pub fn input_name(mut self, input_name: impl Into<String>) -> Self {
        self.config.input_name = Some(input_name.into());
        self
    }

    /// Sets the input image shape (height, width).
    pub fn input_shape(mut self, shape: (u32, u32)) -> Self {
        self.config.input_shape = shape;
        self
    }

    /// Sets the resizing filter.
    pub fn resize_filter(mut self, filter: FilterType) -> Self {
        self.config.resize_filter = filter;
        self
    }

    /// Sets custom normalization statistics.
    pub fn normalize_stats(mut self, mean: [f32; 3], std: [f32; 3]) -> Self {
        self.config.normalize_mean = mean.to_vec();
        self.config.normalize_std = std.to_vec();
        self
    }

    /// Sets the session pool size for concurrent predictions.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.config.session_pool_size = size;
        self
    }

    /// Enables or disables the warmup pass at build time.
    pub fn warmup(mut self, warmup: bool) -> Self {
        self.config.warmup = warmup;
        self
    }

    /// Builds the classifier, loading the model from `model_path`.
    pub fn build(self, model_path: &Path) -> Result<AnimalClassifier, ClassifyError> {
        let mut config = self.config;
        config.model_path = model_path.to_path_buf();
        AnimalClassifier::new(config)
    }

    /// Builds the classifier using the model path already set on the builder.
    pub fn build_from_config(self) -> Result<AnimalClassifier, ClassifyError> {
        AnimalClassifier::new(self.config)
    }
}
