//! Image normalization for model input.
//!
//! Normalization folds the scale, mean, and standard deviation into a single
//! per-channel affine transform (alpha = scale / std, beta = -mean / std)
//! applied while laying pixels out into the tensor, so each pixel is touched
//! exactly once.

use crate::core::{ClassifyError, Tensor4D};
use image::RgbImage;

/// Channel ordering of the emitted tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Channels-first layout (channels x height x width).
    CHW,
    /// Channels-last layout (height x width x channels).
    HWC,
}

/// Normalizes images into model-ready tensors.
///
/// Encapsulates the scaling factor, per-channel mean and standard deviation,
/// and channel ordering, precomputed into alpha/beta coefficients.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    pub alpha: Vec<f32>,
    /// Offset values for each channel (beta = -mean / std)
    pub beta: Vec<f32>,
    /// Channel ordering of the output tensor
    pub order: ChannelOrder,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean values for each channel (defaults to [0.485, 0.456, 0.406])
    /// * `std` - Optional standard deviation values for each channel (defaults to [0.229, 0.224, 0.225])
    /// * `order` - Optional channel ordering (defaults to CHW)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * Scale is less than or equal to 0
    /// * Mean or std vectors don't have exactly 3 elements
    /// * Any standard deviation value is less than or equal to 0
    pub fn new(
        scale: Option<f32>,
        mean: Option<Vec<f32>>,
        std: Option<Vec<f32>>,
        order: Option<ChannelOrder>,
    ) -> Result<Self, ClassifyError> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or_else(|| vec![0.485, 0.456, 0.406]);
        let std = std.unwrap_or_else(|| vec![0.229, 0.224, 0.225]);
        let order = order.unwrap_or(ChannelOrder::CHW);

        if scale <= 0.0 {
            return Err(ClassifyError::ConfigError {
                message: "Scale must be greater than 0".to_string(),
            });
        }

        if mean.len() != 3 {
            return Err(ClassifyError::ConfigError {
                message: "Mean must have exactly 3 elements for RGB".to_string(),
            });
        }

        if std.len() != 3 {
            return Err(ClassifyError::ConfigError {
                message: "Std must have exactly 3 elements for RGB".to_string(),
            });
        }

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ClassifyError::ConfigError {
                    message: format!(
                        "Standard deviation at index {i} must be greater than 0, got {s}"
                    ),
                });
            }
        }

        let alpha: Vec<f32> = std.iter().map(|s| scale / s).collect();
        let beta: Vec<f32> = mean.iter().zip(&std).map(|(m, s)| -m / s).collect();

        Ok(Self { alpha, beta, order })
    }

    /// Identity normalization: only the 1/255 scaling, no mean/std centering.
    ///
    /// Matches models trained on raw [0,1] pixel values.
    pub fn scale_only() -> Result<Self, ClassifyError> {
        Self::new(
            None,
            Some(vec![0.0, 0.0, 0.0]),
            Some(vec![1.0, 1.0, 1.0]),
            None,
        )
    }

    /// Normalizes a single image into a 4D tensor with a leading batch
    /// dimension of 1.
    pub fn normalize_to(&self, img: &RgbImage) -> Result<Tensor4D, ClassifyError> {
        let (width, height) = img.dimensions();
        let channels = 3u32;

        match self.order {
            ChannelOrder::CHW => {
                let mut result = vec![0.0f32; (channels * height * width) as usize];

                for c in 0..channels {
                    for y in 0..height {
                        for x in 0..width {
                            let pixel = img.get_pixel(x, y);
                            let channel_value = pixel[c as usize] as f32;
                            let dst_idx = (c * height * width + y * width + x) as usize;

                            result[dst_idx] =
                                channel_value * self.alpha[c as usize] + self.beta[c as usize];
                        }
                    }
                }

                Tensor4D::from_shape_vec(
                    (1, channels as usize, height as usize, width as usize),
                    result,
                )
                .map_err(|e| {
                    ClassifyError::normalization(
                        &format!("failed to create CHW tensor for {width}x{height} image"),
                        e,
                    )
                })
            }
            ChannelOrder::HWC => {
                let mut result = vec![0.0f32; (height * width * channels) as usize];

                for y in 0..height {
                    for x in 0..width {
                        let pixel = img.get_pixel(x, y);
                        for c in 0..channels {
                            let channel_value = pixel[c as usize] as f32;
                            let dst_idx = (y * width * channels + x * channels + c) as usize;

                            result[dst_idx] =
                                channel_value * self.alpha[c as usize] + self.beta[c as usize];
                        }
                    }
                }

                Tensor4D::from_shape_vec(
                    (1, height as usize, width as usize, channels as usize),
                    result,
                )
                .map_err(|e| {
                    ClassifyError::normalization(
                        &format!("failed to create HWC tensor for {width}x{height} image"),
                        e,
                    )
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rejects_invalid_config() {
        assert!(NormalizeImage::new(Some(0.0), None, None, None).is_err());
        assert!(NormalizeImage::new(None, Some(vec![0.5, 0.5]), None, None).is_err());
        assert!(NormalizeImage::new(None, None, Some(vec![0.2, 0.0, 0.2]), None).is_err());
    }

    #[test]
    fn test_chw_layout_and_batch_dim() {
        let norm = NormalizeImage::new(None, None, None, None).unwrap();
        let img = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));

        let tensor = norm.normalize_to(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 2, 4]);
    }

    #[test]
    fn test_affine_matches_mean_std_formula() {
        let mean = vec![0.485, 0.456, 0.406];
        let std = vec![0.229, 0.224, 0.225];
        let norm =
            NormalizeImage::new(None, Some(mean.clone()), Some(std.clone()), None).unwrap();
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 128, 0]));

        let tensor = norm.normalize_to(&img).unwrap();
        for c in 0..3 {
            let v = img.get_pixel(0, 0)[c] as f32 / 255.0;
            let expected = (v - mean[c]) / std[c];
            let got = tensor[[0, c, 0, 0]];
            assert!(
                (got - expected).abs() < 1e-5,
                "channel {c}: expected {expected}, got {got}"
            );
        }
    }

    #[test]
    fn test_scale_only_leaves_values_in_unit_range() {
        let norm = NormalizeImage::scale_only().unwrap();
        let img = RgbImage::from_pixel(2, 2, Rgb([255, 0, 51]));

        let tensor = norm.normalize_to(&img).unwrap();
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 1, 0, 0]].abs() < 1e-6);
        assert!((tensor[[0, 2, 0, 0]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_hwc_layout() {
        let norm = NormalizeImage::new(
            None,
            Some(vec![0.0, 0.0, 0.0]),
            Some(vec![1.0, 1.0, 1.0]),
            Some(ChannelOrder::HWC),
        )
        .unwrap();
        let img = RgbImage::from_pixel(3, 2, Rgb([255, 255, 255]));

        let tensor = norm.normalize_to(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 2, 3, 3]);
        assert!((tensor[[0, 1, 2, 1]] - 1.0).abs() < 1e-6);
    }
}
