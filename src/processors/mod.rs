//! Image and score processors for the inference pipeline.

pub mod normalize;
pub mod postprocess;

pub use normalize::{ChannelOrder, NormalizeImage};
pub use postprocess::{argmax, softmax};
