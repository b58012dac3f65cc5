//! Utility functions shared across the service.

pub mod image;

pub use image::decode_image;
