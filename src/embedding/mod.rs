//! Image embedding: the backbone seam and the ordered extractor.
//!
//! - [`Backbone`]: black-box image → vector model, loaded once per run
//! - [`Family`]: supported architectures and their output widths
//! - [`VectorExtractor`]: order-preserving, per-image or all-or-nothing extraction
//! - [`Synthetic`]: thumbnail descriptor for dry runs and tests
//! - `Onnx`: pretrained network via ONNX Runtime (feature `onnx`)
mod backbone;
mod extractor;
mod family;
#[cfg(feature = "onnx")]
mod onnx;

pub use backbone::*;
pub use extractor::*;
pub use family::*;
#[cfg(feature = "onnx")]
pub use onnx::*;
