//! Mininn: minimal feed-forward neural network inference in pure Rust.
//!
//! Mininn loads pre-trained feed-forward models from a compact binary
//! format and runs validated, optionally profiled forward passes over them.
//! There is no training, no autodiff, and no accelerator support; the crate
//! is the numeric data-flow engine and nothing else.
//!
//! # Quick Start
//!
//! ```
//! use mininn::prelude::*;
//!
//! // A 2 -> 3 affine layer followed by ReLU.
//! let weights = Tensor::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
//! let bias = Tensor::from_vec(&[3], vec![0.1, 0.2, 0.3])?;
//!
//! let mut model = Model::new();
//! model.add_layer(Layer::linear(weights, bias)?);
//! model.add_layer(Layer::ReLU);
//! model.set_input_shape(vec![2]);
//! model.set_output_shape(vec![3]);
//!
//! let mut engine = InferenceEngine::new(model)?;
//! let input = Tensor::from_vec(&[2], vec![1.0, 2.0])?;
//! let output = engine.predict(&input)?;
//!
//! assert_eq!(output.shape(), &[3]);
//! assert!((output.data()[0] - 9.1).abs() < 1e-5);
//! # Ok::<(), mininn::MininnError>(())
//! ```
//!
//! # Modules
//!
//! - [`tensor`]: the shaped `f32` container and its arithmetic
//! - [`ops`]: stateless kernels (matmul, ReLU, sigmoid, softmax)
//! - [`layer`]: the closed set of layer variants
//! - [`model`]: the ordered layer container with declared shapes
//! - [`format`]: the MINN binary model format (load/save/probe)
//! - [`engine`]: the inference engine with validation and profiling
//! - [`utils`]: normalization, top-k, argmax, image packing
//! - [`error`]: the error taxonomy shared by everything above

pub mod engine;
pub mod error;
pub mod format;
pub mod layer;
pub mod model;
pub mod ops;
pub mod prelude;
pub mod tensor;
pub mod utils;

pub use engine::{InferenceEngine, InferenceStats};
pub use error::{MininnError, Result};
pub use layer::{Layer, LayerType};
pub use model::Model;
pub use tensor::{DataType, Tensor};
