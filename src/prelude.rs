//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use mininn::prelude::*;
//! ```

pub use crate::engine::{InferenceEngine, InferenceStats};
pub use crate::error::{MininnError, Result};
pub use crate::format::{is_model_file, load_model, save_model};
pub use crate::layer::{Layer, LayerType, LinearLayer};
pub use crate::model::Model;
pub use crate::tensor::{DataType, Tensor};
pub use crate::utils::{argmax, normalize, top_k};
