//! Inference engine: validated, profiled forward passes over a model.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{MininnError, Result};
use crate::format;
use crate::model::Model;
use crate::tensor::{DataType, Tensor};

/// Profiling information for the most recent prediction.
///
/// Reset at the start of every `predict` call while profiling is enabled;
/// left at its zero value otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceStats {
    /// Wall-clock duration of the whole forward pass
    pub total_time: Duration,
    /// Per-layer durations, in execution order
    pub layer_times: Vec<Duration>,
    /// Estimated memory footprint: parameter storage plus any retained
    /// intermediate buffers
    pub memory_usage_bytes: usize,
}

/// Executes forward passes over an owned [`Model`].
///
/// The engine validates inputs against the model's declared input shape,
/// runs the layers strictly in order, validates the final shape, and
/// optionally collects [`InferenceStats`]. The model's parameters are never
/// mutated after construction; per-call state (stats, buffers) lives in the
/// engine, so concurrent inference wants one engine per caller.
///
/// # Examples
///
/// ```
/// use mininn::prelude::*;
///
/// let weights = Tensor::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
/// let bias = Tensor::from_vec(&[3], vec![0.1, 0.2, 0.3])?;
///
/// let mut model = Model::new();
/// model.add_layer(Layer::linear(weights, bias)?);
/// model.add_layer(Layer::ReLU);
/// model.set_input_shape(vec![2]);
/// model.set_output_shape(vec![3]);
///
/// let mut engine = InferenceEngine::new(model)?;
/// let input = Tensor::from_vec(&[2], vec![1.0, 2.0])?;
/// let output = engine.predict(&input)?;
/// assert_eq!(output.shape(), &[3]);
/// # Ok::<(), mininn::MininnError>(())
/// ```
pub struct InferenceEngine {
    model: Model,
    profiling_enabled: bool,
    last_stats: InferenceStats,
    intermediate_buffers: Vec<Tensor>,
    buffers_allocated: bool,
}

impl InferenceEngine {
    /// Wrap a model, validating that it is runnable.
    ///
    /// # Errors
    ///
    /// Returns `EmptyModel` for a model with no layers and
    /// `UndeclaredShapes` when either declared shape is missing.
    pub fn new(model: Model) -> Result<Self> {
        if model.is_empty() {
            return Err(MininnError::EmptyModel);
        }
        if model.input_shape().is_empty() || model.output_shape().is_empty() {
            return Err(MininnError::UndeclaredShapes);
        }
        Ok(Self {
            model,
            profiling_enabled: false,
            last_stats: InferenceStats::default(),
            intermediate_buffers: Vec::new(),
            buffers_allocated: false,
        })
    }

    /// Load a model file and wrap it in an engine.
    ///
    /// # Errors
    ///
    /// Propagates [`format::load_model`] failures and the validation in
    /// [`InferenceEngine::new`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model = format::load_model(path)?;
        Self::new(model)
    }

    /// Run a forward pass over one input tensor.
    ///
    /// The caller's tensor is never mutated; the first layer receives a
    /// copy. Layers execute strictly in order, each output feeding the next
    /// layer's input.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the input disagrees with the declared
    /// input shape, `UnsupportedDType` for non-FLOAT32 input,
    /// `LayerExecution` wrapping the failing layer's position and type, and
    /// `OutputShapeMismatch` when the final tensor disagrees with the
    /// declared output shape.
    pub fn predict(&mut self, input: &Tensor) -> Result<Tensor> {
        let start = Instant::now();

        if self.profiling_enabled {
            self.last_stats = InferenceStats {
                layer_times: vec![Duration::ZERO; self.model.num_layers()],
                ..InferenceStats::default()
            };
        }

        self.validate_input(input)?;

        let mut current = input.clone();
        for (index, layer) in self.model.layers().iter().enumerate() {
            let layer_start = Instant::now();
            let next = layer
                .forward(&current)
                .map_err(|source| MininnError::LayerExecution {
                    index,
                    layer_type: layer.layer_type().name().to_string(),
                    source: Box::new(source),
                })?;
            if self.profiling_enabled {
                self.last_stats.layer_times[index] = layer_start.elapsed();
            }
            current = next;
        }

        if current.shape() != self.model.output_shape() {
            return Err(MininnError::output_shape_mismatch(
                self.model.output_shape(),
                current.shape(),
            ));
        }

        if self.profiling_enabled {
            self.last_stats.total_time = start.elapsed();
            self.last_stats.memory_usage_bytes = self.estimate_memory_usage();
        }

        Ok(current)
    }

    /// Run `predict` over every input in order.
    ///
    /// Items are processed independently, one at a time; the first failing
    /// item aborts the whole call.
    ///
    /// # Errors
    ///
    /// Returns `EmptyBatch` for an empty input slice, otherwise whatever
    /// [`InferenceEngine::predict`] returns for the failing item.
    pub fn predict_batch(&mut self, inputs: &[Tensor]) -> Result<Vec<Tensor>> {
        if inputs.is_empty() {
            return Err(MininnError::EmptyBatch);
        }
        let mut outputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            outputs.push(self.predict(input)?);
        }
        Ok(outputs)
    }

    /// Toggle collection of [`InferenceStats`].
    pub fn enable_profiling(&mut self, enable: bool) {
        self.profiling_enabled = enable;
    }

    /// Stats from the most recent profiled prediction.
    #[must_use]
    pub fn last_stats(&self) -> &InferenceStats {
        &self.last_stats
    }

    /// Declared input shape of the wrapped model.
    #[must_use]
    pub fn input_shape(&self) -> &[usize] {
        self.model.input_shape()
    }

    /// Declared output shape of the wrapped model.
    #[must_use]
    pub fn output_shape(&self) -> &[usize] {
        self.model.output_shape()
    }

    /// Number of layers in the wrapped model.
    #[must_use]
    pub fn num_layers(&self) -> usize {
        self.model.num_layers()
    }

    /// Advisory hook: reserve room for intermediate results.
    ///
    /// Has no effect on computed results and is safe to call repeatedly.
    pub fn preallocate_buffers(&mut self) {
        if self.buffers_allocated {
            return;
        }
        self.intermediate_buffers.clear();
        self.intermediate_buffers.reserve(self.model.num_layers());
        self.buffers_allocated = true;
    }

    /// Advisory hook: release any retained intermediate buffers.
    ///
    /// Safe to call at any time, including with nothing to release.
    pub fn clear_buffers(&mut self) {
        self.intermediate_buffers.clear();
        self.intermediate_buffers.shrink_to_fit();
        self.buffers_allocated = false;
    }

    fn validate_input(&self, input: &Tensor) -> Result<()> {
        let expected = self.model.input_shape();
        if input.shape() != expected {
            return Err(MininnError::shape_mismatch(expected, input.shape()));
        }
        if input.dtype() != DataType::Float32 {
            return Err(MininnError::UnsupportedDType {
                dtype: input.dtype().name().to_string(),
            });
        }
        Ok(())
    }

    fn estimate_memory_usage(&self) -> usize {
        let retained: usize = self
            .intermediate_buffers
            .iter()
            .map(|t| t.size() * std::mem::size_of::<f32>())
            .sum();
        self.model.parameter_bytes() + retained
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("model", &self.model)
            .field("profiling_enabled", &self.profiling_enabled)
            .finish_non_exhaustive()
    }
}
