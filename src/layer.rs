//! Neural network layers.
//!
//! The layer set is closed: every supported computation is one variant of
//! [`Layer`], and the variant tag maps one-to-one onto the 1-byte layer type
//! in the binary model format. Layers are constructed once, immutable
//! thereafter, and owned by a [`crate::model::Model`].

use crate::error::{MininnError, Result};
use crate::ops;
use crate::tensor::Tensor;

/// Wire tag identifying a layer kind, shared with the model format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    /// Affine transform with learned weights and bias
    Linear,
    /// Rectified linear unit
    ReLU,
    /// Logistic sigmoid
    Sigmoid,
    /// Flat softmax
    Softmax,
}

impl LayerType {
    /// Wire tag used by the binary model format.
    #[must_use]
    pub fn to_tag(self) -> u8 {
        match self {
            LayerType::Linear => 0,
            LayerType::ReLU => 1,
            LayerType::Sigmoid => 2,
            LayerType::Softmax => 3,
        }
    }

    /// Decode a wire tag.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLayerType` for unrecognized tags.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(LayerType::Linear),
            1 => Ok(LayerType::ReLU),
            2 => Ok(LayerType::Sigmoid),
            3 => Ok(LayerType::Softmax),
            _ => Err(MininnError::UnknownLayerType { tag }),
        }
    }

    /// Layer type name for error messages and debugging.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            LayerType::Linear => "Linear",
            LayerType::ReLU => "ReLU",
            LayerType::Sigmoid => "Sigmoid",
            LayerType::Softmax => "Softmax",
        }
    }
}

/// Fully connected (affine) layer: output = input x weights + bias.
///
/// # Shape
///
/// - weights: `[in_features, out_features]`
/// - bias: `[out_features]`
/// - input: `[in_features]` or `[batch, in_features]`; the output rank
///   mirrors the input rank.
#[derive(Debug, Clone)]
pub struct LinearLayer {
    weights: Tensor,
    bias: Tensor,
}

impl LinearLayer {
    /// Create a linear layer from its parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRank` unless the weights are rank 2 and the bias is
    /// rank 1, and `DimensionMismatch` when the weight output dimension
    /// differs from the bias length.
    pub fn new(weights: Tensor, bias: Tensor) -> Result<Self> {
        if weights.rank() != 2 {
            return Err(MininnError::InvalidRank {
                expected: "2".to_string(),
                actual: weights.rank(),
            });
        }
        if bias.rank() != 1 {
            return Err(MininnError::InvalidRank {
                expected: "1".to_string(),
                actual: bias.rank(),
            });
        }
        if weights.shape()[1] != bias.shape()[0] {
            return Err(MininnError::dimension_mismatch(
                "Weight output dimension must match bias dimension",
                weights.shape()[1],
                bias.shape()[0],
            ));
        }
        Ok(Self { weights, bias })
    }

    /// Number of input features.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.weights.shape()[0]
    }

    /// Number of output features.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Weight matrix, shape `[in_features, out_features]`.
    #[must_use]
    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    /// Bias vector, shape `[out_features]`.
    #[must_use]
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        match input.rank() {
            1 => {
                if input.shape()[0] != self.in_features() {
                    return Err(MininnError::dimension_mismatch(
                        "Input features must match weight input dimension",
                        self.in_features(),
                        input.shape()[0],
                    ));
                }
                // Promote to a one-row batch, multiply, then demote and
                // add the bias element-wise.
                let mut promoted = input.clone();
                promoted.reshape(&[1, input.shape()[0]])?;
                let mut output = ops::matmul(&promoted, &self.weights)?;
                output.reshape(&[self.out_features()])?;
                output.add_assign(&self.bias)?;
                Ok(output)
            }
            2 => {
                if input.shape()[1] != self.in_features() {
                    return Err(MininnError::dimension_mismatch(
                        "Input features must match weight input dimension",
                        self.in_features(),
                        input.shape()[1],
                    ));
                }
                let mut output = ops::matmul(input, &self.weights)?;
                let (batch, features) = (output.shape()[0], output.shape()[1]);
                let bias = self.bias.data();
                let out = output.data_mut();
                for row in 0..batch {
                    for col in 0..features {
                        out[row * features + col] += bias[col];
                    }
                }
                Ok(output)
            }
            actual => Err(MininnError::InvalidRank {
                expected: "1 or 2".to_string(),
                actual,
            }),
        }
    }
}

/// One computation stage of a model.
///
/// # Examples
///
/// ```
/// use mininn::{layer::Layer, tensor::Tensor};
///
/// let weights = Tensor::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let bias = Tensor::from_vec(&[3], vec![0.1, 0.2, 0.3]).unwrap();
/// let layer = Layer::linear(weights, bias).unwrap();
///
/// let input = Tensor::from_vec(&[2], vec![1.0, 2.0]).unwrap();
/// let output = layer.forward(&input).unwrap();
/// assert_eq!(output.shape(), &[3]);
/// ```
#[derive(Debug, Clone)]
pub enum Layer {
    /// Affine transform with owned parameters
    Linear(LinearLayer),
    /// Stateless ReLU activation
    ReLU,
    /// Stateless sigmoid activation
    Sigmoid,
    /// Stateless softmax activation
    Softmax,
}

impl Layer {
    /// Create a linear layer, validating the weight/bias contract.
    ///
    /// # Errors
    ///
    /// See [`LinearLayer::new`].
    pub fn linear(weights: Tensor, bias: Tensor) -> Result<Self> {
        Ok(Layer::Linear(LinearLayer::new(weights, bias)?))
    }

    /// The wire tag for this layer.
    #[must_use]
    pub fn layer_type(&self) -> LayerType {
        match self {
            Layer::Linear(_) => LayerType::Linear,
            Layer::ReLU => LayerType::ReLU,
            Layer::Sigmoid => LayerType::Sigmoid,
            Layer::Softmax => LayerType::Softmax,
        }
    }

    /// Run the layer's forward transform on one input tensor.
    ///
    /// Activations copy the input and apply their kernel in place; the
    /// linear layer produces a fresh output of mirrored rank.
    ///
    /// # Errors
    ///
    /// Propagates the underlying kernel or shape errors; see
    /// [`LinearLayer::new`] and [`crate::ops`].
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        match self {
            Layer::Linear(linear) => linear.forward(input),
            Layer::ReLU => {
                let mut output = input.clone();
                ops::relu(&mut output);
                Ok(output)
            }
            Layer::Sigmoid => {
                let mut output = input.clone();
                ops::sigmoid(&mut output);
                Ok(output)
            }
            Layer::Softmax => {
                let mut output = input.clone();
                ops::softmax(&mut output)?;
                Ok(output)
            }
        }
    }

    /// Number of learned parameters (zero for the stateless activations).
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        match self {
            Layer::Linear(linear) => linear.weights.size() + linear.bias.size(),
            _ => 0,
        }
    }
}
