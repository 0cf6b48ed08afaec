//! Model container: an ordered sequence of layers plus declared shapes.

use crate::layer::Layer;

/// A feed-forward model: layers in execution order, with the input and
/// output shapes the file format (or the builder) declared for it.
///
/// The model is a pure data container; shape compatibility across layers is
/// only discovered when an engine runs the forward pass. Models own large
/// parameter buffers and are move-only.
///
/// # Examples
///
/// ```
/// use mininn::{layer::Layer, model::Model};
///
/// let mut model = Model::new();
/// model.add_layer(Layer::ReLU);
/// model.set_input_shape(vec![4]);
/// model.set_output_shape(vec![4]);
/// assert_eq!(model.num_layers(), 1);
/// ```
#[derive(Default)]
pub struct Model {
    layers: Vec<Layer>,
    input_shape: Vec<usize>,
    output_shape: Vec<usize>,
}

impl Model {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer; insertion order is execution order.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Layers in execution order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    #[must_use]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// True when the model holds no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Declare the expected input shape. Not validated against the layers.
    pub fn set_input_shape(&mut self, shape: Vec<usize>) {
        self.input_shape = shape;
    }

    /// Declare the expected output shape. Not validated against the layers.
    pub fn set_output_shape(&mut self, shape: Vec<usize>) {
        self.output_shape = shape;
    }

    /// Declared input shape (empty when undeclared).
    #[must_use]
    pub fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    /// Declared output shape (empty when undeclared).
    #[must_use]
    pub fn output_shape(&self) -> &[usize] {
        &self.output_shape
    }

    /// Total number of learned parameters across all layers.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Parameter storage in bytes (FLOAT32 = 4 bytes per parameter).
    #[must_use]
    pub fn parameter_bytes(&self) -> usize {
        self.parameter_count() * std::mem::size_of::<f32>()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("num_layers", &self.layers.len())
            .field("input_shape", &self.input_shape)
            .field("output_shape", &self.output_shape)
            .field("parameter_count", &self.parameter_count())
            .finish()
    }
}
