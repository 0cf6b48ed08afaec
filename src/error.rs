//! Error types for mininn operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for mininn operations.
///
/// Provides detailed context about failures including shape and dimension
/// mismatches, malformed model files, and layer execution errors.
///
/// # Examples
///
/// ```
/// use mininn::error::MininnError;
///
/// let err = MininnError::shape_mismatch(&[2, 3], &[3, 2]);
/// assert!(err.to_string().contains("[2, 3]"));
/// assert!(err.to_string().contains("[3, 2]"));
/// ```
#[derive(Debug)]
pub enum MininnError {
    /// Tensor shape is structurally invalid (empty, or has a zero dimension).
    InvalidShape {
        /// Description of the violation
        message: String,
    },

    /// Supplied data length does not match the number of elements the shape requires.
    SizeMismatch {
        /// Element count required by the shape
        expected: usize,
        /// Element count actually supplied
        actual: usize,
    },

    /// Multi-index component exceeds the corresponding dimension.
    OutOfRange {
        /// Dimension the index was applied to
        axis: usize,
        /// Offending index value
        index: usize,
        /// Size of that dimension
        bound: usize,
    },

    /// Two tensors were expected to have identical shapes.
    ShapeMismatch {
        /// Expected shape description
        expected: String,
        /// Actual shape found
        actual: String,
    },

    /// Element-wise division hit a zero divisor.
    DivisionByZero,

    /// Two dimensions that must agree (e.g. matmul inner dimensions) differ.
    DimensionMismatch {
        /// What was being matched
        context: String,
        /// Dimension required
        expected: usize,
        /// Dimension found
        actual: usize,
    },

    /// Tensor rank is outside what the operation accepts.
    InvalidRank {
        /// Acceptable rank(s), e.g. "2" or "1 or 2"
        expected: String,
        /// Rank found
        actual: usize,
    },

    /// Operation received an empty input.
    EmptyInput {
        /// What was empty
        context: String,
    },

    /// Batch prediction was called with no inputs.
    EmptyBatch,

    /// Model contains no layers.
    EmptyModel,

    /// Model has no declared input or output shape.
    UndeclaredShapes,

    /// Tensor data type is not supported for computation.
    UnsupportedDType {
        /// Data type tag found
        dtype: String,
    },

    /// Model file is structurally invalid (bad magic, bad counts, bad ranks).
    FormatError {
        /// Error description
        message: String,
    },

    /// Model file major version is not supported.
    UnsupportedVersion {
        /// Version found in the file
        found: (u16, u16),
        /// Version this library supports
        supported: (u16, u16),
    },

    /// Layer type tag in the model file is not recognized.
    UnknownLayerType {
        /// Raw tag byte
        tag: u8,
    },

    /// Model file ended before a complete record could be read.
    TruncatedFile {
        /// What was being read when the file ran out
        context: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// A layer failed during the forward pass.
    LayerExecution {
        /// Position of the failing layer in execution order
        index: usize,
        /// Layer type name
        layer_type: String,
        /// Underlying failure
        source: Box<MininnError>,
    },

    /// Final tensor shape differs from the model's declared output shape.
    OutputShapeMismatch {
        /// Declared output shape
        expected: String,
        /// Shape actually produced
        actual: String,
    },

    /// Model load failed; wraps the underlying cause with the file path.
    LoadError {
        /// Path of the model file
        path: String,
        /// Underlying failure
        source: Box<MininnError>,
    },

    /// Model save failed; wraps the underlying cause with the file path.
    SaveError {
        /// Path of the model file
        path: String,
        /// Underlying failure
        source: Box<MininnError>,
    },
}

impl fmt::Display for MininnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MininnError::InvalidShape { message } => {
                write!(f, "Invalid tensor shape: {message}")
            }
            MininnError::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Data size mismatch: shape requires {expected} elements, got {actual}"
                )
            }
            MininnError::OutOfRange { axis, index, bound } => {
                write!(
                    f,
                    "Index {index} out of range for dimension {axis} (size {bound})"
                )
            }
            MininnError::ShapeMismatch { expected, actual } => {
                write!(f, "Tensor shape mismatch: expected {expected}, got {actual}")
            }
            MininnError::DivisionByZero => {
                write!(f, "Element-wise division by zero")
            }
            MininnError::DimensionMismatch {
                context,
                expected,
                actual,
            } => {
                write!(f, "{context}: expected {expected}, got {actual}")
            }
            MininnError::InvalidRank { expected, actual } => {
                write!(f, "Invalid tensor rank: expected {expected}, got {actual}")
            }
            MininnError::EmptyInput { context } => {
                write!(f, "Empty input: {context}")
            }
            MininnError::EmptyBatch => {
                write!(f, "Cannot process an empty batch")
            }
            MininnError::EmptyModel => {
                write!(f, "Model must contain at least one layer")
            }
            MininnError::UndeclaredShapes => {
                write!(f, "Model must have declared input and output shapes")
            }
            MininnError::UnsupportedDType { dtype } => {
                write!(
                    f,
                    "Unsupported data type: {dtype} (only FLOAT32 is supported)"
                )
            }
            MininnError::FormatError { message } => {
                write!(f, "Invalid model format: {message}")
            }
            MininnError::UnsupportedVersion { found, supported } => {
                write!(
                    f,
                    "Unsupported model version: found {}.{}, supported {}.{}",
                    found.0, found.1, supported.0, supported.1
                )
            }
            MininnError::UnknownLayerType { tag } => {
                write!(f, "Unknown layer type tag: {tag}")
            }
            MininnError::TruncatedFile { context } => {
                write!(f, "Model file truncated while reading {context}")
            }
            MininnError::Io(e) => write!(f, "I/O error: {e}"),
            MininnError::LayerExecution {
                index,
                layer_type,
                source,
            } => {
                write!(f, "Error in layer {index} ({layer_type}): {source}")
            }
            MininnError::OutputShapeMismatch { expected, actual } => {
                write!(f, "Output shape mismatch: expected {expected}, got {actual}")
            }
            MininnError::LoadError { path, source } => {
                write!(f, "Failed to load model from {path}: {source}")
            }
            MininnError::SaveError { path, source } => {
                write!(f, "Failed to save model to {path}: {source}")
            }
        }
    }
}

impl std::error::Error for MininnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MininnError::Io(e) => Some(e),
            MininnError::LayerExecution { source, .. }
            | MininnError::LoadError { source, .. }
            | MininnError::SaveError { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MininnError {
    fn from(err: std::io::Error) -> Self {
        MininnError::Io(err)
    }
}

impl MininnError {
    /// Create a shape mismatch error from two concrete shapes.
    #[must_use]
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: format_shape(expected),
            actual: format_shape(actual),
        }
    }

    /// Create an output shape mismatch error from two concrete shapes.
    #[must_use]
    pub fn output_shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::OutputShapeMismatch {
            expected: format_shape(expected),
            actual: format_shape(actual),
        }
    }

    /// Create a dimension mismatch error with descriptive context.
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context: context.to_string(),
            expected,
            actual,
        }
    }

    /// Create an empty input error.
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput {
            context: context.to_string(),
        }
    }

    /// Create a truncated file error naming the record being read.
    #[must_use]
    pub fn truncated(context: &str) -> Self {
        Self::TruncatedFile {
            context: context.to_string(),
        }
    }

    /// Peel off any load/save/layer wrappers and return the innermost error.
    #[must_use]
    pub fn root_cause(&self) -> &MininnError {
        match self {
            MininnError::LayerExecution { source, .. }
            | MininnError::LoadError { source, .. }
            | MininnError::SaveError { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Render a shape as `[d0, d1, ...]` for error messages.
pub(crate) fn format_shape(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(ToString::to_string).collect();
    format!("[{}]", dims.join(", "))
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, MininnError>;
