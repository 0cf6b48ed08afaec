//! N-dimensional tensor type for inference data.
//!
//! A [`Tensor`] owns a flat, row-major `f32` buffer together with its shape.
//! Copying is always a deep duplication of the buffer (`Clone`); transfer of
//! ownership is an ordinary Rust move.

use serde::{Deserialize, Serialize};

use crate::error::{format_shape, MininnError, Result};

/// Element type tag for tensor payloads.
///
/// Only [`DataType::Float32`] is functionally supported; the quantized tags
/// exist for the on-disk format and are rejected wherever a numeric payload
/// is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit IEEE-754 floating point
    Float32,
    /// Reserved: 8-bit quantized
    Int8,
    /// Reserved: 4-bit quantized
    Int4,
}

impl DataType {
    /// Wire tag used by the binary model format.
    #[must_use]
    pub fn to_tag(self) -> u8 {
        match self {
            DataType::Float32 => 0,
            DataType::Int8 => 1,
            DataType::Int4 => 2,
        }
    }

    /// Decode a wire tag.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedDType` for tags outside the declared set.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(DataType::Float32),
            1 => Ok(DataType::Int8),
            2 => Ok(DataType::Int4),
            _ => Err(MininnError::UnsupportedDType {
                dtype: format!("tag {tag}"),
            }),
        }
    }

    /// Human-readable name for error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DataType::Float32 => "FLOAT32",
            DataType::Int8 => "INT8",
            DataType::Int4 => "INT4",
        }
    }
}

/// A shaped, exclusively owned buffer of 32-bit floats (row-major storage).
///
/// Invariants: the shape is never empty, no dimension is zero, and the
/// buffer length always equals the product of the shape.
///
/// # Examples
///
/// ```
/// use mininn::tensor::Tensor;
///
/// let t = Tensor::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(t.shape(), &[2, 3]);
/// assert_eq!(t.size(), 6);
/// assert_eq!(t.at(&[1, 2]).unwrap(), 6.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    shape: Vec<usize>,
    dtype: DataType,
    data: Vec<f32>,
}

impl Tensor {
    /// Create a zero-initialized tensor with the given shape.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if the shape is empty or contains a zero
    /// dimension.
    pub fn zeros(shape: &[usize]) -> Result<Self> {
        validate_shape(shape)?;
        let total: usize = shape.iter().product();
        Ok(Self {
            shape: shape.to_vec(),
            dtype: DataType::Float32,
            data: vec![0.0; total],
        })
    }

    /// Create a tensor from a shape and a flat row-major data buffer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` for an invalid shape and `SizeMismatch` when
    /// the data length differs from the product of the shape.
    pub fn from_vec(shape: &[usize], data: Vec<f32>) -> Result<Self> {
        validate_shape(shape)?;
        let total: usize = shape.iter().product();
        if data.len() != total {
            return Err(MininnError::SizeMismatch {
                expected: total,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
            dtype: DataType::Float32,
            data,
        })
    }

    /// Re-tag the tensor with a different data type.
    ///
    /// The buffer is untouched; the tag only matters at the engine and
    /// codec boundaries where non-FLOAT32 tensors are rejected.
    #[must_use]
    pub fn with_dtype(mut self, dtype: DataType) -> Self {
        self.dtype = dtype;
        self
    }

    /// Shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Data type tag.
    #[must_use]
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// The underlying flat buffer.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the underlying flat buffer.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Bounds-checked element read at a multi-index.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRank` when the number of indices differs from the
    /// tensor rank and `OutOfRange` when any index exceeds its dimension.
    pub fn at(&self, indices: &[usize]) -> Result<f32> {
        let idx = self.linear_index(indices)?;
        Ok(self.data[idx])
    }

    /// Bounds-checked mutable element access at a multi-index.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Tensor::at`].
    pub fn at_mut(&mut self, indices: &[usize]) -> Result<&mut f32> {
        let idx = self.linear_index(indices)?;
        Ok(&mut self.data[idx])
    }

    /// Relabel the tensor with a new shape of equal total size.
    ///
    /// The buffer is untouched; only the shape changes.
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` when the new shape's product differs from the
    /// current element count, and `InvalidShape` for a structurally invalid
    /// shape.
    pub fn reshape(&mut self, new_shape: &[usize]) -> Result<()> {
        validate_shape(new_shape)?;
        let new_total: usize = new_shape.iter().product();
        if new_total != self.data.len() {
            return Err(MininnError::SizeMismatch {
                expected: self.data.len(),
                actual: new_total,
            });
        }
        self.shape = new_shape.to_vec();
        Ok(())
    }

    /// Element-wise addition, in place.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the shapes differ.
    pub fn add_assign(&mut self, other: &Tensor) -> Result<()> {
        self.check_same_shape(other)?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// Element-wise subtraction, in place.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the shapes differ.
    pub fn sub_assign(&mut self, other: &Tensor) -> Result<()> {
        self.check_same_shape(other)?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a -= b;
        }
        Ok(())
    }

    /// Element-wise multiplication, in place.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the shapes differ.
    pub fn mul_assign(&mut self, other: &Tensor) -> Result<()> {
        self.check_same_shape(other)?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a *= b;
        }
        Ok(())
    }

    /// Element-wise division, in place.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the shapes differ and `DivisionByZero`
    /// if any divisor element is exactly zero. The divisor check runs before
    /// any element is written, so a failed call leaves the tensor unchanged.
    pub fn div_assign(&mut self, other: &Tensor) -> Result<()> {
        self.check_same_shape(other)?;
        if other.data.iter().any(|&b| b == 0.0) {
            return Err(MininnError::DivisionByZero);
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a /= b;
        }
        Ok(())
    }

    /// Element-wise addition, returning a new tensor.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the shapes differ.
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        let mut result = self.clone();
        result.add_assign(other)?;
        Ok(result)
    }

    /// Element-wise subtraction, returning a new tensor.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the shapes differ.
    pub fn sub(&self, other: &Tensor) -> Result<Tensor> {
        let mut result = self.clone();
        result.sub_assign(other)?;
        Ok(result)
    }

    /// Element-wise multiplication, returning a new tensor.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the shapes differ.
    pub fn mul(&self, other: &Tensor) -> Result<Tensor> {
        let mut result = self.clone();
        result.mul_assign(other)?;
        Ok(result)
    }

    /// Element-wise division, returning a new tensor.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when the shapes differ and `DivisionByZero`
    /// for a zero divisor element.
    pub fn div(&self, other: &Tensor) -> Result<Tensor> {
        let mut result = self.clone();
        result.div_assign(other)?;
        Ok(result)
    }

    /// Row-major linearization: index = sum(indices[i] * stride[i]).
    fn linear_index(&self, indices: &[usize]) -> Result<usize> {
        if indices.len() != self.shape.len() {
            return Err(MininnError::InvalidRank {
                expected: self.shape.len().to_string(),
                actual: indices.len(),
            });
        }
        for (axis, (&index, &bound)) in indices.iter().zip(self.shape.iter()).enumerate() {
            if index >= bound {
                return Err(MininnError::OutOfRange { axis, index, bound });
            }
        }

        let mut index = 0;
        let mut multiplier = 1;
        for (&i, &dim) in indices.iter().zip(self.shape.iter()).rev() {
            index += i * multiplier;
            multiplier *= dim;
        }
        Ok(index)
    }

    fn check_same_shape(&self, other: &Tensor) -> Result<()> {
        if self.shape != other.shape {
            return Err(MininnError::shape_mismatch(&self.shape, &other.shape));
        }
        Ok(())
    }
}

impl std::fmt::Display for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tensor{} ({}, {} elements)",
            format_shape(&self.shape),
            self.dtype.name(),
            self.size()
        )
    }
}

/// Validate that a shape is non-empty with no zero dimensions.
pub(crate) fn validate_shape(shape: &[usize]) -> Result<()> {
    if shape.is_empty() {
        return Err(MininnError::InvalidShape {
            message: "shape cannot be empty".to_string(),
        });
    }
    if shape.iter().any(|&dim| dim == 0) {
        return Err(MininnError::InvalidShape {
            message: format!("shape dimensions cannot be zero: {}", format_shape(shape)),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_initializes_buffer() {
        let t = Tensor::zeros(&[2, 3, 4]).unwrap();
        assert_eq!(t.shape(), &[2, 3, 4]);
        assert_eq!(t.rank(), 3);
        assert_eq!(t.size(), 24);
        assert!(t.data().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_size_equals_shape_product() {
        let t = Tensor::from_vec(&[3, 5], vec![1.0; 15]).unwrap();
        assert_eq!(t.size(), t.shape().iter().product::<usize>());
        assert_eq!(t.data().len(), t.size());
    }

    #[test]
    fn test_empty_shape_rejected() {
        let err = Tensor::zeros(&[]).unwrap_err();
        assert!(matches!(err, MininnError::InvalidShape { .. }));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = Tensor::zeros(&[2, 0, 3]).unwrap_err();
        assert!(matches!(err, MininnError::InvalidShape { .. }));
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        let err = Tensor::from_vec(&[2, 2], vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            MininnError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_at_row_major_order() {
        let t = Tensor::from_vec(&[2, 3], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(t.at(&[0, 0]).unwrap(), 0.0);
        assert_eq!(t.at(&[0, 2]).unwrap(), 2.0);
        assert_eq!(t.at(&[1, 0]).unwrap(), 3.0);
        assert_eq!(t.at(&[1, 2]).unwrap(), 5.0);
    }

    #[test]
    fn test_at_wrong_index_count() {
        let t = Tensor::zeros(&[2, 3]).unwrap();
        let err = t.at(&[1]).unwrap_err();
        assert!(matches!(err, MininnError::InvalidRank { actual: 1, .. }));
    }

    #[test]
    fn test_at_out_of_range() {
        let t = Tensor::zeros(&[2, 3]).unwrap();
        let err = t.at(&[0, 3]).unwrap_err();
        assert!(matches!(
            err,
            MininnError::OutOfRange {
                axis: 1,
                index: 3,
                bound: 3
            }
        ));
    }

    #[test]
    fn test_at_mut_writes_through() {
        let mut t = Tensor::zeros(&[2, 2]).unwrap();
        *t.at_mut(&[1, 1]).unwrap() = 7.5;
        assert_eq!(t.at(&[1, 1]).unwrap(), 7.5);
        assert_eq!(t.data()[3], 7.5);
    }

    #[test]
    fn test_reshape_preserves_data() {
        let mut t = Tensor::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        t.reshape(&[3, 2]).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_reshape_roundtrip_restores_shape() {
        let original = Tensor::from_vec(&[2, 6], (0..12).map(|i| i as f32).collect()).unwrap();
        let mut t = original.clone();
        t.reshape(&[4, 3]).unwrap();
        t.reshape(&[2, 6]).unwrap();
        assert_eq!(t, original);
    }

    #[test]
    fn test_reshape_product_mismatch() {
        let mut t = Tensor::zeros(&[2, 3]).unwrap();
        let err = t.reshape(&[4, 2]).unwrap_err();
        assert!(matches!(err, MininnError::SizeMismatch { .. }));
        assert_eq!(t.shape(), &[2, 3]);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Tensor::from_vec(&[3], vec![1.0, 2.0, 3.0]).unwrap();
        let mut copy = original.clone();
        assert_eq!(copy, original);
        copy.data_mut()[0] = 99.0;
        assert_eq!(original.data()[0], 1.0);
    }

    #[test]
    fn test_with_dtype_tags_without_touching_data() {
        let t = Tensor::from_vec(&[2], vec![1.0, 2.0])
            .unwrap()
            .with_dtype(DataType::Int8);
        assert_eq!(t.dtype(), DataType::Int8);
        assert_eq!(t.data(), &[1.0, 2.0]);
    }

    #[test]
    fn test_dtype_tag_roundtrip() {
        for dtype in [DataType::Float32, DataType::Int8, DataType::Int4] {
            assert_eq!(DataType::from_tag(dtype.to_tag()).unwrap(), dtype);
        }
        assert!(matches!(
            DataType::from_tag(7).unwrap_err(),
            MininnError::UnsupportedDType { .. }
        ));
    }

    // =========================================================================
    // Element-wise arithmetic
    // =========================================================================

    #[test]
    fn test_add_assign() {
        let mut a = Tensor::from_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Tensor::from_vec(&[2, 2], vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        a.add_assign(&b).unwrap();
        assert_eq!(a.data(), &[11.0, 22.0, 33.0, 44.0]);
    }

    #[test]
    fn test_sub_assign() {
        let mut a = Tensor::from_vec(&[3], vec![5.0, 5.0, 5.0]).unwrap();
        let b = Tensor::from_vec(&[3], vec![1.0, 2.0, 3.0]).unwrap();
        a.sub_assign(&b).unwrap();
        assert_eq!(a.data(), &[4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_mul_assign() {
        let mut a = Tensor::from_vec(&[2], vec![3.0, 4.0]).unwrap();
        let b = Tensor::from_vec(&[2], vec![2.0, 0.5]).unwrap();
        a.mul_assign(&b).unwrap();
        assert_eq!(a.data(), &[6.0, 2.0]);
    }

    #[test]
    fn test_div_assign() {
        let mut a = Tensor::from_vec(&[2], vec![6.0, 9.0]).unwrap();
        let b = Tensor::from_vec(&[2], vec![2.0, 3.0]).unwrap();
        a.div_assign(&b).unwrap();
        assert_eq!(a.data(), &[3.0, 3.0]);
    }

    #[test]
    fn test_div_by_zero_leaves_tensor_unchanged() {
        let mut a = Tensor::from_vec(&[3], vec![1.0, 2.0, 3.0]).unwrap();
        let b = Tensor::from_vec(&[3], vec![1.0, 0.0, 2.0]).unwrap();
        let err = a.div_assign(&b).unwrap_err();
        assert!(matches!(err, MininnError::DivisionByZero));
        assert_eq!(a.data(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_elementwise_shape_mismatch() {
        let mut a = Tensor::zeros(&[2, 3]).unwrap();
        let b = Tensor::zeros(&[3, 2]).unwrap();
        assert!(matches!(
            a.add_assign(&b).unwrap_err(),
            MininnError::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn test_binary_add_copies_left_operand() {
        let a = Tensor::from_vec(&[2], vec![1.0, 2.0]).unwrap();
        let b = Tensor::from_vec(&[2], vec![3.0, 4.0]).unwrap();
        let c = a.add(&b).unwrap();
        assert_eq!(c.data(), &[4.0, 6.0]);
        assert_eq!(a.data(), &[1.0, 2.0]);
    }

    #[test]
    fn test_binary_div() {
        let a = Tensor::from_vec(&[2], vec![8.0, 6.0]).unwrap();
        let b = Tensor::from_vec(&[2], vec![4.0, 3.0]).unwrap();
        let c = a.div(&b).unwrap();
        assert_eq!(c.data(), &[2.0, 2.0]);
    }

    #[test]
    fn test_display() {
        let t = Tensor::zeros(&[2, 3]).unwrap();
        let s = t.to_string();
        assert!(s.contains("[2, 3]"));
        assert!(s.contains("FLOAT32"));
        assert!(s.contains('6'));
    }
}
