//! Stateless numeric kernels over tensors.
//!
//! These functions carry no state of their own; layers delegate to them for
//! the actual arithmetic. In-place kernels mutate the tensor buffer directly.

use crate::error::{MininnError, Result};
use crate::tensor::Tensor;

/// Matrix multiplication of two rank-2 tensors.
///
/// For `a` of shape `[m, n]` and `b` of shape `[n, p]`, produces the
/// `[m, p]` product with `c[i, j] = sum_k a[i, k] * b[k, j]`.
///
/// # Errors
///
/// Returns `InvalidRank` unless both operands are rank 2 and
/// `DimensionMismatch` when the inner dimensions differ.
///
/// # Examples
///
/// ```
/// use mininn::{ops, tensor::Tensor};
///
/// let a = Tensor::from_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let eye = Tensor::from_vec(&[2, 2], vec![1.0, 0.0, 0.0, 1.0]).unwrap();
/// let c = ops::matmul(&a, &eye).unwrap();
/// assert_eq!(c.data(), a.data());
/// ```
pub fn matmul(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    if a.rank() != 2 || b.rank() != 2 {
        let actual = if a.rank() != 2 { a.rank() } else { b.rank() };
        return Err(MininnError::InvalidRank {
            expected: "2".to_string(),
            actual,
        });
    }

    let (m, n) = (a.shape()[0], a.shape()[1]);
    let (n2, p) = (b.shape()[0], b.shape()[1]);
    if n != n2 {
        return Err(MininnError::dimension_mismatch(
            "Inner dimensions must match for matrix multiplication",
            n,
            n2,
        ));
    }

    let lhs = a.data();
    let rhs = b.data();
    let mut out = vec![0.0f32; m * p];
    for i in 0..m {
        for j in 0..p {
            let mut sum = 0.0;
            for k in 0..n {
                sum += lhs[i * n + k] * rhs[k * p + j];
            }
            out[i * p + j] = sum;
        }
    }

    Tensor::from_vec(&[m, p], out)
}

/// Rectified linear unit, in place: x -> max(0, x).
pub fn relu(tensor: &mut Tensor) {
    for x in tensor.data_mut() {
        *x = relu_scalar(*x);
    }
}

/// Scalar ReLU: max(0, x).
#[inline]
#[must_use]
pub fn relu_scalar(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

/// Logistic sigmoid, in place: x -> 1 / (1 + exp(-x)).
pub fn sigmoid(tensor: &mut Tensor) {
    for x in tensor.data_mut() {
        *x = sigmoid_scalar(*x);
    }
}

/// Scalar sigmoid: 1 / (1 + exp(-x)).
#[inline]
#[must_use]
pub fn sigmoid_scalar(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Softmax over the whole buffer, in place, treating every element as part
/// of one flat distribution regardless of rank.
///
/// Numerically stable: the maximum is subtracted before exponentiating, so
/// large-magnitude inputs saturate to exact 0.0/1.0 instead of overflowing
/// to NaN or infinity.
///
/// # Errors
///
/// Returns `EmptyInput` for a zero-sized tensor.
pub fn softmax(tensor: &mut Tensor) -> Result<()> {
    if tensor.size() == 0 {
        return Err(MininnError::empty_input("softmax"));
    }

    let data = tensor.data_mut();
    let max = data.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));

    let mut sum = 0.0f32;
    for x in data.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }

    let inverse_sum = 1.0 / sum;
    for x in data.iter_mut() {
        *x *= inverse_sum;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor1d(data: &[f32]) -> Tensor {
        Tensor::from_vec(&[data.len()], data.to_vec()).unwrap()
    }

    // =========================================================================
    // matmul
    // =========================================================================

    #[test]
    fn test_matmul_2x3_times_3x2() {
        let a = Tensor::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = Tensor::from_vec(&[3, 2], vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]).unwrap();
        let c = matmul(&a, &b).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.data(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_matmul_identity_returns_operand() {
        let a = Tensor::from_vec(&[2, 3], vec![1.0, -2.0, 3.0, 0.5, 0.0, -1.5]).unwrap();
        let eye = Tensor::from_vec(&[3, 3], vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
            .unwrap();
        let c = matmul(&a, &eye).unwrap();
        assert_eq!(c.shape(), a.shape());
        assert_eq!(c.data(), a.data());
    }

    #[test]
    fn test_matmul_inner_dimension_mismatch() {
        let a = Tensor::zeros(&[2, 3]).unwrap();
        let b = Tensor::zeros(&[2, 3]).unwrap();
        let err = matmul(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            MininnError::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_matmul_requires_rank_2() {
        let a = Tensor::zeros(&[6]).unwrap();
        let b = Tensor::zeros(&[2, 3]).unwrap();
        assert!(matches!(
            matmul(&a, &b).unwrap_err(),
            MininnError::InvalidRank { actual: 1, .. }
        ));
        assert!(matches!(
            matmul(&b, &a).unwrap_err(),
            MininnError::InvalidRank { actual: 1, .. }
        ));
    }

    // =========================================================================
    // relu / sigmoid
    // =========================================================================

    #[test]
    fn test_relu_clamps_negatives() {
        let mut t = tensor1d(&[-2.0, -0.5, 0.0, 0.5, 2.0]);
        relu(&mut t);
        assert_eq!(t.data(), &[0.0, 0.0, 0.0, 0.5, 2.0]);
    }

    #[test]
    fn test_relu_is_idempotent() {
        let mut once = tensor1d(&[-3.0, -1.0, 0.0, 1.0, 3.0]);
        relu(&mut once);
        let mut twice = once.clone();
        relu(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sigmoid_midpoint_and_symmetry() {
        let mut t = tensor1d(&[0.0]);
        sigmoid(&mut t);
        assert!((t.data()[0] - 0.5).abs() < 1e-6);

        for x in [-5.0f32, -1.0, 0.3, 2.0, 10.0] {
            let total = sigmoid_scalar(x) + sigmoid_scalar(-x);
            assert!((total - 1.0).abs() < 1e-6, "sigmoid symmetry broke at {x}");
        }
    }

    #[test]
    fn test_sigmoid_saturates() {
        assert!((sigmoid_scalar(100.0) - 1.0).abs() < 1e-6);
        assert!(sigmoid_scalar(-100.0).abs() < 1e-6);
    }

    // =========================================================================
    // softmax
    // =========================================================================

    #[test]
    fn test_softmax_sums_to_one() {
        let mut t = tensor1d(&[1.0, 2.0, 3.0, 4.0]);
        softmax(&mut t).unwrap();
        let sum: f32 = t.data().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(t.data().iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_softmax_uniform_on_equal_inputs() {
        let mut t = tensor1d(&[3.5; 4]);
        softmax(&mut t).unwrap();
        for &p in t.data() {
            assert!((p - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax_preserves_ordering() {
        let mut t = tensor1d(&[0.1, 2.0, -1.0]);
        softmax(&mut t).unwrap();
        assert!(t.data()[1] > t.data()[0]);
        assert!(t.data()[0] > t.data()[2]);
    }

    #[test]
    fn test_softmax_large_magnitude_is_finite() {
        let mut t = tensor1d(&[1000.0, 999.0, 998.0]);
        softmax(&mut t).unwrap();
        assert!(t.data().iter().all(|p| p.is_finite()));
        let sum: f32 = t.data().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_extreme_magnitude_degrades_to_exact_probabilities() {
        let mut t = tensor1d(&[1e30, 0.0]);
        softmax(&mut t).unwrap();
        assert_eq!(t.data(), &[1.0, 0.0]);
    }

    #[test]
    fn test_softmax_flat_over_rank_2() {
        // The whole buffer is one distribution, rank notwithstanding.
        let mut t = Tensor::from_vec(&[2, 2], vec![1.0, 1.0, 1.0, 1.0]).unwrap();
        softmax(&mut t).unwrap();
        for &p in t.data() {
            assert!((p - 0.25).abs() < 1e-6);
        }
    }
}
