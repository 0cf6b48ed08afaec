//! Pre- and post-processing helpers for inference callers.

use crate::error::{MininnError, Result};
use crate::tensor::Tensor;

/// Normalize every element: x -> (x - mean) / std.
///
/// # Errors
///
/// Returns `DivisionByZero` when `std` is exactly zero.
///
/// # Examples
///
/// ```
/// use mininn::{tensor::Tensor, utils};
///
/// let input = Tensor::from_vec(&[3], vec![2.0, 4.0, 6.0]).unwrap();
/// let normalized = utils::normalize(&input, 2.0, 2.0).unwrap();
/// assert_eq!(normalized.data(), &[0.0, 1.0, 2.0]);
/// ```
pub fn normalize(input: &Tensor, mean: f32, std: f32) -> Result<Tensor> {
    if std == 0.0 {
        return Err(MininnError::DivisionByZero);
    }
    let mut normalized = input.clone();
    for x in normalized.data_mut() {
        *x = (*x - mean) / std;
    }
    Ok(normalized)
}

/// Pack flat pixel data into a `[height, width, channels]` tensor.
///
/// # Errors
///
/// Returns `SizeMismatch` when the pixel buffer length disagrees with the
/// dimensions, and `InvalidShape` for zero dimensions.
pub fn preprocess_image(
    pixel_data: &[f32],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<Tensor> {
    Tensor::from_vec(&[height, width, channels], pixel_data.to_vec())
}

/// Top-k entries of a rank-1 tensor as `(index, value)` pairs, sorted by
/// descending value. `k` is clipped to the tensor size.
///
/// # Errors
///
/// Returns `InvalidRank` for anything but a rank-1 tensor.
///
/// # Examples
///
/// ```
/// use mininn::{tensor::Tensor, utils};
///
/// let scores = Tensor::from_vec(&[4], vec![0.1, 0.8, 0.3, 0.2]).unwrap();
/// let top = utils::top_k(&scores, 2).unwrap();
/// assert_eq!(top, vec![(1, 0.8), (2, 0.3)]);
/// ```
pub fn top_k(output: &Tensor, k: usize) -> Result<Vec<(usize, f32)>> {
    if output.rank() != 1 {
        return Err(MininnError::InvalidRank {
            expected: "1".to_string(),
            actual: output.rank(),
        });
    }

    let mut indexed: Vec<(usize, f32)> = output
        .data()
        .iter()
        .copied()
        .enumerate()
        .collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed.truncate(k.min(output.size()));
    Ok(indexed)
}

/// Index of the largest element of a rank-1 tensor.
///
/// # Errors
///
/// Returns `InvalidRank` for anything but rank 1 and `EmptyInput` for a
/// zero-sized tensor.
pub fn argmax(output: &Tensor) -> Result<usize> {
    if output.rank() != 1 {
        return Err(MininnError::InvalidRank {
            expected: "1".to_string(),
            actual: output.rank(),
        });
    }
    let data = output.data();
    if data.is_empty() {
        return Err(MininnError::empty_input("argmax"));
    }

    let mut max_idx = 0;
    let mut max_val = data[0];
    for (i, &x) in data.iter().enumerate().skip(1) {
        if x > max_val {
            max_val = x;
            max_idx = i;
        }
    }
    Ok(max_idx)
}

/// Check a tensor against an expected shape.
///
/// # Errors
///
/// Returns `ShapeMismatch` naming both shapes when they differ.
pub fn validate_shape(tensor: &Tensor, expected: &[usize]) -> Result<()> {
    if tensor.shape() != expected {
        return Err(MininnError::shape_mismatch(expected, tensor.shape()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let input = Tensor::from_vec(&[3], vec![2.0, 4.0, 6.0]).unwrap();
        let normalized = normalize(&input, 2.0, 2.0).unwrap();
        assert_eq!(normalized.data(), &[0.0, 1.0, 2.0]);
        // Caller's tensor is untouched.
        assert_eq!(input.data(), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_normalize_zero_std() {
        let input = Tensor::from_vec(&[2], vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            normalize(&input, 0.0, 0.0).unwrap_err(),
            MininnError::DivisionByZero
        ));
    }

    #[test]
    fn test_preprocess_image_shape() {
        let pixels = vec![0.5; 2 * 3 * 1];
        let t = preprocess_image(&pixels, 3, 2, 1).unwrap();
        assert_eq!(t.shape(), &[2, 3, 1]);
    }

    #[test]
    fn test_preprocess_image_size_mismatch() {
        let pixels = vec![0.5; 5];
        assert!(matches!(
            preprocess_image(&pixels, 3, 2, 1).unwrap_err(),
            MininnError::SizeMismatch { .. }
        ));
    }

    #[test]
    fn test_top_k_sorted_descending() {
        let scores = Tensor::from_vec(&[4], vec![0.1, 0.8, 0.3, 0.2]).unwrap();
        let top = top_k(&scores, 2).unwrap();
        assert_eq!(top, vec![(1, 0.8), (2, 0.3)]);
    }

    #[test]
    fn test_top_k_clips_to_size() {
        let scores = Tensor::from_vec(&[3], vec![3.0, 1.0, 2.0]).unwrap();
        let top = top_k(&scores, 10).unwrap();
        assert_eq!(top, vec![(0, 3.0), (2, 2.0), (1, 1.0)]);
    }

    #[test]
    fn test_top_k_requires_rank_1() {
        let t = Tensor::zeros(&[2, 2]).unwrap();
        assert!(matches!(
            top_k(&t, 1).unwrap_err(),
            MininnError::InvalidRank { actual: 2, .. }
        ));
    }

    #[test]
    fn test_argmax() {
        let scores = Tensor::from_vec(&[3], vec![0.1, 0.8, 0.1]).unwrap();
        assert_eq!(argmax(&scores).unwrap(), 1);
    }

    #[test]
    fn test_argmax_first_wins_on_ties() {
        let scores = Tensor::from_vec(&[3], vec![0.5, 0.5, 0.5]).unwrap();
        assert_eq!(argmax(&scores).unwrap(), 0);
    }

    #[test]
    fn test_argmax_requires_rank_1() {
        let t = Tensor::zeros(&[1, 3]).unwrap();
        assert!(matches!(
            argmax(&t).unwrap_err(),
            MininnError::InvalidRank { .. }
        ));
    }

    #[test]
    fn test_validate_shape() {
        let t = Tensor::zeros(&[2, 3]).unwrap();
        assert!(validate_shape(&t, &[2, 3]).is_ok());
        assert!(matches!(
            validate_shape(&t, &[3, 2]).unwrap_err(),
            MininnError::ShapeMismatch { .. }
        ));
    }
}
