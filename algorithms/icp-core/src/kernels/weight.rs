//! C6: inverse-distance weighting of NN pairs.

use crate::error::IcpError;

/// Computes `w_i = 100 / (100 + d_i)` for each squared distance, plus the
/// `f64`-accumulated sum `S_w = sum(w_i)`.
///
/// # Errors
/// [`IcpError::EmptyInput`] if `sq_distances` is empty.
pub fn weigh(sq_distances: &[f32]) -> Result<(Vec<f32>, f64), IcpError> {
    if sq_distances.is_empty() {
        return Err(IcpError::EmptyInput);
    }
    let weights: Vec<f32> = sq_distances.iter().map(|&d| 100.0 / (100.0 + d)).collect();
    let sum: f64 = weights.iter().map(|&w| f64::from(w)).sum();
    Ok((weights, sum))
}
