//! C9: cross-covariance matrix `S` and the scale scalars `sigma_m`,
//! `sigma_f`, built from per-workgroup partial 11-vectors summed by the
//! [`crate::kernels::reduce`] primitive.

use super::reduce::reduce_sum_f32_widening;
use super::BLOCK_ELEMS;
use crate::error::IcpError;

/// The packed result of the cross-covariance stage: the 3x3 cross-covariance
/// matrix (row-major) and the two scale constituents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovarianceFrame {
    /// `S[a][b] = sum(w_hat * (c*d_m)_a * (c*d_f)_b)`.
    pub s: [[f64; 3]; 3],
    /// `sum(w_hat * ||c*d_m||^2)`.
    pub sigma_m: f64,
    /// `sum(w_hat * ||c*d_f||^2)`.
    pub sigma_f: f64,
}

/// One workgroup's partial 11-vector: row-major `S` then `[sigma_m, sigma_f]`.
fn chunk_partial(dev_m: &[[f32; 4]], dev_f: &[[f32; 4]], weights: Option<&[f32]>, c: f32) -> [f32; 11] {
    let mut acc = [0.0f32; 11];
    for (i, (m, f)) in dev_m.iter().zip(dev_f).enumerate() {
        let w = weights.map_or(1.0, |w| w[i]);
        let cm = [c * m[0], c * m[1], c * m[2]];
        let cf = [c * f[0], c * f[1], c * f[2]];
        for a in 0..3 {
            for b in 0..3 {
                acc[a * 3 + b] += w * cm[a] * cf[b];
            }
        }
        acc[9] += w * (cm[0] * cm[0] + cm[1] * cm[1] + cm[2] * cm[2]);
        acc[10] += w * (cf[0] * cf[0] + cf[1] * cf[1] + cf[2] * cf[2]);
    }
    acc
}

/// Builds the cross-covariance frame from paired deviations.
///
/// `c` rescales deviations before the product to control floating-point
/// dynamic range; it leaves the eigenvectors of `S` and the scale factor
/// `s = sqrt(sigma_f / sigma_m)` invariant (§4.9).
///
/// # Errors
/// [`IcpError::EmptyInput`] if the deviation sets are empty, mismatched in
/// length, or (when weighted) mismatched with the weight set's length.
pub fn cross_covariance(
    dev_m: &[[f32; 4]],
    dev_f: &[[f32; 4]],
    weights: Option<&[f32]>,
    c: f32,
) -> Result<CovarianceFrame, IcpError> {
    if dev_m.is_empty() || dev_f.is_empty() || dev_m.len() != dev_f.len() {
        return Err(IcpError::EmptyInput);
    }
    if let Some(w) = weights {
        if w.len() != dev_m.len() {
            return Err(IcpError::EmptyInput);
        }
    }

    let m_chunks: Vec<&[[f32; 4]]> = dev_m.chunks(BLOCK_ELEMS).collect();
    let f_chunks: Vec<&[[f32; 4]]> = dev_f.chunks(BLOCK_ELEMS).collect();
    let w_chunks: Vec<Option<&[f32]>> = match weights {
        Some(w) => w.chunks(BLOCK_ELEMS).map(Some).collect(),
        None => core::iter::repeat(None).take(m_chunks.len()).collect(),
    };

    let num_chunks = m_chunks.len();
    let cols = num_chunks.max(4).next_multiple_of(4);

    let partials: Vec<[f32; 11]> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..num_chunks)
                .into_par_iter()
                .map(|i| chunk_partial(m_chunks[i], f_chunks[i], w_chunks[i], c))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..num_chunks).map(|i| chunk_partial(m_chunks[i], f_chunks[i], w_chunks[i], c)).collect()
        }
    };

    // Lay out as 11 rows (one per packed component) x `cols` chunk-partials,
    // padded with zero partials so the reduce primitive's shape contract is
    // satisfied, then let C1 do the cross-chunk summation.
    let mut matrix = vec![0.0f32; 11 * cols];
    for (chunk_idx, partial) in partials.iter().enumerate() {
        for (row, &value) in partial.iter().enumerate() {
            matrix[row * cols + chunk_idx] = value;
        }
    }

    let totals = reduce_sum_f32_widening(&matrix, 11, cols)?;

    Ok(CovarianceFrame {
        s: [
            [totals[0], totals[1], totals[2]],
            [totals[3], totals[4], totals[5]],
            [totals[6], totals[7], totals[8]],
        ],
        sigma_m: totals[9],
        sigma_f: totals[10],
    })
}
