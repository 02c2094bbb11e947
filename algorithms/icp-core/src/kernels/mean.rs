//! C7: (optionally weighted) mean position of two paired point sets, xyz
//! only.

use crate::error::IcpError;

/// Packed `[f_mean | m_mean]` output of the mean stage. Lane 3 of each
/// half is fixed to zero (§4.7).
pub type MeanPair = ([f32; 4], [f32; 4]);

fn pack(mean: [f64; 3]) -> [f32; 4] {
    [mean[0] as f32, mean[1] as f32, mean[2] as f32, 0.0]
}

/// Unweighted mean: `mean = sum(p_i) / n`, computed independently for the
/// fixed-side and moving-side pairs.
///
/// # Errors
/// [`IcpError::EmptyInput`] if either set is empty.
pub fn mean_regular(f_xyz: &[[f32; 3]], m_xyz: &[[f32; 3]]) -> Result<MeanPair, IcpError> {
    if f_xyz.is_empty() || m_xyz.is_empty() {
        return Err(IcpError::EmptyInput);
    }
    Ok((pack(plain_mean(f_xyz)), pack(plain_mean(m_xyz))))
}

fn plain_mean(xyz: &[[f32; 3]]) -> [f64; 3] {
    let n = xyz.len() as f64;
    let mut acc = [0.0f64; 3];
    for p in xyz {
        acc[0] += f64::from(p[0]);
        acc[1] += f64::from(p[1]);
        acc[2] += f64::from(p[2]);
    }
    [acc[0] / n, acc[1] / n, acc[2] / n]
}

/// Weighted mean: `mean = sum(w_i * p_i / S_w)`. The division by `S_w` is
/// applied before the per-point scaling, not after the sum, to keep the
/// running total within float range on very large pairings (§4.7).
///
/// # Errors
/// [`IcpError::EmptyInput`] if either set (or the weight set) is empty.
pub fn mean_weighted(
    f_xyz: &[[f32; 3]],
    m_xyz: &[[f32; 3]],
    weights: &[f32],
    sum_w: f64,
) -> Result<MeanPair, IcpError> {
    if f_xyz.is_empty() || m_xyz.is_empty() || weights.is_empty() {
        return Err(IcpError::EmptyInput);
    }
    Ok((pack(weighted_mean(f_xyz, weights, sum_w)), pack(weighted_mean(m_xyz, weights, sum_w))))
}

fn weighted_mean(xyz: &[[f32; 3]], weights: &[f32], sum_w: f64) -> [f64; 3] {
    let mut acc = [0.0f64; 3];
    for (p, &w) in xyz.iter().zip(weights) {
        let scaled = f64::from(w) / sum_w;
        acc[0] += scaled * f64::from(p[0]);
        acc[1] += scaled * f64::from(p[1]);
        acc[2] += scaled * f64::from(p[2]);
    }
    acc
}
