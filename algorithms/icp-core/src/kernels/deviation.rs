//! C8: elementwise deviation from the mean, xyz only.

/// `d_i = p_i - mean`, written as a float4 with lane 3 fixed to zero.
#[must_use]
pub fn deviate(xyz: &[[f32; 3]], mean: [f32; 4]) -> Vec<[f32; 4]> {
    xyz.iter()
        .map(|p| [p[0] - mean[0], p[1] - mean[1], p[2] - mean[2], 0.0])
        .collect()
}
