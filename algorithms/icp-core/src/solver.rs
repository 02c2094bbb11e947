//! C10: extracting the incremental rotation, translation, and scale from a
//! [`CovarianceFrame`], via either SVD (host) or power iteration on the
//! Horn profile matrix (data-parallel backend).

use nalgebra::{Matrix3, Matrix4, Quaternion, Rotation3, UnitQuaternion, Vector3, Vector4};

use crate::error::IcpError;
use crate::kernels::covariance::CovarianceFrame;
use crate::transform::Similarity;

/// Power-iteration cap (§4.10): if the predicate never stops improving, the
/// loop still terminates here and the ICP driver reports non-convergence
/// rather than hanging.
const POWER_ITERATION_CAP: usize = 1000;

// =============================================================================
// SHARED SCALE/TRANSLATION EXTRACTION
// =============================================================================

fn scale_from_frame(frame: &CovarianceFrame) -> Result<f64, IcpError> {
    if frame.sigma_m == 0.0 || !frame.sigma_m.is_finite() || !frame.sigma_f.is_finite() {
        return Err(IcpError::Degenerate);
    }
    let s = (frame.sigma_f / frame.sigma_m).sqrt();
    if !s.is_finite() {
        return Err(IcpError::Degenerate);
    }
    Ok(s)
}

fn finish(
    rotation: Matrix3<f32>,
    scale: f32,
    f_mean: [f32; 4],
    m_mean: [f32; 4],
) -> Similarity {
    let q = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation));
    let f_vec = Vector3::new(f_mean[0], f_mean[1], f_mean[2]);
    let m_vec = Vector3::new(m_mean[0], m_mean[1], m_mean[2]);
    let t = f_vec - scale * (rotation * m_vec);
    Similarity { q, t, s: scale }
}

// =============================================================================
// VARIANT A: SVD (HOST)
// =============================================================================

/// Horn's closed-form solution via SVD of `S`: `R_k = V * U^T`, with the
/// determinant fixed up to `+1` if the raw product reflects (§4.10).
///
/// # Errors
/// [`IcpError::Degenerate`] if `sigma_m` is zero/non-finite, or the SVD
/// fails to converge.
pub fn solve_svd(
    frame: &CovarianceFrame,
    f_mean: [f32; 4],
    m_mean: [f32; 4],
) -> Result<Similarity, IcpError> {
    let scale = scale_from_frame(frame)?;

    let mat = Matrix3::from_row_slice(&[
        frame.s[0][0],
        frame.s[0][1],
        frame.s[0][2],
        frame.s[1][0],
        frame.s[1][1],
        frame.s[1][2],
        frame.s[2][0],
        frame.s[2][1],
        frame.s[2][2],
    ]);
    if mat.iter().any(|v| !v.is_finite()) {
        return Err(IcpError::Degenerate);
    }

    let svd = mat.svd(true, true);
    let u = svd.u.ok_or(IcpError::Degenerate)?;
    let v_t = svd.v_t.ok_or(IcpError::Degenerate)?;
    let v = v_t.transpose();

    let raw = v * u.transpose();
    let det = raw.determinant();
    let r = if det < 0.0 {
        let mut d = Matrix3::<f64>::identity();
        d[(2, 2)] = det;
        v * d * u.transpose()
    } else {
        raw
    };

    Ok(finish(r.cast::<f32>(), scale as f32, f_mean, m_mean))
}

// =============================================================================
// VARIANT B: POWER METHOD (DATA-PARALLEL BACKEND)
// =============================================================================

fn horn_profile_matrix(frame: &CovarianceFrame) -> Matrix4<f64> {
    let sxx = frame.s[0][0];
    let sxy = frame.s[0][1];
    let sxz = frame.s[0][2];
    let syx = frame.s[1][0];
    let syy = frame.s[1][1];
    let syz = frame.s[1][2];
    let szx = frame.s[2][0];
    let szy = frame.s[2][1];
    let szz = frame.s[2][2];

    Matrix4::new(
        sxx - syy - szz,
        sxy + syx,
        szx + sxz,
        syz - szy,
        sxy + syx,
        -sxx + syy - szz,
        syz + szy,
        szx - sxz,
        szx + sxz,
        syz + szy,
        -sxx - syy + szz,
        sxy - syx,
        syz - szy,
        szx - sxz,
        sxy - syx,
        sxx + syy + szz,
    )
}

/// Power iteration from `x0`, stopping once successive step distances stop
/// improving or the cap is hit.
fn power_iterate(n: &Matrix4<f64>, x0: Vector4<f64>) -> Vector4<f64> {
    let mut x = x0.normalize();
    let mut prev_dist = f64::INFINITY;
    for _ in 0..POWER_ITERATION_CAP {
        let x_new = (n * x).normalize();
        let dist = (x_new - x).norm();
        x = x_new;
        if dist >= prev_dist {
            break;
        }
        prev_dist = dist;
    }
    x
}

/// Horn's closed-form solution via power iteration on the 4x4 profile
/// matrix `N(S)`. If the dominant eigenvalue found is negative, `N` is
/// shifted by it and the search is retried exactly once more, relying on
/// the Gershgorin argument in §4.10 rather than a bounded retry loop — this
/// matches the documented source behaviour (open question, resolved in
/// DESIGN.md).
///
/// # Errors
/// [`IcpError::Degenerate`] if `sigma_m` is zero/non-finite, `S` contains
/// non-finite values, or the final quaternion candidate is non-finite.
pub fn solve_power_method(
    frame: &CovarianceFrame,
    f_mean: [f32; 4],
    m_mean: [f32; 4],
) -> Result<Similarity, IcpError> {
    let scale = scale_from_frame(frame)?;

    let n = horn_profile_matrix(frame);
    if n.iter().any(|v| !v.is_finite()) {
        return Err(IcpError::Degenerate);
    }

    let ones = Vector4::new(1.0, 1.0, 1.0, 1.0);
    let mut x = power_iterate(&n, ones);
    let lambda = (n * x).dot(&x);

    if lambda < 0.0 {
        let shifted = n - Matrix4::identity() * lambda;
        x = power_iterate(&shifted, ones);
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(IcpError::Degenerate);
    }

    let q = UnitQuaternion::new_normalize(Quaternion::new(x[3], x[0], x[1], x[2]));
    let rotation = q.to_rotation_matrix().into_inner();

    Ok(finish(rotation.cast::<f32>(), scale as f32, f_mean, m_mean))
}
