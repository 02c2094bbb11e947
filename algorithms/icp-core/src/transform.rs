//! Similarity transform type and C4: applying it to a point set while
//! preserving photometric channels.

use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3};

use crate::point::Point8;

// =============================================================================
// SIMILARITY TRANSFORM
// =============================================================================

/// A similarity transform `(q, t, s)`: unit rotation quaternion, translation
/// in millimetres, and a strictly positive uniform scale (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Unit rotation quaternion.
    pub q: UnitQuaternion<f32>,
    /// Translation, in millimetres.
    pub t: Vector3<f32>,
    /// Uniform scale. Always strictly positive.
    pub s: f32,
}

impl Similarity {
    /// The identity transform: no rotation, no translation, unit scale.
    #[must_use]
    pub fn identity() -> Self {
        Self { q: UnitQuaternion::identity(), t: Vector3::zeros(), s: 1.0 }
    }

    /// The rotation matrix `R` derived from `q`.
    #[must_use]
    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        self.q.to_rotation_matrix().into_inner()
    }

    /// The fused 4x4 homogeneous matrix `[s*R | t; 0 0 0 1]` (§4.4).
    #[must_use]
    pub fn to_matrix4(&self) -> Matrix4<f32> {
        let r = self.rotation_matrix() * self.s;
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.t);
        m
    }

    /// Serializes to the on-wire layout: `[q_x, q_y, q_z, q_w, t_x, t_y,
    /// t_z, s]` (§6).
    #[must_use]
    pub fn to_wire(&self) -> [f32; 8] {
        let qv = self.q.as_vector();
        [qv.x, qv.y, qv.z, qv.w, self.t.x, self.t.y, self.t.z, self.s]
    }

    /// Parses the on-wire layout produced by [`to_wire`](Self::to_wire).
    /// Renormalizes the quaternion defensively.
    #[must_use]
    pub fn from_wire(wire: [f32; 8]) -> Self {
        let q = UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(
            wire[3], wire[0], wire[1], wire[2],
        ));
        let t = Vector3::new(wire[4], wire[5], wire[6]);
        Self { q, t, s: wire[7] }
    }

    /// The rotation angle encoded by `q`, in degrees:
    /// `180/pi * 2 * atan2(||q.vec||, q.w)` (§4.12). Used by the convergence
    /// driver on the *incremental* step transform, not the accumulated one.
    #[must_use]
    pub fn angle_deg(&self) -> f64 {
        let qv = self.q.as_vector();
        let vec_norm = (f64::from(qv.x * qv.x + qv.y * qv.y + qv.z * qv.z)).sqrt();
        let w = f64::from(qv.w);
        180.0 / core::f64::consts::PI * 2.0 * vec_norm.atan2(w)
    }

    /// Composes `self` applied after `inner` (`self . inner`), matching the
    /// session transform accumulation rule of §4.10:
    /// `R <- R_k . R, t <- s_k . R_k . t + t_k, s <- s_k . s`.
    #[must_use]
    pub fn compose_after(&self, inner: &Self) -> Self {
        let q = self.q * inner.q;
        let t = self.s * (self.rotation_matrix() * inner.t) + self.t;
        let s = self.s * inner.s;
        Self { q, t, s }
    }
}

// =============================================================================
// C4: TRANSFORM APPLIER
// =============================================================================

/// Applies `t` to every point's geometric lanes via the quaternion form
/// `p' = s * (p + 2 * q_v x (q_v x p + q_w * p)) + t`, preserving lanes 3-7
/// bit-exactly (§4.4).
#[must_use]
pub fn apply_quaternion(points: &[Point8], t: &Similarity) -> Vec<Point8> {
    let qv = Vector3::new(t.q.as_vector().x, t.q.as_vector().y, t.q.as_vector().z);
    let qw = t.q.as_vector().w;

    points
        .iter()
        .map(|point| {
            let p = Vector3::new(point.lanes[0], point.lanes[1], point.lanes[2]);
            let inner = qv.cross(&p) + qw * p;
            let outer = qv.cross(&inner);
            let p_prime = t.s * (p + 2.0 * outer) + t.t;

            let mut lanes = point.lanes;
            lanes[0] = p_prime.x;
            lanes[1] = p_prime.y;
            lanes[2] = p_prime.z;
            Point8 { lanes }
        })
        .collect()
}

/// Applies a fused 4x4 homogeneous matrix to every point's geometric lanes:
/// `p' = matrix * (p, 1)^T`, preserving lanes 3-7 bit-exactly (§4.4).
#[must_use]
pub fn apply_matrix(points: &[Point8], matrix: &Matrix4<f32>) -> Vec<Point8> {
    points
        .iter()
        .map(|point| {
            let p = nalgebra::Vector4::new(
                point.lanes[0],
                point.lanes[1],
                point.lanes[2],
                1.0,
            );
            let p_prime = matrix * p;

            let mut lanes = point.lanes;
            lanes[0] = p_prime.x;
            lanes[1] = p_prime.y;
            lanes[2] = p_prime.z;
            Point8 { lanes }
        })
        .collect()
}
