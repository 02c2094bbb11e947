//! The pipeline context (§9): a single buffer owner identified by role
//! (transformed points, NN pairs, weights) rather than per-stage classes,
//! reused in place across every iteration of a session.

use crate::point::Point8;

/// Owns every staging buffer [`crate::driver::IcpStep`] reads or writes
/// during one [`step`](crate::driver::IcpStep::step) call. Buffers are
/// cleared and refilled in place each iteration rather than reallocated,
/// mirroring the accelerator staging-buffer discipline of §5: every
/// acquisition is scoped to the call, and nothing is left mapped across a
/// call boundary.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    /// `M'`: the moving landmarks after applying the current transform.
    pub(crate) transformed: Vec<Point8>,
    /// NN pairs' fixed-side points, one per transformed landmark.
    pub(crate) nn_points: Vec<Point8>,
    /// NN pairs' squared distances, parallel to `nn_points`.
    pub(crate) nn_sq_dist: Vec<f32>,
    /// Inverse-distance weights (only populated under `Weighting::Weighted`).
    pub(crate) weights: Vec<f32>,
    /// `sum(weights)`, computed in `f64` (§4.6).
    pub(crate) sum_w: f64,
}

impl PipelineContext {
    /// Pre-allocates every buffer for `landmark_count` pairs, avoiding
    /// reallocation on the first iteration.
    #[must_use]
    pub fn with_capacity(landmark_count: usize) -> Self {
        Self {
            transformed: Vec::with_capacity(landmark_count),
            nn_points: Vec::with_capacity(landmark_count),
            nn_sq_dist: Vec::with_capacity(landmark_count),
            weights: Vec::with_capacity(landmark_count),
            sum_w: 0.0,
        }
    }
}
