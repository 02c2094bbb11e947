//! C5: a faithful, intentionally unoptimized Random-Ball-Cover nearest
//! neighbour index over the fixed cloud's landmark set, and the
//! Kinect-Registration distance metric it is built around.
//!
//! The RBC *construction* algorithm itself is out of scope (§1); this is a
//! concrete instance good enough to exercise the query contract
//! end-to-end, not a performance-tuned index.

use crate::error::IcpError;
use crate::landmark::{LandmarkSet, RepresentativeSet};
use crate::point::Point8;

// =============================================================================
// DISTANCE METRIC
// =============================================================================

/// The Kinect-Registration distance: `||p_g - p_g'||^2 + (1/alpha) * ||p_p -
/// p_p'||^2`, partitioning geometric and photometric contributions with
/// `f_g(alpha) = 1`, `f_p(alpha) = 1/alpha` (§4.5, resolved open question).
///
/// `alpha` must be strictly positive; `alpha = 0` is a literal division by
/// zero and is rejected by callers before this function is reached.
#[must_use]
pub fn kinect_distance(a: &Point8, b: &Point8, alpha: f32) -> f32 {
    let [ax, ay, az] = a.xyz();
    let [bx, by, bz] = b.xyz();
    let geo = (ax - bx).powi(2) + (ay - by).powi(2) + (az - bz).powi(2);

    let [ar, ag, ab] = a.rgb();
    let [br, bg, bb] = b.rgb();
    let photo = (ar - br).powi(2) + (ag - bg).powi(2) + (ab - bb).powi(2);

    geo + photo / alpha
}

// =============================================================================
// RBC INDEX
// =============================================================================

/// An opaque handle built once over a session's fixed-cloud landmark set
/// (§3). Supports point queries returning `(nn_point, nn_sq_dist)`.
#[derive(Debug, Clone)]
pub struct RbcIndex {
    representatives: Vec<Point8>,
    /// Index into `owned`, grouped by representative: `owned[r]` is the list
    /// of landmark points whose nearest representative is `r`.
    owned: Vec<Vec<Point8>>,
    alpha: f32,
    /// Cheap fingerprint of the landmark set this index was built over, used
    /// to catch a stale handle being queried after `F` changed (§4.12).
    fingerprint: u64,
}

fn landmark_fingerprint(landmarks: &LandmarkSet) -> u64 {
    let mut acc = landmarks.len() as u64;
    for (i, p) in landmarks.points().iter().enumerate() {
        acc = acc
            .wrapping_mul(1_099_511_628_211)
            .wrapping_add(p.lanes[0].to_bits() as u64)
            .wrapping_add((i as u64) << 1);
    }
    acc
}

impl RbcIndex {
    /// Builds the index: each landmark is assigned to its nearest
    /// representative (by the same Kinect-Registration metric the index is
    /// queried with), and each representative keeps an owned candidate
    /// list.
    ///
    /// # Errors
    /// [`IcpError::Degenerate`] if `alpha <= 0`.
    pub fn build(
        landmarks: &LandmarkSet,
        representatives: &RepresentativeSet,
        alpha: f32,
    ) -> Result<Self, IcpError> {
        if !(alpha > 0.0) {
            return Err(IcpError::Degenerate);
        }
        let reps = representatives.points().to_vec();
        let mut owned: Vec<Vec<Point8>> = vec![Vec::new(); reps.len()];

        for landmark in landmarks.points() {
            let mut best = 0usize;
            let mut best_dist = f32::INFINITY;
            for (r, rep) in reps.iter().enumerate() {
                let d = kinect_distance(landmark, rep, alpha);
                if d < best_dist {
                    best_dist = d;
                    best = r;
                }
            }
            owned[best].push(*landmark);
        }

        Ok(Self { representatives: reps, owned, alpha, fingerprint: landmark_fingerprint(landmarks) })
    }

    /// Whether this index was built over `landmarks` (cheap, non-cryptographic
    /// check used to reject a stale handle).
    #[must_use]
    pub fn matches(&self, landmarks: &LandmarkSet) -> bool {
        self.fingerprint == landmark_fingerprint(landmarks)
    }

    /// For each query point, finds the nearest representative, then
    /// linearly scans its owned candidate list for the nearest landmark.
    /// Returns `(nn_point, nn_sq_dist)` per query. Approximate: a landmark
    /// owned by a different, non-nearest representative is never
    /// considered, which the ICP driver tolerates via weighting and
    /// iteration (§4.5).
    ///
    /// # Errors
    /// [`IcpError::InvalidIndex`] if the index has no representatives (an
    /// empty `RepresentativeSet` was used to build it).
    pub fn query(&self, queries: &[Point8]) -> Result<Vec<(Point8, f32)>, IcpError> {
        if self.representatives.is_empty() {
            return Err(IcpError::InvalidIndex);
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            Ok(queries.par_iter().map(|q| self.nearest(q)).collect())
        }
        #[cfg(not(feature = "parallel"))]
        {
            Ok(queries.iter().map(|q| self.nearest(q)).collect())
        }
    }

    fn nearest(&self, query: &Point8) -> (Point8, f32) {
        let mut best_rep = 0usize;
        let mut best_rep_dist = f32::INFINITY;
        for (r, rep) in self.representatives.iter().enumerate() {
            let d = kinect_distance(query, rep, self.alpha);
            if d < best_rep_dist {
                best_rep_dist = d;
                best_rep = r;
            }
        }

        let candidates = &self.owned[best_rep];
        let mut best_point = self.representatives[best_rep];
        let mut best_dist = best_rep_dist;
        for candidate in candidates {
            let d = kinect_distance(query, candidate, self.alpha);
            if d < best_dist {
                best_dist = d;
                best_point = *candidate;
            }
        }
        (best_point, best_dist)
    }
}
