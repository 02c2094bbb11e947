//! Session configuration: the validated knobs every stage in the pipeline
//! reads from.

use crate::error::IcpError;

// =============================================================================
// CONFIGURATION FAMILIES
// =============================================================================

/// Which method the per-iteration driver uses to extract a rotation from the
/// cross-covariance matrix `S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationSolver {
    /// SVD of `S` on the host, via `nalgebra`.
    Svd,
    /// Power iteration on the 4x4 Horn profile matrix `N(S)`, run on the
    /// data-parallel backend.
    PowerMethod,
}

/// Whether NN pairs contribute equally or are weighted by inverse distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Every pair contributes with weight 1.
    Regular,
    /// Pairs are weighted by `w_i = 100 / (100 + d_i)` (see [`crate::kernels::weight`]).
    Weighted,
}

// =============================================================================
// SESSION OPTIONS
// =============================================================================

/// Validated, immutable configuration a [`crate::session::Session`] is built
/// from.
///
/// Construct via [`SessionOptionsBuilder`] rather than directly; the builder
/// is the only place arity/positivity is validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Number of RBC representatives. Power of two, multiple of four.
    pub nr: usize,
    /// NN-metric scaling parameter that discounts the photometric term
    /// relative to the geometric one. Must be strictly positive.
    pub alpha: f32,
    /// Deviation scaling factor applied before the cross-covariance product,
    /// to control floating-point dynamic range. Must be strictly positive.
    pub c: f32,
    /// Hard cap on the number of [`crate::driver::IcpStep`] iterations per
    /// [`crate::session::Session::register`] call.
    pub max_iterations: u32,
    /// Convergence threshold on the incremental rotation angle, in degrees.
    pub angle_threshold_deg: f64,
    /// Convergence threshold on the incremental translation, in millimetres.
    pub translation_threshold_mm: f64,
    /// Which method extracts the rotation from `S` each iteration.
    pub rotation_solver: RotationSolver,
    /// Whether NN pairs are weighted by inverse distance.
    pub weighting: Weighting,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            nr: 256,
            alpha: 200.0,
            c: 1e-6,
            max_iterations: 40,
            angle_threshold_deg: 1e-3,
            translation_threshold_mm: 1e-2,
            rotation_solver: RotationSolver::PowerMethod,
            weighting: Weighting::Weighted,
        }
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Method-chaining builder for [`SessionOptions`], validated once on
/// [`build`](Self::build).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptionsBuilder {
    opts: SessionOptions,
}

impl SessionOptionsBuilder {
    /// Start from the default option set.
    #[must_use]
    pub fn new() -> Self {
        Self { opts: SessionOptions::default() }
    }

    /// Set the RBC representative count.
    #[must_use]
    pub const fn nr(mut self, nr: usize) -> Self {
        self.opts.nr = nr;
        self
    }

    /// Set the NN-metric photometric discount parameter.
    #[must_use]
    pub const fn alpha(mut self, alpha: f32) -> Self {
        self.opts.alpha = alpha;
        self
    }

    /// Set the deviation scaling factor.
    #[must_use]
    pub const fn c(mut self, c: f32) -> Self {
        self.opts.c = c;
        self
    }

    /// Set the iteration cap.
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.opts.max_iterations = max_iterations;
        self
    }

    /// Set the angle convergence threshold, in degrees.
    #[must_use]
    pub const fn angle_threshold_deg(mut self, angle_threshold_deg: f64) -> Self {
        self.opts.angle_threshold_deg = angle_threshold_deg;
        self
    }

    /// Set the translation convergence threshold, in millimetres.
    #[must_use]
    pub const fn translation_threshold_mm(mut self, translation_threshold_mm: f64) -> Self {
        self.opts.translation_threshold_mm = translation_threshold_mm;
        self
    }

    /// Set the rotation solver variant.
    #[must_use]
    pub const fn rotation_solver(mut self, rotation_solver: RotationSolver) -> Self {
        self.opts.rotation_solver = rotation_solver;
        self
    }

    /// Set the weighting scheme.
    #[must_use]
    pub const fn weighting(mut self, weighting: Weighting) -> Self {
        self.opts.weighting = weighting;
        self
    }

    /// Validate and produce the final [`SessionOptions`].
    ///
    /// # Errors
    /// Returns [`IcpError::InvalidArity`] if `nr` is not a power of two or
    /// not a multiple of four. `alpha` and `c` are not validated here
    /// directly (non-positive values are caught the first time they would
    /// divide by zero, at query/covariance time); the builder only enforces
    /// the static arity constraint that's cheap and context-free to check up
    /// front.
    pub fn build(self) -> Result<SessionOptions, IcpError> {
        let nr = self.opts.nr;
        if nr == 0 || !nr.is_power_of_two() || !nr.is_multiple_of(4) {
            return Err(IcpError::InvalidArity { nr });
        }
        Ok(self.opts)
    }
}

impl Default for SessionOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
