//! The public single-session API (§6): build once over a fixed cloud, then
//! register any number of moving clouds against it.

use crate::config::SessionOptions;
use crate::driver::IcpStep;
use crate::error::IcpError;
use crate::landmark::{sample_landmarks, sample_representatives, LandmarkSet};
use crate::pipeline::PipelineContext;
use crate::point::{Point8, PointCloud};
use crate::rbc::RbcIndex;
use crate::transform::{apply_quaternion, Similarity};

/// Outcome of [`Session::register`]: the transform found, how it was found,
/// and whether it actually converged (§6, §7).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistrationResult {
    /// The session transform after this call (cumulative across iterations
    /// run, on top of whatever was accumulated before `register` was
    /// called).
    pub transform: Similarity,
    /// Iterations run by this `register` call.
    pub iterations: u32,
    /// Whether the convergence thresholds were met before the iteration
    /// cap. `false` is not an error (§7) — it's a normal, reportable
    /// outcome.
    pub converged: bool,
    /// Incremental rotation angle (degrees) of the last iteration run.
    pub delta_angle_deg: f64,
    /// Incremental translation (mm) of the last iteration run.
    pub delta_translation_mm: f64,
}

/// A single fixed-cloud registration session: owns `F`, its RBC index, and
/// the accumulated transform and iteration counter (§3's `IterationState`).
pub struct Session {
    options: SessionOptions,
    f_landmarks: LandmarkSet,
    rbc: RbcIndex,
    step: IcpStep,
    ctx: PipelineContext,
    moving_landmarks: Option<Vec<Point8>>,
    t: Similarity,
    k: u32,
}

impl Session {
    /// Builds a session over `fixed_cloud`: samples its landmarks, samples
    /// `options.nr` RBC representatives from them, and builds the RBC index
    /// once. The index and `fixed_cloud`'s landmarks stay fixed for the
    /// life of the session (§3).
    ///
    /// # Errors
    /// [`IcpError::InvalidArity`] if `options.nr` is invalid;
    /// [`IcpError::Degenerate`] if `options.alpha <= 0`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn new(fixed_cloud: &PointCloud, options: SessionOptions) -> Result<Self, IcpError> {
        let f_landmarks = sample_landmarks(fixed_cloud);
        let representatives = sample_representatives(&f_landmarks, options.nr)?;
        let rbc = RbcIndex::build(&f_landmarks, &representatives, options.alpha)?;
        let step = IcpStep::new(&options);
        let ctx = PipelineContext::with_capacity(f_landmarks.len());

        log::debug!(
            "session started: nr={}, alpha={}, rotation_solver={:?}, weighting={:?}",
            options.nr,
            options.alpha,
            options.rotation_solver,
            options.weighting
        );

        Ok(Self {
            options,
            f_landmarks,
            rbc,
            step,
            ctx,
            moving_landmarks: None,
            t: Similarity::identity(),
            k: 0,
        })
    }

    /// Sets the moving cloud for the next [`register`](Self::register)
    /// call, resetting the accumulated transform to identity and the
    /// iteration counter to zero (§6).
    pub fn set_moving(&mut self, moving_cloud: &PointCloud) {
        let landmarks = sample_landmarks(moving_cloud);
        self.moving_landmarks = Some(landmarks.points().to_vec());
        self.t = Similarity::identity();
        self.k = 0;
        log::trace!("moving cloud set, transform reset to identity");
    }

    /// Runs the convergence loop (§4.12) from the current accumulated
    /// transform until the incremental rotation and translation both fall
    /// under threshold, or `max_iterations` is reached.
    ///
    /// # Errors
    /// [`IcpError::EmptyInput`] if [`set_moving`](Self::set_moving) was
    /// never called; [`IcpError::InvalidIndex`] if the RBC index no longer
    /// matches the fixed cloud's landmarks; any other [`IcpError`] raised by
    /// the per-iteration solver. On error, the accumulated transform is left
    /// exactly as it was after the last successful iteration (§7) — the
    /// caller may adjust thresholds and call `register` again.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn register(&mut self) -> Result<RegistrationResult, IcpError> {
        let m_landmarks = self.moving_landmarks.clone().ok_or(IcpError::EmptyInput)?;
        if !self.rbc.matches(&self.f_landmarks) {
            return Err(IcpError::InvalidIndex);
        }

        let mut iterations = 0u32;
        let mut delta_angle_deg = f64::INFINITY;
        let mut delta_translation_mm = f64::INFINITY;

        while iterations < self.options.max_iterations {
            let outcome = self.step.step(&mut self.ctx, &m_landmarks, &self.rbc, &self.t)?;
            self.t = outcome.accumulated;
            self.k += 1;
            iterations += 1;
            delta_angle_deg = outcome.incremental.angle_deg().abs();
            delta_translation_mm = f64::from(outcome.incremental.t.norm());

            let converged = delta_angle_deg < self.options.angle_threshold_deg
                && delta_translation_mm < self.options.translation_threshold_mm;
            if converged {
                log::debug!("register: converged after {iterations} iterations (k={})", self.k);
                return Ok(RegistrationResult {
                    transform: self.t,
                    iterations,
                    converged: true,
                    delta_angle_deg,
                    delta_translation_mm,
                });
            }
        }

        log::warn!(
            "register: did not converge within {} iterations (k={})",
            self.options.max_iterations,
            self.k
        );
        Ok(RegistrationResult {
            transform: self.t,
            iterations,
            converged: false,
            delta_angle_deg,
            delta_translation_mm,
        })
    }

    /// Applies the current accumulated transform to the full-resolution
    /// moving cloud (not just its landmarks) and returns the result.
    ///
    /// # Errors
    /// [`IcpError::EmptyInput`] if [`set_moving`](Self::set_moving) was
    /// never called.
    pub fn transform_moving(&self, moving_cloud: &PointCloud) -> Result<PointCloud, IcpError> {
        if self.moving_landmarks.is_none() {
            return Err(IcpError::EmptyInput);
        }
        let transformed = apply_quaternion(moving_cloud.points(), &self.t);
        Ok(PointCloud::new(moving_cloud.width(), moving_cloud.height(), transformed))
    }

    /// The transform accumulated so far this session.
    #[must_use]
    pub const fn current_transform(&self) -> Similarity {
        self.t
    }

    /// The cumulative iteration count since the last [`set_moving`](Self::set_moving).
    #[must_use]
    pub const fn iterations_run(&self) -> u32 {
        self.k
    }
}
