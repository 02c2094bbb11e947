//! C11 (the per-iteration `IcpStep` driver) and C12 (the `Icp` convergence
//! driver that loops it to a fixed point).

use crate::config::{RotationSolver, SessionOptions, Weighting};
use crate::error::IcpError;
use crate::kernels::covariance::cross_covariance;
use crate::kernels::deviation::deviate;
use crate::kernels::{mean, weight};
use crate::pipeline::PipelineContext;
use crate::point::Point8;
use crate::rbc::RbcIndex;
use crate::solver::{solve_power_method, solve_svd};
use crate::transform::{apply_quaternion, Similarity};

// =============================================================================
// C11: PER-ITERATION DRIVER
// =============================================================================

/// The transform produced by one [`IcpStep::step`] call: the incremental
/// `(R_k, t_k, s_k)` this iteration solved for, and the session transform
/// after composing it onto the value passed in (the "Writeback" of §4.11).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// The incremental transform this iteration solved for.
    pub incremental: Similarity,
    /// `incremental` composed after the transform passed into `step`.
    pub accumulated: Similarity,
}

/// Composes C4-C10 into the single per-iteration state machine: `Transform
/// -> NnQuery -> [Weigh] -> Mean -> Dev -> S -> Solve -> Accumulate ->
/// Writeback` (§4.11).
///
/// Configuration-family dispatch (rotation solver x weighting) happens
/// entirely inside `step`; the state machine itself never branches on which
/// cross-product is active.
#[derive(Debug, Clone, Copy)]
pub struct IcpStep {
    rotation_solver: RotationSolver,
    weighting: Weighting,
    c: f32,
}

impl IcpStep {
    /// Builds a driver from session options.
    #[must_use]
    pub fn new(options: &SessionOptions) -> Self {
        Self { rotation_solver: options.rotation_solver, weighting: options.weighting, c: options.c }
    }

    /// Runs one iteration of the pipeline.
    ///
    /// `m_landmarks` are the moving cloud's *untransformed* landmark
    /// positions (sampled once in `Session::set_moving`); `current` is the
    /// transform accumulated so far this session. `ctx`'s buffers are
    /// cleared and refilled in place.
    ///
    /// # Errors
    /// [`IcpError::InvalidIndex`] if `rbc` has no representatives;
    /// [`IcpError::EmptyInput`] if `m_landmarks` is empty;
    /// [`IcpError::Degenerate`] if the solver hits a degenerate
    /// configuration (§7).
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn step(
        &self,
        ctx: &mut PipelineContext,
        m_landmarks: &[Point8],
        rbc: &RbcIndex,
        current: &Similarity,
    ) -> Result<StepOutcome, IcpError> {
        if m_landmarks.is_empty() {
            return Err(IcpError::EmptyInput);
        }

        // Transform.
        log::trace!("icp step: transforming {} landmarks", m_landmarks.len());
        ctx.transformed.clear();
        ctx.transformed.extend(apply_quaternion(m_landmarks, current));

        // NnQuery.
        let pairs = rbc.query(&ctx.transformed)?;
        ctx.nn_points.clear();
        ctx.nn_sq_dist.clear();
        ctx.nn_points.extend(pairs.iter().map(|(p, _)| *p));
        ctx.nn_sq_dist.extend(pairs.iter().map(|(_, d)| *d));

        // [Weigh]
        if matches!(self.weighting, Weighting::Weighted) {
            let (w, sum_w) = weight::weigh(&ctx.nn_sq_dist)?;
            ctx.weights.clear();
            ctx.weights.extend(w);
            ctx.sum_w = sum_w;
        } else {
            ctx.weights.clear();
            ctx.sum_w = 0.0;
        }
        let weights_ref: Option<&[f32]> =
            matches!(self.weighting, Weighting::Weighted).then_some(&ctx.weights[..]);

        let f_xyz: Vec<[f32; 3]> = ctx.nn_points.iter().map(Point8::xyz).collect();
        let m_xyz: Vec<[f32; 3]> = ctx.transformed.iter().map(Point8::xyz).collect();

        // Mean.
        let (f_mean, m_mean) = match weights_ref {
            Some(w) => mean::mean_weighted(&f_xyz, &m_xyz, w, ctx.sum_w)?,
            None => mean::mean_regular(&f_xyz, &m_xyz)?,
        };

        // Dev.
        let dev_f = deviate(&f_xyz, f_mean);
        let dev_m = deviate(&m_xyz, m_mean);

        // S.
        let frame = cross_covariance(&dev_m, &dev_f, weights_ref, self.c)?;

        // Solve.
        let incremental = match self.rotation_solver {
            RotationSolver::Svd => solve_svd(&frame, f_mean, m_mean),
            RotationSolver::PowerMethod => solve_power_method(&frame, f_mean, m_mean),
        }
        .inspect_err(|err| log::warn!("icp step: solver failed: {err}"))?;

        // Accumulate + Writeback.
        let accumulated = incremental.compose_after(current);
        log::debug!(
            "icp step done: incremental angle={:.5} deg, |t|={:.5} mm, s={:.6}",
            incremental.angle_deg(),
            incremental.t.norm(),
            incremental.s
        );

        Ok(StepOutcome { incremental, accumulated })
    }
}

// =============================================================================
// C12: CONVERGENCE DRIVER
// =============================================================================

/// Final report from running [`Icp::run`] to completion or to the
/// iteration cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceReport {
    /// The session transform after the last successful iteration.
    pub transform: Similarity,
    /// Number of iterations actually run.
    pub iterations: u32,
    /// Whether the thresholds were met before the iteration cap.
    pub converged: bool,
    /// Incremental angle (degrees) of the final iteration run.
    pub delta_angle_deg: f64,
    /// Incremental translation (mm) of the final iteration run.
    pub delta_translation_mm: f64,
}

/// Loops [`IcpStep::step`] until the incremental rotation and translation
/// both fall under threshold, or `max_iterations` is reached (§4.12).
#[derive(Debug, Clone, Copy)]
pub struct Icp {
    step: IcpStep,
    max_iterations: u32,
    angle_threshold_deg: f64,
    translation_threshold_mm: f64,
}

impl Icp {
    /// Builds a convergence driver from session options.
    #[must_use]
    pub fn new(options: &SessionOptions) -> Self {
        Self {
            step: IcpStep::new(options),
            max_iterations: options.max_iterations,
            angle_threshold_deg: options.angle_threshold_deg,
            translation_threshold_mm: options.translation_threshold_mm,
        }
    }

    /// Runs the convergence loop starting from `initial`, reusing `ctx`'s
    /// buffers across every iteration.
    ///
    /// Errors propagate immediately and leave `ConvergenceReport` out of
    /// reach; callers that need the partially-accumulated transform on
    /// failure should track it themselves between `step` calls instead (see
    /// [`crate::session::Session::register`], which does exactly this).
    ///
    /// # Errors
    /// Any [`IcpError`] raised by [`IcpStep::step`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn run(
        &self,
        ctx: &mut PipelineContext,
        m_landmarks: &[Point8],
        rbc: &RbcIndex,
        initial: Similarity,
    ) -> Result<ConvergenceReport, IcpError> {
        let mut current = initial;
        let mut delta_angle_deg = f64::INFINITY;
        let mut delta_translation_mm = f64::INFINITY;
        let mut iterations = 0u32;

        while iterations < self.max_iterations {
            let outcome = self.step.step(ctx, m_landmarks, rbc, &current)?;
            current = outcome.accumulated;
            delta_angle_deg = outcome.incremental.angle_deg().abs();
            delta_translation_mm = f64::from(outcome.incremental.t.norm());
            iterations += 1;

            let converged =
                delta_angle_deg < self.angle_threshold_deg && delta_translation_mm < self.translation_threshold_mm;
            if converged {
                log::debug!("icp converged after {iterations} iterations");
                return Ok(ConvergenceReport {
                    transform: current,
                    iterations,
                    converged: true,
                    delta_angle_deg,
                    delta_translation_mm,
                });
            }
        }

        log::warn!("icp did not converge within {} iterations", self.max_iterations);
        Ok(ConvergenceReport {
            transform: current,
            iterations,
            converged: false,
            delta_angle_deg,
            delta_translation_mm,
        })
    }
}
