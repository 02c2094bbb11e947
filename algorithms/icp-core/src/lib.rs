//! Pairwise rigid-plus-scale registration of two organized point clouds.
//!
//! This crate implements Horn's absolute-orientation method driven by an
//! approximate nearest-neighbour index (a Random-Ball-Cover over a
//! subsampled landmark grid), in the style of consumer-depth-camera
//! registration pipelines: a fixed cloud is indexed once, and any number of
//! moving clouds can then be registered against it.
//!
//! ```no_run
//! use icp_core::{PointCloud, Session, SessionOptionsBuilder};
//!
//! # fn load_fixed() -> Vec<f32> { vec![0.0; icp_core::CLOUD_LEN * icp_core::POINT_LANES] }
//! # fn load_moving() -> Vec<f32> { vec![0.0; icp_core::CLOUD_LEN * icp_core::POINT_LANES] }
//! # fn main() -> Result<(), icp_core::IcpError> {
//! let fixed = PointCloud::from_row_major_f32(&load_fixed());
//! let moving = PointCloud::from_row_major_f32(&load_moving());
//!
//! let options = SessionOptionsBuilder::new().build()?;
//! let mut session = Session::new(&fixed, options)?;
//! session.set_moving(&moving);
//!
//! let result = session.register()?;
//! let aligned = session.transform_moving(&moving)?;
//! # let _ = (result, aligned);
//! # Ok(())
//! # }
//! ```
//!
//! # Crate layout
//!
//! - [`point`]: the fixed-layout point and organized-cloud data model (§3).
//! - [`kernels`]: the row-wise data-parallel primitives (reduction, scan,
//!   weighting, mean, deviation, cross-covariance) every pipeline stage is
//!   built from.
//! - [`landmark`]: deterministic down-sampling from the sensor grid to the
//!   landmark grid and from landmarks to RBC representatives.
//! - [`rbc`]: the nearest-neighbour index and its distance metric.
//! - [`transform`]: the similarity transform type and its application to a
//!   point set.
//! - [`solver`]: extracting an incremental transform from a cross-covariance
//!   frame, via SVD or power iteration.
//! - [`driver`]: the per-iteration state machine and the convergence loop
//!   built on top of it.
//! - [`session`]: the public entry point gluing the above into a
//!   register-many-moving-clouds-against-one-fixed-cloud session.
pub mod config;
pub mod driver;
pub mod error;
pub mod kernels;
pub mod landmark;
pub mod pipeline;
pub mod point;
pub mod rbc;
pub mod session;
pub mod solver;
pub mod transform;

pub use config::{RotationSolver, SessionOptions, SessionOptionsBuilder, Weighting};
pub use driver::{ConvergenceReport, Icp, IcpStep, StepOutcome};
pub use error::{IcpError, IcpResult};
pub use landmark::{sample_landmarks, sample_representatives, LandmarkSet, RepresentativeSet};
pub use pipeline::PipelineContext;
pub use point::{Point8, PointCloud, CLOUD_HEIGHT, CLOUD_LEN, CLOUD_WIDTH, POINT_LANES};
pub use rbc::{kinect_distance, RbcIndex};
pub use session::{RegistrationResult, Session};
pub use transform::{apply_matrix, apply_quaternion, Similarity};
