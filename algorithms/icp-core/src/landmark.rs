//! C3: deterministic down-sampling from the full sensor grid to a landmark
//! grid, and from landmarks to RBC representatives.

use crate::error::IcpError;
use crate::point::{Point8, PointCloud};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Landmark grid side length (128x128 = 16384 points, §3).
pub const LANDMARK_SIDE: usize = 128;
/// Total landmark count.
pub const LANDMARK_LEN: usize = LANDMARK_SIDE * LANDMARK_SIDE;

const WINDOW_ROW_START: usize = 48;
const WINDOW_COL_START: usize = 64;
const ROW_STEP: usize = 3;
const COL_STEP: usize = 4;
const ROW_OFFSET: usize = 1;
const COL_OFFSET: usize = 2;

// =============================================================================
// LANDMARK SET
// =============================================================================

/// An ordered 128x128 subsampling of a [`PointCloud`], cardinality exactly
/// [`LANDMARK_LEN`].
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point8>,
}

impl LandmarkSet {
    /// Landmark points, row-major.
    #[must_use]
    pub fn points(&self) -> &[Point8] {
        &self.points
    }

    /// Landmark count (always [`LANDMARK_LEN`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Deterministically down-samples a full-resolution cloud to a 128x128
/// landmark grid.
///
/// Takes the fixed central window (rows 48..432, cols 64..576), stepping 3
/// in y and 4 in x with offsets (+1, +2), so the output has exactly
/// [`LANDMARK_LEN`] points regardless of cloud content (§4.3).
#[must_use]
pub fn sample_landmarks(cloud: &PointCloud) -> LandmarkSet {
    let mut points = Vec::with_capacity(LANDMARK_LEN);
    for row in 0..LANDMARK_SIDE {
        let src_row = WINDOW_ROW_START + row * ROW_STEP + ROW_OFFSET;
        for col in 0..LANDMARK_SIDE {
            let src_col = WINDOW_COL_START + col * COL_STEP + COL_OFFSET;
            points.push(cloud.at(src_row, src_col));
        }
    }
    LandmarkSet { points }
}

// =============================================================================
// REPRESENTATIVE SET
// =============================================================================

/// An ordered `nr`-subsampling of a [`LandmarkSet`]; `nr` is a power of two
/// and a multiple of four.
#[derive(Debug, Clone, PartialEq)]
pub struct RepresentativeSet {
    points: Vec<Point8>,
}

impl RepresentativeSet {
    /// Representative points, row-major over the `(nr_y, nr_x)` tile grid.
    #[must_use]
    pub fn points(&self) -> &[Point8] {
        &self.points
    }

    /// Representative count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

fn validate_nr(nr: usize) -> Result<(), IcpError> {
    if nr == 0 || !nr.is_power_of_two() || !nr.is_multiple_of(4) {
        return Err(IcpError::InvalidArity { nr });
    }
    Ok(())
}

/// Picks the middle element of each `(128/nr_x) x (128/nr_y)` sub-tile of
/// the landmark grid, where `nr_y = 2^floor(log2(nr)/2)` and
/// `nr_x = nr / nr_y` (§4.3).
///
/// # Errors
/// [`IcpError::InvalidArity`] if `nr` is not a power of two or not a
/// multiple of four.
pub fn sample_representatives(
    landmarks: &LandmarkSet,
    nr: usize,
) -> Result<RepresentativeSet, IcpError> {
    validate_nr(nr)?;

    let log2_nr = nr.trailing_zeros();
    let nr_y = 1usize << (log2_nr / 2);
    let nr_x = nr / nr_y;

    let tile_w = LANDMARK_SIDE / nr_x;
    let tile_h = LANDMARK_SIDE / nr_y;

    let mut points = Vec::with_capacity(nr);
    for ty in 0..nr_y {
        let mid_row = ty * tile_h + tile_h / 2;
        for tx in 0..nr_x {
            let mid_col = tx * tile_w + tile_w / 2;
            points.push(landmarks.points[mid_row * LANDMARK_SIDE + mid_col]);
        }
    }
    Ok(RepresentativeSet { points })
}
