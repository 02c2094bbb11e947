//! Data-parallel kernels (C1-C9): the row-wise primitives every pipeline
//! stage is built from.
//!
//! Every kernel here is dispatched the same way: with the `parallel` feature
//! (the default) rows are partitioned across a `rayon` pool standing in for
//! the accelerator's workgroup queue; without it, the identical algorithm
//! runs on a single thread. The numerical result is unaffected by which path
//! runs, since the tree shape within a row is fixed either way.

use crate::error::IcpError;

pub mod covariance;
pub mod deviation;
pub mod mean;
pub mod reduce;
pub mod scan;
pub mod weight;

// =============================================================================
// SHARED SHAPE CONSTANTS
// =============================================================================

/// SIMD lane width the two-level tree is sized around.
pub const LANE_WIDTH: usize = 4;
/// Elements handled by a single workgroup/block (`8 * lane_width`, §4.1).
pub const BLOCK_ELEMS: usize = 8 * LANE_WIDTH;
/// Maximum number of blocks a single row's reduction tree supports.
pub const MAX_BLOCKS_PER_ROW: usize = 8 * LANE_WIDTH;
/// Maximum column count a single-pass reduce/scan can service.
pub const MAX_COLS: usize = BLOCK_ELEMS * MAX_BLOCKS_PER_ROW;

/// Shared precondition check for every row-wise primitive in this module:
/// `cols` must be a multiple of four (and at least four), and must fit the
/// two-level tree's fan-in.
pub(crate) fn validate_shape(cols: usize) -> Result<(), IcpError> {
    if cols < 4 || !cols.is_multiple_of(4) {
        return Err(IcpError::InvalidShape { cols });
    }
    if cols > MAX_COLS {
        return Err(IcpError::SizeExceeded { cols, max_cols: MAX_COLS });
    }
    Ok(())
}

/// Deterministic pairwise tree combine over a slice, folding down to one
/// value. Used for both the intra-block and inter-block reduction phases so
/// the result only ever depends on `values` and the fixed block size, never
/// on how many worker threads ran it.
pub(crate) fn tree_combine<T: Copy>(values: &[T], identity: T, combine: fn(T, T) -> T) -> T {
    if values.is_empty() {
        return identity;
    }
    let mut level = values.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut pairs = level.chunks(2);
        for pair in &mut pairs {
            if pair.len() == 2 {
                next.push(combine(pair[0], pair[1]));
            } else {
                next.push(pair[0]);
            }
        }
        level = next;
    }
    level[0]
}

/// Maps `rows` independent row-slices of `data` (each `cols` wide) through
/// `f`, across the worker pool when the `parallel` feature is enabled.
pub(crate) fn map_rows<E, T, F>(data: &[E], rows: usize, cols: usize, f: F) -> Vec<T>
where
    E: Sync,
    F: Fn(&[E]) -> T + Sync + Send,
    T: Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        data.par_chunks(cols).take(rows).map(|row| f(row)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        data.chunks(cols).take(rows).map(|row| f(row)).collect()
    }
}
