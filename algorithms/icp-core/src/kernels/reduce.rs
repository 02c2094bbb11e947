//! C1: row-wise associative reduction (min / max / sum) over large arrays.
//!
//! Every row is folded by the same two-phase tree: an intra-block pairwise
//! combine over `BLOCK_ELEMS`-sized chunks, then an inter-block pairwise
//! combine of the block partials. Both phases use [`super::tree_combine`],
//! so the result is deterministic for a fixed block size regardless of how
//! many worker threads ran it.

use super::{map_rows, tree_combine, validate_shape, BLOCK_ELEMS};
use crate::error::IcpError;

// =============================================================================
// ROW REDUCTION CORE
// =============================================================================

fn reduce_row<E: Copy, T: Copy, F>(row: &[E], identity: T, lift: F, combine: fn(T, T) -> T) -> T
where
    F: Fn(E) -> T,
{
    let block_partials: Vec<T> = row
        .chunks(BLOCK_ELEMS)
        .map(|block| {
            let lifted: Vec<T> = block.iter().map(|&x| lift(x)).collect();
            tree_combine(&lifted, identity, combine)
        })
        .collect();
    tree_combine(&block_partials, identity, combine)
}

// =============================================================================
// PUBLIC KERNELS
// =============================================================================

/// Row-wise minimum of an `f32` array, exact.
///
/// # Errors
/// [`IcpError::InvalidShape`] if `cols` isn't a multiple of four (or is less
/// than four); [`IcpError::SizeExceeded`] if `cols` overflows the two-level
/// tree's fan-in.
pub fn reduce_min_f32(data: &[f32], rows: usize, cols: usize) -> Result<Vec<f32>, IcpError> {
    validate_shape(cols)?;
    Ok(map_rows(data, rows, cols, |row| {
        reduce_row(row, f32::INFINITY, |x| x, f32::min)
    }))
}

/// Row-wise maximum of a `u32` array, exact.
///
/// # Errors
/// Same preconditions as [`reduce_min_f32`].
pub fn reduce_max_u32(data: &[u32], rows: usize, cols: usize) -> Result<Vec<u32>, IcpError> {
    validate_shape(cols)?;
    Ok(map_rows(data, rows, cols, |row| reduce_row(row, 0u32, |x| x, u32::max)))
}

/// Row-wise sum of an `f32` array, accumulated in `f32`.
///
/// # Errors
/// Same preconditions as [`reduce_min_f32`].
pub fn reduce_sum_f32(data: &[f32], rows: usize, cols: usize) -> Result<Vec<f32>, IcpError> {
    validate_shape(cols)?;
    Ok(map_rows(data, rows, cols, |row| reduce_row(row, 0.0f32, |x| x, |a, b| a + b)))
}

/// Row-wise sum of an `f32` array, width-promoted to `f64` partials for
/// accuracy on large rows.
///
/// # Errors
/// Same preconditions as [`reduce_min_f32`].
pub fn reduce_sum_f32_widening(
    data: &[f32],
    rows: usize,
    cols: usize,
) -> Result<Vec<f64>, IcpError> {
    validate_shape(cols)?;
    Ok(map_rows(data, rows, cols, |row| {
        reduce_row(row, 0.0f64, |x| f64::from(x), |a, b| a + b)
    }))
}
