//! Moore neighborhoods: the full hypercube around a cell.

use crate::neighborhood::{window, Offset};

/// Every nonzero offset in `[-radius, radius]^dimensions`.
///
/// A 2D neighborhood of radius `r` has `(2r+1)^2 - 1` cells.
pub(crate) fn offsets(dimensions: usize, radius: usize) -> Vec<Offset> {
    window(dimensions, radius).collect()
}
