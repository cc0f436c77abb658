//! Von Neumann neighborhoods: cells within a Manhattan distance.

use crate::neighborhood::{window, Offset};

/// Nonzero offsets whose components add up, in absolute value, to at most `radius`.
pub(crate) fn offsets(dimensions: usize, radius: usize) -> Vec<Offset> {
    window(dimensions, radius)
        .filter(|offset| offset.iter().map(|n| n.unsigned_abs()).sum::<usize>() <= radius)
        .collect()
}
