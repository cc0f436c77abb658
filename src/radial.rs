//! Radial neighborhoods: cells within a Euclidean distance.

use crate::neighborhood::{window, Offset};

/// Nonzero offsets whose Euclidean norm is at most `radius + delta`.
pub(crate) fn offsets(dimensions: usize, radius: usize, delta: f64) -> Vec<Offset> {
    let limit = radius as f64 + delta;
    window(dimensions, radius)
        .filter(|offset| {
            let squared: isize = offset.iter().map(|n| n * n).sum();
            (squared as f64).sqrt() <= limit
        })
        .collect()
}
