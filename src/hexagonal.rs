//! Hexagonal neighborhoods on a rectangular 2D grid.
//!
//! Odd rows (odd second coordinate) are shifted half a cell to the right, so the two row
//! parities need distinct offset lists.

use crate::neighborhood::Offset;

use std::collections::BTreeSet;

type Pair = (isize, isize);

/// Offset lists for even and odd rows, sorted by `(y, x)`.
///
/// Each radius step grows the previous ring by one orthogonal step and then fills the
/// rectangular band that approximates the next hex ring.
pub(crate) fn offsets(radius: usize) -> [Vec<Offset>; 2] {
    let mut lists: [Vec<Pair>; 2] = [vec![(0, 0)], vec![(0, 0)]];
    for step in 1..=radius as isize {
        for (parity, list) in lists.iter_mut().enumerate() {
            let shift = if parity == 1 { step / 2 } else { (step + 1) / 2 };
            let mut cells: BTreeSet<Pair> = list.iter().copied().collect();
            for &(x, y) in list.iter() {
                cells.extend(&[(x, y - 1), (x - 1, y), (x + 1, y), (x, y + 1)]);
            }
            for x in 0..=step {
                for y in -step..=step {
                    cells.insert((x - shift, y));
                }
            }
            cells.remove(&(0, 0));
            let mut sorted: Vec<Pair> = cells.into_iter().collect();
            sorted.sort_by_key(|&(x, y)| (y, x));
            *list = sorted;
        }
    }
    let [even, odd] = lists;
    [to_offsets(even), to_offsets(odd)]
}

fn to_offsets(pairs: Vec<Pair>) -> Vec<Offset> {
    pairs.into_iter().map(|(x, y)| vec![x, y]).collect()
}
