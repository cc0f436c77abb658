use crate::{hexagonal, moore, neumann, radial, Error};

use boolinator::Boolinator;
use enum_iterator::IntoEnumIterator;
use itertools::Itertools;
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Relative position of a neighbor, one signed component per dimension.
pub type Offset = Vec<isize>;

/// How cells close to the border of the grid get their neighbors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoEnumIterator, Serialize, Deserialize)]
pub enum EdgeRule {
    /// Cells on the edge have no neighbors at all and never change.
    IgnoreEdgeCells,
    /// Cells on the edge only see the neighbors that exist inside the grid.
    IgnoreMissingNeighborsOfEdgeCells,
    /// Every dimension wraps around, so the grid behaves like a torus.
    FirstAndLastCellOfDimensionAreNeighbors,
}

impl EdgeRule {
    /// Iterate over every edge rule.
    pub fn all() -> impl Iterator<Item = EdgeRule> {
        EdgeRule::into_enum_iter()
    }

    pub fn name(self) -> &'static str {
        match self {
            EdgeRule::IgnoreEdgeCells => "ignore_edge_cells",
            EdgeRule::IgnoreMissingNeighborsOfEdgeCells => "ignore_missing_neighbors_of_edge_cells",
            EdgeRule::FirstAndLastCellOfDimensionAreNeighbors => {
                "first_and_last_cell_of_dimension_are_neighbors"
            }
        }
    }
}

impl Default for EdgeRule {
    fn default() -> Self {
        EdgeRule::IgnoreEdgeCells
    }
}

impl fmt::Display for EdgeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeRule::all()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| Error::UnknownEdgeRule(s.to_owned()))
    }
}

/// The shape of a neighborhood. The set is closed: every topology knows how to build its offsets.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Topology {
    /// Every cell of the `2r+1` hypercube around the center.
    Moore,
    /// Cells within Manhattan distance `r`.
    VonNeumann,
    /// Cells within Euclidean distance `r + delta`.
    Radial { delta: f64 },
    /// Hexagonal tiling laid out on a rectangular 2D grid, odd rows shifted right.
    Hexagonal,
}

impl Topology {
    /// Radial topology with the usual `0.25` tolerance.
    pub fn radial() -> Self {
        Topology::Radial { delta: 0.25 }
    }

    fn offsets(self, dimensions: usize, radius: usize) -> Offsets {
        match self {
            Topology::Moore => Offsets::Uniform(moore::offsets(dimensions, radius)),
            Topology::VonNeumann => Offsets::Uniform(neumann::offsets(dimensions, radius)),
            Topology::Radial { delta } => {
                Offsets::Uniform(radial::offsets(dimensions, radius, delta))
            }
            Topology::Hexagonal => {
                assert_eq!(
                    dimensions, 2,
                    "gridmaton::Topology::Hexagonal: only defined on 2D grids"
                );
                Offsets::RowParity(hexagonal::offsets(radius))
            }
        }
    }
}

/// Canonical relative offsets of a neighborhood, excluding the center.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Offsets {
    /// The same offsets apply to every cell.
    Uniform(Vec<Offset>),
    /// Offsets depend on the parity of the cell's second coordinate.
    RowParity([Vec<Offset>; 2]),
}

impl Offsets {
    /// Offsets that apply to the cell at `coordinate`.
    pub fn for_coordinate(&self, coordinate: &[usize]) -> &[Offset] {
        match self {
            Offsets::Uniform(offsets) => offsets,
            Offsets::RowParity(lists) => &lists[coordinate[1] % 2],
        }
    }
}

/// Enumerate the `[-radius, radius]^dimensions` window without its center.
///
/// The first axis varies fastest.
pub(crate) fn window(dimensions: usize, radius: usize) -> impl Iterator<Item = Offset> {
    let r = radius as isize;
    (0..dimensions)
        .map(move |_| -r..=r)
        .multi_cartesian_product()
        .map(|mut offset| {
            offset.reverse();
            offset
        })
        .filter(|offset| offset.iter().any(|&n| n != 0))
}

/// Maps a coordinate to the coordinates of its neighbors, under a topology and an edge rule.
///
/// Offsets are computed once per grid shape and cached, so one neighborhood can be shared
/// between automatons of different shapes.
pub struct Neighborhood {
    topology: Topology,
    edge_rule: EdgeRule,
    radius: usize,
    cache: RwLock<HashMap<Vec<usize>, Arc<Offsets>>>,
}

impl Neighborhood {
    /// Make a neighborhood. Panics if `radius` is zero.
    pub fn new(topology: Topology, edge_rule: EdgeRule, radius: usize) -> Self {
        assert!(
            radius >= 1,
            "gridmaton::Neighborhood::new: radius must be at least 1"
        );
        Neighborhood {
            topology,
            edge_rule,
            radius,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn moore(edge_rule: EdgeRule) -> Self {
        Self::new(Topology::Moore, edge_rule, 1)
    }

    pub fn von_neumann(edge_rule: EdgeRule) -> Self {
        Self::new(Topology::VonNeumann, edge_rule, 1)
    }

    pub fn radial(edge_rule: EdgeRule) -> Self {
        Self::new(Topology::radial(), edge_rule, 1)
    }

    pub fn hexagonal(edge_rule: EdgeRule) -> Self {
        Self::new(Topology::Hexagonal, edge_rule, 1)
    }

    /// Same neighborhood with another radius.
    pub fn with_radius(self, radius: usize) -> Self {
        Self::new(self.topology, self.edge_rule, radius)
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[inline]
    pub fn edge_rule(&self) -> EdgeRule {
        self.edge_rule
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Whether some component of `coordinate` lies within `radius` cells of a border.
    pub fn is_on_edge(coordinate: &[usize], grid_size: &[usize], radius: usize) -> bool {
        coordinate
            .iter()
            .zip(grid_size)
            .any(|(&c, &d)| c < radius || c + radius >= d)
    }

    /// Whether `coordinate` is on the edge for this neighborhood's radius.
    #[inline]
    pub fn touches_edge(&self, coordinate: &[usize], grid_size: &[usize]) -> bool {
        Self::is_on_edge(coordinate, grid_size, self.radius)
    }

    /// Canonical offsets for a grid of the given shape.
    pub fn offsets(&self, grid_size: &[usize]) -> Arc<Offsets> {
        if let Some(offsets) = self.cache.read().get(grid_size) {
            return Arc::clone(offsets);
        }
        debug!(
            "computing {:?} offsets of radius {} for grid {:?}",
            self.topology, self.radius, grid_size
        );
        let offsets = Arc::new(self.topology.offsets(grid_size.len(), self.radius));
        Arc::clone(
            self.cache
                .write()
                .entry(grid_size.to_vec())
                .or_insert(offsets),
        )
    }

    /// Absolute coordinates of the neighbors of `coordinate`.
    ///
    /// `coordinate` must lie inside `grid_size`. Every call returns a fresh iterator.
    pub fn get_neighbors_coordinates(
        &self,
        coordinate: &[usize],
        grid_size: &[usize],
    ) -> NeighborCoordinates {
        NeighborCoordinates {
            offsets: self.offsets(grid_size),
            coordinate: coordinate.to_vec(),
            grid_size: grid_size.to_vec(),
            edge_rule: self.edge_rule,
            on_edge: self.touches_edge(coordinate, grid_size),
            next: 0,
        }
    }
}

impl Clone for Neighborhood {
    fn clone(&self) -> Self {
        Neighborhood {
            topology: self.topology,
            edge_rule: self.edge_rule,
            radius: self.radius,
            cache: RwLock::new(self.cache.read().clone()),
        }
    }
}

impl fmt::Debug for Neighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neighborhood")
            .field("topology", &self.topology)
            .field("edge_rule", &self.edge_rule)
            .field("radius", &self.radius)
            .finish()
    }
}

impl PartialEq for Neighborhood {
    fn eq(&self, other: &Self) -> bool {
        self.topology == other.topology
            && self.edge_rule == other.edge_rule
            && self.radius == other.radius
    }
}

impl Default for Neighborhood {
    fn default() -> Self {
        Self::moore(EdgeRule::default())
    }
}

/// Iterator over the neighbors of one cell, see [`Neighborhood::get_neighbors_coordinates`].
#[derive(Clone, Debug)]
pub struct NeighborCoordinates {
    offsets: Arc<Offsets>,
    coordinate: Vec<usize>,
    grid_size: Vec<usize>,
    edge_rule: EdgeRule,
    on_edge: bool,
    next: usize,
}

impl NeighborCoordinates {
    fn translate(&self, offset: &[isize]) -> Option<Vec<usize>> {
        if !self.on_edge {
            return Some(
                self.coordinate
                    .iter()
                    .zip(offset)
                    .map(|(&c, &o)| (c as isize + o) as usize)
                    .collect(),
            );
        }
        let wrap = self.edge_rule == EdgeRule::FirstAndLastCellOfDimensionAreNeighbors;
        self.coordinate
            .iter()
            .zip(offset)
            .zip(&self.grid_size)
            .map(|((&c, &o), &d)| {
                let n = c as isize + o;
                let folded = n.rem_euclid(d as isize);
                (wrap || n == folded).as_some(folded as usize)
            })
            .collect()
    }
}

impl Iterator for NeighborCoordinates {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.on_edge && self.edge_rule == EdgeRule::IgnoreEdgeCells {
            return None;
        }
        loop {
            let neighbor = {
                let offset = self
                    .offsets
                    .for_coordinate(&self.coordinate)
                    .get(self.next)?;
                self.translate(offset)
            };
            self.next += 1;
            if neighbor.is_some() {
                return neighbor;
            }
        }
    }
}
