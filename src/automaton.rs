use crate::{Cell, Error, Grid, Neighborhood, Result, Rule, RuleSet, State};

use log::trace;
use ndarray::{ArrayD, Dimension, IxDyn};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use std::fmt;

/// A grid of cells, the states they may take and the rules that advance them.
///
/// Every generation is produced only from the previous one: rules read the automaton through a
/// shared reference while the next grid is being built, and the grid is swapped in once all
/// cells are computed.
#[derive(Clone, Debug)]
pub struct Automaton {
    states: Vec<State>,
    grid: Grid,
    default_value: Cell,
    rules: RuleSet,
    neighborhood: Neighborhood,
}

impl Automaton {
    /// Make a new automaton with every cell set to `default_value`.
    ///
    /// Panics if `grid_size` is empty or has a zero extent.
    pub fn new(grid_size: &[usize], default_value: Cell) -> Self {
        assert!(
            !grid_size.is_empty() && grid_size.iter().all(|&d| d >= 1),
            "gridmaton::Automaton::new: grid is empty, which isn't allowed"
        );
        Automaton {
            states: Vec::new(),
            grid: ArrayD::from_elem(IxDyn(grid_size), default_value.clone()),
            default_value,
            rules: RuleSet::default(),
            neighborhood: Neighborhood::default(),
        }
    }

    /// Shape of the grid, one extent per dimension.
    #[inline]
    pub fn grid_size(&self) -> &[usize] {
        self.grid.shape()
    }

    /// Extent of the first dimension.
    #[inline]
    pub fn length(&self) -> usize {
        self.grid_size()[0]
    }

    /// Extent of the second dimension, or 1 for a one-dimensional grid.
    #[inline]
    pub fn width(&self) -> usize {
        self.grid_size().get(1).copied().unwrap_or(1)
    }

    #[inline]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn set_states(&mut self, states: Vec<State>) {
        self.states = states;
    }

    #[inline]
    pub fn default_value(&self) -> &Cell {
        &self.default_value
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Get the grid mutably, for seeding patterns by hand.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Replace the whole grid. Its shape must match the automaton's.
    pub fn set_grid(&mut self, grid: Grid) -> Result<()> {
        if grid.shape() != self.grid_size() {
            return Err(Error::ShapeMismatch {
                expected: self.grid_size().to_vec(),
                found: grid.shape().to_vec(),
            });
        }
        self.grid = grid;
        Ok(())
    }

    /// The state at `coordinate`, if the cell is in bounds and set.
    #[inline]
    pub fn cell(&self, coordinate: &[usize]) -> Option<&State> {
        self.grid.get(coordinate).and_then(Option::as_ref)
    }

    /// Set one cell. Panics if `coordinate` is out of bounds.
    #[inline]
    pub fn set_cell(&mut self, coordinate: &[usize], cell: Cell) {
        self.grid[coordinate] = cell;
    }

    #[inline]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Use `rule` as the only rule.
    pub fn set_rule<R: Rule + 'static>(&mut self, rule: R) {
        self.rules = RuleSet::single(rule);
    }

    pub fn set_rules(&mut self, rules: RuleSet) {
        self.rules = rules;
    }

    /// The neighborhood rules are expected to count with.
    #[inline]
    pub fn neighborhood(&self) -> &Neighborhood {
        &self.neighborhood
    }

    pub fn set_neighborhood(&mut self, neighborhood: Neighborhood) {
        self.neighborhood = neighborhood;
    }

    /// Draw every cell uniformly from the states.
    ///
    /// Does nothing if there are no states.
    pub fn random_initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.states.is_empty() {
            return;
        }
        let states = &self.states;
        self.grid
            .iter_mut()
            .for_each(|cell| *cell = states.choose(rng).cloned());
    }

    /// Reset every cell to the default value.
    pub fn clear_grid(&mut self) {
        self.grid.fill(self.default_value.clone());
    }

    /// Advance one generation with the configured rules.
    pub fn apply_rule(&mut self) {
        self.grid = self.next_generation(&self.rules);
    }

    /// Advance one generation with the given rules instead of the configured ones.
    pub fn apply_rules(&mut self, rules: &RuleSet) {
        self.grid = self.next_generation(rules);
    }

    fn next_generation(&self, rules: &RuleSet) -> Grid {
        trace!(
            "computing generation of {:?} with {} rules",
            self.grid_size(),
            rules.len()
        );
        if rules.is_empty() {
            return self.grid.clone();
        }
        let cells: Vec<(IxDyn, &Cell)> = self.grid.indexed_iter().collect();
        let next: Vec<Cell> = cells
            .into_par_iter()
            .map(|(index, cell)| rules.evaluate(self, index.slice(), cell))
            .collect();
        let mut grid = ArrayD::from_elem(self.grid.raw_dim(), None);
        grid.iter_mut().zip(next).for_each(|(slot, cell)| *slot = cell);
        grid
    }

    /// Whether `coordinate` lies within `radius` cells of a border.
    #[inline]
    pub fn is_on_edge(&self, coordinate: &[usize], radius: usize) -> bool {
        Neighborhood::is_on_edge(coordinate, self.grid_size(), radius)
    }

    /// Count the neighbors of `coordinate` whose state is one of `states`.
    ///
    /// States are compared by value.
    pub fn count_neighbors(
        &self,
        neighborhood: &Neighborhood,
        coordinate: &[usize],
        states: &[State],
    ) -> usize {
        neighborhood
            .get_neighbors_coordinates(coordinate, self.grid_size())
            .filter(|neighbor| {
                self.grid[neighbor.as_slice()]
                    .as_ref()
                    .map_or(false, |state| states.contains(state))
            })
            .count()
    }
}

impl PartialEq for Automaton {
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states && self.grid == other.grid
    }
}

impl fmt::Display for Automaton {
    /// Write state names separated by spaces, one row of the last axis per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.grid.rows() {
            for cell in row {
                match cell {
                    Some(state) => write!(f, "{} ", state.name())?,
                    None => f.write_str("_ ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeRule, RulePolicy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn state() -> State {
        State::new("state", "#000")
    }

    fn dumb(length: usize, width: usize) -> Automaton {
        let mut automaton = Automaton::new(&[length, width], Some(state()));
        automaton.set_states(vec![state()]);
        automaton
    }

    #[test]
    fn init() {
        let automaton = dumb(2, 3);
        assert_eq!(automaton.grid_size(), &[2, 3]);
        assert_eq!(automaton.length(), 2);
        assert_eq!(automaton.width(), 3);
        assert_eq!(automaton.states(), &[state()]);
        assert!(automaton.grid().iter().all(|c| c.as_ref() == Some(&state())));
    }

    #[test]
    fn display() {
        assert_eq!(dumb(2, 3).to_string(), "state state state \nstate state state \n");
        let empty = Automaton::new(&[1, 2], None);
        assert_eq!(empty.to_string(), "_ _ \n");
    }

    #[test]
    fn equality_ignores_rules() {
        let a = dumb(2, 3);
        let mut b = dumb(2, 3);
        b.set_rule(|_: &Automaton, _: &[usize]| -> Cell { None });
        assert_eq!(a, b);
        b.set_cell(&[1, 2], None);
        assert_ne!(a, b);
    }

    #[test]
    fn random_initialize() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut automaton = dumb(2, 3);
        automaton.grid_mut().fill(None);
        automaton.set_states(Vec::new());
        automaton.random_initialize(&mut rng);
        assert!(automaton.grid().iter().all(Option::is_none));

        automaton.set_states(vec![state()]);
        automaton.random_initialize(&mut rng);
        assert!(automaton.grid().iter().all(|c| c.as_ref() == Some(&state())));
    }

    #[test]
    fn random_initialize_is_seedable() {
        let states = vec![State::new("a", "#000"), State::new("b", "#FFF")];
        let mut a = Automaton::new(&[8, 8], None);
        let mut b = Automaton::new(&[8, 8], None);
        a.set_states(states.clone());
        b.set_states(states);
        a.random_initialize(&mut StdRng::seed_from_u64(42));
        b.random_initialize(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.grid().iter().all(Option::is_some));
    }

    #[test]
    #[should_panic(expected = "grid is empty, which isn't allowed")]
    fn zero_extent_grid_panics() {
        Automaton::new(&[3, 0], None);
    }

    #[test]
    fn apply_rule_visits_every_cell_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lol = State::new("lol", "#F00");
        let output = lol.clone();
        let mut automaton = dumb(2, 3);
        automaton.set_rule(move |_: &Automaton, _: &[usize]| -> Cell {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(output.clone())
        });
        automaton.apply_rule();
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert!(automaton.grid().iter().all(|c| c.as_ref() == Some(&lol)));
    }

    #[test]
    fn identity_rule_keeps_grid() {
        let mut automaton = Automaton::new(&[4, 5], None);
        automaton.set_states(vec![State::new("a", "#000"), State::new("b", "#FFF")]);
        automaton.random_initialize(&mut StdRng::seed_from_u64(3));
        let before = automaton.grid().clone();
        automaton.set_rule(|a: &Automaton, c: &[usize]| -> Cell { a.cell(c).cloned() });
        automaton.apply_rule();
        assert_eq!(automaton.grid(), &before);
    }

    #[test]
    fn rules_read_the_previous_generation() {
        // Shift everything one cell down the first axis, wrapping around.
        let on = State::new("on", "#000");
        let mut automaton = Automaton::new(&[4], None);
        automaton.set_cell(&[0], Some(on.clone()));
        automaton.set_rule(|a: &Automaton, c: &[usize]| -> Cell {
            let previous = (c[0] + a.length() - 1) % a.length();
            a.cell(&[previous]).cloned()
        });
        automaton.apply_rule();
        assert_eq!(automaton.cell(&[1]), Some(&on));
        assert_eq!(automaton.grid().iter().filter(|c| c.is_some()).count(), 1);
    }

    #[test]
    fn generation_is_independent_of_thread_count() {
        let a = State::new("a", "#000");
        let b = State::new("b", "#FFF");
        let mut automaton = Automaton::new(&[16, 12], None);
        automaton.set_states(vec![a.clone(), b.clone()]);
        automaton.set_neighborhood(Neighborhood::moore(
            EdgeRule::FirstAndLastCellOfDimensionAreNeighbors,
        ));
        automaton.random_initialize(&mut StdRng::seed_from_u64(11));
        automaton.set_rule(move |x: &Automaton, c: &[usize]| -> Cell {
            let n = x.count_neighbors(x.neighborhood(), c, std::slice::from_ref(&a));
            Some(if n % 2 == 1 { a.clone() } else { b.clone() })
        });

        let mut single = automaton.clone();
        rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(|| single.apply_rule());
        automaton.apply_rule();
        assert_eq!(automaton, single);
    }

    #[test]
    fn without_rules_nothing_changes() {
        let mut automaton = dumb(3, 3);
        automaton.apply_rule();
        assert_eq!(automaton, dumb(3, 3));
    }

    #[test]
    fn rule_policies() {
        let a = State::new("a", "#000");
        let b = State::new("b", "#111");
        let c = State::new("c", "#222");
        let keep = |x: &Automaton, coord: &[usize]| -> Cell { x.cell(coord).cloned() };
        let to = |state: &State| {
            let state = state.clone();
            move |_: &Automaton, _: &[usize]| -> Cell { Some(state.clone()) }
        };

        let first = RuleSet::new(RulePolicy::FirstChangeWins)
            .with(keep)
            .with(to(&b))
            .with(to(&c));
        let mut automaton = Automaton::new(&[2, 2], Some(a.clone()));
        automaton.apply_rules(&first);
        assert!(automaton.grid().iter().all(|x| x.as_ref() == Some(&b)));

        let last = RuleSet::new(RulePolicy::LastRuleWins)
            .with(to(&b))
            .with(to(&c));
        automaton.apply_rules(&last);
        assert!(automaton.grid().iter().all(|x| x.as_ref() == Some(&c)));

        // The last rule decides even when it keeps the cell as it was.
        let mut automaton = Automaton::new(&[1, 1], Some(a.clone()));
        automaton.apply_rules(&RuleSet::new(RulePolicy::LastRuleWins).with(to(&b)).with(keep));
        assert_eq!(automaton.cell(&[0, 0]), Some(&a));
        automaton.apply_rules(&RuleSet::new(RulePolicy::FirstChangeWins).with(to(&b)).with(keep));
        assert_eq!(automaton.cell(&[0, 0]), Some(&b));
    }

    #[test]
    fn cells_keep_their_coordinates_in_three_dimensions() {
        let mut automaton = Automaton::new(&[2, 3, 4], None);
        automaton.set_rule(|_: &Automaton, c: &[usize]| -> Cell {
            Some(State::new(format!("{:?}", c), "#000"))
        });
        automaton.apply_rule();
        for (index, cell) in automaton.grid().indexed_iter() {
            let expected = format!("{:?}", index.slice());
            assert_eq!(cell.as_ref().map(State::name), Some(expected.as_str()));
        }
    }

    #[test]
    fn clear_grid() {
        let mut automaton = dumb(2, 2);
        automaton.grid_mut().fill(None);
        automaton.clear_grid();
        assert_eq!(automaton, dumb(2, 2));
    }

    #[test]
    fn set_grid_checks_shape() {
        let mut automaton = dumb(2, 3);
        assert!(matches!(
            automaton.set_grid(ArrayD::from_elem(IxDyn(&[3, 2]), None)),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(automaton.set_grid(ArrayD::from_elem(IxDyn(&[2, 3]), None)).is_ok());
    }

    #[test]
    fn is_on_edge_with_radius_two() {
        let automaton = Automaton::new(&[5, 6], None);
        for x in 0..5 {
            for y in 0..6 {
                let inner = x == 2 && (y == 2 || y == 3);
                assert_eq!(automaton.is_on_edge(&[x, y], 2), !inner, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn count_neighbors() {
        let automaton = dumb(4, 3);
        let neighborhood = Neighborhood::moore(EdgeRule::IgnoreMissingNeighborsOfEdgeCells);
        let allowed = [state()];
        let cases = [([0, 0], 3), ([0, 1], 5), ([1, 1], 8), ([2, 2], 5), ([3, 2], 3)];
        for &(coordinate, expected) in &cases {
            assert_eq!(
                automaton.count_neighbors(&neighborhood, &coordinate, &allowed),
                expected,
                "{:?}",
                coordinate
            );
        }
        assert_eq!(
            automaton.count_neighbors(&neighborhood, &[1, 1], &[State::new("other", "#000")]),
            0
        );
    }
}
