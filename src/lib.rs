//! Gridmaton is a library intended to run cellular automatons on n-dimensional grids.
//!
//! An [`Automaton`] holds a dense grid of [`State`]s, the states it may take, a [`Neighborhood`]
//! and a set of rules. Every generation is produced from the previous one only, so the order in
//! which cells are computed can't leak into the result, and cells are computed in parallel.
//!
//! Neighborhoods come in Moore, Von Neumann, radial and hexagonal flavors, each with an
//! [`EdgeRule`] deciding what happens at the border of the grid. [`AutomatonHistory`] keeps past
//! generations for undo and redo, and [`AutomatonRunner`] paces many generations in a row.

mod automaton;
mod error;
mod hexagonal;
mod history;
mod moore;
mod neighborhood;
mod neumann;
pub mod presets;
mod radial;
mod rule;
mod runner;
mod serial;
mod state;

pub use automaton::Automaton;
pub use error::{Error, Result};
pub use history::{AutomatonHistory, DEFAULT_CAPACITY};
pub use neighborhood::{EdgeRule, NeighborCoordinates, Neighborhood, Offset, Offsets, Topology};
pub use rule::{Rule, RulePolicy, RuleSet};
pub use runner::{AutomatonRunner, RunReport, RunnerConfig, StopHandle};
pub use state::{Cell, Grid, State};
