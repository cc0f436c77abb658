use ndarray::ArrayD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A named, colored category that a cell can take.
///
/// Cloning a `State` only bumps reference counts, so a grid can hold one per cell cheaply.
/// Two states are equal when both their name and color match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State {
    name: Arc<str>,
    color: Arc<str>,
}

impl State {
    pub fn new(name: impl Into<Arc<str>>, color: impl Into<Arc<str>>) -> Self {
        State {
            name: name.into(),
            color: color.into(),
        }
    }

    /// Display label, also used to look the state up when deserializing.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display hint, meaningless to the simulation itself.
    #[inline]
    pub fn color(&self) -> &str {
        &self.color
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// Persisted as a `[name, color]` pair.
impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&*self.name, &*self.color).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (name, color) = <(String, String)>::deserialize(deserializer)?;
        Ok(State::new(name, color))
    }
}

/// One grid entry. `None` marks a cell that was never initialized.
pub type Cell = Option<State>;

/// Dense N-dimensional array of cells representing one generation.
pub type Grid = ArrayD<Cell>;
