//! JSON and binary encodings of an automaton's states and grid.
//!
//! Rules and neighborhoods are code, so only the data survives a round trip. A decoded
//! automaton starts with no rule, a default neighborhood and unset cells as its default.

use crate::{Automaton, Cell, Error, Grid, Result, State};

use log::debug;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Serialize, Deserialize)]
struct SerialAutomaton {
    states: Vec<State>,
    grid_size: Vec<usize>,
    grid: Value,
}

impl Automaton {
    /// Encode as a JSON object with `states` (`[name, color]` pairs), `grid_size` and `grid`.
    ///
    /// `grid` nests one array per dimension. Cells are written by state name, with `null` for
    /// unset cells.
    pub fn to_json(&self) -> Result<String> {
        let serial = SerialAutomaton {
            states: self.states().to_vec(),
            grid_size: self.grid_size().to_vec(),
            grid: nest(self.grid_size(), &mut self.grid().iter()),
        };
        Ok(serde_json::to_string(&serial)?)
    }

    /// Decode what [`to_json`](Self::to_json) produced.
    ///
    /// Every name in the grid must belong to `states`. When several states share a name, the
    /// last one listed is used.
    pub fn from_json(json: &str) -> Result<Automaton> {
        let serial: SerialAutomaton = serde_json::from_str(json)?;
        check_grid_size(&serial.grid_size)?;
        let by_name: HashMap<&str, &State> =
            serial.states.iter().map(|s| (s.name(), s)).collect();

        let mut cells = Vec::with_capacity(serial.grid_size.iter().product());
        flatten(&serial.grid, &serial.grid_size, 0, &by_name, &mut cells)?;
        let grid = grid_from_cells(&serial.grid_size, cells)?;
        debug!("decoded {:?} automaton from json", serial.grid_size);

        let mut automaton = Automaton::new(&serial.grid_size, None);
        automaton.set_grid(grid)?;
        automaton.set_states(serial.states);
        Ok(automaton)
    }
}

fn check_grid_size(grid_size: &[usize]) -> Result<()> {
    if grid_size.is_empty() || grid_size.contains(&0) {
        return Err(Error::InvalidGridSize(grid_size.to_vec()));
    }
    Ok(())
}

fn grid_from_cells(grid_size: &[usize], cells: Vec<Cell>) -> Result<Grid> {
    let found = vec![cells.len()];
    ArrayD::from_shape_vec(IxDyn(grid_size), cells).map_err(|_| Error::ShapeMismatch {
        expected: grid_size.to_vec(),
        found,
    })
}

fn nest<'a, I>(shape: &[usize], cells: &mut I) -> Value
where
    I: Iterator<Item = &'a Cell>,
{
    match shape {
        [] => match cells.next() {
            Some(Some(state)) => Value::String(state.name().to_owned()),
            _ => Value::Null,
        },
        [extent, rest @ ..] => Value::Array((0..*extent).map(|_| nest(rest, cells)).collect()),
    }
}

fn flatten(
    value: &Value,
    grid_size: &[usize],
    depth: usize,
    by_name: &HashMap<&str, &State>,
    cells: &mut Vec<Cell>,
) -> Result<()> {
    let extent = match grid_size.get(depth) {
        Some(&extent) => extent,
        None => {
            let cell = match value {
                Value::Null => None,
                Value::String(name) => Some(
                    by_name
                        .get(name.as_str())
                        .map(|&state| state.clone())
                        .ok_or_else(|| Error::UnknownState(name.clone()))?,
                ),
                other => return Err(Error::UnknownState(other.to_string())),
            };
            cells.push(cell);
            return Ok(());
        }
    };

    let items = value.as_array().ok_or_else(|| Error::ShapeMismatch {
        expected: grid_size.to_vec(),
        found: grid_size[..depth].to_vec(),
    })?;
    if items.len() != extent {
        let mut found = grid_size[..depth].to_vec();
        found.push(items.len());
        return Err(Error::ShapeMismatch {
            expected: grid_size.to_vec(),
            found,
        });
    }
    for item in items {
        flatten(item, grid_size, depth + 1, by_name, cells)?;
    }
    Ok(())
}

#[cfg(feature = "binary")]
mod binary {
    use super::*;

    use bincode::{deserialize_from, serialize_into};
    use std::convert::TryFrom;
    use std::io::{Read, Write};

    /// Cells are stored as indices into `states`.
    #[derive(Serialize, Deserialize)]
    struct BinaryAutomaton {
        states: Vec<State>,
        grid_size: Vec<usize>,
        cells: Vec<Option<u32>>,
    }

    impl Automaton {
        /// Write a compact bincode snapshot of the states and grid.
        ///
        /// Every set cell must hold one of the automaton's states.
        pub fn write_binary<W: Write>(&self, writer: W) -> Result<()> {
            let states = self.states();
            let cells = self
                .grid()
                .iter()
                .map(|cell| match cell {
                    None => Ok(None),
                    Some(state) => states
                        .iter()
                        .position(|s| s == state)
                        .and_then(|i| u32::try_from(i).ok())
                        .map(Some)
                        .ok_or_else(|| Error::UnknownState(state.name().to_owned())),
                })
                .collect::<Result<Vec<_>>>()?;
            let binary = BinaryAutomaton {
                states: states.to_vec(),
                grid_size: self.grid_size().to_vec(),
                cells,
            };
            serialize_into(writer, &binary)?;
            Ok(())
        }

        /// Read a snapshot written by [`write_binary`](Self::write_binary).
        pub fn read_binary<R: Read>(reader: R) -> Result<Automaton> {
            let binary: BinaryAutomaton = deserialize_from(reader)?;
            check_grid_size(&binary.grid_size)?;
            let states = &binary.states;
            let cells = binary
                .cells
                .iter()
                .map(|&index| match index {
                    None => Ok(None),
                    Some(i) => states
                        .get(i as usize)
                        .cloned()
                        .map(Some)
                        .ok_or_else(|| Error::UnknownState(i.to_string())),
                })
                .collect::<Result<Vec<_>>>()?;
            let grid = grid_from_cells(&binary.grid_size, cells)?;

            let mut automaton = Automaton::new(&binary.grid_size, None);
            automaton.set_grid(grid)?;
            automaton.set_states(binary.states);
            Ok(automaton)
        }
    }
}
