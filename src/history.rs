//! Bounded, cursor-navigable history of automaton generations.

use crate::{Automaton, Error, Grid, Result};

use log::{debug, trace};
use std::convert::TryFrom;

/// Number of snapshots a history holds unless told otherwise.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded log of snapshots with a cursor, for undo, redo and seeking.
///
/// Snapshots are cloned on the way in and on the way out, so nothing outside the history can
/// alter what it stores. Appending after moving the cursor back discards the entries past the
/// cursor first. A full history refuses new entries instead of evicting old ones.
#[derive(Clone, Debug)]
pub struct AutomatonHistory<T = Grid> {
    capacity: usize,
    snapshots: Vec<T>,
    current: Option<usize>,
}

impl<T> Default for AutomatonHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> AutomatonHistory<T> {
    pub fn new(capacity: usize) -> Self {
        AutomatonHistory {
            capacity,
            snapshots: Vec::new(),
            current: None,
        }
    }

    /// Maximum number of snapshots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Position of the cursor, `None` when the history is empty.
    #[inline]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// How many times `move_forward(1)` can succeed from here.
    pub fn remaining_steps(&self) -> usize {
        self.current.map_or(0, |current| self.len() - current - 1)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = None;
    }

    /// Remove the entries strictly after `index`.
    ///
    /// Does nothing if `index` is the last entry or beyond. The cursor is pulled back to `index`
    /// if it was past it.
    pub fn clear_after(&mut self, index: usize) {
        if index >= self.len().saturating_sub(1) {
            return;
        }
        debug!(
            "dropping {} history entries after {}",
            self.len() - index - 1,
            index
        );
        self.snapshots.truncate(index + 1);
        if let Some(current) = self.current.as_mut() {
            if *current > index {
                *current = index;
            }
        }
    }

    /// Remove the entries strictly after the cursor.
    pub fn clear_after_current(&mut self) {
        if let Some(current) = self.current {
            self.clear_after(current);
        }
    }

    fn cursor(&self) -> isize {
        self.current.map_or(-1, |current| current as isize)
    }

    fn check(&self, index: isize) -> Result<usize> {
        if index < 0 || index as usize >= self.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(index as usize)
    }
}

impl<T: Clone> AutomatonHistory<T> {
    /// Copy of the snapshot at `index`.
    pub fn get_at(&self, index: usize) -> Result<T> {
        let index = self.check(isize::try_from(index).unwrap_or(isize::MAX))?;
        Ok(self.snapshots[index].clone())
    }

    /// Copy of the snapshot under the cursor.
    pub fn get(&self) -> Result<T> {
        let index = self.check(self.cursor())?;
        Ok(self.snapshots[index].clone())
    }

    /// Overwrite the snapshot at `index` with a copy of `snapshot`.
    pub fn set(&mut self, index: usize, snapshot: &T) -> Result<()> {
        let index = self.check(isize::try_from(index).unwrap_or(isize::MAX))?;
        self.snapshots[index] = snapshot.clone();
        Ok(())
    }

    /// Store a copy of `snapshot` right after the cursor and move onto it.
    pub fn append(&mut self, snapshot: &T) -> Result<()> {
        if self.remaining_steps() > 0 {
            self.clear_after_current();
        }
        if self.len() >= self.capacity {
            return Err(Error::HistoryFull {
                capacity: self.capacity,
            });
        }
        self.snapshots.push(snapshot.clone());
        self.current = Some(self.len() - 1);
        Ok(())
    }

    /// Move the cursor `steps` entries back and return the snapshot there.
    pub fn move_backward(&mut self, steps: usize) -> Result<T> {
        let target = isize::try_from(steps)
            .ok()
            .and_then(|steps| self.cursor().checked_sub(steps))
            .unwrap_or(isize::MIN);
        self.relocate(target)
    }

    /// Move the cursor `steps` entries forward and return the snapshot there.
    pub fn move_forward(&mut self, steps: usize) -> Result<T> {
        let target = isize::try_from(steps)
            .ok()
            .and_then(|steps| self.cursor().checked_add(steps))
            .unwrap_or(isize::MAX);
        self.relocate(target)
    }

    /// Move the cursor to `index` and return the snapshot there.
    pub fn move_to(&mut self, index: usize) -> Result<T> {
        self.relocate(isize::try_from(index).unwrap_or(isize::MAX))
    }

    fn relocate(&mut self, index: isize) -> Result<T> {
        let index = self.check(index)?;
        trace!("history cursor moved to {}", index);
        self.current = Some(index);
        Ok(self.snapshots[index].clone())
    }
}

impl AutomatonHistory<Grid> {
    /// Store a copy of the automaton's current grid.
    pub fn append_automaton_state(&mut self, automaton: &Automaton) -> Result<()> {
        self.append(automaton.grid())
    }
}
