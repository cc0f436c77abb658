//! Ready-made automatons.

use crate::{Automaton, Cell, EdgeRule, Neighborhood, Rule, State};

/// Conway's Game of Life (B3/S23) on a Moore neighborhood.
///
/// Cells on the border of the grid never change.
#[derive(Clone, Debug, PartialEq)]
pub struct GameOfLife {
    pub life: State,
    pub death: State,
}

impl Default for GameOfLife {
    fn default() -> Self {
        GameOfLife {
            life: State::new("Life", "#000"),
            death: State::new("Death", "#FFF"),
        }
    }
}

impl GameOfLife {
    /// A `length` by `width` automaton full of dead cells, running this rule.
    pub fn automaton(self, length: usize, width: usize) -> Automaton {
        let mut automaton = Automaton::new(&[length, width], Some(self.death.clone()));
        automaton.set_states(vec![self.life.clone(), self.death.clone()]);
        automaton.set_neighborhood(Neighborhood::moore(EdgeRule::IgnoreEdgeCells));
        automaton.set_rule(self);
        automaton
    }

    fn alive(&self, automaton: &Automaton, coordinate: &[usize]) -> usize {
        automaton.count_neighbors(
            automaton.neighborhood(),
            coordinate,
            std::slice::from_ref(&self.life),
        )
    }
}

impl Rule for GameOfLife {
    fn apply(&self, automaton: &Automaton, coordinate: &[usize]) -> Cell {
        let current = automaton.cell(coordinate);
        if automaton.is_on_edge(coordinate, automaton.neighborhood().radius()) {
            return current.cloned();
        }
        match current {
            Some(state) if *state == self.death => {
                if self.alive(automaton, coordinate) == 3 {
                    Some(self.life.clone())
                } else {
                    Some(state.clone())
                }
            }
            Some(state) if *state == self.life => match self.alive(automaton, coordinate) {
                2 | 3 => Some(self.life.clone()),
                _ => Some(self.death.clone()),
            },
            other => other.cloned(),
        }
    }
}

/// Forest fire: a tree next to fire catches fire, fire burns through its stages and leaves ash.
///
/// Uses a Von Neumann neighborhood. Empty ground and ash never change.
#[derive(Clone, Debug, PartialEq)]
pub struct ForestFire {
    pub empty: State,
    pub tree: State,
    /// Burning stages, from freshly lit to nearly out.
    pub fire: [State; 4],
    pub ash: State,
}

impl Default for ForestFire {
    fn default() -> Self {
        ForestFire {
            empty: State::new("Empty", "#FFF"),
            tree: State::new("Tree", "#15A655"),
            fire: [
                State::new("Fire", "#F93913"),
                State::new("Fire1", "#D42806"),
                State::new("Fire2", "#AD2003"),
                State::new("Fire3", "#781400"),
            ],
            ash: State::new("Ash", "#676463"),
        }
    }
}

impl ForestFire {
    /// A `length` by `width` automaton of empty ground, running this rule.
    pub fn automaton(self, length: usize, width: usize) -> Automaton {
        let mut automaton = Automaton::new(&[length, width], Some(self.empty.clone()));
        let mut states = self.fire.to_vec();
        states.extend(vec![self.ash.clone(), self.empty.clone(), self.tree.clone()]);
        automaton.set_states(states);
        automaton.set_neighborhood(Neighborhood::von_neumann(EdgeRule::IgnoreEdgeCells));
        automaton.set_rule(self);
        automaton
    }
}

impl Rule for ForestFire {
    fn apply(&self, automaton: &Automaton, coordinate: &[usize]) -> Cell {
        let current = match automaton.cell(coordinate) {
            Some(state) => state,
            None => return None,
        };
        if *current == self.tree {
            let burning =
                automaton.count_neighbors(automaton.neighborhood(), coordinate, &self.fire);
            return Some(if burning >= 1 {
                self.fire[0].clone()
            } else {
                self.tree.clone()
            });
        }
        match self.fire.iter().position(|stage| stage == current) {
            Some(stage) => Some(self.fire.get(stage + 1).unwrap_or(&self.ash).clone()),
            None => Some(current.clone()),
        }
    }
}
