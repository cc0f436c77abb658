use crate::{Automaton, Cell};

use std::fmt;
use std::sync::Arc;

/// A transition rule: computes the next value of one cell.
///
/// Rules only ever see the generation being replaced, through a shared reference, so the order
/// in which cells are visited cannot leak into the result. Any `Fn(&Automaton, &[usize]) -> Cell`
/// closure is a rule.
pub trait Rule: Send + Sync {
    fn apply(&self, automaton: &Automaton, coordinate: &[usize]) -> Cell;
}

impl<F> Rule for F
where
    F: Fn(&Automaton, &[usize]) -> Cell + Send + Sync,
{
    #[inline]
    fn apply(&self, automaton: &Automaton, coordinate: &[usize]) -> Cell {
        self(automaton, coordinate)
    }
}

/// How the outputs of several rules are combined for one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RulePolicy {
    /// Rules run in order and the first one whose output differs from the cell's current value
    /// decides. If every rule keeps the value, the cell keeps it.
    FirstChangeWins,
    /// Every rule overwrites the output of the one before it, so the last rule decides.
    LastRuleWins,
}

impl Default for RulePolicy {
    fn default() -> Self {
        RulePolicy::FirstChangeWins
    }
}

/// An ordered list of rules and the policy that combines them.
///
/// With a single rule both policies give exactly that rule's output. With no rule at all every
/// cell keeps its value.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn Rule>>,
    policy: RulePolicy,
}

impl RuleSet {
    pub fn new(policy: RulePolicy) -> Self {
        RuleSet {
            rules: Vec::new(),
            policy,
        }
    }

    pub fn single<R: Rule + 'static>(rule: R) -> Self {
        Self::default().with(rule)
    }

    /// Append a rule, returning the set.
    pub fn with<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.push(rule);
        self
    }

    pub fn push<R: Rule + 'static>(&mut self, rule: R) {
        self.rules.push(Arc::new(rule));
    }

    #[inline]
    pub fn policy(&self) -> RulePolicy {
        self.policy
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Next value of the cell at `coordinate`, whose current value is `current`.
    pub fn evaluate(&self, automaton: &Automaton, coordinate: &[usize], current: &Cell) -> Cell {
        let mut outputs = self.rules.iter().map(|rule| rule.apply(automaton, coordinate));
        let decided = match self.policy {
            RulePolicy::FirstChangeWins => outputs.find(|output| output != current),
            RulePolicy::LastRuleWins => outputs.last(),
        };
        decided.unwrap_or_else(|| current.clone())
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rules.len())
            .field("policy", &self.policy)
            .finish()
    }
}
