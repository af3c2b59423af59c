//! History of accepted generations.
//!
//! The engine appends one [`StateTransition`] per accepted state. The
//! history can be bounded, in which case the oldest entries are evicted.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// What caused a generation to be accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cause {
    /// A caller invoked the named transition.
    Transition { name: String },

    /// A trigger armed for the previous generation settled.
    Trigger,
}

/// Record of a single accepted generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(serialize = "S: Serialize", deserialize = "S: Deserialize<'de>"))]
pub struct StateTransition<S> {
    /// The state that was live before
    pub from: S,
    /// The accepted state
    pub to: S,
    /// Generation the accepted state was adopted under
    pub generation: u64,
    pub cause: Cause,
    /// When the state was accepted
    pub timestamp: DateTime<Utc>,
}

/// Ordered, optionally bounded history of accepted generations.
///
/// # Example
///
/// ```rust
/// use settle::core::{Cause, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_limit(Some(2));
/// for generation in 1..=3u64 {
///     history.record(StateTransition {
///         from: generation - 1,
///         to: generation,
///         generation,
///         cause: Cause::Trigger,
///         timestamp: Utc::now(),
///     });
/// }
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.evicted(), 1);
/// assert_eq!(history.get_path(), vec![&1, &2, &3]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(serialize = "S: Serialize", deserialize = "S: Deserialize<'de>"))]
pub struct StateHistory<S> {
    transitions: VecDeque<StateTransition<S>>,
    limit: Option<usize>,
    evicted: u64,
}

impl<S> Default for StateHistory<S> {
    fn default() -> Self {
        Self::with_limit(None)
    }
}

impl<S> StateHistory<S> {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history keeping at most `limit` entries. `Some(0)` keeps
    /// nothing.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            transitions: VecDeque::new(),
            limit,
            evicted: 0,
        }
    }

    /// Append a transition, evicting the oldest entry when full.
    pub fn record(&mut self, transition: StateTransition<S>) {
        if self.limit == Some(0) {
            self.evicted += 1;
            return;
        }
        if let Some(limit) = self.limit {
            while self.transitions.len() >= limit {
                self.transitions.pop_front();
                self.evicted += 1;
            }
        }
        self.transitions.push_back(transition);
    }

    /// States traversed: the `from` of the oldest retained entry, then the
    /// `to` of every entry.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        path.extend(self.transitions.iter().map(|t| &t.to));
        path
    }

    /// Time between the oldest and newest retained entries.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.front()?;
        let last = self.transitions.back()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Number of entries dropped because of the limit.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

impl<S: State> StateHistory<S> {
    /// Variant tags along the path, handy for asserting on cycles.
    pub fn names(&self) -> Vec<String> {
        self.get_path()
            .into_iter()
            .map(|s| s.name().to_string())
            .collect()
    }
}
