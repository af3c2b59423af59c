//! Event sink notified by the engine.
//!
//! Three independent callbacks, all optional:
//! - `on_state_change` fires once per accepted generation, in order
//! - `on_trigger_ignored` fires when a trigger result loses the staleness check
//! - `on_trigger_failure` fires when a trigger task errors or panics
//!
//! Sinks run while the engine slot is locked. The lock is reentrant, so a
//! sink may read the state accessor from inside a callback. A panicking sink
//! is caught and logged; it never unwinds into the engine.

mod log;

pub use log::{Event, EventLog};

use crate::core::{Snapshot, State, StateId, Step};
use crate::engine::TriggerError;

/// A trigger result discarded because its generation was superseded.
#[derive(Clone, Debug, PartialEq)]
pub struct IgnoredSettlement<S> {
    /// State and id captured when the trigger was armed
    pub expected: Snapshot<S>,
    /// Live state and id at settlement
    pub actual: Snapshot<S>,
    /// The step the trigger produced, possibly [`Step::Unchanged`]
    pub discarded: Step<S>,
}

/// Receiver of engine notifications. Every method defaults to a no-op.
pub trait EventSink<S: State>: Send + Sync + 'static {
    fn on_state_change(&self, _state: &S, _id: StateId) {}

    fn on_trigger_ignored(&self, _ignored: &IgnoredSettlement<S>) {}

    fn on_trigger_failure(&self, _error: &TriggerError) {}
}

impl<S: State> EventSink<S> for () {}

type StateChangeFn<S> = Box<dyn Fn(&S, StateId) + Send + Sync>;
type IgnoredFn<S> = Box<dyn Fn(&IgnoredSettlement<S>) + Send + Sync>;
type FailureFn = Box<dyn Fn(&TriggerError) + Send + Sync>;

/// Event sink assembled from closures.
///
/// # Example
///
/// ```rust
/// use settle::core::State;
/// use settle::events::Events;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Counter(u32);
///
/// impl State for Counter {
///     fn name(&self) -> &str {
///         "counter"
///     }
/// }
///
/// let events: Events<Counter> = Events::new()
///     .state_change(|state: &Counter, id| println!("{:?} adopted as {}", state, id))
///     .trigger_failure(|error| eprintln!("{}", error));
/// ```
pub struct Events<S> {
    state_change: Option<StateChangeFn<S>>,
    trigger_ignored: Option<IgnoredFn<S>>,
    trigger_failure: Option<FailureFn>,
}

impl<S: State> Events<S> {
    pub fn new() -> Self {
        Self {
            state_change: None,
            trigger_ignored: None,
            trigger_failure: None,
        }
    }

    pub fn state_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&S, StateId) + Send + Sync + 'static,
    {
        self.state_change = Some(Box::new(callback));
        self
    }

    pub fn trigger_ignored<F>(mut self, callback: F) -> Self
    where
        F: Fn(&IgnoredSettlement<S>) + Send + Sync + 'static,
    {
        self.trigger_ignored = Some(Box::new(callback));
        self
    }

    pub fn trigger_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(&TriggerError) + Send + Sync + 'static,
    {
        self.trigger_failure = Some(Box::new(callback));
        self
    }
}

impl<S: State> Default for Events<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> EventSink<S> for Events<S> {
    fn on_state_change(&self, state: &S, id: StateId) {
        if let Some(callback) = &self.state_change {
            callback(state, id);
        }
    }

    fn on_trigger_ignored(&self, ignored: &IgnoredSettlement<S>) {
        if let Some(callback) = &self.trigger_ignored {
            callback(ignored);
        }
    }

    fn on_trigger_failure(&self, error: &TriggerError) {
        if let Some(callback) = &self.trigger_failure {
            callback(error);
        }
    }
}
