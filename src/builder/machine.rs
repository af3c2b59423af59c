//! Builder for constructing engines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::State;
use crate::engine::{Engine, Inner, NoTriggers, Transition, Transitions, Triggers};
use crate::events::EventSink;
use tokio::runtime::Handle;

/// Default number of accepted generations kept in the history.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Builder for constructing engines with a fluent API.
///
/// Only the initial state is required. Without triggers the engine is a
/// plain synchronous state machine; without events nothing is notified.
pub struct EngineBuilder<S: State, P = ()> {
    initial: Option<S>,
    transitions: Vec<Transition<S, P>>,
    triggers: Option<Box<dyn Triggers<S>>>,
    sink: Option<Box<dyn EventSink<S>>>,
    history_limit: Option<usize>,
    runtime: Option<Handle>,
}

impl<S: State, P: Send + Sync + 'static> EngineBuilder<S, P> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            transitions: Vec::new(),
            triggers: None,
            sink: None,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            runtime: None,
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S, P>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, P>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, P>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Set the trigger table.
    pub fn triggers(mut self, triggers: impl Triggers<S>) -> Self {
        self.triggers = Some(Box::new(triggers));
        self
    }

    /// Set the event sink.
    pub fn events(mut self, sink: impl EventSink<S>) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Keep at most `limit` accepted generations in the history.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Keep every accepted generation.
    pub fn unbounded_history(mut self) -> Self {
        self.history_limit = None;
        self
    }

    /// Spawn trigger tasks on `handle` instead of the ambient runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the engine.
    /// Returns an error if required fields are missing, a transition name
    /// is repeated, or no tokio runtime is reachable.
    pub fn build(self) -> Result<Engine<S, P>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let mut transitions = Transitions::new();
        for transition in self.transitions {
            if let Err(duplicate) = transitions.insert(transition) {
                return Err(BuildError::DuplicateTransition {
                    name: duplicate.name,
                });
            }
        }

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| BuildError::NoRuntime)?,
        };

        let triggers = self.triggers.unwrap_or_else(|| Box::new(NoTriggers));
        let sink = self.sink.unwrap_or_else(|| Box::new(()));

        Ok(Engine::from_inner(Inner::new(
            initial,
            transitions,
            triggers,
            sink,
            self.history_limit,
            runtime,
        )))
    }
}

impl<S: State, P: Send + Sync + 'static> Default for EngineBuilder<S, P> {
    fn default() -> Self {
        Self::new()
    }
}
