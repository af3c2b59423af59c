//! Recording event sink.

use super::{EventSink, IgnoredSettlement};
use crate::core::{Snapshot, State, StateId};
use crate::engine::TriggerError;
use parking_lot::Mutex;
use std::sync::Arc;

/// One notification captured by an [`EventLog`].
#[derive(Clone, Debug, PartialEq)]
pub enum Event<S> {
    StateChanged(Snapshot<S>),
    TriggerIgnored(IgnoredSettlement<S>),
    /// Rendered error message
    TriggerFailed(String),
}

/// Sink that records every notification in arrival order.
///
/// Clones share the same buffer, so one clone can be handed to the engine
/// while another is kept for assertions.
pub struct EventLog<S> {
    events: Arc<Mutex<Vec<Event<S>>>>,
}

impl<S: State> EventLog<S> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<Event<S>> {
        self.events.lock().clone()
    }

    /// States adopted, in generation order.
    pub fn state_changes(&self) -> Vec<Snapshot<S>> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::StateChanged(snapshot) => Some(snapshot.clone()),
                _ => None,
            })
            .collect()
    }

    /// Variant tags of the adopted states.
    pub fn names(&self) -> Vec<String> {
        self.state_changes()
            .iter()
            .map(|s| s.state.name().to_string())
            .collect()
    }

    pub fn ignored(&self) -> Vec<IgnoredSettlement<S>> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::TriggerIgnored(ignored) => Some(ignored.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::TriggerFailed(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl<S> Clone for EventLog<S> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<S: State> Default for EventLog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> EventSink<S> for EventLog<S> {
    fn on_state_change(&self, state: &S, id: StateId) {
        self.events.lock().push(Event::StateChanged(Snapshot {
            state: state.clone(),
            id,
        }));
    }

    fn on_trigger_ignored(&self, ignored: &IgnoredSettlement<S>) {
        self.events
            .lock()
            .push(Event::TriggerIgnored(ignored.clone()));
    }

    fn on_trigger_failure(&self, error: &TriggerError) {
        self.events
            .lock()
            .push(Event::TriggerFailed(error.to_string()));
    }
}
