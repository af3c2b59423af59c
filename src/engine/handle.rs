//! Public handles onto a running engine.

use crate::core::{Snapshot, State, StateHistory, StateId};
use crate::engine::error::EngineError;
use crate::engine::slot::{EngineStatus, Inner, Invocation};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A built engine that has not been started.
///
/// [`Engine::start`] consumes the engine, so the initial trigger can only be
/// armed once.
pub struct Engine<S: State, P = ()> {
    inner: Arc<Inner<S, P>>,
}

impl<S: State, P: Send + Sync + 'static> Engine<S, P> {
    pub(crate) fn from_inner(inner: Inner<S, P>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Arm the initial state's trigger and hand out the state accessor and
    /// one invoker per transition name.
    pub fn start(self) -> (StateAccessor<S, P>, Invokers<S, P>) {
        self.inner.start();

        let invokers = self
            .inner
            .transition_names()
            .map(|name| {
                (
                    name.to_string(),
                    Invoker {
                        name: name.to_string(),
                        inner: Arc::clone(&self.inner),
                    },
                )
            })
            .collect();

        (
            StateAccessor {
                inner: Arc::clone(&self.inner),
            },
            Invokers {
                by_name: invokers,
                inner: self.inner,
            },
        )
    }

    /// The initial snapshot, generation 0.
    pub fn initial(&self) -> Snapshot<S> {
        self.inner.snapshot()
    }
}

/// Read access to the live state.
///
/// Always re-read after an `.await`: the engine may have moved on while the
/// caller was suspended.
pub struct StateAccessor<S: State, P = ()> {
    inner: Arc<Inner<S, P>>,
}

impl<S: State, P: Send + Sync + 'static> StateAccessor<S, P> {
    pub fn state(&self) -> S {
        self.inner.snapshot().state
    }

    /// State and id, read from the same generation.
    pub fn snapshot(&self) -> Snapshot<S> {
        self.inner.snapshot()
    }

    pub fn id(&self) -> StateId {
        self.inner.current_id()
    }

    /// Whether `id` still names the live generation.
    pub fn is_current(&self, id: StateId) -> bool {
        self.inner.current_id() == id
    }

    pub fn status(&self) -> EngineStatus {
        self.inner.status()
    }

    pub fn history(&self) -> StateHistory<S> {
        self.inner.with_history(Clone::clone)
    }

    /// Inspect the history without cloning it.
    pub fn with_history<R>(&self, f: impl FnOnce(&StateHistory<S>) -> R) -> R {
        self.inner.with_history(f)
    }
}

impl<S: State, P> Clone for StateAccessor<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: State, P: Send + Sync + 'static> fmt::Debug for StateAccessor<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateAccessor")
            .field("current", &self.inner.snapshot())
            .finish()
    }
}

/// A transition bound to its engine.
pub struct Invoker<S: State, P = ()> {
    name: String,
    inner: Arc<Inner<S, P>>,
}

impl<S: State, P: Send + Sync + 'static> Invoker<S, P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the transition to the caller's view of the state.
    pub fn call(&self, state: &S) -> Result<Invocation, EngineError>
    where
        P: Default,
    {
        self.call_with(state, &P::default())
    }

    pub fn call_with(&self, state: &S, params: &P) -> Result<Invocation, EngineError> {
        self.inner.invoke(&self.name, Some(state), params)
    }

    /// Apply the transition to the live state, read under the slot lock.
    pub fn fire(&self) -> Result<Invocation, EngineError>
    where
        P: Default,
    {
        self.fire_with(&P::default())
    }

    pub fn fire_with(&self, params: &P) -> Result<Invocation, EngineError> {
        self.inner.invoke(&self.name, None, params)
    }
}

impl<S: State, P> Clone for Invoker<S, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: State, P> fmt::Debug for Invoker<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker").field("name", &self.name).finish()
    }
}

/// One invoker per transition name.
pub struct Invokers<S: State, P = ()> {
    by_name: BTreeMap<String, Invoker<S, P>>,
    inner: Arc<Inner<S, P>>,
}

impl<S: State, P: Send + Sync + 'static> Invokers<S, P> {
    pub fn get(&self, name: &str) -> Option<&Invoker<S, P>> {
        self.by_name.get(name)
    }

    /// Like [`Invokers::get`], failing with
    /// [`EngineError::UnknownTransition`].
    pub fn invoker(&self, name: &str) -> Result<&Invoker<S, P>, EngineError> {
        self.get(name).ok_or_else(|| EngineError::UnknownTransition {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.has_transition(name)
    }

    /// `invoke(name, state)` with default parameters.
    pub fn invoke(&self, name: &str, state: &S) -> Result<Invocation, EngineError>
    where
        P: Default,
    {
        self.inner.invoke(name, Some(state), &P::default())
    }

    pub fn invoke_with(&self, name: &str, state: &S, params: &P) -> Result<Invocation, EngineError> {
        self.inner.invoke(name, Some(state), params)
    }
}

impl<S: State, P> Clone for Invokers<S, P> {
    fn clone(&self) -> Self {
        Self {
            by_name: self.by_name.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: State, P> fmt::Debug for Invokers<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.by_name.keys()).finish()
    }
}
