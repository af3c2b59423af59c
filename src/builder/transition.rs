//! Builder for constructing named transitions.

use crate::builder::error::BuildError;
use crate::core::{Sources, State, Step};
use crate::engine::{Transition, TransitionFn};
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use settle::builder::TransitionBuilder;
/// use settle::core::{State, Step};
/// use settle::engine::Transition;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Loader {
///     Idle,
///     Loading { threshold: u32 },
/// }
///
/// impl State for Loader {
///     fn name(&self) -> &str {
///         match self {
///             Self::Idle => "idle",
///             Self::Loading { .. } => "loading",
///         }
///     }
/// }
///
/// let begin: Transition<Loader, u32> = TransitionBuilder::new()
///     .name("begin")
///     .from(["idle"])
///     .apply(|_, threshold: &u32| Step::Next(Loader::Loading { threshold: *threshold }))
///     .build()
///     .unwrap();
///
/// assert!(begin.accepts(&Loader::Idle));
/// ```
pub struct TransitionBuilder<S: State, P = ()> {
    name: Option<String>,
    sources: Option<Sources<S>>,
    apply: Option<TransitionFn<S, P>>,
}

impl<S: State, P: 'static> TransitionBuilder<S, P> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            name: None,
            sources: None,
            apply: None,
        }
    }

    /// Set the transition name (required, unique per engine).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declare the source variants by tag (required unless another source
    /// method is used).
    pub fn from<I, N>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.sources = Some(Sources::variants(variants));
        self
    }

    /// Accept every variant as a source.
    pub fn from_any(mut self) -> Self {
        self.sources = Some(Sources::any());
        self
    }

    /// Declare the sources with a predicate.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.sources = Some(Sources::when(predicate));
        self
    }

    /// Set a full transition function that may decline with
    /// [`Step::Unchanged`].
    pub fn apply<F>(mut self, f: F) -> Self
    where
        F: Fn(&S, &P) -> Step<S> + Send + Sync + 'static,
    {
        self.apply = Some(Arc::new(f));
        self
    }

    /// Set a transition function that always produces a next state.
    pub fn to<F>(self, f: F) -> Self
    where
        F: Fn(&S, &P) -> S + Send + Sync + 'static,
    {
        self.apply(move |state, params| Step::Next(f(state, params)))
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, P>, BuildError> {
        let name = self.name.ok_or(BuildError::MissingTransitionName)?;
        let Some(sources) = self.sources else {
            return Err(BuildError::MissingTransitionSources { name });
        };
        let Some(apply) = self.apply else {
            return Err(BuildError::MissingTransitionAction { name });
        };

        Ok(Transition {
            name,
            sources,
            apply,
        })
    }
}

impl<S: State, P: 'static> Default for TransitionBuilder<S, P> {
    fn default() -> Self {
        Self::new()
    }
}
