//! Builder API for ergonomic engine construction.
//!
//! This module provides fluent builders and macros for creating engines
//! with minimal boilerplate while keeping construction errors explicit.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::{EngineBuilder, DEFAULT_HISTORY_LIMIT};
pub use transition::TransitionBuilder;

use crate::core::{Sources, State, Step};
use crate::engine::Transition;
use std::sync::Arc;

/// Create an unconditional transition from the listed variants to a fixed
/// target state.
///
/// # Example
///
/// ```
/// use settle::builder::simple_transition;
/// use settle::engine::Transition;
/// use settle::state_enum;
///
/// state_enum! {
///     enum MyState {
///         Start,
///         End,
///     }
/// }
///
/// let transition: Transition<MyState> = simple_transition("finish", ["Start"], MyState::End);
/// assert!(transition.accepts(&MyState::Start));
/// ```
pub fn simple_transition<S, P, I, N>(name: &str, from: I, to: S) -> Transition<S, P>
where
    S: State,
    P: 'static,
    I: IntoIterator<Item = N>,
    N: Into<String>,
{
    Transition {
        name: name.to_string(),
        sources: Sources::variants(from),
        apply: Arc::new(move |_: &S, _: &P| Step::Next(to.clone())),
    }
}

/// Create a transition to a fixed target state whose sources are given by a
/// predicate.
///
/// # Example
///
/// ```
/// use settle::builder::guarded_transition;
/// use settle::engine::Transition;
/// use settle::state_enum;
///
/// state_enum! {
///     enum MyState {
///         Start,
///         Middle,
///         End,
///     }
/// }
///
/// let transition: Transition<MyState> =
///     guarded_transition("skip", |s| !matches!(s, MyState::End), MyState::End);
///
/// assert!(transition.accepts(&MyState::Middle));
/// assert!(!transition.accepts(&MyState::End));
/// ```
pub fn guarded_transition<S, P, F>(name: &str, guard: F, to: S) -> Transition<S, P>
where
    S: State,
    P: 'static,
    F: Fn(&S) -> bool + Send + Sync + 'static,
{
    Transition {
        name: name.to_string(),
        sources: Sources::when(guard),
        apply: Arc::new(move |_: &S, _: &P| Step::Next(to.clone())),
    }
}
