//! Build errors for engine and transition builders.

use thiserror::Error;

/// Errors that can occur when building engines and transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Transition name not specified. Call .name(name)")]
    MissingTransitionName,

    #[error("Transition '{name}' has no source variants. Call .from(..) or .from_any()")]
    MissingTransitionSources { name: String },

    #[error("Transition '{name}' has no action. Call .to(..) or .apply(..)")]
    MissingTransitionAction { name: String },

    #[error("Transition '{name}' is defined more than once")]
    DuplicateTransition { name: String },

    #[error("No tokio runtime available. Build inside a runtime or call .runtime(handle)")]
    NoRuntime,
}
