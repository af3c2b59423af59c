//! Errors returned synchronously by transition invokers.

use thiserror::Error;

/// Contract violations detected when a transition is invoked.
///
/// Every variant indicates a programming error in the caller; the engine
/// leaves its state, id and armed trigger untouched when returning one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown transition '{name}'")]
    UnknownTransition { name: String },

    #[error("transition '{transition}' is not defined for state '{state}'")]
    InvalidSource { transition: String, state: String },

    /// A transition was invoked from inside [`Triggers::trigger`](crate::engine::Triggers::trigger).
    #[error("transition '{name}' invoked while a trigger is being armed")]
    ReentrantInvocation { name: String },
}

impl EngineError {
    /// Stable code for logs and diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::UnknownTransition { .. } => "UNKNOWN_TRANSITION",
            EngineError::InvalidSource { .. } => "INVALID_SOURCE",
            EngineError::ReentrantInvocation { .. } => "REENTRANT_INVOCATION",
        }
    }
}
