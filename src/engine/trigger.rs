//! Asynchronous triggers armed on state entry.

use crate::core::{State, Step};
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Errors produced by trigger tasks.
///
/// These never escape the engine; they are delivered to
/// [`EventSink::on_trigger_failure`](crate::events::EventSink::on_trigger_failure).
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("trigger failed: {0}")]
    Failed(String),

    #[error("trigger panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl TriggerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn other<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }
}

/// Boxed future driving a trigger to settlement.
pub type TriggerFuture<S> = Pin<Box<dyn Future<Output = Result<Step<S>, TriggerError>> + Send>>;

type CancelCallback = Box<dyn FnOnce() + Send>;

/// Background work armed against one generation.
///
/// The future resolves to the next state, to [`Step::Unchanged`], or to an
/// error. A task is cancellable by default: when the engine moves on it
/// cancels the token handed to [`Triggers::trigger`], runs the `on_cancel`
/// callback, stops polling the future and suppresses its result.
pub struct TriggerTask<S> {
    pub(crate) future: TriggerFuture<S>,
    pub(crate) on_cancel: Option<CancelCallback>,
    pub(crate) detached: bool,
}

impl<S: State> TriggerTask<S> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<Step<S>, TriggerError>> + Send + 'static,
    {
        Self {
            future: Box::pin(future),
            on_cancel: None,
            detached: false,
        }
    }

    /// Task whose future always yields a next state.
    pub fn next<F>(future: F) -> Self
    where
        F: Future<Output = S> + Send + 'static,
    {
        Self::new(async move { Ok(Step::Next(future.await)) })
    }

    /// Move to `state` once `delay` has elapsed on the tokio clock.
    pub fn after(delay: Duration, state: S) -> Self {
        Self::next(async move {
            tokio::time::sleep(delay).await;
            state
        })
    }

    /// Run `callback` when the engine cancels this task.
    pub fn on_cancel<C>(mut self, callback: C) -> Self
    where
        C: FnOnce() + Send + 'static,
    {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    /// Do not register a cancel handle for this task.
    ///
    /// A detached task keeps running after the engine moves on. When it then
    /// settles, the result loses the staleness check and is reported through
    /// `on_trigger_ignored`, even if the step is [`Step::Unchanged`].
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

/// Trigger table: maps each state to the background work it starts.
///
/// Implementations should `match` exhaustively on the state enum so that a
/// new variant without a decision fails to compile.
///
/// # Example
///
/// ```rust
/// use settle::core::State;
/// use settle::engine::{TriggerTask, Triggers};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Blink {
///     On,
///     Off,
///     Halted,
/// }
///
/// impl State for Blink {
///     fn name(&self) -> &str {
///         match self {
///             Self::On => "on",
///             Self::Off => "off",
///             Self::Halted => "halted",
///         }
///     }
/// }
///
/// struct BlinkTriggers;
///
/// impl Triggers<Blink> for BlinkTriggers {
///     fn trigger(&self, state: &Blink, _cancel: &CancellationToken) -> Option<TriggerTask<Blink>> {
///         match state {
///             Blink::On => Some(TriggerTask::after(Duration::from_millis(500), Blink::Off)),
///             Blink::Off => Some(TriggerTask::after(Duration::from_millis(500), Blink::On)),
///             Blink::Halted => None,
///         }
///     }
/// }
/// ```
pub trait Triggers<S: State>: Send + Sync + 'static {
    /// Build the task for a freshly adopted `state`, or `None` when the
    /// variant has no trigger. `cancel` fires when the state is superseded.
    ///
    /// Runs before `state` becomes live. It may read the state accessor but
    /// must not invoke transitions; those fail with
    /// [`EngineError::ReentrantInvocation`](crate::engine::EngineError::ReentrantInvocation).
    fn trigger(&self, state: &S, cancel: &CancellationToken) -> Option<TriggerTask<S>>;
}

impl<S, F> Triggers<S> for F
where
    S: State,
    F: Fn(&S, &CancellationToken) -> Option<TriggerTask<S>> + Send + Sync + 'static,
{
    fn trigger(&self, state: &S, cancel: &CancellationToken) -> Option<TriggerTask<S>> {
        self(state, cancel)
    }
}

/// Trigger table for machines driven only by transitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTriggers;

impl<S: State> Triggers<S> for NoTriggers {
    fn trigger(&self, _state: &S, _cancel: &CancellationToken) -> Option<TriggerTask<S>> {
        None
    }
}
