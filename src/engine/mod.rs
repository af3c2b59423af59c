//! The engine: live-state slot, trigger arming and staleness checks.
//!
//! # Protocol
//!
//! Every accepted state goes through the same steps, under the slot lock:
//! 1. ask the trigger table for the incoming state's task
//! 2. cancel the trigger armed for the outgoing generation
//! 3. mint a fresh [`StateId`](crate::core::StateId)
//! 4. spawn the incoming task, if its variant has one
//! 5. replace the live snapshot
//! 6. notify `on_state_change`
//!
//! When a trigger settles, its result is applied only if it was not
//! cancelled and its generation is still live. A result from a superseded
//! generation, including "no change", is discarded and reported through
//! `on_trigger_ignored`.

mod error;
mod handle;
mod slot;
mod transition;
mod trigger;

pub(crate) use slot::Inner;
pub(crate) use transition::Transitions;

pub use error::EngineError;
pub use handle::{Engine, Invoker, Invokers, StateAccessor};
pub use slot::{EngineStatus, Invocation};
pub use transition::{Transition, TransitionFn};
pub use trigger::{NoTriggers, TriggerError, TriggerFuture, TriggerTask, Triggers};
