//! Core state machine types.
//!
//! This module contains the pure data model the engine works on:
//! - State values via the `State` trait, and the ids they are adopted under
//! - Declared source variants for transitions
//! - History of accepted generations
//!
//! Nothing in this module spawns tasks or holds locks.

mod history;
mod sources;
mod state;

pub(crate) use state::IdMint;

pub use history::{Cause, StateHistory, StateTransition};
pub use sources::Sources;
pub use state::{Snapshot, State, StateId, Step};
