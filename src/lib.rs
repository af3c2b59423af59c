//! Settle: a finite-state runtime with asynchronous triggers
//!
//! States change in two ways. Callers invoke synchronous, pure
//! *transitions*. States may also arm a *trigger* on entry: background work
//! that eventually proposes the next state. The engine guarantees that only
//! one state is live at a time and that a trigger result is applied only
//! while the generation it was armed for is still live.
//!
//! # Core Concepts
//!
//! - **State**: Tagged immutable values via the `State` trait
//! - **Transitions**: Named pure functions with declared source variants
//! - **Triggers**: Cancellable futures armed when a state is adopted
//! - **Events**: Notifications of state changes, stale results and failures
//!
//! # Example
//!
//! ```rust
//! use settle::builder::{simple_transition, EngineBuilder};
//! use settle::engine::TriggerTask;
//! use settle::events::EventLog;
//! use settle::state_enum;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! state_enum! {
//!     enum Kettle {
//!         Cold as "cold",
//!         Heating as "heating",
//!         Boiling as "boiling",
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let log = EventLog::new();
//! let engine = EngineBuilder::<Kettle>::new()
//!     .initial(Kettle::Cold)
//!     .add_transition(simple_transition("switch_on", ["cold"], Kettle::Heating))
//!     .triggers(|state: &Kettle, _cancel: &CancellationToken| match state {
//!         Kettle::Heating => Some(TriggerTask::after(Duration::from_millis(5), Kettle::Boiling)),
//!         Kettle::Cold | Kettle::Boiling => None,
//!     })
//!     .events(log.clone())
//!     .build()
//!     .unwrap();
//!
//! let (state, transitions) = engine.start();
//! transitions.invoke("switch_on", &state.state()).unwrap();
//! tokio::time::sleep(Duration::from_millis(20)).await;
//!
//! assert_eq!(state.state(), Kettle::Boiling);
//! assert_eq!(log.names(), vec!["heating", "boiling"]);
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod events;

// Re-export commonly used types
pub use builder::{BuildError, EngineBuilder, TransitionBuilder};
pub use crate::core::{Snapshot, Sources, State, StateId, Step};
pub use engine::{
    Engine, EngineError, EngineStatus, Invocation, Invoker, Invokers, StateAccessor, TriggerError,
    TriggerTask, Triggers,
};
pub use events::{EventLog, EventSink, Events, IgnoredSettlement};
