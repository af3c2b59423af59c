//! The live-state slot and the accept/settle protocol.
//!
//! All writes to the slot go through [`Inner::accept`] or [`Inner::settle`],
//! both of which run with the slot lock held. Comparing a settling trigger's
//! id against the live id and replacing the live state is therefore a single
//! atomic step, even on a multi-threaded runtime.

use crate::core::{Cause, IdMint, Snapshot, State, StateHistory, StateId, StateTransition, Step};
use crate::engine::error::EngineError;
use crate::engine::transition::Transitions;
use crate::engine::trigger::{TriggerError, TriggerFuture, TriggerTask, Triggers};
use crate::events::{EventSink, IgnoredSettlement};
use chrono::Utc;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::any::Any;
use std::cell::RefCell;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Result of invoking a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// A new generation was accepted under this id.
    Accepted(StateId),

    /// The transition declined; nothing changed.
    Unchanged,
}

impl Invocation {
    pub fn accepted(&self) -> Option<StateId> {
        match self {
            Invocation::Accepted(id) => Some(*id),
            Invocation::Unchanged => None,
        }
    }
}

/// Whether a trigger is outstanding for the live generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Armed(StateId),
    Idle,
}

/// Handle used to preempt the trigger armed for one generation.
struct CancelHandle {
    id: StateId,
    token: CancellationToken,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelHandle {
    fn cancel(self) {
        tracing::trace!(generation = self.id.generation(), "cancelling trigger");
        self.token.cancel();
        if let Some(callback) = self.on_cancel {
            if catch_unwind(AssertUnwindSafe(callback)).is_err() {
                tracing::error!(
                    generation = self.id.generation(),
                    "trigger cancel callback panicked"
                );
            }
        }
    }
}

/// What arming a trigger for a new state produced.
enum Arming {
    /// The variant has no trigger.
    Idle,
    /// A task was spawned; the handle is absent for detached tasks.
    Armed(Option<CancelHandle>),
}

/// A task handed out by the trigger table, not yet spawned.
struct Prepared<S> {
    task: TriggerTask<S>,
    token: CancellationToken,
}

/// Everything a settling task needs to validate its result.
struct Armed<S> {
    expected: Snapshot<S>,
    token: CancellationToken,
}

pub(crate) struct Slot<S> {
    current: Snapshot<S>,
    active: Option<CancelHandle>,
    pending: Option<StateId>,
    history: StateHistory<S>,
    /// Set while the trigger table runs; transitions are refused meanwhile.
    arming: bool,
}

impl<S> Drop for Slot<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.token.cancel();
        }
    }
}

type SlotGuard<'a, S> = ReentrantMutexGuard<'a, RefCell<Slot<S>>>;

pub(crate) struct Inner<S: State, P> {
    slot: ReentrantMutex<RefCell<Slot<S>>>,
    mint: IdMint,
    transitions: Transitions<S, P>,
    triggers: Box<dyn Triggers<S>>,
    sink: Box<dyn EventSink<S>>,
    runtime: Handle,
}

impl<S: State, P: Send + Sync + 'static> Inner<S, P> {
    /// Adopt `initial` as generation 0 without arming anything yet.
    pub(crate) fn new(
        initial: S,
        transitions: Transitions<S, P>,
        triggers: Box<dyn Triggers<S>>,
        sink: Box<dyn EventSink<S>>,
        history_limit: Option<usize>,
        runtime: Handle,
    ) -> Self {
        let mint = IdMint::new();
        let id = mint.mint();
        let slot = Slot {
            current: Snapshot { state: initial, id },
            active: None,
            pending: None,
            history: StateHistory::with_limit(history_limit),
            arming: false,
        };

        Self {
            slot: ReentrantMutex::new(RefCell::new(slot)),
            mint,
            transitions,
            triggers,
            sink,
            runtime,
        }
    }

    pub(crate) fn transition_names(&self) -> impl Iterator<Item = &str> {
        self.transitions.names()
    }

    pub(crate) fn has_transition(&self, name: &str) -> bool {
        self.transitions.get(name).is_some()
    }

    /// Arm the trigger of the initial state.
    pub(crate) fn start(self: &Arc<Self>) {
        let guard = self.slot.lock();
        let initial = guard.borrow().current.clone();
        tracing::debug!(
            state = initial.state.name(),
            generation = initial.id.generation(),
            "starting engine"
        );

        let prepared = self.prepare(&guard, &initial.state);
        let arming = self.arm(&initial, prepared);
        Self::install_arming(&guard, arming, initial.id);
    }

    pub(crate) fn snapshot(&self) -> Snapshot<S> {
        self.slot.lock().borrow().current.clone()
    }

    pub(crate) fn current_id(&self) -> StateId {
        self.slot.lock().borrow().current.id
    }

    pub(crate) fn status(&self) -> EngineStatus {
        let guard = self.slot.lock();
        let slot = guard.borrow();
        match slot.pending {
            Some(id) if id == slot.current.id => EngineStatus::Armed(id),
            _ => EngineStatus::Idle,
        }
    }

    pub(crate) fn with_history<R>(&self, f: impl FnOnce(&StateHistory<S>) -> R) -> R {
        let guard = self.slot.lock();
        let slot = guard.borrow();
        f(&slot.history)
    }

    /// Apply the named transition to `view`, or to the live state when no
    /// view is given.
    pub(crate) fn invoke(
        self: &Arc<Self>,
        name: &str,
        view: Option<&S>,
        params: &P,
    ) -> Result<Invocation, EngineError> {
        let transition =
            self.transitions
                .get(name)
                .ok_or_else(|| EngineError::UnknownTransition {
                    name: name.to_string(),
                })?;

        let guard = self.slot.lock();
        if guard.borrow().arming {
            tracing::warn!(transition = name, "transition invoked from the trigger table");
            return Err(EngineError::ReentrantInvocation {
                name: name.to_string(),
            });
        }

        let live;
        let source = match view {
            Some(state) => state,
            None => {
                live = guard.borrow().current.state.clone();
                &live
            }
        };

        if !transition.accepts(source) {
            tracing::warn!(
                transition = name,
                state = source.name(),
                "transition invoked outside its source variants"
            );
            return Err(EngineError::InvalidSource {
                transition: name.to_string(),
                state: source.name().to_string(),
            });
        }

        match (transition.apply)(source, params) {
            Step::Unchanged => {
                tracing::trace!(transition = name, "transition declined");
                Ok(Invocation::Unchanged)
            }
            Step::Next(next) => {
                let cause = Cause::Transition {
                    name: transition.name.clone(),
                };
                Ok(Invocation::Accepted(self.accept(&guard, next, cause)))
            }
        }
    }

    /// Replace the live state with `next` under a fresh id.
    ///
    /// Order matters: the trigger table is consulted before anything is
    /// touched, the outstanding trigger is cancelled next, the new id is
    /// minted before the new task is spawned, and the snapshot is replaced
    /// before anyone is notified.
    fn accept(self: &Arc<Self>, guard: &SlotGuard<'_, S>, next: S, cause: Cause) -> StateId {
        // A panicking trigger table unwinds from here with the slot intact.
        let prepared = self.prepare(guard, &next);

        let previous = guard.borrow_mut().active.take();
        if let Some(handle) = previous {
            handle.cancel();
        }

        let id = self.mint.mint();
        let adopted = Snapshot {
            state: next,
            id,
        };
        let arming = self.arm(&adopted, prepared);

        {
            let mut slot = guard.borrow_mut();
            let from = std::mem::replace(&mut slot.current, adopted.clone());
            slot.history.record(StateTransition {
                from: from.state,
                to: adopted.state.clone(),
                generation: id.generation(),
                cause: cause.clone(),
                timestamp: Utc::now(),
            });
        }
        Self::install_arming(guard, arming, id);

        tracing::debug!(
            state = adopted.state.name(),
            generation = id.generation(),
            ?cause,
            "accepted state"
        );
        self.notify("on_state_change", |sink| {
            sink.on_state_change(&adopted.state, id)
        });
        id
    }

    fn install_arming(guard: &SlotGuard<'_, S>, arming: Arming, id: StateId) {
        let mut slot = guard.borrow_mut();
        match arming {
            Arming::Idle => {
                slot.active = None;
                slot.pending = None;
            }
            Arming::Armed(handle) => {
                slot.active = handle;
                slot.pending = Some(id);
            }
        }
    }

    /// Ask the trigger table for the task of `state`.
    ///
    /// Transitions invoked from inside the table are refused, so the table
    /// cannot adopt a generation that the caller is about to overwrite.
    fn prepare(&self, guard: &SlotGuard<'_, S>, state: &S) -> Option<Prepared<S>> {
        let token = CancellationToken::new();

        guard.borrow_mut().arming = true;
        let task = catch_unwind(AssertUnwindSafe(|| self.triggers.trigger(state, &token)));
        guard.borrow_mut().arming = false;

        match task {
            Ok(task) => task.map(|task| Prepared { task, token }),
            Err(payload) => resume_unwind(payload),
        }
    }

    /// Spawn the prepared task against `adopted`.
    fn arm(self: &Arc<Self>, adopted: &Snapshot<S>, prepared: Option<Prepared<S>>) -> Arming {
        let Some(Prepared { task, token }) = prepared else {
            return Arming::Idle;
        };

        tracing::trace!(
            state = adopted.state.name(),
            generation = adopted.id.generation(),
            detached = task.detached,
            "arming trigger"
        );

        let armed = Armed {
            expected: adopted.clone(),
            token: token.clone(),
        };
        self.runtime
            .spawn(supervise(Arc::downgrade(self), armed, task.future));

        if task.detached {
            return Arming::Armed(None);
        }
        Arming::Armed(Some(CancelHandle {
            id: adopted.id,
            token,
            on_cancel: task.on_cancel,
        }))
    }

    /// Validate a trigger result against the live generation.
    fn settle(self: &Arc<Self>, armed: Armed<S>, outcome: Result<Step<S>, TriggerError>) {
        let guard = self.slot.lock();

        // Preempted by a later accept; its result must never apply.
        if armed.token.is_cancelled() {
            tracing::trace!(
                generation = armed.expected.id.generation(),
                "discarding result of cancelled trigger"
            );
            return;
        }

        let expected_id = armed.expected.id;
        let fresh = guard.borrow().current.id == expected_id;
        if fresh {
            guard.borrow_mut().pending = None;
        }

        match outcome {
            Err(error) => {
                tracing::warn!(
                    state = armed.expected.state.name(),
                    generation = expected_id.generation(),
                    %error,
                    "trigger failed"
                );
                self.notify("on_trigger_failure", |sink| sink.on_trigger_failure(&error));
            }
            Ok(Step::Unchanged) if fresh => {
                tracing::trace!(
                    generation = expected_id.generation(),
                    "trigger settled without a state change"
                );
            }
            Ok(Step::Next(next)) if fresh => {
                self.accept(&guard, next, Cause::Trigger);
            }
            Ok(discarded) => {
                let actual = guard.borrow().current.clone();
                tracing::debug!(
                    expected = expected_id.generation(),
                    actual = actual.id.generation(),
                    ?discarded,
                    "ignoring stale trigger result"
                );
                let ignored = IgnoredSettlement {
                    expected: armed.expected,
                    actual,
                    discarded,
                };
                self.notify("on_trigger_ignored", |sink| sink.on_trigger_ignored(&ignored));
            }
        }
    }

    fn notify(&self, callback: &'static str, f: impl FnOnce(&dyn EventSink<S>)) {
        let sink = self.sink.as_ref();
        if catch_unwind(AssertUnwindSafe(|| f(sink))).is_err() {
            tracing::error!(callback, "event sink panicked");
        }
    }
}

/// Drive one trigger task to settlement and hand the outcome to the engine.
///
/// The user future runs as its own task so that a panic inside it surfaces
/// as a [`TriggerError::Panicked`] instead of tearing down the supervisor.
async fn supervise<S, P>(engine: Weak<Inner<S, P>>, armed: Armed<S>, future: TriggerFuture<S>)
where
    S: State,
    P: Send + Sync + 'static,
{
    let mut task = tokio::spawn(future);

    let outcome = tokio::select! {
        biased;
        _ = armed.token.cancelled() => {
            task.abort();
            return;
        }
        joined = &mut task => match joined {
            Ok(result) => result,
            Err(error) if error.is_panic() => {
                Err(TriggerError::Panicked(panic_message(error.into_panic())))
            }
            Err(_) => return,
        },
    };

    if let Some(engine) = engine.upgrade() {
        engine.settle(armed, outcome);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
