//! State values, generation ids and transition steps.
//!
//! A state is an immutable tagged value. The engine never edits a state in
//! place: every accepted state is a new value paired with a freshly minted
//! [`StateId`].

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};

/// Trait for state machine states.
///
/// States are usually enums; [`State::name`] returns the variant tag and is
/// what transition source sets are checked against.
///
/// # Example
///
/// ```rust
/// use settle::core::State;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Loader {
///     Idle,
///     Loading { threshold: u32 },
///     Loaded { value: u64 },
/// }
///
/// impl State for Loader {
///     fn name(&self) -> &str {
///         match self {
///             Self::Idle => "idle",
///             Self::Loading { .. } => "loading",
///             Self::Loaded { .. } => "loaded",
///         }
///     }
/// }
///
/// assert_eq!(Loader::Loading { threshold: 3 }.name(), "loading");
/// ```
pub trait State: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// The variant tag of this state.
    fn name(&self) -> &str;
}

static NEXT_ENGINE: AtomicU64 = AtomicU64::new(0);

/// Opaque token identifying one adopted state value.
///
/// Ids are only meant for staleness checks. Two ids minted in the same
/// process never compare equal; ids minted by one engine are ordered by
/// [`StateId::generation`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId {
    engine: u64,
    generation: u64,
}

impl StateId {
    /// Position of this state in its engine's acceptance order. The initial
    /// state is generation 0.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether both ids were minted by the same engine.
    pub fn same_engine(&self, other: &StateId) -> bool {
        self.engine == other.engine
    }
}

impl Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateId({}#{})", self.engine, self.generation)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.engine, self.generation)
    }
}

/// Monotonic id source owned by a single engine.
#[derive(Debug)]
pub(crate) struct IdMint {
    engine: u64,
    next: AtomicU64,
}

impl IdMint {
    pub(crate) fn new() -> Self {
        Self {
            engine: NEXT_ENGINE.fetch_add(1, Ordering::Relaxed),
            next: AtomicU64::new(0),
        }
    }

    pub(crate) fn mint(&self) -> StateId {
        StateId {
            engine: self.engine,
            generation: self.next.fetch_add(1, Ordering::SeqCst),
        }
    }
}

/// A state together with the id it was adopted under.
///
/// Observers always read both halves from the same generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<S> {
    pub state: S,
    pub id: StateId,
}

/// Outcome of a transition or trigger: move to a new state, or stay put.
#[derive(Clone, Debug, PartialEq)]
pub enum Step<S> {
    /// Adopt this state as the next generation.
    Next(S),

    /// Decline to change state.
    Unchanged,
}

impl<S> Step<S> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Step::Unchanged)
    }

    pub fn into_option(self) -> Option<S> {
        match self {
            Step::Next(state) => Some(state),
            Step::Unchanged => None,
        }
    }
}

impl<S> From<Option<S>> for Step<S> {
    fn from(value: Option<S>) -> Self {
        value.map_or(Step::Unchanged, Step::Next)
    }
}
