//! Named synchronous transitions.

use crate::core::{Sources, State, Step};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Pure transition function: caller's view of the state plus parameters in,
/// next step out. Must not block or perform I/O.
pub type TransitionFn<S, P> = Arc<dyn Fn(&S, &P) -> Step<S> + Send + Sync>;

/// A named transition with its declared source variants.
pub struct Transition<S, P = ()> {
    pub name: String,
    pub sources: Sources<S>,
    pub apply: TransitionFn<S, P>,
}

impl<S: State, P> Transition<S, P> {
    /// Whether `state` belongs to the declared source set (pure).
    pub fn accepts(&self, state: &S) -> bool {
        self.sources.contains(state)
    }
}

impl<S, P> Clone for Transition<S, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            sources: self.sources.clone(),
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<S, P> fmt::Debug for Transition<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

/// Transition table keyed by name.
pub(crate) struct Transitions<S, P> {
    by_name: BTreeMap<String, Transition<S, P>>,
}

impl<S, P> Transitions<S, P> {
    pub(crate) fn new() -> Self {
        Self {
            by_name: BTreeMap::new(),
        }
    }

    /// Insert a transition, handing it back if the name is taken.
    pub(crate) fn insert(&mut self, transition: Transition<S, P>) -> Result<(), Transition<S, P>> {
        if self.by_name.contains_key(&transition.name) {
            return Err(transition);
        }
        self.by_name.insert(transition.name.clone(), transition);
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Transition<S, P>> {
        self.by_name.get(name)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    enum TestState {
        Idle,
        Loading { threshold: u32 },
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "idle",
                Self::Loading { .. } => "loading",
            }
        }
    }

    fn begin() -> Transition<TestState, u32> {
        Transition {
            name: "begin".to_string(),
            sources: Sources::variants(["idle"]),
            apply: Arc::new(|_: &TestState, threshold: &u32| {
                Step::Next(TestState::Loading {
                    threshold: *threshold,
                })
            }),
        }
    }

    #[test]
    fn accepts_checks_declared_sources() {
        let transition = begin();

        assert!(transition.accepts(&TestState::Idle));
        assert!(!transition.accepts(&TestState::Loading { threshold: 1 }));
    }

    #[test]
    fn apply_receives_parameters() {
        let transition = begin();

        assert_eq!(
            (transition.apply)(&TestState::Idle, &7),
            Step::Next(TestState::Loading { threshold: 7 })
        );
    }

    #[test]
    fn table_rejects_duplicate_names() {
        let mut table = Transitions::new();

        assert!(table.insert(begin()).is_ok());
        let rejected = table.insert(begin()).unwrap_err();

        assert_eq!(rejected.name, "begin");
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["begin"]);
        assert!(table.get("begin").is_some());
        assert!(table.get("reload").is_none());
    }
}
