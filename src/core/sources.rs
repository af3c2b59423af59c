//! Declared source variants of a transition.
//!
//! A transition is only defined for the variants it declares. Invoking it
//! against any other variant is a programming error that the engine rejects
//! before the transition function runs.

use super::state::State;
use std::fmt;
use std::sync::Arc;

enum Rule<S> {
    Any,
    Variants(Vec<String>),
    Predicate(Arc<dyn Fn(&S) -> bool + Send + Sync>),
}

/// Set of states a transition accepts as input.
///
/// # Example
///
/// ```rust
/// use settle::core::{Sources, State};
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Light {
///     Red,
///     Yellow,
///     Disabled,
/// }
///
/// impl State for Light {
///     fn name(&self) -> &str {
///         match self {
///             Self::Red => "red",
///             Self::Yellow => "yellow",
///             Self::Disabled => "disabled",
///         }
///     }
/// }
///
/// let stoppable = Sources::variants(["red", "yellow"]);
///
/// assert!(stoppable.contains(&Light::Red));
/// assert!(!stoppable.contains(&Light::Disabled));
/// ```
pub struct Sources<S> {
    rule: Rule<S>,
}

impl<S: State> Sources<S> {
    /// Accept every variant.
    pub fn any() -> Self {
        Self { rule: Rule::Any }
    }

    /// Accept the listed variant tags, as returned by [`State::name`].
    pub fn variants<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            rule: Rule::Variants(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Accept the states matching a pure predicate.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Self {
            rule: Rule::Predicate(Arc::new(predicate)),
        }
    }

    pub fn contains(&self, state: &S) -> bool {
        match &self.rule {
            Rule::Any => true,
            Rule::Variants(names) => names.iter().any(|n| n == state.name()),
            Rule::Predicate(predicate) => predicate(state),
        }
    }
}

impl<S> Clone for Sources<S> {
    fn clone(&self) -> Self {
        let rule = match &self.rule {
            Rule::Any => Rule::Any,
            Rule::Variants(names) => Rule::Variants(names.clone()),
            Rule::Predicate(predicate) => Rule::Predicate(Arc::clone(predicate)),
        };
        Self { rule }
    }
}

impl<S> fmt::Debug for Sources<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule {
            Rule::Any => f.write_str("Sources::Any"),
            Rule::Variants(names) => f.debug_tuple("Sources::Variants").field(names).finish(),
            Rule::Predicate(_) => f.write_str("Sources::Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    enum TestState {
        Idle,
        Loading { attempts: u32 },
        Loaded,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "idle",
                Self::Loading { .. } => "loading",
                Self::Loaded => "loaded",
            }
        }
    }

    #[test]
    fn any_accepts_everything() {
        let sources = Sources::any();

        assert!(sources.contains(&TestState::Idle));
        assert!(sources.contains(&TestState::Loading { attempts: 0 }));
        assert!(sources.contains(&TestState::Loaded));
    }

    #[test]
    fn variants_match_by_tag() {
        let sources = Sources::variants(["idle", "loaded"]);

        assert!(sources.contains(&TestState::Idle));
        assert!(sources.contains(&TestState::Loaded));
        assert!(!sources.contains(&TestState::Loading { attempts: 2 }));
    }

    #[test]
    fn predicate_can_inspect_payload() {
        let sources = Sources::when(|s: &TestState| {
            matches!(s, TestState::Loading { attempts } if *attempts < 3)
        });

        assert!(sources.contains(&TestState::Loading { attempts: 1 }));
        assert!(!sources.contains(&TestState::Loading { attempts: 3 }));
        assert!(!sources.contains(&TestState::Idle));
    }

    #[test]
    fn clone_shares_predicate() {
        let sources = Sources::when(|s: &TestState| matches!(s, TestState::Idle));
        let cloned = sources.clone();

        assert_eq!(sources.contains(&TestState::Idle), cloned.contains(&TestState::Idle));
        assert!(!cloned.contains(&TestState::Loaded));
    }
}
