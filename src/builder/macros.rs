//! Macros for ergonomic state declaration.

/// Declare a state enum and its [`State`](crate::core::State) implementation.
///
/// Variants may be unit or struct-like. The tag returned by `name()` is the
/// variant identifier unless overridden with `as "tag"`.
///
/// # Example
///
/// ```
/// use settle::core::State;
/// use settle::state_enum;
///
/// state_enum! {
///     pub enum Loader {
///         Idle as "idle",
///         Loading { threshold: u32 } as "loading",
///         Loaded { value: u64 } as "loaded",
///         Failed,
///     }
/// }
///
/// assert_eq!(Loader::Loading { threshold: 2 }.name(), "loading");
/// assert_eq!(Loader::Failed.name(), "Failed");
/// ```
#[macro_export]
macro_rules! state_enum {
    (@tag $variant:ident) => {
        stringify!($variant)
    };
    (@tag $variant:ident $tag:literal) => {
        $tag
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
                $({ $($field:ident : $field_ty:ty),* $(,)? })?
                $(as $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $({ $($field: $field_ty),* })?
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant { .. } => $crate::state_enum!(@tag $variant $($tag)?)),*
                }
            }
        }
    };
}
