//! The outcome of unifying two types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Context, Ty, TyVar};

/// The result of unifying an expected type with an actual type.
///
/// Failures are ordinary values: the checker reports them as diagnostics
/// and keeps going with sibling definitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unification {
    /// The two types were made equal; carries the unified type.
    Unified(Ty),

    /// The two types have incompatible shapes or names.
    TypeMismatch {
        /// The expected type.
        expected: Ty,
        /// The actual type.
        actual: Ty,
    },

    /// Binding `variable` to `expected` would build an infinite type.
    CircularReference {
        /// The type the variable was to be bound to.
        expected: Ty,
        /// The variable occurring in it.
        variable: TyVar,
    },

    /// A type does not provide the classes a variable requires.
    ContextMismatch {
        /// The constrained side.
        expected: Ty,
        /// The classes the constrained side requires.
        expected_context: Context,
        /// The side that failed to provide them.
        actual: Ty,
        /// The classes that side is known to provide.
        actual_context: Context,
    },
}

impl Unification {
    /// A type mismatch between `expected` and `actual`.
    #[must_use]
    pub fn mismatch(expected: Ty, actual: Ty) -> Self {
        Self::TypeMismatch { expected, actual }
    }

    /// Continue with `f` if unified, otherwise pass the failure through.
    #[must_use]
    pub fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(Ty) -> Self,
    {
        match self {
            Self::Unified(ty) => f(ty),
            failure => failure,
        }
    }

    /// Transform the unified type, passing failures through.
    #[must_use]
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(Ty) -> Ty,
    {
        match self {
            Self::Unified(ty) => Self::Unified(f(ty)),
            failure => failure,
        }
    }

    /// Returns true on success.
    #[must_use]
    pub fn is_unified(&self) -> bool {
        matches!(self, Self::Unified(_))
    }

    /// The unified type, if any.
    #[must_use]
    pub fn unified(&self) -> Option<&Ty> {
        match self {
            Self::Unified(ty) => Some(ty),
            _ => None,
        }
    }

    /// Consume and return the unified type, if any.
    #[must_use]
    pub fn into_unified(self) -> Option<Ty> {
        match self {
            Self::Unified(ty) => Some(ty),
            _ => None,
        }
    }

    /// Convert into a `Result`, keeping the failure as the error value.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` for every variant other than `Unified`.
    pub fn into_result(self) -> Result<Ty, Self> {
        match self {
            Self::Unified(ty) => Ok(ty),
            failure => Err(failure),
        }
    }

    /// The required classes the actual side does not provide.
    ///
    /// Empty for every variant other than `ContextMismatch`.
    #[must_use]
    pub fn missing_context(&self) -> Context {
        match self {
            Self::ContextMismatch {
                expected_context,
                actual_context,
                ..
            } => expected_context.difference(actual_context),
            _ => Context::new(),
        }
    }
}

impl fmt::Display for Unification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unified(ty) => write!(f, "unified as `{ty}`"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "expected `{expected}`, found `{actual}`")
            }
            Self::CircularReference { expected, variable } => {
                write!(f, "cannot construct the infinite type `{variable} = {expected}`")
            }
            Self::ContextMismatch { actual, .. } => {
                write!(f, "`{actual}` does not implement {}", self.missing_context())
            }
        }
    }
}
