//! Type checking core for LHC.
//!
//! This crate decides whether the types the analyzer infers for a program
//! fit together. It implements Hindley-Milner unification extended with
//! type-class contexts on type variables, partially applied type
//! constructors and recursive algebraic data types.
//!
//! # Overview
//!
//! The analyzer walks each definition, reserving fresh variables from a
//! [`TypeScope`] and recording an [`Equation`] at every application or
//! pattern site. [`check_group`] unifies those equations and generalizes
//! each definition's declared type:
//!
//! 1. **Reserve**: fresh variables `t0`, `t1`, ... carry the classes they
//!    must satisfy
//! 2. **Unify**: [`unify`] binds variables, checks contexts against the
//!    [`SymbolResolver`] and rejects infinite types
//! 3. **Specialize**: [`bind_arguments`] instantiates generic data
//!    declarations such as `List a` at concrete arguments
//! 4. **Generalize**: [`TypeScope::generalize`] replaces every bound
//!    variable with its final type
//!
//! # Diagnostics
//!
//! Failed unifications are ordinary [`Unification`] values; [`check_group`]
//! converts the first failure of each definition into a
//! [`Diagnostic`](lhc_diagnostics::Diagnostic) and moves on to the next
//! definition.
//!
//! # See Also
//!
//! - `lhc-types`: type representation
//! - `lhc-diagnostics`: error reporting
//! - `lhc-session`: checker options

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod bind_args;
mod builtins;
pub mod check;
pub mod diagnostics;
pub mod env;
pub mod resolver;
pub mod scope;
pub mod unify;

pub use bind_args::bind_arguments;
pub use builtins::PRIMITIVES;
pub use check::{check_group, Definition, Equation, GroupOutcome, TypeChecker, TypedDef};
pub use env::{ClassEnv, ClassInfo, EnvError};
pub use lhc_types::Unification;
pub use resolver::SymbolResolver;
pub use scope::{ScopeError, TypeScope};
pub use unify::{satisfies, unify};

use lhc_diagnostics::{Diagnostic, FileId};
use lhc_session::Options;

/// Type check one definition group of `file`.
///
/// This is the main entry point for drivers that do not keep a
/// [`TypeChecker`] around.
///
/// # Errors
///
/// Returns all collected diagnostics if any definition fails to check.
pub fn type_check_group(
    resolver: &dyn SymbolResolver,
    options: &Options,
    file: FileId,
    definitions: &[Definition],
) -> Result<Vec<TypedDef>, Vec<Diagnostic>> {
    TypeChecker::new(resolver, options.clone(), file).check(definitions)
}
