//! Diagnostic construction for unification failures.
//!
//! Codes:
//!
//! - `E0001` type mismatch
//! - `E0002` infinite type
//! - `E0003` missing instance
//!
//! Internal scope errors are reported as [`Severity::Bug`](lhc_diagnostics::Severity::Bug).

use lhc_diagnostics::{Diagnostic, FullSpan};
use lhc_types::{Ty, TyVar, Unification};

use crate::scope::ScopeError;

/// Build the diagnostic for a failed unification.
///
/// Returns `None` for [`Unification::Unified`].
#[must_use]
pub fn unification_diagnostic(result: &Unification, span: FullSpan) -> Option<Diagnostic> {
    match result {
        Unification::Unified(_) => None,
        Unification::TypeMismatch { expected, actual } => Some(type_mismatch(expected, actual, span)),
        Unification::CircularReference { expected, variable } => {
            Some(occurs_check(variable, expected, span))
        }
        Unification::ContextMismatch {
            expected,
            expected_context,
            actual,
            actual_context,
        } => {
            let missing = result.missing_context();
            let classes: Vec<String> = missing.iter().map(|c| format!("`{c}`")).collect();
            let diag = Diagnostic::error(format!(
                "missing instance: `{actual}` does not implement {}",
                classes.join(", ")
            ))
            .with_code("E0003")
            .with_label(span, format!("required by the context of `{expected}`"))
            .with_note(format!("`{expected}` requires {expected_context}"));
            let diag = if actual_context.is_empty() {
                diag.with_note(format!("`{actual}` implements no required class"))
            } else {
                diag.with_note(format!("`{actual}` implements {actual_context}"))
            };
            Some(diag)
        }
    }
}

fn type_mismatch(expected: &Ty, actual: &Ty, span: FullSpan) -> Diagnostic {
    Diagnostic::error(format!(
        "type mismatch: expected `{expected}`, found `{actual}`"
    ))
    .with_code("E0001")
    .with_label(span, "type mismatch here")
}

fn occurs_check(var: &TyVar, ty: &Ty, span: FullSpan) -> Diagnostic {
    Diagnostic::error(format!(
        "infinite type: type variable `{var}` occurs in `{ty}`"
    ))
    .with_code("E0002")
    .with_label(span, "infinite type detected")
    .with_note("This would create an infinitely recursive type")
}

/// Build the diagnostic for an internal scope error.
#[must_use]
pub fn scope_error_diagnostic(err: &ScopeError, span: FullSpan) -> Diagnostic {
    Diagnostic::bug(format!("internal type checker error: {err}"))
        .with_label(span, "while checking this")
        .with_note("this is a bug in the type checker, not in the program")
}
