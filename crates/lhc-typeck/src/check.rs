//! Definition-group checking.
//!
//! The analyzer hands over a group of definitions, each with the type it
//! declares and the equations collected while walking its body. Equations
//! of one definition are unified in order and the first failure stops that
//! definition; sibling definitions are still checked so that every failing
//! definition is reported in one pass.

use std::collections::VecDeque;

use lhc_diagnostics::{Diagnostic, DiagnosticHandler, FileId, FullSpan, Span};
use lhc_intern::Symbol;
use lhc_session::Options;
use lhc_types::Ty;
use tracing::debug;

use crate::diagnostics::unification_diagnostic;
use crate::resolver::SymbolResolver;
use crate::scope::TypeScope;

/// One unification site: the type a context expects and the type found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Equation {
    /// The expected type.
    pub expected: Ty,
    /// The observed type.
    pub actual: Ty,
    /// Where the equation arose.
    pub span: Span,
}

impl Equation {
    /// Create an equation.
    #[must_use]
    pub fn new(expected: Ty, actual: Ty, span: Span) -> Self {
        Self {
            expected,
            actual,
            span,
        }
    }
}

/// A value, pattern or signature definition to check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    /// The definition's name.
    pub name: Symbol,
    /// The declared type, usually built from reserved variables.
    pub declared: Ty,
    /// The span of the whole definition.
    pub span: Span,
    /// Equations in the order they were collected.
    pub equations: Vec<Equation>,
}

impl Definition {
    /// Create a definition without equations.
    #[must_use]
    pub fn new(name: impl Into<Symbol>, declared: Ty, span: Span) -> Self {
        Self {
            name: name.into(),
            declared,
            span,
            equations: Vec::new(),
        }
    }

    /// Add an equation.
    #[must_use]
    pub fn with_equation(mut self, expected: Ty, actual: Ty, span: Span) -> Self {
        self.equations.push(Equation::new(expected, actual, span));
        self
    }
}

/// A definition together with its generalized type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedDef {
    /// The definition's name.
    pub name: Symbol,
    /// The fully resolved type.
    pub ty: Ty,
    /// The span of the definition.
    pub span: Span,
}

/// The result of checking one definition group.
#[derive(Clone, Debug, Default)]
pub struct GroupOutcome {
    /// Definitions that checked, in group order.
    pub typed: Vec<TypedDef>,
    /// Diagnostics for failing definitions.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of failing definitions.
    pub failed: usize,
    /// True if checking stopped before the end of the group.
    pub stopped_early: bool,
}

impl GroupOutcome {
    /// Returns true if no definition failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed == 0
    }
}

/// Check a group of definitions in `scope`.
pub fn check_group(scope: &mut TypeScope<'_>, file: FileId, definitions: &[Definition]) -> GroupOutcome {
    let mut outcome = GroupOutcome::default();
    let mut work: VecDeque<&Definition> = definitions.iter().collect();

    while let Some(def) = work.pop_front() {
        debug!(name = %def.name, equations = def.equations.len(), "checking definition");
        scope.track_all(&def.declared);

        match check_definition(scope, file, def) {
            Ok(typed) => {
                if def.equations.is_empty() {
                    outcome.diagnostics.push(
                        Diagnostic::warning(format!("definition `{}` has no equations", def.name))
                            .with_label(FullSpan::new(file, def.span), "its type is never constrained"),
                    );
                }
                outcome.typed.push(typed);
            }
            Err(diag) => {
                outcome.diagnostics.push(diag);
                outcome.failed += 1;
                if scope.options().should_stop(outcome.failed) {
                    debug!(failed = outcome.failed, remaining = work.len(), "stopping after failure");
                    outcome.stopped_early = !work.is_empty();
                    break;
                }
            }
        }
    }
    outcome
}

fn check_definition(
    scope: &mut TypeScope<'_>,
    file: FileId,
    def: &Definition,
) -> Result<TypedDef, Diagnostic> {
    for equation in &def.equations {
        let result = scope.unify(&equation.expected, &equation.actual);
        if let Some(diag) = unification_diagnostic(&result, FullSpan::new(file, equation.span)) {
            debug!(name = %def.name, failure = %result, "definition failed");
            return Err(diag.with_secondary_label(
                FullSpan::new(file, def.span),
                format!("in the definition of `{}`", def.name),
            ));
        }
    }
    Ok(TypedDef {
        name: def.name,
        ty: scope.generalize(&def.declared),
        span: def.span,
    })
}

/// Checks definition groups of one file against a resolver.
pub struct TypeChecker<R> {
    resolver: R,
    options: Options,
    file: FileId,
    handler: DiagnosticHandler,
}

impl<R: SymbolResolver> TypeChecker<R> {
    /// Create a checker for `file`.
    #[must_use]
    pub fn new(resolver: R, options: Options, file: FileId) -> Self {
        Self {
            resolver,
            options,
            file,
            handler: DiagnosticHandler::new(),
        }
    }

    /// The resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Diagnostics emitted so far and not yet taken.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.handler.diagnostics()
    }

    /// Check one definition group in a fresh scope.
    ///
    /// # Errors
    ///
    /// Returns every diagnostic collected so far if any definition failed,
    /// if warnings were emitted and `deny_warnings` is set, or if the
    /// options are invalid.
    pub fn check(&mut self, definitions: &[Definition]) -> Result<Vec<TypedDef>, Vec<Diagnostic>> {
        let mut scope = match TypeScope::with_options(&self.resolver, self.options.clone()) {
            Ok(scope) => scope,
            Err(err) => {
                self.handler.emit(Diagnostic::error(format!("invalid type checker options: {err}")));
                return Err(self.handler.take_diagnostics());
            }
        };
        let outcome = check_group(&mut scope, self.file, definitions);
        debug!(
            typed = outcome.typed.len(),
            failed = outcome.failed,
            "definition group checked"
        );

        for diag in outcome.diagnostics {
            self.handler.emit(diag);
        }

        let denied = self.options.deny_warnings && self.handler.warning_count() > 0;
        if self.handler.has_errors() || denied {
            Err(self.handler.take_diagnostics())
        } else {
            Ok(outcome.typed)
        }
    }
}
