//! Type unification with occurs and context checks.
//!
//! This module implements unification for Hindley-Milner inference with
//! type-class contexts. Unification makes two types equal by binding type
//! variables in the [`TypeScope`], or reports why no binding exists.
//!
//! ## Algorithm
//!
//! Both sides are first resolved one layer deep, then matched pairwise:
//!
//! 1. Two variables are bound to one fresh variable carrying both contexts
//! 2. A variable and a concrete shape: occurs check, context check, bind
//! 3. A variable and a constructor: occurs check, bind, record the context
//! 4. Functions unify argument then result, walking the arrow spine in a
//!    loop
//! 5. Unions and lookups unify by name, arity and then argument-wise
//! 6. A constructor and a union: bind the head to the union's leading
//!    arguments, flatten, and unify as unions
//! 7. Anything else is a mismatch
//!
//! ## Occurs Check
//!
//! Before binding `a` to `t`, `t` is fully resolved and must not mention `a`;
//! otherwise the result is [`Unification::CircularReference`].
//!
//! ## Contexts
//!
//! A variable requiring `{Eq, Show}` may only be bound to a type that
//! implements both, according to the resolver or to classes recorded in the
//! scope. Contexts only grow; they are merged by set union.

use std::borrow::Cow;

use lhc_types::{Context, Ty, TyCtor, TyVar, Unification};
use tracing::trace;

use crate::scope::TypeScope;

/// Unify `expected` with `actual`, binding variables in `scope`.
///
/// On success the result carries the unified type, fully resolved. Failures
/// keep the bindings made before the failing step.
pub fn unify(scope: &mut TypeScope<'_>, expected: &Ty, actual: &Ty) -> Unification {
    trace!(%expected, %actual, "unify");

    // Same variable unifies trivially
    if let (Ty::Var(v1), Ty::Var(v2)) = (expected, actual) {
        if v1 == v2 {
            scope.track(v1);
            return Unification::Unified(scope.generalize(expected));
        }
    }

    scope.track_all(expected);
    scope.track_all(actual);
    let expected = scope.resolve_layer(Cow::Borrowed(expected));
    let actual = scope.resolve_layer(Cow::Borrowed(actual));
    unify_resolved(scope, &expected, &actual)
}

/// Unification once both sides have been resolved one layer deep.
fn unify_resolved(scope: &mut TypeScope<'_>, expected: &Ty, actual: &Ty) -> Unification {
    match (expected, actual) {
        (Ty::Var(v1), Ty::Var(v2)) => unify_vars(scope, v1, v2),

        (Ty::Var(var), Ty::Ctor(ctor)) | (Ty::Ctor(ctor), Ty::Var(var)) => {
            unify_var_ctor(scope, var, ctor)
        }

        (Ty::Var(var), other) | (other, Ty::Var(var)) => unify_var(scope, var, other),

        (Ty::Fun(_, _), Ty::Fun(_, _)) => unify_funs(scope, expected, actual),

        (Ty::Ctor(c1), Ty::Ctor(c2)) => unify_ctors(scope, c1, c2, expected, actual),

        (Ty::Ctor(ctor), applied) => unify_ctor_applied(scope, ctor, applied, Side::Expected),
        (applied, Ty::Ctor(ctor)) => unify_ctor_applied(scope, ctor, applied, Side::Actual),

        (Ty::Con(c1), Ty::Con(c2)) => {
            if c1.name() == c2.name() {
                Unification::Unified(expected.clone())
            } else {
                Unification::mismatch(expected.clone(), actual.clone())
            }
        }

        (
            Ty::Con(_) | Ty::Union(_) | Ty::Lookup(_),
            Ty::Con(_) | Ty::Union(_) | Ty::Lookup(_),
        ) => unify_unions(scope, expected, actual),

        // Different type structures: mismatch
        _ => Unification::mismatch(expected.clone(), actual.clone()),
    }
}

/// Two function types: unify the arguments along both arrow spines, then
/// the final results.
///
/// Each argument is unified before the next one is looked at, so later
/// positions see earlier bindings.
fn unify_funs(scope: &mut TypeScope<'_>, expected: &Ty, actual: &Ty) -> Unification {
    let mut froms = Vec::new();
    let (mut expected, mut actual) = (Cow::Borrowed(expected), Cow::Borrowed(actual));
    while expected.is_fun() && actual.is_fun() {
        let (Some((from1, to1)), Some((from2, to2))) = (split_arrow(expected), split_arrow(actual)) else {
            unreachable!("both sides are function types")
        };
        match unify(scope, &from1, &from2) {
            Unification::Unified(from) => froms.push(from),
            failure => return failure,
        }
        expected = scope.resolve_layer(to1);
        actual = scope.resolve_layer(to2);
    }

    let to = match unify(scope, &expected, &actual) {
        Unification::Unified(to) => to,
        failure => return failure,
    };
    // Later arguments may have bound variables of earlier ones
    let to = scope.generalize(&to);
    let fun = froms
        .into_iter()
        .rev()
        .fold(to, |to, from| Ty::fun(scope.generalize(&from), to));
    Unification::Unified(fun)
}

/// Argument and result of a function type, borrowed or moved out.
fn split_arrow(ty: Cow<'_, Ty>) -> Option<(Cow<'_, Ty>, Cow<'_, Ty>)> {
    match ty {
        Cow::Borrowed(Ty::Fun(from, to)) => Some((Cow::Borrowed(&**from), Cow::Borrowed(&**to))),
        Cow::Owned(Ty::Fun(from, to)) => Some((Cow::Owned(*from), Cow::Owned(*to))),
        Cow::Borrowed(_) | Cow::Owned(_) => None,
    }
}

/// Two unbound variables: bind both to a fresh representative.
///
/// The representative requires everything either side required, including
/// classes recorded for them as constructor heads.
fn unify_vars(scope: &mut TypeScope<'_>, v1: &TyVar, v2: &TyVar) -> Unification {
    if v1 == v2 {
        return Unification::Unified(Ty::Var(v1.clone()));
    }
    let merged = scope.required_of(v1).union(&scope.required_of(v2));
    let rep = scope.reserve(merged);
    scope.assign(v1, Ty::Var(rep.clone()));
    scope.assign(v2, Ty::Var(rep.clone()));
    Unification::Unified(Ty::Var(rep))
}

/// An unbound variable and a function, union, lookup or concrete type.
fn unify_var(scope: &mut TypeScope<'_>, var: &TyVar, other: &Ty) -> Unification {
    let target = scope.generalize(other);
    if target.occurs(var) {
        return Unification::CircularReference {
            expected: target,
            variable: var.clone(),
        };
    }

    let required = scope.required_of(var);
    if !required.is_empty() {
        let provided = scope.provided_context(&target, &required);
        if !required.is_subset(&provided) {
            trace!(var = %var, target = %target, "context not satisfied");
            return Unification::ContextMismatch {
                expected: Ty::Var(var.clone()),
                expected_context: required,
                actual: target,
                actual_context: provided,
            };
        }
    }

    scope.assign(var, target.clone());
    Unification::Unified(target)
}

/// An unbound variable and a constructor with an unbound head.
fn unify_var_ctor(scope: &mut TypeScope<'_>, var: &TyVar, ctor: &TyCtor) -> Unification {
    let target = scope.generalize(&Ty::Ctor(ctor.clone()));
    if target.occurs(var) {
        return Unification::CircularReference {
            expected: target,
            variable: var.clone(),
        };
    }
    let required = scope.required_of(var);
    scope.assign(var, target.clone());
    scope.extend_context(&target, &required);
    Unification::Unified(target)
}

/// Unify argument lists pairwise, stopping at the first failure.
fn unify_args(scope: &mut TypeScope<'_>, args1: &[Ty], args2: &[Ty]) -> Result<Vec<Ty>, Unification> {
    let mut unified = Vec::with_capacity(args1.len());
    for (a1, a2) in args1.iter().zip(args2) {
        unified.push(unify(scope, a1, a2).into_result()?);
    }
    Ok(unified)
}

/// Two named types: concrete, union or lookup.
fn unify_unions(scope: &mut TypeScope<'_>, expected: &Ty, actual: &Ty) -> Unification {
    let (Some((name1, args1)), Some((name2, args2))) = (expected.as_applied(), actual.as_applied())
    else {
        return Unification::mismatch(expected.clone(), actual.clone());
    };
    if name1 != name2 || args1.len() != args2.len() {
        return Unification::mismatch(expected.clone(), actual.clone());
    }

    if let Err(failure) = unify_args(scope, args1, args2) {
        return failure;
    }

    // Keep the members of whichever side is fully defined
    let result = match (expected, actual) {
        (Ty::Union(u), _) if u.is_defined() => expected,
        (_, Ty::Union(u)) if u.is_defined() => actual,
        (Ty::Union(_), _) | (Ty::Con(_), _) => expected,
        (_, Ty::Union(_) | Ty::Con(_)) => actual,
        _ => expected,
    };
    Unification::Unified(scope.generalize(result))
}

/// Which argument of [`unify`] a value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Expected,
    Actual,
}

/// A constructor with an unbound head and a named type.
fn unify_ctor_applied(
    scope: &mut TypeScope<'_>,
    ctor: &TyCtor,
    applied: &Ty,
    side: Side,
) -> Unification {
    let ctor_ty = Ty::Ctor(ctor.clone());
    let mismatch = || match side {
        Side::Expected => Unification::mismatch(ctor_ty.clone(), applied.clone()),
        Side::Actual => Unification::mismatch(applied.clone(), ctor_ty.clone()),
    };

    let Some((name, args)) = applied.as_applied() else {
        return mismatch();
    };
    let pending = ctor.args().len();
    if args.len() < pending {
        return mismatch();
    }
    let leading = args[..args.len() - pending].to_vec();
    let partial = match applied {
        Ty::Union(union) => Ty::Union(union.rebuild(leading, None)),
        Ty::Lookup(lookup) => Ty::Lookup(lookup.with_args(leading)),
        _ => applied.clone(),
    };

    // The head stands for the partially applied union, e.g. `Maybe`
    let head = ctor.head();
    let required = scope.context_of(&ctor_ty);
    if !required.is_empty() {
        let provided = scope.provided_context(&partial, &required);
        if !required.is_subset(&provided) {
            trace!(head = %head, union = %name, "constructor context not satisfied");
            return Unification::ContextMismatch {
                expected: Ty::Ctor(ctor.clone()),
                expected_context: required,
                actual: partial,
                actual_context: provided,
            };
        }
    }

    let partial = scope.generalize(&partial);
    if partial.occurs(head) {
        return Unification::CircularReference {
            expected: partial,
            variable: head.clone(),
        };
    }
    scope.assign(head, partial.clone());

    let Some(flat) = partial.apply_args(ctor.args()) else {
        return mismatch();
    };
    match side {
        Side::Expected => unify(scope, &flat, applied),
        Side::Actual => unify(scope, applied, &flat),
    }
}

/// Two constructors with unbound heads, aligned from the right.
fn unify_ctors(
    scope: &mut TypeScope<'_>,
    c1: &TyCtor,
    c2: &TyCtor,
    expected: &Ty,
    actual: &Ty,
) -> Unification {
    let (n1, n2) = (c1.args().len(), c2.args().len());
    let common = n1.min(n2);

    // The shorter head absorbs the longer constructor's leading part
    let head1 = head_with_leading(c1, n1 - common);
    let head2 = head_with_leading(c2, n2 - common);
    let heads = unify(scope, &head1, &head2);
    if !heads.is_unified() {
        return heads;
    }

    if let Err(failure) = unify_args(scope, &c1.args()[n1 - common..], &c2.args()[n2 - common..]) {
        return failure;
    }

    // Both heads now agree; the wider constructor is the more informative result
    let result = if n1 >= n2 { expected } else { actual };
    Unification::Unified(scope.generalize(result))
}

fn head_with_leading(ctor: &TyCtor, leading: usize) -> Ty {
    if leading == 0 {
        Ty::Var(ctor.head().clone())
    } else {
        Ty::Ctor(TyCtor::new(ctor.head().clone(), ctor.args()[..leading].to_vec()))
    }
}

/// Returns true if `required` is satisfied by `ty` in `scope`.
pub fn satisfies(scope: &mut TypeScope<'_>, ty: &Ty, required: &Context) -> bool {
    let ty = scope.shallow_resolve(ty);
    match &ty {
        Ty::Var(var) => required.is_subset(&scope.required_of(var)),
        _ => required.is_subset(&scope.provided_context(&ty, required)),
    }
}
