//! Property tests for unification.
//!
//! These tests verify the algebraic properties unification must have
//! regardless of which types the analyzer feeds it.

use lhc_typeck::{unify, ClassEnv, TypeScope};
use lhc_types::{Context, Ty, TyVar};
use proptest::prelude::*;

fn arb_ty() -> impl Strategy<Value = Ty> {
    let leaf = prop_oneof![
        Just(Ty::con("Int")),
        Just(Ty::con("Char")),
        Just(Ty::con("Bool")),
        Just(Ty::var("a")),
        Just(Ty::var("b")),
        Just(Ty::var_with("n", &["Num"])),
        Just(Ty::var_with("c", &["Eq", "Show"])),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        let head = prop_oneof![
            Just(TyVar::unconstrained("m")),
            Just(TyVar::new("f", Context::of(&["Functor"]))),
        ];
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(from, to)| Ty::fun(from, to)),
            inner.clone().prop_map(|elem| Ty::union("List", vec![elem])),
            inner.clone().prop_map(|elem| Ty::lookup("List", vec![elem])),
            inner.clone().prop_map(|elem| Ty::union("Maybe", vec![elem])),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Ty::union("Either", vec![l, r])),
            (head, prop::collection::vec(inner, 1..=2)).prop_map(|(head, args)| Ty::ctor(head, args)),
        ]
    })
}

/// Lookups and unions of the same name denote the same type.
fn nominal(ty: &Ty) -> Ty {
    match ty {
        Ty::Fun(from, to) => Ty::fun(nominal(from), nominal(to)),
        Ty::Union(union) => Ty::union(union.name().as_str(), union.args().iter().map(nominal).collect()),
        Ty::Lookup(lookup) => Ty::union(lookup.name().as_str(), lookup.args().iter().map(nominal).collect()),
        Ty::Ctor(ctor) => Ty::ctor(ctor.head().clone(), ctor.args().iter().map(nominal).collect()),
        Ty::Var(_) | Ty::Con(_) => ty.clone(),
    }
}

/// Rename variables to `v0`, `v1`, ... in order of first occurrence.
fn canonical(ty: &Ty, seen: &mut Vec<TyVar>) -> Ty {
    fn rename(var: &TyVar, seen: &mut Vec<TyVar>) -> TyVar {
        let idx = match seen.iter().position(|v| v == var) {
            Some(idx) => idx,
            None => {
                seen.push(var.clone());
                seen.len() - 1
            }
        };
        TyVar::new(format!("v{idx}").as_str(), var.context().clone())
    }

    match ty {
        Ty::Var(var) => Ty::Var(rename(var, seen)),
        Ty::Fun(from, to) => {
            let from = canonical(from, seen);
            Ty::fun(from, canonical(to, seen))
        }
        Ty::Union(union) => Ty::union(
            union.name().as_str(),
            union.args().iter().map(|arg| canonical(arg, seen)).collect(),
        ),
        Ty::Lookup(lookup) => Ty::union(
            lookup.name().as_str(),
            lookup.args().iter().map(|arg| canonical(arg, seen)).collect(),
        ),
        Ty::Ctor(ctor) => {
            let head = rename(ctor.head(), seen);
            Ty::ctor(head, ctor.args().iter().map(|arg| canonical(arg, seen)).collect())
        }
        Ty::Con(_) => ty.clone(),
    }
}

proptest! {
    // unify(A, B) succeeds iff unify(B, A) does, with the same result up to naming
    #[test]
    fn unify_is_symmetric(a in arb_ty(), b in arb_ty()) {
        let env = ClassEnv::with_prelude();

        let mut forward = TypeScope::new(&env);
        let ab = unify(&mut forward, &a, &b);
        let mut backward = TypeScope::new(&env);
        let ba = unify(&mut backward, &b, &a);

        prop_assert_eq!(ab.is_unified(), ba.is_unified());
        if ab.is_unified() {
            let left = canonical(&forward.generalize(&a), &mut Vec::new());
            let right = canonical(&backward.generalize(&a), &mut Vec::new());
            prop_assert_eq!(left, right);
        }
    }

    // A successful unification makes both sides equal
    #[test]
    fn unify_produces_unifier(a in arb_ty(), b in arb_ty()) {
        let env = ClassEnv::with_prelude();
        let mut scope = TypeScope::new(&env);
        let result = unify(&mut scope, &a, &b);
        if let Some(unified) = result.unified() {
            let ga = nominal(&scope.generalize(&a));
            prop_assert_eq!(&ga, &nominal(&scope.generalize(&b)));
            prop_assert_eq!(&ga, &nominal(&scope.generalize(unified)));
        }
    }

    // Every type unifies with itself and nothing gets bound
    #[test]
    fn unify_is_reflexive(a in arb_ty()) {
        let env = ClassEnv::with_prelude();
        let mut scope = TypeScope::new(&env);
        prop_assert_eq!(unify(&mut scope, &a, &a).into_unified(), Some(a.clone()));
        prop_assert_eq!(scope.generalize(&a), a);
    }

    // Ground types unify exactly when they name the same type
    #[test]
    fn ground_types_unify_iff_equal(a in arb_ty(), b in arb_ty()) {
        prop_assume!(a.is_ground() && b.is_ground());
        let env = ClassEnv::with_prelude();
        let mut scope = TypeScope::new(&env);
        prop_assert_eq!(unify(&mut scope, &a, &b).is_unified(), nominal(&a) == nominal(&b));
    }
}
