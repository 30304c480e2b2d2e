//! Integration tests for the LHC type checker.
//!
//! These tests drive the public API the way the analyzer does: reserve
//! variables, unify expected against observed types, specialize data types
//! and generalize the results.

use lhc_diagnostics::{DiagnosticRenderer, FileId, Severity, SourceMap, Span};
use lhc_intern::Symbol;
use lhc_session::Options;
use lhc_typeck::diagnostics::scope_error_diagnostic;
use lhc_typeck::{
    type_check_group, unify, ClassEnv, Definition, ScopeError, TypeScope, Unification,
};
use lhc_types::{Context, Ty, TyVar, UnionTy};

fn int() -> Ty {
    Ty::con("Int")
}

fn string() -> Ty {
    Ty::con("String")
}

#[test]
fn test_reflexivity() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    assert_eq!(unify(&mut scope, &int(), &int()), Unification::Unified(int()));
}

#[test]
fn test_variable_absorption() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let a = TyVar::unconstrained("a");

    assert_eq!(
        unify(&mut scope, &string(), &Ty::Var(a.clone())),
        Unification::Unified(string())
    );
    assert_eq!(scope.target(&a), string());
}

#[test]
fn test_rebind_is_internal_error() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let a = TyVar::unconstrained("a");

    assert!(unify(&mut scope, &Ty::Var(a.clone()), &Ty::con("Char")).is_unified());
    let err = scope.bind(&a, int()).unwrap_err();
    assert!(matches!(err, ScopeError::Rebind { .. }));
    assert_eq!(scope.target(&a), Ty::con("Char"));

    let diag = scope_error_diagnostic(&err, lhc_diagnostics::FullSpan::new(FileId::new(0), Span::DUMMY));
    assert_eq!(diag.severity, Severity::Bug);
}

#[test]
fn test_unifying_bound_variable_against_other_type_is_mismatch() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let a = Ty::var("a");

    assert!(unify(&mut scope, &a, &Ty::con("Char")).is_unified());
    assert_eq!(
        unify(&mut scope, &a, &int()),
        Unification::mismatch(Ty::con("Char"), int())
    );
}

#[test]
fn test_chain_propagation() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let a = Ty::var("a");
    let b = Ty::var("b");
    let a_to_int = Ty::fun(a.clone(), int());
    let b_to_int = Ty::fun(b, int());

    assert!(unify(&mut scope, &a_to_int, &b_to_int).is_unified());
    assert!(unify(&mut scope, &a, &string()).is_unified());

    let expected = Ty::fun(string(), int());
    assert_eq!(scope.generalize(&a_to_int), expected);
    assert_eq!(scope.generalize(&b_to_int), expected);
}

#[test]
fn test_function_vs_concrete_mismatch_keeps_order() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let fun = Ty::fun(string(), int());

    assert_eq!(
        unify(&mut scope, &fun, &int()),
        Unification::TypeMismatch {
            expected: fun.clone(),
            actual: int(),
        }
    );
    assert_eq!(
        unify(&mut scope, &int(), &fun),
        Unification::TypeMismatch {
            expected: int(),
            actual: fun,
        }
    );
}

#[test]
fn test_function_vs_union_mismatch() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let fun = Ty::fun(int(), int());
    let list = Ty::union("List", vec![int()]);
    assert_eq!(
        unify(&mut scope, &list, &fun),
        Unification::mismatch(list, fun)
    );
}

#[test]
fn test_circular_reference() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let a = TyVar::unconstrained("a");
    let bit_to_a = Ty::fun(Ty::con("Bit"), Ty::Var(a.clone()));

    assert_eq!(
        unify(&mut scope, &bit_to_a, &Ty::Var(a.clone())),
        Unification::CircularReference {
            expected: bit_to_a,
            variable: a,
        }
    );
}

#[test]
fn test_circular_reference_through_binding() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let a = Ty::var("a");
    let b = Ty::var("b");

    // a ~ List b, then b ~ a would make b = List b
    assert!(unify(&mut scope, &a, &Ty::union("List", vec![b.clone()])).is_unified());
    let result = unify(&mut scope, &b, &a);
    assert!(matches!(result, Unification::CircularReference { .. }));
}

#[test]
fn test_context_merge() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let a = TyVar::new("a", Context::of(&["Eq"]));
    let b = TyVar::new("b", Context::of(&["Show"]));

    assert!(unify(&mut scope, &Ty::Var(a.clone()), &Ty::Var(b.clone())).is_unified());

    let ra = scope.generalize(&Ty::Var(a));
    let rb = scope.generalize(&Ty::Var(b));
    assert_eq!(ra, rb);
    let merged = ra.as_var().unwrap();
    assert_eq!(merged.context(), &Context::of(&["Eq", "Show"]));
    assert_eq!(merged.display_with_context(), format!("(Eq {0}, Show {0}) => {0}", merged.name()));
}

#[test]
fn test_context_mismatch_names_missing_symbols() {
    let mut env = ClassEnv::with_prelude();
    env.register_class("Pretty", &[]);
    env.register_instance("Show", "Widget").unwrap();
    let mut scope = TypeScope::new(&env);

    let result = unify(&mut scope, &Ty::con("Widget"), &Ty::var_with("a", &["Eq", "Show"]));
    let Unification::ContextMismatch {
        expected_context,
        actual_context,
        ..
    } = &result
    else {
        panic!("expected a context mismatch, got {result:?}");
    };
    assert_eq!(expected_context, &Context::of(&["Eq", "Show"]));
    assert_eq!(actual_context, &Context::of(&["Show"]));
    assert_eq!(result.missing_context(), Context::of(&["Eq"]));
}

#[test]
fn test_context_satisfied_after_merge() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let a = Ty::var_with("a", &["Eq"]);
    let b = Ty::var_with("b", &["Num"]);

    assert!(unify(&mut scope, &a, &b).is_unified());
    // The merged representative needs both Eq and Num
    assert!(!unify(&mut scope, &a, &string()).is_unified());
    assert!(unify(&mut scope, &b, &int()).is_unified());
    assert_eq!(scope.generalize(&a), int());
}

#[test]
fn test_specialize_list() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);

    let result = scope.specialize(Symbol::intern("List"), &[int()]).unwrap();
    let Some(Ty::Union(list)) = result.unified() else {
        panic!("expected a union, got {result:?}");
    };
    assert_eq!(list.to_string(), "List Int");
    let cons = list.member("Cons").unwrap();
    assert_eq!(cons.fields[0].ty, int());
    assert_eq!(cons.fields[1].ty, Ty::lookup("List", vec![int()]));
    assert_eq!(cons.fields[1].ty.to_string(), "List Int");
}

#[test]
fn test_specialized_union_unifies_with_lookup() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);

    let list = scope
        .specialize(Symbol::intern("List"), &[int()])
        .unwrap()
        .into_unified()
        .unwrap();
    let tail = Ty::lookup("List", vec![Ty::var("e")]);
    let result = unify(&mut scope, &tail, &list);
    assert_eq!(result, Unification::Unified(list));
    assert_eq!(scope.generalize(&Ty::var("e")), int());
}

#[test]
fn test_monadic_constructor() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let m = scope.reserve(Context::of(&["Monad"]));
    let a = scope.reserve(Context::new());

    // return :: a -> m a, used at Maybe Int
    let ret = Ty::fun(Ty::Var(a.clone()), Ty::ctor(m.clone(), vec![Ty::Var(a)]));
    let used = Ty::fun(int(), Ty::union("Maybe", vec![int()]));
    assert_eq!(unify(&mut scope, &ret, &used), Unification::Unified(used.clone()));
    assert_eq!(scope.generalize(&ret), used);
    assert_eq!(scope.target(&m), Ty::union("Maybe", Vec::new()));
}

#[test]
fn test_monadic_constructor_context_mismatch() {
    let mut env = ClassEnv::with_prelude();
    env.register_data_type(UnionTy::defined(
        "Box",
        vec![Ty::var("a")],
        vec![lhc_types::Member::positional("Box", vec![Ty::var("a")])],
    ))
    .unwrap();
    let mut scope = TypeScope::new(&env);
    let m = TyVar::new("m", Context::of(&["Monad"]));

    let result = unify(
        &mut scope,
        &Ty::ctor(m, vec![int()]),
        &Ty::union("Box", vec![int()]),
    );
    assert_eq!(result.missing_context(), Context::of(&["Monad"]));
}

#[test]
fn test_type_check_group_reports_every_failing_definition() {
    let env = ClassEnv::with_prelude();
    let src = "bad1 = 'c' + 1\nbad2 = not 3\nok = 1\n";
    let mut sources = SourceMap::new();
    let file = sources.add_file("Main.lhs".to_string(), src.to_string());

    let defs = vec![
        Definition::new("bad1", Ty::var("r1"), Span::from_raw(0, 14)).with_equation(
            Ty::var_with("n", &["Num"]),
            Ty::con("Char"),
            Span::from_raw(7, 10),
        ),
        Definition::new("bad2", Ty::var("r2"), Span::from_raw(15, 27)).with_equation(
            Ty::con("Bool"),
            int(),
            Span::from_raw(26, 27),
        ),
        Definition::new("ok", Ty::var("r3"), Span::from_raw(28, 34)).with_equation(
            Ty::var("r3"),
            int(),
            Span::from_raw(33, 34),
        ),
    ];

    let errors = type_check_group(&env, &Options::default(), file, &defs).unwrap_err();
    let codes: Vec<_> = errors.iter().map(|d| d.code.as_deref()).collect();
    assert_eq!(codes, [Some("E0003"), Some("E0001")]);

    let rendered = DiagnosticRenderer::new(&sources)
        .without_colors()
        .render_to_string(&errors);
    assert!(rendered.contains("E0003"));
    assert!(rendered.contains("Main.lhs"));
}

#[test]
fn test_type_check_group_success() {
    let env = ClassEnv::with_prelude();
    let a = Ty::var("a");
    let defs = [Definition::new("twice", Ty::fun(a.clone(), a.clone()), Span::from_raw(0, 5))
        .with_equation(a, Ty::con("Double"), Span::from_raw(1, 2))];

    let typed = type_check_group(&env, &Options::default(), FileId::new(0), &defs).unwrap();
    assert_eq!(typed.len(), 1);
    assert_eq!(typed[0].name.as_str(), "twice");
    assert_eq!(typed[0].ty.to_string(), "Double -> Double");
}

#[test]
fn test_error_limit() {
    let env = ClassEnv::with_prelude();
    let options = Options::from_toml_str("[typeck]\nerror-limit = 2\n").unwrap();
    let bad = |name: &str| {
        Definition::new(name, int(), Span::DUMMY).with_equation(int(), string(), Span::DUMMY)
    };
    let defs = [bad("a1"), bad("a2"), bad("a3")];

    let errors = type_check_group(&env, &options, FileId::new(0), &defs).unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_fresh_variables_avoid_user_names() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let t0 = Ty::var("t0");
    let t1 = Ty::var_with("t1", &["Eq"]);

    assert!(unify(&mut scope, &t0, &t1).is_unified());
    let rep = scope.generalize(&t0);
    let name = rep.as_var().unwrap().name();
    assert_ne!(name.as_str(), "t0");
    assert_ne!(name.as_str(), "t1");
}

#[test]
fn test_fresh_variables_unaffected_by_later_user_names() {
    let env = ClassEnv::with_prelude();
    let mut scope = TypeScope::new(&env);
    let (a, b) = (Ty::var("a"), Ty::var("b"));

    // The representative of a and b is named t0; a user t0 appears afterwards
    assert!(unify(&mut scope, &a, &b).is_unified());
    assert_eq!(scope.generalize(&a).to_string(), "t0");
    assert!(unify(&mut scope, &Ty::var("t0"), &int()).is_unified());

    assert!(scope.generalize(&a).as_var().is_some());
    assert_eq!(scope.generalize(&a), scope.generalize(&b));
    assert_eq!(scope.generalize(&Ty::var("t0")), int());
}
