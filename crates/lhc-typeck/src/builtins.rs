//! Built-in types, classes and data declarations.
//!
//! These are registered before any user declaration is seen:
//!
//! ```text
//! Int  Char  Bool  Bit  String  Double
//!
//! class Eq; class Ord; class Show; class Num; class Functor; class Monad
//!
//! data List a     = Nil | Cons a (List a)
//! data Maybe a    = Nothing | Just a
//! data Either a b = Left a | Right b
//! ```

use lhc_types::{Field, Member, Ty, UnionTy};

use crate::env::ClassEnv;

/// The primitive nullary types.
pub const PRIMITIVES: [&str; 6] = ["Int", "Char", "Bool", "Bit", "String", "Double"];

/// The standard classes, with their superclasses.
const CLASSES: [(&str, &[&str]); 6] = [
    ("Eq", &[]),
    ("Ord", &["Eq"]),
    ("Show", &[]),
    ("Num", &[]),
    ("Functor", &[]),
    ("Monad", &["Functor"]),
];

/// Instance table: type head and the classes it implements.
const INSTANCES: [(&str, &[&str]); 9] = [
    ("Int", &["Eq", "Ord", "Show", "Num"]),
    ("Double", &["Eq", "Ord", "Show", "Num"]),
    ("Char", &["Eq", "Ord", "Show"]),
    ("Bool", &["Eq", "Ord", "Show"]),
    ("Bit", &["Eq", "Ord", "Show"]),
    ("String", &["Eq", "Ord", "Show"]),
    ("List", &["Eq", "Ord", "Show", "Functor", "Monad"]),
    ("Maybe", &["Eq", "Ord", "Show", "Functor", "Monad"]),
    ("Either", &["Eq", "Ord", "Show", "Functor", "Monad"]),
];

fn list_decl() -> UnionTy {
    let a = Ty::var("a");
    UnionTy::defined(
        "List",
        vec![a.clone()],
        vec![
            Member::new("Nil", Vec::new()),
            Member::new(
                "Cons",
                vec![
                    Field::new("head", a.clone()),
                    Field::new("tail", Ty::lookup("List", vec![a])),
                ],
            ),
        ],
    )
}

fn maybe_decl() -> UnionTy {
    let a = Ty::var("a");
    UnionTy::defined(
        "Maybe",
        vec![a.clone()],
        vec![
            Member::new("Nothing", Vec::new()),
            Member::positional("Just", vec![a]),
        ],
    )
}

fn either_decl() -> UnionTy {
    let a = Ty::var("a");
    let b = Ty::var("b");
    UnionTy::defined(
        "Either",
        vec![a.clone(), b.clone()],
        vec![
            Member::positional("Left", vec![a]),
            Member::positional("Right", vec![b]),
        ],
    )
}

impl ClassEnv {
    /// An environment pre-populated with the built-in types and classes.
    #[must_use]
    pub fn with_prelude() -> Self {
        let mut env = Self::new();
        for (class, supers) in CLASSES {
            env.register_class(class, supers);
        }
        for (head, classes) in INSTANCES {
            for class in classes {
                // Every class above is registered.
                let _ = env.register_instance(*class, head);
            }
        }
        for decl in [list_decl(), maybe_decl(), either_decl()] {
            let _ = env.register_data_type(decl);
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymbolResolver;
    use lhc_intern::Symbol;

    #[test]
    fn test_prelude_instances() {
        let env = ClassEnv::with_prelude();
        let eq = Symbol::intern("Eq");
        let num = Symbol::intern("Num");
        for prim in PRIMITIVES {
            assert!(env.is_implemented(eq, &Ty::con(prim)), "{prim} should implement Eq");
        }
        assert!(env.is_implemented(num, &Ty::con("Int")));
        assert!(!env.is_implemented(num, &Ty::con("Char")));
        assert!(env.is_implemented(Symbol::intern("Monad"), &Ty::union("Maybe", vec![])));
    }

    #[test]
    fn test_prelude_data_types() {
        let env = ClassEnv::with_prelude();
        let list = env.data_type_declaration(Symbol::intern("List")).unwrap();
        assert_eq!(list.arity(), 1);
        assert_eq!(list.members().map(<[Member]>::len), Some(2));
        let either = env.data_type_declaration(Symbol::intern("Either")).unwrap();
        assert_eq!(either.arity(), 2);
        assert!(env.data_type_declaration(Symbol::intern("Int")).is_none());
    }
}
