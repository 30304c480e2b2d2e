//! # LHC Type Representation
//!
//! This crate defines the type expressions manipulated by the LHC type
//! checker, together with the [`Unification`] value that reports the outcome
//! of unifying two of them.
//!
//! ## Overview
//!
//! Types are immutable values compared and hashed structurally:
//!
//! - [`TyVar`]: a type variable, named, carrying a [`Context`] of type-class
//!   symbols that whatever it resolves to must implement
//! - [`TyCon`]: a nullary concrete type such as `Int` or `Char`
//! - [`Ty::Fun`]: a function type `a -> b`
//! - [`UnionTy`]: an algebraic data type applied to arguments, optionally
//!   with its member constructors
//! - [`TyLookup`]: a name-based reference to a union, used where a data type
//!   mentions itself so that no cyclic value is ever built
//! - [`TyCtor`]: a constructor variable awaiting arguments, such as the `m`
//!   in `Monad m => m a`
//!
//! ## Naming invariants
//!
//! Concrete type and union names start with an uppercase letter, variable
//! names with a lowercase letter or `_`. Constructors check this eagerly:
//! the `try_new` forms return [`InvalidName`], the `new` forms panic.
//!
//! ## See Also
//!
//! - `lhc-typeck`: the type scope, unification and argument binding

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod unification;
pub mod union;

pub use unification::Unification;
pub use union::{Field, Member, TyCtor, TyLookup, UnionTy};

use std::collections::BTreeSet;
use std::fmt;

use lhc_intern::Symbol;
use serde::{Deserialize, Serialize};

/// A set of type-class symbols.
///
/// Contexts only ever grow: combining two contexts is a set union, and a
/// requirement once attached to a variable is never dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context(BTreeSet<Symbol>);

impl Context {
    /// The empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from class names.
    #[must_use]
    pub fn of(classes: &[&str]) -> Self {
        classes.iter().map(|c| Symbol::intern(c)).collect()
    }

    /// Returns true if no class is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if `class` is required.
    #[must_use]
    pub fn contains(&self, class: Symbol) -> bool {
        self.0.contains(&class)
    }

    /// Add a class.
    pub fn insert(&mut self, class: Symbol) -> bool {
        self.0.insert(class)
    }

    /// Merge every class of `other` into `self`.
    pub fn extend(&mut self, other: &Context) {
        self.0.extend(other.0.iter().copied());
    }

    /// Classes in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.iter().copied()
    }

    /// The classes required by either context.
    #[must_use]
    pub fn union(&self, other: &Context) -> Context {
        self.0.union(&other.0).copied().collect()
    }

    /// The classes of `self` that `other` lacks.
    #[must_use]
    pub fn difference(&self, other: &Context) -> Context {
        self.0.difference(&other.0).copied().collect()
    }

    /// Returns true if every class of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Context) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl FromIterator<Symbol> for Context {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, class) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{class}")?;
        }
        write!(f, "}}")
    }
}

/// A type or variable name that breaks the capitalization rules.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidName {
    /// Concrete and union type names start with an uppercase letter.
    #[error("type name `{0}` must start with an uppercase letter")]
    Type(String),
    /// Type variable names start with a lowercase letter or `_`.
    #[error("type variable name `{0}` must start with a lowercase letter")]
    Variable(String),
}

pub(crate) fn check_type_name(name: Symbol) -> Result<Symbol, InvalidName> {
    if name.starts_uppercase() {
        Ok(name)
    } else {
        Err(InvalidName::Type(name.as_str().to_string()))
    }
}

pub(crate) fn check_var_name(name: Symbol) -> Result<Symbol, InvalidName> {
    if name.starts_lowercase() {
        Ok(name)
    } else {
        Err(InvalidName::Variable(name.as_str().to_string()))
    }
}

pub(crate) fn or_panic<T>(result: Result<T, InvalidName>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}

/// A type variable.
///
/// Two variables are the same variable only if both their names and their
/// contexts agree; `a` and `Eq a` are distinct until unified. Variables
/// minted by a type scope also carry their counter value, so `t0` written
/// by the user and a scope's `t0` are never the same variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TyVar {
    name: Symbol,
    context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fresh: Option<u32>,
}

impl TyVar {
    /// Create a type variable.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidName::Variable`] unless `name` starts lowercase.
    pub fn try_new(name: impl Into<Symbol>, context: Context) -> Result<Self, InvalidName> {
        let name = check_var_name(name.into())?;
        Ok(Self {
            name,
            context,
            fresh: None,
        })
    }

    /// A scope-minted variable named after `self` with `index` appended.
    ///
    /// Appending digits keeps the name valid.
    #[must_use]
    pub fn numbered(&self, index: u32, context: Context) -> Self {
        Self {
            name: Symbol::intern(&format!("{}{index}", self.name)),
            context,
            fresh: Some(index),
        }
    }

    /// Returns true for variables minted by a type scope.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.fresh.is_some()
    }

    /// Create a type variable.
    ///
    /// # Panics
    ///
    /// Panics unless `name` starts with a lowercase letter or `_`.
    #[must_use]
    pub fn new(name: impl Into<Symbol>, context: Context) -> Self {
        or_panic(Self::try_new(name, context))
    }

    /// Create a type variable with an empty context.
    ///
    /// # Panics
    ///
    /// Panics unless `name` starts with a lowercase letter or `_`.
    #[must_use]
    pub fn unconstrained(name: impl Into<Symbol>) -> Self {
        Self::new(name, Context::new())
    }

    /// The variable's name.
    #[must_use]
    pub fn name(&self) -> Symbol {
        self.name
    }

    /// The classes this variable must resolve to an instance of.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Render the variable with its context, e.g. `(Eq a, Show a) => a`.
    #[must_use]
    pub fn display_with_context(&self) -> String {
        match self.context.len() {
            0 => self.name.to_string(),
            1 => format!(
                "{} {} => {}",
                self.context.iter().map(Symbol::as_str).collect::<String>(),
                self.name,
                self.name
            ),
            _ => {
                let preds: Vec<String> = self
                    .context
                    .iter()
                    .map(|class| format!("{class} {}", self.name))
                    .collect();
                format!("({}) => {}", preds.join(", "), self.name)
            }
        }
    }
}

impl fmt::Display for TyVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A nullary concrete type such as `Int`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TyCon {
    name: Symbol,
}

impl TyCon {
    /// Create a concrete type.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidName::Type`] unless `name` starts uppercase.
    pub fn try_new(name: impl Into<Symbol>) -> Result<Self, InvalidName> {
        Ok(Self {
            name: check_type_name(name.into())?,
        })
    }

    /// Create a concrete type.
    ///
    /// # Panics
    ///
    /// Panics unless `name` starts with an uppercase letter.
    #[must_use]
    pub fn new(name: impl Into<Symbol>) -> Self {
        or_panic(Self::try_new(name))
    }

    /// The type's name.
    #[must_use]
    pub fn name(self) -> Symbol {
        self.name
    }
}

/// A type expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    /// A type variable (e.g. `a` in `a -> a`).
    Var(TyVar),

    /// A nullary concrete type (e.g. `Int`).
    Con(TyCon),

    /// A function type `arg -> result`.
    Fun(Box<Ty>, Box<Ty>),

    /// An algebraic data type applied to arguments (e.g. `List Int`).
    Union(UnionTy),

    /// A reference to a union by name, used for recursive field positions.
    Lookup(TyLookup),

    /// A constructor variable applied to pending arguments (e.g. `m a`).
    Ctor(TyCtor),
}

impl Ty {
    /// An unconstrained type variable.
    ///
    /// # Panics
    ///
    /// Panics if `name` does not start lowercase.
    #[must_use]
    pub fn var(name: &str) -> Self {
        Self::Var(TyVar::unconstrained(name))
    }

    /// A type variable constrained by `classes`.
    ///
    /// # Panics
    ///
    /// Panics if `name` does not start lowercase.
    #[must_use]
    pub fn var_with(name: &str, classes: &[&str]) -> Self {
        Self::Var(TyVar::new(name, Context::of(classes)))
    }

    /// A nullary concrete type.
    ///
    /// # Panics
    ///
    /// Panics if `name` does not start uppercase.
    #[must_use]
    pub fn con(name: &str) -> Self {
        Self::Con(TyCon::new(name))
    }

    /// A function type `from -> to`.
    #[must_use]
    pub fn fun(from: Ty, to: Ty) -> Self {
        Self::Fun(Box::new(from), Box::new(to))
    }

    /// A union applied to `args`, with no member information.
    ///
    /// # Panics
    ///
    /// Panics if `name` does not start uppercase.
    #[must_use]
    pub fn union(name: &str, args: Vec<Ty>) -> Self {
        Self::Union(UnionTy::new(name, args))
    }

    /// A name-based reference to a union applied to `args`.
    ///
    /// # Panics
    ///
    /// Panics if `name` does not start uppercase.
    #[must_use]
    pub fn lookup(name: &str, args: Vec<Ty>) -> Self {
        Self::Lookup(TyLookup::new(name, args))
    }

    /// A constructor variable applied to `args`.
    #[must_use]
    pub fn ctor(head: TyVar, args: Vec<Ty>) -> Self {
        Self::Ctor(TyCtor::new(head, args))
    }

    /// The variable, if this is one.
    #[must_use]
    pub fn as_var(&self) -> Option<&TyVar> {
        match self {
            Self::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true for function types.
    #[must_use]
    pub fn is_fun(&self) -> bool {
        matches!(self, Self::Fun(_, _))
    }

    /// The type constructor name of a concrete, union or lookup type.
    #[must_use]
    pub fn head_name(&self) -> Option<Symbol> {
        match self {
            Self::Con(c) => Some(c.name()),
            Self::Union(u) => Some(u.name()),
            Self::Lookup(l) => Some(l.name()),
            Self::Var(_) | Self::Fun(_, _) | Self::Ctor(_) => None,
        }
    }

    /// Name and arguments of a concrete, union or lookup type.
    ///
    /// A nullary concrete type is treated as a union with no arguments.
    #[must_use]
    pub fn as_applied(&self) -> Option<(Symbol, &[Ty])> {
        match self {
            Self::Con(c) => Some((c.name(), &[])),
            Self::Union(u) => Some((u.name(), u.args())),
            Self::Lookup(l) => Some((l.name(), l.args())),
            Self::Var(_) | Self::Fun(_, _) | Self::Ctor(_) => None,
        }
    }

    /// The free type variables, in first-occurrence order.
    ///
    /// Member fields of a union are determined by its arguments and are not
    /// traversed.
    #[must_use]
    pub fn free_vars(&self) -> Vec<TyVar> {
        let mut vars: Vec<TyVar> = Vec::new();
        let mut stack = vec![self];
        while let Some(ty) = stack.pop() {
            match ty {
                Self::Var(v) => {
                    if !vars.contains(v) {
                        vars.push(v.clone());
                    }
                }
                Self::Con(_) => {}
                Self::Fun(from, to) => {
                    stack.push(to);
                    stack.push(from);
                }
                Self::Union(u) => stack.extend(u.args().iter().rev()),
                Self::Lookup(l) => stack.extend(l.args().iter().rev()),
                Self::Ctor(c) => {
                    stack.extend(c.args().iter().rev());
                    if !vars.contains(c.head()) {
                        vars.push(c.head().clone());
                    }
                }
            }
        }
        vars
    }

    /// Returns true if `var` occurs free in this type.
    #[must_use]
    pub fn occurs(&self, var: &TyVar) -> bool {
        let mut stack = vec![self];
        while let Some(ty) = stack.pop() {
            match ty {
                Self::Var(v) if v == var => return true,
                Self::Var(_) | Self::Con(_) => {}
                Self::Fun(from, to) => {
                    stack.push(from);
                    stack.push(to);
                }
                Self::Union(u) => stack.extend(u.args()),
                Self::Lookup(l) => stack.extend(l.args()),
                Self::Ctor(c) => {
                    if c.head() == var {
                        return true;
                    }
                    stack.extend(c.args());
                }
            }
        }
        false
    }

    /// Returns true if this type mentions no type variable.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.free_vars().is_empty()
    }

    /// Apply this type, as a type constructor, to further arguments.
    ///
    /// This is the flatten step for partially applied constructors: a
    /// resolved head `Either String` applied to `[a]` becomes the union
    /// `Either String a`. A variable head becomes a [`TyCtor`]. Function
    /// types take no arguments and yield `None`. Member information is
    /// dropped because it described the shorter application.
    #[must_use]
    pub fn apply_args(&self, pending: &[Ty]) -> Option<Ty> {
        if pending.is_empty() {
            return Some(self.clone());
        }
        let joined = |args: &[Ty]| -> Vec<Ty> { args.iter().chain(pending).cloned().collect() };
        match self {
            Self::Var(v) => Some(Self::Ctor(TyCtor::new(v.clone(), pending.to_vec()))),
            Self::Con(c) => Some(Self::Union(UnionTy::from_parts(c.name(), pending.to_vec(), None))),
            Self::Union(u) => Some(Self::Union(UnionTy::from_parts(u.name(), joined(u.args()), None))),
            Self::Lookup(l) => Some(Self::Lookup(TyLookup::from_parts(l.name(), joined(l.args())))),
            Self::Ctor(c) => Some(Self::Ctor(TyCtor::new(c.head().clone(), joined(c.args())))),
            Self::Fun(_, _) => None,
        }
    }

    /// Whether this type needs parentheses as a type argument.
    fn is_atomic(&self) -> bool {
        match self {
            Self::Var(_) | Self::Con(_) => true,
            Self::Fun(_, _) | Self::Ctor(_) => false,
            Self::Union(u) => u.args().is_empty(),
            Self::Lookup(l) => l.args().is_empty(),
        }
    }
}

pub(crate) fn fmt_application(
    f: &mut fmt::Formatter<'_>,
    head: &dyn fmt::Display,
    args: &[Ty],
) -> fmt::Result {
    write!(f, "{head}")?;
    for arg in args {
        if arg.is_atomic() {
            write!(f, " {arg}")?;
        } else {
            write!(f, " ({arg})")?;
        }
    }
    Ok(())
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(v) => write!(f, "{v}"),
            Self::Con(c) => write!(f, "{}", c.name()),
            Self::Fun(from, to) => {
                if from.is_fun() {
                    write!(f, "({from}) -> {to}")
                } else {
                    write!(f, "{from} -> {to}")
                }
            }
            Self::Union(u) => fmt_application(f, &u.name(), u.args()),
            Self::Lookup(l) => fmt_application(f, &l.name(), l.args()),
            Self::Ctor(c) => fmt_application(f, c.head(), c.args()),
        }
    }
}

impl From<TyVar> for Ty {
    fn from(var: TyVar) -> Self {
        Self::Var(var)
    }
}

impl From<TyCon> for Ty {
    fn from(con: TyCon) -> Self {
        Self::Con(con)
    }
}

impl From<UnionTy> for Ty {
    fn from(union: UnionTy) -> Self {
        Self::Union(union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_union_and_difference() {
        let eq_show = Context::of(&["Eq", "Show"]);
        let show = Context::of(&["Show"]);

        assert_eq!(eq_show.difference(&show), Context::of(&["Eq"]));
        assert_eq!(show.union(&Context::of(&["Ord"])), Context::of(&["Ord", "Show"]));
        assert!(show.is_subset(&eq_show));
        assert_eq!(eq_show.to_string(), "{Eq, Show}");
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(
            TyCon::try_new("int"),
            Err(InvalidName::Type("int".to_string()))
        );
        assert_eq!(
            TyVar::try_new("A", Context::new()),
            Err(InvalidName::Variable("A".to_string()))
        );
        assert!(UnionTy::try_new("list", Vec::new()).is_err());
        assert!(TyLookup::try_new("", Vec::new()).is_err());
        assert!(TyVar::try_new("_r", Context::new()).is_ok());
    }

    #[test]
    #[should_panic(expected = "must start with an uppercase letter")]
    fn test_lowercase_concrete_panics() {
        let _ = Ty::con("int");
    }

    #[test]
    #[should_panic(expected = "must start with a lowercase letter")]
    fn test_uppercase_variable_panics() {
        let _ = Ty::var("A");
    }

    #[test]
    fn test_variables_differ_by_context() {
        assert_ne!(Ty::var("a"), Ty::var_with("a", &["Eq"]));
        assert_eq!(Ty::var_with("a", &["Eq"]), Ty::var_with("a", &["Eq"]));
    }

    #[test]
    fn test_numbered_variable_is_distinct_from_user_variable() {
        let prefix = TyVar::unconstrained("t");
        let fresh = prefix.numbered(0, Context::of(&["Eq"]));
        assert_eq!(fresh.name().as_str(), "t0");
        assert_eq!(fresh.to_string(), "t0");
        assert!(fresh.is_fresh());
        assert_ne!(fresh, TyVar::new("t0", Context::of(&["Eq"])));
        assert!(!Ty::Var(TyVar::unconstrained("t0")).occurs(&prefix.numbered(0, Context::new())));
    }

    #[test]
    fn test_free_vars_order() {
        let a = TyVar::unconstrained("a");
        let b = TyVar::unconstrained("b");
        let m = TyVar::new("m", Context::of(&["Monad"]));

        // (a -> b) -> m a
        let ty = Ty::fun(
            Ty::fun(Ty::Var(a.clone()), Ty::Var(b.clone())),
            Ty::ctor(m.clone(), vec![Ty::Var(a.clone())]),
        );
        assert_eq!(ty.free_vars(), vec![a.clone(), b.clone(), m.clone()]);
        assert!(ty.occurs(&m));
        assert!(!ty.occurs(&TyVar::unconstrained("c")));
        assert!(!ty.is_ground());
        assert!(Ty::union("List", vec![Ty::con("Int")]).is_ground());
    }

    #[test]
    fn test_free_vars_of_deep_type() {
        let mut ty = Ty::var("a");
        for _ in 0..2_000 {
            ty = Ty::fun(Ty::con("Int"), ty);
        }
        assert_eq!(ty.free_vars(), vec![TyVar::unconstrained("a")]);
        assert!(ty.occurs(&TyVar::unconstrained("a")));
    }

    #[test]
    fn test_display() {
        let int = Ty::con("Int");
        let a = Ty::var("a");
        assert_eq!(Ty::fun(a.clone(), int.clone()).to_string(), "a -> Int");
        assert_eq!(
            Ty::fun(Ty::fun(a.clone(), a.clone()), int.clone()).to_string(),
            "(a -> a) -> Int"
        );
        assert_eq!(
            Ty::union("Either", vec![Ty::union("List", vec![int.clone()]), a.clone()]).to_string(),
            "Either (List Int) a"
        );
        let m = TyVar::new("m", Context::of(&["Monad"]));
        assert_eq!(Ty::ctor(m, vec![a]).to_string(), "m a");
        assert_eq!(Ty::union("Unit", Vec::new()).to_string(), "Unit");
    }

    #[test]
    fn test_display_with_context() {
        assert_eq!(TyVar::unconstrained("a").display_with_context(), "a");
        assert_eq!(
            TyVar::new("a", Context::of(&["Eq"])).display_with_context(),
            "Eq a => a"
        );
        assert_eq!(
            TyVar::new("a", Context::of(&["Show", "Eq"])).display_with_context(),
            "(Eq a, Show a) => a"
        );
    }

    #[test]
    fn test_apply_args_flattens() {
        let int = Ty::con("Int");
        let string = Ty::con("String");

        let either_string = Ty::union("Either", vec![string.clone()]);
        assert_eq!(
            either_string.apply_args(&[int.clone()]),
            Some(Ty::union("Either", vec![string, int.clone()]))
        );
        assert_eq!(
            Ty::con("Maybe").apply_args(&[int.clone()]),
            Some(Ty::union("Maybe", vec![int.clone()]))
        );
        let m = TyVar::unconstrained("m");
        assert_eq!(
            Ty::Var(m.clone()).apply_args(&[int.clone()]),
            Some(Ty::ctor(m, vec![int.clone()]))
        );
        assert_eq!(Ty::fun(int.clone(), int.clone()).apply_args(&[int.clone()]), None);
        assert_eq!(int.apply_args(&[]), Some(int));
    }

    #[test]
    fn test_as_applied_treats_concrete_as_nullary_union() {
        let bool_ty = Ty::con("Bool");
        let (name, args) = bool_ty.as_applied().unwrap();
        assert_eq!(name.as_str(), "Bool");
        assert!(args.is_empty());
        assert!(Ty::var("a").as_applied().is_none());
    }
}
