//! Algebraic data types and the nodes that refer to them.

use std::fmt;

use lhc_intern::Symbol;
use serde::{Deserialize, Serialize};

use crate::{check_type_name, fmt_application, or_panic, InvalidName, Ty, TyVar};

/// A named algebraic data type applied to ordered arguments.
///
/// A generic declaration such as `data List a = Nil | Cons a (List a)` is a
/// `UnionTy` whose arguments are its parameter variables and whose members
/// are present. A bare reference like `List Int` met during inference has no
/// members until the declaration is specialized to its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnionTy {
    name: Symbol,
    args: Vec<Ty>,
    members: Option<Vec<Member>>,
}

impl UnionTy {
    /// Create a union reference without member information.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidName::Type`] unless `name` starts uppercase.
    pub fn try_new(name: impl Into<Symbol>, args: Vec<Ty>) -> Result<Self, InvalidName> {
        Ok(Self::from_parts(check_type_name(name.into())?, args, None))
    }

    /// Create a union reference without member information.
    ///
    /// # Panics
    ///
    /// Panics unless `name` starts with an uppercase letter.
    #[must_use]
    pub fn new(name: impl Into<Symbol>, args: Vec<Ty>) -> Self {
        or_panic(Self::try_new(name, args))
    }

    /// Create a fully defined union.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidName::Type`] if the union or any member name does not
    /// start uppercase.
    pub fn try_defined(
        name: impl Into<Symbol>,
        args: Vec<Ty>,
        members: Vec<Member>,
    ) -> Result<Self, InvalidName> {
        let name = check_type_name(name.into())?;
        for member in &members {
            check_type_name(member.name)?;
        }
        Ok(Self::from_parts(name, args, Some(members)))
    }

    /// Create a fully defined union.
    ///
    /// # Panics
    ///
    /// Panics if the union or any member name does not start uppercase.
    #[must_use]
    pub fn defined(name: impl Into<Symbol>, args: Vec<Ty>, members: Vec<Member>) -> Self {
        or_panic(Self::try_defined(name, args, members))
    }

    pub(crate) fn from_parts(name: Symbol, args: Vec<Ty>, members: Option<Vec<Member>>) -> Self {
        Self {
            name,
            args,
            members,
        }
    }

    /// The union's name.
    #[must_use]
    pub fn name(&self) -> Symbol {
        self.name
    }

    /// The type arguments, in declaration order.
    #[must_use]
    pub fn args(&self) -> &[Ty] {
        &self.args
    }

    /// Number of type arguments.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// The member constructors, when known.
    #[must_use]
    pub fn members(&self) -> Option<&[Member]> {
        self.members.as_deref()
    }

    /// Returns true if the member constructors are known.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.members.is_some()
    }

    /// The same union with different arguments and members.
    #[must_use]
    pub fn rebuild(&self, args: Vec<Ty>, members: Option<Vec<Member>>) -> Self {
        Self::from_parts(self.name, args, members)
    }

    /// The declared parameters, for a generic declaration whose arguments
    /// are all variables.
    #[must_use]
    pub fn params(&self) -> Option<Vec<&TyVar>> {
        self.args.iter().map(Ty::as_var).collect()
    }

    /// Look up a member constructor by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members()?.iter().find(|m| m.name.as_str() == name)
    }
}

impl fmt::Display for UnionTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_application(f, &self.name, &self.args)
    }
}

/// A member constructor of a union, e.g. `Cons a (List a)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// The constructor name.
    pub name: Symbol,
    /// The constructor's fields, in order.
    pub fields: Vec<Field>,
}

impl Member {
    /// Create a member constructor.
    #[must_use]
    pub fn new(name: impl Into<Symbol>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// A member with positional fields named `_0`, `_1`, ...
    #[must_use]
    pub fn positional(name: impl Into<Symbol>, tys: Vec<Ty>) -> Self {
        let fields = tys
            .into_iter()
            .enumerate()
            .map(|(i, ty)| Field::new(format!("_{i}").as_str(), ty))
            .collect();
        Self::new(name, fields)
    }
}

/// A named, typed field of a member constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// The field name.
    pub name: Symbol,
    /// The field type.
    pub ty: Ty,
}

impl Field {
    /// Create a field.
    #[must_use]
    pub fn new(name: impl Into<Symbol>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A reference to a union by name, applied to arguments.
///
/// Recursive field positions use this node instead of embedding the union
/// itself; it is resolved against the declaration registry on demand.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TyLookup {
    name: Symbol,
    args: Vec<Ty>,
}

impl TyLookup {
    /// Create a lookup node.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidName::Type`] unless `name` starts uppercase.
    pub fn try_new(name: impl Into<Symbol>, args: Vec<Ty>) -> Result<Self, InvalidName> {
        Ok(Self::from_parts(check_type_name(name.into())?, args))
    }

    /// Create a lookup node.
    ///
    /// # Panics
    ///
    /// Panics unless `name` starts with an uppercase letter.
    #[must_use]
    pub fn new(name: impl Into<Symbol>, args: Vec<Ty>) -> Self {
        or_panic(Self::try_new(name, args))
    }

    pub(crate) fn from_parts(name: Symbol, args: Vec<Ty>) -> Self {
        Self { name, args }
    }

    /// The referenced union's name.
    #[must_use]
    pub fn name(&self) -> Symbol {
        self.name
    }

    /// The arguments the union is applied to.
    #[must_use]
    pub fn args(&self) -> &[Ty] {
        &self.args
    }

    /// The same lookup with different arguments.
    #[must_use]
    pub fn with_args(&self, args: Vec<Ty>) -> Self {
        Self::from_parts(self.name, args)
    }
}

/// A constructor variable applied to pending arguments, e.g. `m a`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TyCtor {
    head: TyVar,
    args: Vec<Ty>,
}

impl TyCtor {
    /// Create a partially applied constructor.
    #[must_use]
    pub fn new(head: TyVar, args: Vec<Ty>) -> Self {
        Self { head, args }
    }

    /// Create a partially applied constructor from a head variable name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidName::Variable`] unless the head name starts
    /// lowercase.
    pub fn try_named(
        head: impl Into<Symbol>,
        context: crate::Context,
        args: Vec<Ty>,
    ) -> Result<Self, InvalidName> {
        Ok(Self::new(TyVar::try_new(head, context)?, args))
    }

    /// The constructor variable.
    #[must_use]
    pub fn head(&self) -> &TyVar {
        &self.head
    }

    /// The pending arguments.
    #[must_use]
    pub fn args(&self) -> &[Ty] {
        &self.args
    }
}
