//! The questions the type checker asks about named types and classes.

use lhc_intern::Symbol;
use lhc_types::{Context, Ty, UnionTy};

/// Answers type-class and data-type queries on behalf of the analyzer.
///
/// The checker never owns declarations itself; whoever drives it supplies
/// a resolver backed by the program's class, instance and data declarations.
/// [`ClassEnv`](crate::ClassEnv) is an in-memory implementation.
pub trait SymbolResolver {
    /// Returns true if `ty` is an instance of `class`.
    fn is_implemented(&self, class: Symbol, ty: &Ty) -> bool;

    /// The classes a named type is known to implement.
    fn type_class_context(&self, name: Symbol) -> Context;

    /// The generic declaration of a data type, with its members.
    fn data_type_declaration(&self, name: Symbol) -> Option<UnionTy>;
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for &R {
    fn is_implemented(&self, class: Symbol, ty: &Ty) -> bool {
        (**self).is_implemented(class, ty)
    }

    fn type_class_context(&self, name: Symbol) -> Context {
        (**self).type_class_context(name)
    }

    fn data_type_declaration(&self, name: Symbol) -> Option<UnionTy> {
        (**self).data_type_declaration(name)
    }
}
