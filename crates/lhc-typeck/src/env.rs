//! In-memory class, instance and data type registry.
//!
//! [`ClassEnv`] is the [`SymbolResolver`] used by tests and by drivers that
//! collect declarations up front. Instances are keyed by the head name of
//! the instance type (`instance Eq (List a)` is recorded under `List`);
//! function types use the head name `->`.

use lhc_intern::Symbol;
use lhc_types::{Context, Ty, UnionTy};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::resolver::SymbolResolver;

/// Head name under which instances for function types are recorded.
pub const FUNCTION_HEAD: &str = "->";

/// Information about a type class.
#[derive(Clone, Debug)]
pub struct ClassInfo {
    /// The class name.
    pub name: Symbol,
    /// Superclass names. Recorded but not used for instance resolution.
    pub supers: Vec<Symbol>,
}

/// Errors raised while registering declarations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    /// An instance names a class that was never registered.
    #[error("unknown type class `{0}`")]
    UnknownClass(Symbol),
    /// A data declaration has no members or non-variable parameters.
    #[error("data type `{0}` is not a generic declaration")]
    NotGeneric(Symbol),
    /// A data type was declared twice.
    #[error("data type `{0}` is already declared")]
    DuplicateDataType(Symbol),
}

/// Registry of classes, instances and data declarations.
#[derive(Clone, Debug, Default)]
pub struct ClassEnv {
    /// Type classes (name -> `ClassInfo`).
    classes: FxHashMap<Symbol, ClassInfo>,

    /// Instances (type head name -> implemented classes).
    instances: FxHashMap<Symbol, FxHashSet<Symbol>>,

    /// Generic data declarations (name -> union with members).
    data_types: FxHashMap<Symbol, UnionTy>,
}

impl ClassEnv {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type class.
    pub fn register_class(&mut self, name: impl Into<Symbol>, supers: &[&str]) {
        let name = name.into();
        let supers = supers.iter().map(|s| Symbol::intern(s)).collect();
        self.classes.insert(name, ClassInfo { name, supers });
    }

    /// Look up a class.
    #[must_use]
    pub fn class(&self, name: Symbol) -> Option<&ClassInfo> {
        self.classes.get(&name)
    }

    /// Record that the type named `head` implements `class`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::UnknownClass`] if `class` was never registered.
    pub fn register_instance(
        &mut self,
        class: impl Into<Symbol>,
        head: impl Into<Symbol>,
    ) -> Result<(), EnvError> {
        let class = class.into();
        if !self.classes.contains_key(&class) {
            return Err(EnvError::UnknownClass(class));
        }
        self.instances.entry(head.into()).or_default().insert(class);
        Ok(())
    }

    /// Register a generic data declaration such as `List a`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::NotGeneric`] unless the union carries members and
    /// all of its arguments are variables, and
    /// [`EnvError::DuplicateDataType`] if the name is taken.
    pub fn register_data_type(&mut self, decl: UnionTy) -> Result<(), EnvError> {
        let name = decl.name();
        if !decl.is_defined() || decl.params().is_none() {
            return Err(EnvError::NotGeneric(name));
        }
        if self.data_types.contains_key(&name) {
            return Err(EnvError::DuplicateDataType(name));
        }
        self.data_types.insert(name, decl);
        Ok(())
    }

    /// The classes the type named `head` implements.
    #[must_use]
    pub fn instances_of(&self, head: Symbol) -> Context {
        self.instances
            .get(&head)
            .map(|classes| classes.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Names of all registered data types.
    pub fn data_type_names(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.data_types.keys().copied()
    }
}

/// The name instances of `ty` are recorded under, if it has one.
pub(crate) fn instance_head(ty: &Ty) -> Option<Symbol> {
    match ty {
        Ty::Fun(_, _) => Some(Symbol::intern(FUNCTION_HEAD)),
        other => other.head_name(),
    }
}

impl SymbolResolver for ClassEnv {
    fn is_implemented(&self, class: Symbol, ty: &Ty) -> bool {
        instance_head(ty)
            .and_then(|head| self.instances.get(&head))
            .is_some_and(|classes| classes.contains(&class))
    }

    fn type_class_context(&self, name: Symbol) -> Context {
        self.instances_of(name)
    }

    fn data_type_declaration(&self, name: Symbol) -> Option<UnionTy> {
        self.data_types.get(&name).cloned()
    }
}
