//! The type scope: bindings, fresh variables and context extensions.
//!
//! A [`TypeScope`] holds the mutable state of one inference pass:
//!
//! - a union-find style binding store from type variables to targets,
//! - a counter minting fresh variables `t0`, `t1`, ... that are never equal
//!   to a user-written variable and skip names the scope has already seen,
//! - a table of extra classes attached to named type heads, seeded lazily
//!   from the resolver, and one for constructor variable heads.
//!
//! Every variable the scope knows about occupies one slot of an
//! `IndexMap`; unbound variables have an empty slot. Bindings are only ever
//! added, never changed: rebinding a variable to a different target is an
//! internal error.

use std::borrow::Cow;

use indexmap::IndexMap;
use lhc_intern::Symbol;
use lhc_session::{Options, SessionError};
use lhc_types::{Context, Field, Member, Ty, TyCtor, TyLookup, TyVar, UnionTy, Unification};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{trace, warn};

use crate::env::instance_head;
use crate::resolver::SymbolResolver;
use crate::{bind_args, unify};

/// Internal invariant violations raised by the scope.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// A bound variable was bound again to a different target.
    #[error("type variable `{var}` is already bound to `{existing}`, cannot rebind to `{target}`")]
    Rebind {
        /// The variable.
        var: TyVar,
        /// Its current target.
        existing: Ty,
        /// The rejected new target.
        target: Ty,
    },
    /// A binding would make a variable part of its own target.
    #[error("binding `{var}` to `{target}` would create an infinite type")]
    Circular {
        /// The variable.
        var: TyVar,
        /// The rejected target.
        target: Ty,
    },
    /// The resolver has no declaration for a data type.
    #[error("no declaration for data type `{0}`")]
    UnknownDataType(Symbol),
}

/// Mutable state of one inference pass.
pub struct TypeScope<'r> {
    /// Answers class and data type queries.
    resolver: &'r dyn SymbolResolver,

    /// Known variables and their bindings; the slot index is the variable's key.
    slots: IndexMap<TyVar, Option<Ty>>,

    /// Names of known variables, regardless of context.
    names: FxHashSet<Symbol>,

    /// Extra classes per named type head.
    extensions: FxHashMap<Symbol, Context>,

    /// Extra classes per constructor variable head, e.g. the `m` of `m a`.
    head_extensions: FxHashMap<TyVar, Context>,

    /// Fresh variables are numbered after this one.
    prefix: TyVar,

    /// Counter for fresh variable names.
    next_fresh: u32,

    /// Session options.
    options: Options,
}

impl<'r> TypeScope<'r> {
    /// Create a scope with default options.
    #[must_use]
    pub fn new(resolver: &'r dyn SymbolResolver) -> Self {
        Self::from_parts(resolver, Options::default(), TyVar::unconstrained("t"))
    }

    /// Create a scope with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if the options do not
    /// validate.
    pub fn with_options(resolver: &'r dyn SymbolResolver, options: Options) -> Result<Self, SessionError> {
        options.validate()?;
        let prefix = TyVar::try_new(options.fresh_var_prefix.as_str(), Context::new())
            .map_err(|err| SessionError::InvalidConfig(err.to_string()))?;
        Ok(Self::from_parts(resolver, options, prefix))
    }

    fn from_parts(resolver: &'r dyn SymbolResolver, options: Options, prefix: TyVar) -> Self {
        Self {
            resolver,
            slots: IndexMap::new(),
            names: FxHashSet::default(),
            extensions: FxHashMap::default(),
            head_extensions: FxHashMap::default(),
            prefix,
            next_fresh: 0,
            options,
        }
    }

    /// The resolver this scope consults.
    #[must_use]
    pub fn resolver(&self) -> &'r dyn SymbolResolver {
        self.resolver
    }

    /// The session options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Number of variables the scope knows about.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the scope knows no variable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Make `var` known to the scope so fresh names avoid it.
    pub fn track(&mut self, var: &TyVar) {
        if !self.slots.contains_key(var) {
            self.names.insert(var.name());
            self.slots.insert(var.clone(), None);
        }
    }

    /// Make every variable of `ty` known to the scope.
    pub fn track_all(&mut self, ty: &Ty) {
        for var in ty.free_vars() {
            self.track(&var);
        }
    }

    /// Reserve a fresh, unbound variable carrying `context`.
    ///
    /// The variable never equals a user-written one, even if the user later
    /// writes the same name.
    pub fn reserve(&mut self, context: Context) -> TyVar {
        loop {
            let var = self.prefix.numbered(self.next_fresh, context.clone());
            self.next_fresh += 1;
            if self.names.contains(&var.name()) {
                continue;
            }
            self.track(&var);
            trace!(var = %var.display_with_context(), "reserved fresh variable");
            return var;
        }
    }

    /// Returns true if `var` has a binding.
    #[must_use]
    pub fn is_bound(&self, var: &TyVar) -> bool {
        matches!(self.slots.get(var), Some(Some(_)))
    }

    /// Follow the binding chain of `var` to an unbound variable or a
    /// non-variable type.
    #[must_use]
    pub fn target(&self, var: &TyVar) -> Ty {
        match self.find(var) {
            Found::Root(root) => Ty::Var(root.clone()),
            Found::Bound(ty) => ty.clone(),
        }
    }

    fn find<'a>(&'a self, var: &'a TyVar) -> Found<'a> {
        let mut current = var;
        loop {
            match self.slots.get(current) {
                Some(Some(Ty::Var(next))) => current = next,
                Some(Some(ty)) => return Found::Bound(ty),
                Some(None) | None => return Found::Root(current),
            }
        }
    }

    /// Resolve the outermost layer of `ty`.
    ///
    /// Variables are replaced by their target. A constructor whose head is
    /// bound is flattened with its pending arguments; one whose head is
    /// unbound gets the head's representative.
    #[must_use]
    pub fn shallow_resolve(&self, ty: &Ty) -> Ty {
        let mut current = ty.clone();
        loop {
            match &current {
                Ty::Var(var) => {
                    let target = self.target(var);
                    if matches!(target, Ty::Var(_)) {
                        return target;
                    }
                    current = target;
                }
                Ty::Ctor(ctor) => match self.target(ctor.head()) {
                    Ty::Var(head) => return Ty::Ctor(TyCtor::new(head, ctor.args().to_vec())),
                    head => match head.apply_args(ctor.args()) {
                        Some(flat) => current = flat,
                        None => return current,
                    },
                },
                _ => return current,
            }
        }
    }

    /// [`TypeScope::shallow_resolve`] that leaves anything but variables
    /// and constructors where it is.
    pub(crate) fn resolve_layer<'t>(&self, ty: Cow<'t, Ty>) -> Cow<'t, Ty> {
        if matches!(&*ty, Ty::Var(_) | Ty::Ctor(_)) {
            Cow::Owned(self.shallow_resolve(&ty))
        } else {
            ty
        }
    }

    /// Bind `var` to `target`.
    ///
    /// Binding a variable to itself, or binding it again to a target that
    /// resolves to the same type, does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Rebind`] if `var` is bound to a different
    /// target, and [`ScopeError::Circular`] if `var` occurs in `target`.
    pub fn bind(&mut self, var: &TyVar, target: Ty) -> Result<(), ScopeError> {
        if let Some(Some(existing)) = self.slots.get(var) {
            let existing = existing.clone();
            if existing == target || self.generalize(&existing) == self.generalize(&target) {
                return Ok(());
            }
            warn!(var = %var, existing = %existing, target = %target, "rejected rebind of type variable");
            return Err(ScopeError::Rebind {
                var: var.clone(),
                existing,
                target,
            });
        }
        let resolved = self.generalize(&target);
        if resolved == Ty::Var(var.clone()) {
            self.track(var);
            return Ok(());
        }
        if resolved.occurs(var) {
            return Err(ScopeError::Circular {
                var: var.clone(),
                target,
            });
        }
        self.assign(var, target);
        Ok(())
    }

    /// Bind an unbound variable without checks.
    pub(crate) fn assign(&mut self, var: &TyVar, target: Ty) {
        trace!(var = %var, target = %target, "bind");
        self.names.insert(var.name());
        self.slots.insert(var.clone(), Some(target));
    }

    /// Attach extra classes to a type head.
    ///
    /// Named types, function types and constructor heads carry extensions;
    /// variables carry their context themselves and are left alone.
    pub fn extend_context(&mut self, ty: &Ty, classes: &Context) {
        if classes.is_empty() {
            return;
        }
        match self.shallow_resolve(ty) {
            Ty::Ctor(ctor) => {
                trace!(head = %ctor.head(), classes = %classes, "extend constructor context");
                self.head_extensions
                    .entry(ctor.head().clone())
                    .or_default()
                    .extend(classes);
            }
            resolved => {
                if let Some(key) = self.extension_key(&resolved) {
                    trace!(head = %key, classes = %classes, "extend context");
                    self.extension_entry(key).extend(classes);
                }
            }
        }
    }

    /// The classes `ty` is known to implement, or for variables the
    /// classes they require.
    pub fn context_of(&mut self, ty: &Ty) -> Context {
        match self.shallow_resolve(ty) {
            Ty::Var(var) => var.context().clone(),
            Ty::Ctor(ctor) => self.required_of(ctor.head()),
            resolved => match self.extension_key(&resolved) {
                Some(key) => self.extension_entry(key).clone(),
                None => Context::new(),
            },
        }
    }

    /// Everything an unbound variable must satisfy: its own context plus the
    /// classes recorded for it as a constructor head.
    pub(crate) fn required_of(&self, var: &TyVar) -> Context {
        match self.head_extensions.get(var) {
            Some(extra) => var.context().union(extra),
            None => var.context().clone(),
        }
    }

    /// Compute the classes `ty` provides out of `required`.
    ///
    /// Combines the resolver's instance check with the extension table.
    pub(crate) fn provided_context(&mut self, ty: &Ty, required: &Context) -> Context {
        let mut provided = self.context_of(ty);
        for class in required.iter() {
            if !provided.contains(class) && self.resolver.is_implemented(class, ty) {
                provided.insert(class);
            }
        }
        provided
    }

    fn extension_key(&self, ty: &Ty) -> Option<Symbol> {
        match ty {
            Ty::Var(_) | Ty::Ctor(_) => None,
            other => instance_head(other),
        }
    }

    fn extension_entry(&mut self, key: Symbol) -> &mut Context {
        let resolver = self.resolver;
        self.extensions.entry(key).or_insert_with(|| {
            if key.starts_uppercase() {
                resolver.type_class_context(key)
            } else {
                Context::new()
            }
        })
    }

    /// Deep-resolve `ty`, replacing every bound variable with its final
    /// target.
    ///
    /// Constructors whose head resolved are flattened; unbound variables are
    /// kept with their context. Works on an explicit stack, so arbitrarily
    /// deep types are fine.
    #[must_use]
    pub fn generalize(&self, ty: &Ty) -> Ty {
        let mut work = vec![Step::Visit(ty)];
        let mut done: Vec<Ty> = Vec::new();

        while let Some(step) = work.pop() {
            match step {
                Step::Visit(ty) => match ty {
                    Ty::Var(var) => match self.find(var) {
                        Found::Root(root) => done.push(Ty::Var(root.clone())),
                        Found::Bound(target) => work.push(Step::Visit(target)),
                    },
                    Ty::Con(_) => done.push(ty.clone()),
                    Ty::Fun(from, to) => {
                        work.push(Step::Fun);
                        work.push(Step::Visit(to));
                        work.push(Step::Visit(from));
                    }
                    Ty::Union(union) => {
                        work.push(Step::Union(union));
                        for member in union.members().unwrap_or_default().iter().rev() {
                            work.extend(member.fields.iter().rev().map(|field| Step::Visit(&field.ty)));
                        }
                        work.extend(union.args().iter().rev().map(Step::Visit));
                    }
                    Ty::Lookup(lookup) => {
                        work.push(Step::Lookup(lookup));
                        work.extend(lookup.args().iter().rev().map(Step::Visit));
                    }
                    Ty::Ctor(ctor) => match self.find(ctor.head()) {
                        Found::Root(root) => {
                            work.push(Step::Ctor(ctor, Some(root)));
                            work.extend(ctor.args().iter().rev().map(Step::Visit));
                        }
                        Found::Bound(head) => {
                            work.push(Step::Ctor(ctor, None));
                            work.push(Step::Visit(head));
                            work.extend(ctor.args().iter().rev().map(Step::Visit));
                        }
                    },
                },
                Step::Fun => {
                    let to = pop(&mut done);
                    let from = pop(&mut done);
                    done.push(Ty::fun(from, to));
                }
                Step::Union(union) => {
                    let members = union.members().map(|members| {
                        let count = members.iter().map(|m| m.fields.len()).sum();
                        let mut tys = take(&mut done, count).into_iter();
                        members
                            .iter()
                            .map(|member| {
                                let fields = member
                                    .fields
                                    .iter()
                                    .zip(tys.by_ref())
                                    .map(|(field, ty)| Field::new(field.name, ty))
                                    .collect();
                                Member::new(member.name, fields)
                            })
                            .collect()
                    });
                    let args = take(&mut done, union.args().len());
                    done.push(Ty::Union(union.rebuild(args, members)));
                }
                Step::Lookup(lookup) => {
                    let args = take(&mut done, lookup.args().len());
                    done.push(Ty::Lookup(lookup.with_args(args)));
                }
                Step::Ctor(ctor, Some(root)) => {
                    let args = take(&mut done, ctor.args().len());
                    done.push(Ty::Ctor(TyCtor::new(root.clone(), args)));
                }
                Step::Ctor(ctor, None) => {
                    let head = pop(&mut done);
                    let args = take(&mut done, ctor.args().len());
                    let flat = match head.apply_args(&args) {
                        Some(flat) => flat,
                        None => Ty::Ctor(TyCtor::new(ctor.head().clone(), args)),
                    };
                    done.push(flat);
                }
            }
        }
        pop(&mut done)
    }

    /// Unify `expected` with `actual` in this scope.
    pub fn unify(&mut self, expected: &Ty, actual: &Ty) -> Unification {
        unify::unify(self, expected, actual)
    }

    /// Specialize the generic declaration `generic` to `args`.
    pub fn bind_arguments(&mut self, generic: &UnionTy, args: &[Ty]) -> Unification {
        bind_args::bind_arguments(self, generic, args)
    }

    /// Look up the data type `name` and specialize it to `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::UnknownDataType`] if the resolver has no
    /// declaration for `name`.
    pub fn specialize(&mut self, name: Symbol, args: &[Ty]) -> Result<Unification, ScopeError> {
        let generic = self
            .resolver
            .data_type_declaration(name)
            .ok_or(ScopeError::UnknownDataType(name))?;
        Ok(self.bind_arguments(&generic, args))
    }
}

/// Where a binding chain ends.
enum Found<'a> {
    Root(&'a TyVar),
    Bound(&'a Ty),
}

/// One step of [`TypeScope::generalize`].
enum Step<'a> {
    Visit(&'a Ty),
    Fun,
    Union(&'a UnionTy),
    Lookup(&'a TyLookup),
    /// A constructor and, if its head is unbound, the head's root.
    Ctor(&'a TyCtor, Option<&'a TyVar>),
}

fn pop(done: &mut Vec<Ty>) -> Ty {
    done.pop().unwrap_or_else(|| unreachable!("generalize pushes one result per visited type"))
}

fn take(done: &mut Vec<Ty>, count: usize) -> Vec<Ty> {
    done.split_off(done.len() - count)
}

impl std::fmt::Debug for TypeScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeScope")
            .field("slots", &self.slots)
            .field("extensions", &self.extensions)
            .field("head_extensions", &self.head_extensions)
            .field("next_fresh", &self.next_fresh)
            .finish_non_exhaustive()
    }
}
