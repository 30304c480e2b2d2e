//! Specialization of generic data declarations.
//!
//! Given `data Either a b = Left a | Right b` and the arguments
//! `[String, Int]`, the binder produces
//!
//! ```text
//! Either String Int = Left String | Right Int
//! ```
//!
//! Each declared parameter is instantiated as a fresh scope variable with
//! the parameter's context, and every field occurrence of the parameter is
//! unified with the corresponding argument. A context the argument cannot
//! satisfy is therefore reported at the first field that uses it.
//! Recursive references (`List a` inside `List`) are [`Ty::Lookup`] nodes;
//! their arguments are rewritten but they are never expanded. Other unions
//! nested in a field keep their rewritten arguments and lose their member
//! list.

use indexmap::IndexMap;
use lhc_intern::Symbol;
use lhc_types::{Field, Member, Ty, TyCtor, TyVar, UnionTy, Unification};
use tracing::debug;

use crate::scope::TypeScope;
use crate::unify::unify;

/// A declared parameter, its fresh instance and the argument it maps to.
struct ParamBinding<'a> {
    fresh: TyVar,
    arg: &'a Ty,
}

/// Specialize `generic` to `args`.
///
/// Returns [`Unification::TypeMismatch`] when the number of arguments does
/// not match the declaration, otherwise the first field failure or the
/// specialized union.
pub fn bind_arguments(scope: &mut TypeScope<'_>, generic: &UnionTy, args: &[Ty]) -> Unification {
    debug!(union = %generic.name(), arity = args.len(), "bind arguments");

    if generic.arity() != args.len() {
        return Unification::mismatch(
            Ty::Union(generic.clone()),
            Ty::Union(generic.rebuild(args.to_vec(), None)),
        );
    }

    let mut params: IndexMap<Symbol, ParamBinding<'_>> = IndexMap::new();
    for (declared, arg) in generic.args().iter().zip(args) {
        match declared {
            Ty::Var(param) => {
                let fresh = scope.reserve(param.context().clone());
                params.insert(param.name(), ParamBinding { fresh, arg });
            }
            // Already specialized positions unify directly
            other => {
                if let Err(failure) = unify(scope, other, arg).into_result() {
                    return failure;
                }
            }
        }
    }

    let mut binder = Binder { scope, params };
    let members = match generic.members() {
        Some(members) => match binder.rewrite_members(members) {
            Ok(members) => Some(members),
            Err(failure) => return failure,
        },
        None => None,
    };

    // Parameters no field mentions still have to accept their argument
    let pending: Vec<(TyVar, Ty)> = binder
        .params
        .values()
        .map(|binding| (binding.fresh.clone(), binding.arg.clone()))
        .collect();
    for (fresh, arg) in pending {
        if let Err(failure) = unify(binder.scope, &Ty::Var(fresh), &arg).into_result() {
            return failure;
        }
    }

    let args = args.iter().map(|arg| binder.scope.generalize(arg)).collect();
    let specialized = generic.rebuild(args, members);
    Unification::Unified(binder.scope.generalize(&Ty::Union(specialized)))
}

struct Binder<'s, 'r, 'a> {
    scope: &'s mut TypeScope<'r>,
    /// Declared parameters by name, in declaration order.
    params: IndexMap<Symbol, ParamBinding<'a>>,
}

impl Binder<'_, '_, '_> {
    fn rewrite_members(&mut self, members: &[Member]) -> Result<Vec<Member>, Unification> {
        let mut rewritten = Vec::with_capacity(members.len());
        for member in members {
            let mut fields = Vec::with_capacity(member.fields.len());
            for field in &member.fields {
                fields.push(Field::new(field.name, self.rewrite(&field.ty)?));
            }
            rewritten.push(Member::new(member.name, fields));
        }
        Ok(rewritten)
    }

    fn rewrite_all(&mut self, tys: &[Ty]) -> Result<Vec<Ty>, Unification> {
        tys.iter().map(|ty| self.rewrite(ty)).collect()
    }

    /// Unify a parameter occurrence with its argument.
    fn bind_param(&mut self, param: &TyVar) -> Option<Result<Ty, Unification>> {
        let binding = self.params.get(&param.name())?;
        let fresh = Ty::Var(binding.fresh.clone());
        let arg = binding.arg.clone();
        Some(unify(self.scope, &fresh, &arg).into_result())
    }

    fn rewrite(&mut self, ty: &Ty) -> Result<Ty, Unification> {
        match ty {
            Ty::Var(var) => self.bind_param(var).unwrap_or_else(|| Ok(ty.clone())),
            Ty::Con(_) => Ok(ty.clone()),
            Ty::Fun(from, to) => Ok(Ty::fun(self.rewrite(from)?, self.rewrite(to)?)),
            // Its members described the old arguments
            Ty::Union(union) => Ok(Ty::Union(union.rebuild(self.rewrite_all(union.args())?, None))),
            // Never expanded
            Ty::Lookup(lookup) => Ok(Ty::Lookup(lookup.with_args(self.rewrite_all(lookup.args())?))),
            Ty::Ctor(ctor) => {
                let args = self.rewrite_all(ctor.args())?;
                match self.bind_param(ctor.head()) {
                    Some(head) => {
                        let head = head?;
                        head.apply_args(&args).ok_or_else(|| {
                            Unification::mismatch(ty.clone(), Ty::Ctor(TyCtor::new(ctor.head().clone(), args)))
                        })
                    }
                    None => Ok(Ty::Ctor(TyCtor::new(ctor.head().clone(), args))),
                }
            }
        }
    }
}
