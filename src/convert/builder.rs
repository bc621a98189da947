//! Recursive converter construction
//!
//! The builder walks a type expression, asks the cache before building each
//! component, and reports every finished or failed build back to it. Cycles in
//! the type graph end at a forward placeholder instead of recursing forever.

use crate::cache::RecursionCache;
use crate::convert::action::{Action, Verb};
use crate::convert::hooks::Hooks;
use crate::convert::rules::{self, FieldAction};
use crate::error::{ConvcacheError, ConvcacheResult};
use crate::types::{Schema, TypeExpr};
use tracing::debug;

/// Builds actions for one top-level request against a cache
pub struct Builder<'a, C> {
    schema: &'a Schema,
    hooks: Option<&'a Hooks>,
    cache: &'a mut C,
}

impl<'a, C> Builder<'a, C>
where
    C: RecursionCache<Verb, TypeExpr, Action>,
{
    pub fn new(schema: &'a Schema, cache: &'a mut C) -> Self {
        Self {
            schema,
            hooks: None,
            cache,
        }
    }

    /// Apply per-record hooks to the records this builder builds
    pub fn hooks(mut self, hooks: &'a Hooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Action for `ty`, reusing finished work and breaking cycles
    ///
    /// On failure every build this call started is abandoned. Protocol errors
    /// from the cache take precedence over the build error that triggered the
    /// cleanup.
    pub fn lookup(&mut self, verb: Verb, ty: &TypeExpr) -> ConvcacheResult<Action> {
        if let Some(action) = self.cache.get(&verb, ty) {
            return Ok(action);
        }

        if let Some(forward) = self.cache.in_flight(&verb, ty) {
            debug!("{} for {} is already being built, forwarding", verb, ty);
            return Ok(Action::forward(verb, forward));
        }

        match self.build(verb, ty) {
            Ok(action) => {
                self.cache.complete(&verb, ty, action.clone())?;
                Ok(action)
            }
            Err(err) => {
                debug!("Abandoning {} for {}: {}", verb, ty, err);
                self.cache.de_flight(&verb, ty, None)?;
                Err(err)
            }
        }
    }

    fn build(&mut self, verb: Verb, ty: &TypeExpr) -> ConvcacheResult<Action> {
        debug!("Building {} for {}", verb, ty);
        match ty {
            TypeExpr::Int | TypeExpr::Float | TypeExpr::Str | TypeExpr::Bool | TypeExpr::Any => {
                Ok(rules::primitive(verb, ty))
            }
            TypeExpr::List(inner) => Ok(rules::list(verb, self.lookup(verb, inner)?)),
            TypeExpr::Optional(inner) => Ok(rules::optional(verb, self.lookup(verb, inner)?)),
            TypeExpr::Tuple(items) => {
                let actions = items
                    .iter()
                    .map(|item| self.lookup(verb, item))
                    .collect::<ConvcacheResult<Vec<_>>>()?;
                Ok(rules::tuple(verb, actions))
            }
            TypeExpr::Named(name) => {
                let schema = self.schema;
                let def = schema
                    .record(name)
                    .ok_or_else(|| ConvcacheError::UnknownType(name.clone()))?;
                let fields = def
                    .fields
                    .iter()
                    .map(|field| -> ConvcacheResult<FieldAction> {
                        Ok(FieldAction {
                            name: field.name.clone(),
                            default: field.default.clone(),
                            action: self.lookup(verb, &field.ty)?,
                        })
                    })
                    .collect::<ConvcacheResult<Vec<_>>>()?;
                let hooks = self.hooks.and_then(|hooks| hooks.record(name));
                Ok(rules::record(verb, def, fields, hooks))
            }
        }
    }
}
