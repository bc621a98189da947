//! Shareable converter front end
//!
//! `Converters` owns a schema and hands out actions for any type expression.
//! Each top-level request is built in its own isolated cache session, so
//! concurrent requests from different threads never observe each other's
//! half-built entries.

use crate::cache::{BuildCache, ThreadIsolatedCache};
use crate::config::schema::{CacheConfig, CacheIsolation};
use crate::convert::action::{Action, Verb};
use crate::convert::builder::Builder;
use crate::convert::datum::Datum;
use crate::convert::hooks::Hooks;
use crate::error::ConvcacheResult;
use crate::types::{Schema, TypeExpr};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::trace;

/// Converter factory for a schema
pub struct Converters {
    schema: Schema,
    hooks: Hooks,
    isolation: CacheIsolation,
    contexts: ThreadIsolatedCache<Verb, TypeExpr, Action>,
    /// Finished top-level actions, when memoization is enabled
    memo: Option<RwLock<HashMap<(Verb, TypeExpr), Action>>>,
}

impl Converters {
    /// Create converters with default cache settings
    pub fn new(schema: Schema) -> Self {
        Self::with_settings(schema, &CacheConfig::default())
    }

    /// Create converters with explicit cache settings
    pub fn with_settings(schema: Schema, settings: &CacheConfig) -> Self {
        Self {
            schema,
            hooks: Hooks::default(),
            isolation: settings.isolation,
            contexts: ThreadIsolatedCache::new(),
            memo: settings.memoize.then(|| RwLock::new(HashMap::new())),
        }
    }

    /// Attach per-record hooks; every hooked record must be in the schema
    pub fn with_hooks(mut self, hooks: Hooks) -> ConvcacheResult<Self> {
        hooks.validate(&self.schema)?;
        self.hooks = hooks;
        if let Some(memo) = &mut self.memo {
            memo.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
        }
        Ok(self)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Build (or reuse) the action for `verb` over `ty`
    pub fn lookup(&self, verb: Verb, ty: &TypeExpr) -> ConvcacheResult<Action> {
        if let Some(action) = self.memoized(verb, ty) {
            trace!("Reusing {} for {}", verb, ty);
            return Ok(action);
        }

        let action = match self.isolation {
            CacheIsolation::Thread => {
                // Discarded when the guard drops, including after a failed build
                let mut context = self.contexts.enter();
                Builder::new(&self.schema, &mut context)
                    .hooks(&self.hooks)
                    .lookup(verb, ty)?
            }
            CacheIsolation::Session => {
                let mut session = BuildCache::new();
                Builder::new(&self.schema, &mut session)
                    .hooks(&self.hooks)
                    .lookup(verb, ty)?
            }
        };

        if let Some(memo) = &self.memo {
            memo.write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((verb, ty.clone()), action.clone());
        }
        Ok(action)
    }

    pub fn decoder(&self, ty: &TypeExpr) -> ConvcacheResult<Action> {
        self.lookup(Verb::Decode, ty)
    }

    pub fn encoder(&self, ty: &TypeExpr) -> ConvcacheResult<Action> {
        self.lookup(Verb::Encode, ty)
    }

    pub fn checker(&self, ty: &TypeExpr) -> ConvcacheResult<Action> {
        self.lookup(Verb::Check, ty)
    }

    pub fn inspector(&self, ty: &TypeExpr) -> ConvcacheResult<Action> {
        self.lookup(Verb::Inspect, ty)
    }

    /// Decode JSON into a value of type `ty`
    pub fn decode(&self, ty: &TypeExpr, value: &Value) -> ConvcacheResult<Datum> {
        self.decoder(ty)?.decode(value)
    }

    /// Encode a value of type `ty` as JSON
    pub fn encode(&self, ty: &TypeExpr, datum: &Datum) -> ConvcacheResult<Value> {
        self.encoder(ty)?.encode(datum)
    }

    /// Whether JSON conforms to `ty`
    pub fn check(&self, ty: &TypeExpr, value: &Value) -> ConvcacheResult<bool> {
        self.checker(ty)?.check(value)
    }

    /// Whether an in-memory value is a valid `ty`, so that encoding it succeeds
    pub fn inspect(&self, ty: &TypeExpr, datum: &Datum) -> ConvcacheResult<bool> {
        self.inspector(ty)?.inspect(datum)
    }

    /// Decode then re-encode: fills in defaults on the way in, drops them on the way out
    pub fn normalize(&self, ty: &TypeExpr, value: &Value) -> ConvcacheResult<Value> {
        let datum = self.decode(ty, value)?;
        self.encode(ty, &datum)
    }

    /// Number of memoized top-level actions
    pub fn memoized_count(&self) -> usize {
        self.memo.as_ref().map_or(0, |memo| {
            memo.read().unwrap_or_else(PoisonError::into_inner).len()
        })
    }

    fn memoized(&self, verb: Verb, ty: &TypeExpr) -> Option<Action> {
        let memo = self.memo.as_ref()?;
        let memo = memo.read().unwrap_or_else(PoisonError::into_inner);
        memo.get(&(verb, ty.clone())).cloned()
    }
}
