//! Per-record conversion hooks
//!
//! Hooks adapt a record's JSON around the generated converters, typically to
//! accept older document layouts:
//!
//! | Hook | Runs | Used by |
//! |------|------|---------|
//! | `pre_decode` | before the record's fields are read | decode, check |
//! | `post_encode` | after the record object is built | encode |
//! | `check` | instead of the generated check | check |
//!
//! Hooks must not assume their input is valid. A `pre_decode` failure is a
//! decode error, and makes `check` report the value as non-conforming.

use crate::convert::action::CheckFn;
use crate::error::{ConvcacheError, ConvcacheResult};
use crate::types::Schema;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type PreDecodeFn = dyn Fn(&Value) -> ConvcacheResult<Value> + Send + Sync;
pub type PostEncodeFn = dyn Fn(Value) -> ConvcacheResult<Value> + Send + Sync;

/// Hooks registered for one record
#[derive(Clone, Default)]
pub struct RecordHooks {
    pub pre_decode: Option<Arc<PreDecodeFn>>,
    pub post_encode: Option<Arc<PostEncodeFn>>,
    pub check: Option<Arc<CheckFn>>,
}

/// Hooks for the records of a schema, keyed by record name
#[derive(Clone, Default)]
pub struct Hooks {
    records: HashMap<String, RecordHooks>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite the record's JSON before it is decoded or checked
    pub fn pre_decode(
        mut self,
        record: impl Into<String>,
        f: impl Fn(&Value) -> ConvcacheResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.records.entry(record.into()).or_default().pre_decode = Some(Arc::new(f));
        self
    }

    /// Rewrite the record's JSON after it is encoded
    pub fn post_encode(
        mut self,
        record: impl Into<String>,
        f: impl Fn(Value) -> ConvcacheResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.records.entry(record.into()).or_default().post_encode = Some(Arc::new(f));
        self
    }

    /// Replace the generated check for the record
    pub fn check(
        mut self,
        record: impl Into<String>,
        f: impl Fn(&Value) -> ConvcacheResult<bool> + Send + Sync + 'static,
    ) -> Self {
        self.records.entry(record.into()).or_default().check = Some(Arc::new(f));
        self
    }

    /// Hooks for a record, if any were registered
    pub fn record(&self, name: &str) -> Option<&RecordHooks> {
        self.records.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every hooked record must exist in the schema
    pub fn validate(&self, schema: &Schema) -> ConvcacheResult<()> {
        match self
            .records
            .keys()
            .find(|name| schema.record(name).is_none())
        {
            Some(name) => Err(ConvcacheError::UnknownType(name.clone())),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.records.keys().collect();
        names.sort();
        f.debug_struct("Hooks").field("records", &names).finish()
    }
}
