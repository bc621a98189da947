//! Type descriptions converters are built for
//!
//! A [`TypeExpr`] is the cache key for every converter; a [`Schema`] supplies
//! the record definitions that named types refer to.

pub mod expr;
pub mod schema;

pub use expr::TypeExpr;
pub use schema::{FieldDef, RecordDef, Schema, TAG_KEY};
