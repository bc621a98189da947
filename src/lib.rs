//! convcache - recursion-safe converter caching
//!
//! Builds decoders, encoders, checkers and inspectors for recursive record
//! types. A build cache tracks which (verb, type) pairs are in progress so
//! that self-referential types resolve through forward placeholders instead
//! of recursing forever.

pub mod cache;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod types;
pub mod ui;

pub use cache::{BuildCache, Downgrade, ForwardAction, RecursionCache, ThreadIsolatedCache};
pub use convert::{Action, Converters, Datum, Hooks, Verb};
pub use error::{ConvcacheError, ConvcacheResult};
pub use types::{Schema, TypeExpr};
