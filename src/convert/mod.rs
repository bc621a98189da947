//! Converters built on top of the recursion cache
//!
//! A [`Converters`] instance turns type expressions into [`Action`]s. Building
//! is recursive: records refer to other records, and self-referential types
//! are closed off with forward placeholders from the cache.

pub mod action;
pub mod builder;
pub mod converters;
pub mod datum;
pub mod hooks;
pub mod rules;

pub use action::{Action, Verb};
pub use builder::Builder;
pub use converters::Converters;
pub use datum::Datum;
pub use hooks::{Hooks, RecordHooks};
