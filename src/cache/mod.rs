//! Recursion-breaking build cache
//!
//! Lets a builder construct artifacts (converters) for cyclic type graphs.
//! Each (verb, type key) pair moves through a small lifecycle; a recursive
//! request for a key that is still being built receives a [`ForwardAction`]
//! placeholder instead of starting a second build.
//!
//! # Protocol
//!
//! ```text
//! in_flight(v, k) -> None        caller builds, then complete(v, k, artifact)
//!                                or de_flight(v, k, None) on failure
//! in_flight(v, k) -> Some(fwd)   caller embeds fwd; it resolves on complete
//! ```
//!
//! # Entry States
//!
//! | State | Created by | Description |
//! |-------|------------|-------------|
//! | Absent | - | Never requested, or abandoned |
//! | Pending | `in_flight` | Build on the stack; forward action made on first recursive request |
//! | Done | `complete` | Final artifact; forward action (if any) resolved |
//!
//! [`BuildCache`] serves one builder context. [`ThreadIsolatedCache`] gives
//! each thread its own private [`BuildCache`].

pub mod build;
pub mod forward;
pub mod isolated;

pub use build::BuildCache;
pub use forward::{Downgrade, ForwardAction};
pub use isolated::{ContextGuard, ThreadIsolatedCache};

use crate::error::ConvcacheResult;

/// Build state of a single (verb, type key)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Absent,
    Pending,
    Done,
}

/// The in-flight / complete / abandon protocol, as seen by a builder
///
/// Implemented by [`BuildCache`] and by the per-thread views of
/// [`ThreadIsolatedCache`], so builders can drive either.
pub trait RecursionCache<V, K, A: Downgrade> {
    /// Finished artifact for the key, if any
    fn get(&self, verb: &V, key: &K) -> Option<A>;

    /// Begin a build, or receive a placeholder if one is already under way
    fn in_flight(&mut self, verb: &V, key: &K) -> Option<ForwardAction<A>>;

    /// Finish a build started with `in_flight`
    fn complete(&mut self, verb: &V, key: &K, artifact: A) -> ConvcacheResult<()>;

    /// Abandon a build started with `in_flight`
    fn de_flight(
        &mut self,
        verb: &V,
        key: &K,
        forward: Option<&ForwardAction<A>>,
    ) -> ConvcacheResult<()>;
}
