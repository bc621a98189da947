//! Forward actions: single-assignment placeholders for artifacts still being built
//!
//! A forward action is handed to a builder that asks for a type whose build is
//! already on the stack. The builder embeds it wherever the real artifact would
//! go; once the outer build completes, the cache resolves it and every holder
//! sees the finished artifact.
//!
//! A placeholder usually ends up inside its own target (a recursive type's
//! converter calls itself through one), so a resolved placeholder only keeps a
//! [`Downgrade::Weak`] link. The target stays alive through the cache entry
//! that finished it and through every artifact that encloses it.

use crate::error::{ConvcacheError, ConvcacheResult};
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock, Weak};

/// Artifacts a placeholder can refer to without owning them
pub trait Downgrade: Sized {
    type Weak;

    fn downgrade(&self) -> Self::Weak;

    /// The artifact again, if anything still owns it
    fn upgrade(weak: &Self::Weak) -> Option<Self>;
}

impl<T: ?Sized> Downgrade for Arc<T> {
    type Weak = Weak<T>;

    fn downgrade(&self) -> Weak<T> {
        Arc::downgrade(self)
    }

    fn upgrade(weak: &Weak<T>) -> Option<Self> {
        weak.upgrade()
    }
}

struct Slot<A: Downgrade> {
    verb: String,
    key: String,
    target: OnceLock<A::Weak>,
}

/// Shared, lazily-resolved reference to a build artifact
///
/// Clones share the same slot, so resolving one resolves all of them.
pub struct ForwardAction<A: Downgrade> {
    slot: Arc<Slot<A>>,
}

impl<A: Downgrade> ForwardAction<A> {
    /// Create an unresolved forward action for the given verb and key
    pub fn new(verb: &impl fmt::Debug, key: &impl fmt::Debug) -> Self {
        Self {
            slot: Arc::new(Slot {
                verb: format!("{:?}", verb),
                key: format!("{:?}", key),
                target: OnceLock::new(),
            }),
        }
    }

    /// Create a forward action that is already resolved to `target`
    pub fn resolved(verb: &impl fmt::Debug, key: &impl fmt::Debug, target: &A) -> Self {
        let forward = Self::new(verb, key);
        // A fresh slot is always empty.
        let _ = forward.slot.target.set(target.downgrade());
        forward
    }

    /// Resolve the placeholder. Resolution is single-assignment.
    pub fn resolve(&self, target: &A) -> ConvcacheResult<()> {
        self.slot
            .target
            .set(target.downgrade())
            .map_err(|_| ConvcacheError::DoubleResolution {
                verb: self.slot.verb.clone(),
                key: self.slot.key.clone(),
            })
    }

    /// The resolved artifact
    ///
    /// Fails when the placeholder was never resolved, or when every owner of
    /// the target has since dropped it.
    pub fn target(&self) -> ConvcacheResult<A> {
        let weak = self
            .slot
            .target
            .get()
            .ok_or_else(|| ConvcacheError::UnresolvedForward {
                verb: self.slot.verb.clone(),
                key: self.slot.key.clone(),
            })?;
        A::upgrade(weak).ok_or_else(|| ConvcacheError::DetachedForward {
            verb: self.slot.verb.clone(),
            key: self.slot.key.clone(),
        })
    }

    /// Call the resolved artifact with `input`
    pub fn invoke<F, I, O>(&self, input: I) -> ConvcacheResult<O>
    where
        A: Deref<Target = F>,
        F: Fn(I) -> O + ?Sized,
    {
        let target = self.target()?;
        let f: &F = &target;
        Ok(f(input))
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.target.get().is_some()
    }

    /// Whether both handles refer to the same placeholder
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    /// Verb this placeholder was created for (diagnostics only)
    pub fn verb(&self) -> &str {
        &self.slot.verb
    }

    /// Type key this placeholder was created for (diagnostics only)
    pub fn key(&self) -> &str {
        &self.slot.key
    }
}

impl<A: Downgrade> Clone for ForwardAction<A> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<A: Downgrade> fmt::Debug for ForwardAction<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_resolved() {
            "resolved"
        } else {
            "unresolved"
        };
        write!(f, "<fwd {} {} ({})>", self.slot.verb, self.slot.key, state)
    }
}
