//! Single-context build cache
//!
//! Tracks, per (verb, type key), whether an artifact is being built or is
//! finished. All mutation happens on the call stack of one top-level build;
//! there is no internal locking.

use crate::cache::forward::{Downgrade, ForwardAction};
use crate::cache::{EntryState, RecursionCache};
use crate::error::{ConvcacheError, ConvcacheResult};
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{trace, warn};

enum Entry<A: Downgrade> {
    /// Build under way; the forward action is created on the first recursive request
    Pending { forward: Option<ForwardAction<A>> },
    /// Finished artifact
    Done(A),
}

/// Recursion-breaking cache for one builder context
pub struct BuildCache<V, K, A: Downgrade> {
    entries: HashMap<(V, K), Entry<A>>,
}

impl<V, K, A> BuildCache<V, K, A>
where
    V: Eq + Hash + Clone + Debug,
    K: Eq + Hash + Clone + Debug,
    A: Clone + Downgrade,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Finished artifact for the key, if its build completed
    pub fn get(&self, verb: &V, key: &K) -> Option<A> {
        match self.entries.get(&(verb.clone(), key.clone())) {
            Some(Entry::Done(artifact)) => Some(artifact.clone()),
            _ => None,
        }
    }

    /// Announce that the caller is about to build `key`
    ///
    /// Returns `None` when the caller must perform the build. Returns a forward
    /// action when the key is already being built further up the stack; every
    /// such request during one build receives the same placeholder. For a key
    /// that is already done, the finished artifact comes back pre-resolved.
    pub fn in_flight(&mut self, verb: &V, key: &K) -> Option<ForwardAction<A>> {
        match self.entries.entry((verb.clone(), key.clone())) {
            MapEntry::Vacant(vacant) => {
                trace!("{:?} {:?}: pending", verb, key);
                vacant.insert(Entry::Pending { forward: None });
                None
            }
            MapEntry::Occupied(mut occupied) => match occupied.get_mut() {
                Entry::Pending { forward } => {
                    let forward = forward.get_or_insert_with(|| {
                        trace!("{:?} {:?}: recursive request, forwarding", verb, key);
                        ForwardAction::new(verb, key)
                    });
                    Some(forward.clone())
                }
                Entry::Done(artifact) => Some(ForwardAction::resolved(verb, key, artifact)),
            },
        }
    }

    /// Record the finished artifact and resolve any outstanding forward action
    pub fn complete(&mut self, verb: &V, key: &K, artifact: A) -> ConvcacheResult<()> {
        let Some(entry) = self
            .entries
            .get_mut(&(verb.clone(), key.clone()))
            .filter(|entry| matches!(entry, Entry::Pending { .. }))
        else {
            return Err(ConvcacheError::StaleComplete {
                verb: format!("{:?}", verb),
                key: format!("{:?}", key),
            });
        };

        if let Entry::Pending {
            forward: Some(forward),
        } = entry
        {
            forward.resolve(&artifact)?;
        }
        *entry = Entry::Done(artifact);

        trace!("{:?} {:?}: done", verb, key);
        Ok(())
    }

    /// Abandon a pending build so that a later attempt can start fresh
    ///
    /// `forward` is the placeholder the caller received from `in_flight` for
    /// this key, if any. A placeholder that is not the one recorded for the key
    /// is rejected. Absent and finished keys are left untouched.
    pub fn de_flight(
        &mut self,
        verb: &V,
        key: &K,
        forward: Option<&ForwardAction<A>>,
    ) -> ConvcacheResult<()> {
        let slot = (verb.clone(), key.clone());
        let recorded = match self.entries.get(&slot) {
            Some(Entry::Pending { forward }) => forward.as_ref(),
            Some(Entry::Done(_)) | None => {
                trace!("{:?} {:?}: nothing in flight to abandon", verb, key);
                return Ok(());
            }
        };

        if let Some(given) = forward {
            if !recorded.is_some_and(|recorded| recorded.ptr_eq(given)) {
                return Err(ConvcacheError::ForeignAbandon {
                    verb: format!("{:?}", verb),
                    key: format!("{:?}", key),
                });
            }
        }

        if recorded.is_some() {
            warn!(
                "Abandoned {:?} {:?} with a forward reference that will never resolve",
                verb, key
            );
        }
        self.entries.remove(&slot);
        trace!("{:?} {:?}: abandoned", verb, key);
        Ok(())
    }

    /// Current state of the key
    pub fn state(&self, verb: &V, key: &K) -> EntryState {
        match self.entries.get(&(verb.clone(), key.clone())) {
            None => EntryState::Absent,
            Some(Entry::Pending { .. }) => EntryState::Pending,
            Some(Entry::Done(_)) => EntryState::Done,
        }
    }

    /// Number of pending builds
    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, Entry::Pending { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, pending or done
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V, K, A> Default for BuildCache<V, K, A>
where
    V: Eq + Hash + Clone + Debug,
    K: Eq + Hash + Clone + Debug,
    A: Clone + Downgrade,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, K, A> RecursionCache<V, K, A> for BuildCache<V, K, A>
where
    V: Eq + Hash + Clone + Debug,
    K: Eq + Hash + Clone + Debug,
    A: Clone + Downgrade,
{
    fn get(&self, verb: &V, key: &K) -> Option<A> {
        BuildCache::get(self, verb, key)
    }

    fn in_flight(&mut self, verb: &V, key: &K) -> Option<ForwardAction<A>> {
        BuildCache::in_flight(self, verb, key)
    }

    fn complete(&mut self, verb: &V, key: &K, artifact: A) -> ConvcacheResult<()> {
        BuildCache::complete(self, verb, key, artifact)
    }

    fn de_flight(
        &mut self,
        verb: &V,
        key: &K,
        forward: Option<&ForwardAction<A>>,
    ) -> ConvcacheResult<()> {
        BuildCache::de_flight(self, verb, key, forward)
    }
}
