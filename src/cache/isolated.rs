//! Per-thread build caches
//!
//! Independent builders running on different threads must not see each
//! other's pending entries. Each thread gets a private [`BuildCache`], created
//! on first use and discarded when its outermost [`ContextGuard`] drops, on
//! [`ThreadIsolatedCache::release`], or when the thread exits.
//!
//! The registry lock is only held for the duration of a single operation,
//! never across a build, so recursive calls on the same thread find each
//! other's entries without contention from other threads' builds.

use crate::cache::build::BuildCache;
use crate::cache::forward::{Downgrade, ForwardAction};
use crate::cache::{EntryState, RecursionCache};
use crate::error::{ConvcacheError, ConvcacheResult};
use std::cell::RefCell;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};
use tracing::debug;

struct Context<V, K, A: Downgrade> {
    /// Number of live guards on this thread
    depth: usize,
    cache: BuildCache<V, K, A>,
}

struct Registry<V, K, A: Downgrade> {
    contexts: Mutex<HashMap<ThreadId, Context<V, K, A>>>,
}

impl<V, K, A: Downgrade> Registry<V, K, A> {
    // Operations never panic while holding the lock, so a poisoned registry
    // still holds consistent per-thread caches.
    fn lock(&self) -> MutexGuard<'_, HashMap<ThreadId, Context<V, K, A>>> {
        self.contexts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the thread's context, outside the registry lock
    fn discard(&self, id: ThreadId) -> bool {
        let removed = self.lock().remove(&id);
        removed.is_some()
    }
}

/// A registry holding contexts for the exiting thread
trait ThreadExit {
    fn thread_exited(&self, id: ThreadId);
}

impl<V, K, A: Downgrade> ThreadExit for Registry<V, K, A> {
    fn thread_exited(&self, id: ThreadId) {
        if self.discard(id) {
            debug!("Discarded build context of exited {:?}", id);
        }
    }
}

/// Registries to notify when the current thread exits
struct ExitHooks {
    thread: ThreadId,
    registries: RefCell<Vec<Weak<dyn ThreadExit>>>,
}

impl Drop for ExitHooks {
    fn drop(&mut self) {
        for registry in self.registries.get_mut().drain(..) {
            if let Some(registry) = registry.upgrade() {
                registry.thread_exited(self.thread);
            }
        }
    }
}

thread_local! {
    static EXIT_HOOKS: ExitHooks = ExitHooks {
        thread: thread::current().id(),
        registries: RefCell::new(Vec::new()),
    };
}

/// Have the registry forget the current thread's context when the thread exits
fn on_thread_exit(registry: Weak<dyn ThreadExit>) {
    let registered = EXIT_HOOKS.try_with(move |hooks| {
        let mut registries = hooks.registries.borrow_mut();
        registries.retain(|known| known.strong_count() > 0);
        if !registries.iter().any(|known| known.ptr_eq(&registry)) {
            registries.push(registry);
        }
    });
    if registered.is_err() {
        debug!("Thread is shutting down; its build context ends with its last guard");
    }
}

/// Registry of private build caches, one per thread
pub struct ThreadIsolatedCache<V, K, A: Downgrade> {
    registry: Arc<Registry<V, K, A>>,
}

impl<V, K, A> ThreadIsolatedCache<V, K, A>
where
    V: Eq + Hash + Clone + Debug + 'static,
    K: Eq + Hash + Clone + Debug + 'static,
    A: Clone + Downgrade + 'static,
{
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                contexts: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Enter a builder context on the calling thread
    ///
    /// Nested guards on the same thread share one cache. The cache is
    /// discarded when the outermost guard drops.
    pub fn enter(&self) -> ContextGuard<'_, V, K, A> {
        self.with_current(|context| context.depth += 1);
        ContextGuard { owner: self }
    }

    /// Finished artifact for the key in the calling thread's cache
    pub fn get(&self, verb: &V, key: &K) -> Option<A> {
        self.with_existing(|context| context.cache.get(verb, key))
            .flatten()
    }

    /// `in_flight` against the calling thread's cache
    pub fn in_flight(&self, verb: &V, key: &K) -> Option<ForwardAction<A>> {
        self.with_current(|context| context.cache.in_flight(verb, key))
    }

    /// `complete` against the calling thread's cache
    pub fn complete(&self, verb: &V, key: &K, artifact: A) -> ConvcacheResult<()> {
        self.with_existing(|context| context.cache.complete(verb, key, artifact))
            .unwrap_or_else(|| {
                Err(ConvcacheError::StaleComplete {
                    verb: format!("{:?}", verb),
                    key: format!("{:?}", key),
                })
            })
    }

    /// `de_flight` against the calling thread's cache
    pub fn de_flight(
        &self,
        verb: &V,
        key: &K,
        forward: Option<&ForwardAction<A>>,
    ) -> ConvcacheResult<()> {
        self.with_existing(|context| context.cache.de_flight(verb, key, forward))
            .unwrap_or(Ok(()))
    }

    /// State of the key in the calling thread's cache
    pub fn state(&self, verb: &V, key: &K) -> EntryState {
        self.with_existing(|context| context.cache.state(verb, key))
            .unwrap_or(EntryState::Absent)
    }

    /// Discard the calling thread's cache, whatever its state
    pub fn release(&self) {
        let id = thread::current().id();
        if self.registry.discard(id) {
            debug!("Released build context for {:?}", id);
        }
    }

    /// Number of threads that currently own a cache
    pub fn context_count(&self) -> usize {
        self.registry.lock().len()
    }

    fn with_current<R>(&self, f: impl FnOnce(&mut Context<V, K, A>) -> R) -> R {
        let id = thread::current().id();
        let mut contexts = self.registry.lock();
        let context = match contexts.entry(id) {
            MapEntry::Occupied(occupied) => occupied.into_mut(),
            MapEntry::Vacant(vacant) => {
                debug!("Created build context for {:?}", id);
                let registry: Weak<dyn ThreadExit> = Arc::downgrade(&self.registry) as Weak<Registry<V, K, A>>;
                on_thread_exit(registry);
                vacant.insert(Context {
                    depth: 0,
                    cache: BuildCache::new(),
                })
            }
        };
        f(context)
    }

    fn with_existing<R>(&self, f: impl FnOnce(&mut Context<V, K, A>) -> R) -> Option<R> {
        self.registry
            .lock()
            .get_mut(&thread::current().id())
            .map(f)
    }

    fn exit(&self) {
        let id = thread::current().id();
        let finished = {
            let mut contexts = self.registry.lock();
            let Some(context) = contexts.get_mut(&id) else {
                // Released while the guard was alive
                return;
            };
            context.depth = context.depth.saturating_sub(1);
            if context.depth == 0 {
                contexts.remove(&id)
            } else {
                None
            }
        };

        if finished.is_some() {
            debug!("Discarded build context for {:?}", id);
        }
    }
}

impl<V, K, A> Default for ThreadIsolatedCache<V, K, A>
where
    V: Eq + Hash + Clone + Debug + 'static,
    K: Eq + Hash + Clone + Debug + 'static,
    A: Clone + Downgrade + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A live builder context on the current thread
///
/// Dereferences to the protocol through [`RecursionCache`]; dropping the
/// outermost guard discards the thread's cache.
pub struct ContextGuard<'a, V, K, A>
where
    V: Eq + Hash + Clone + Debug + 'static,
    K: Eq + Hash + Clone + Debug + 'static,
    A: Clone + Downgrade + 'static,
{
    owner: &'a ThreadIsolatedCache<V, K, A>,
}

impl<V, K, A> Drop for ContextGuard<'_, V, K, A>
where
    V: Eq + Hash + Clone + Debug + 'static,
    K: Eq + Hash + Clone + Debug + 'static,
    A: Clone + Downgrade + 'static,
{
    fn drop(&mut self) {
        self.owner.exit();
    }
}

impl<V, K, A> RecursionCache<V, K, A> for ContextGuard<'_, V, K, A>
where
    V: Eq + Hash + Clone + Debug + 'static,
    K: Eq + Hash + Clone + Debug + 'static,
    A: Clone + Downgrade + 'static,
{
    fn get(&self, verb: &V, key: &K) -> Option<A> {
        self.owner.get(verb, key)
    }

    fn in_flight(&mut self, verb: &V, key: &K) -> Option<ForwardAction<A>> {
        self.owner.in_flight(verb, key)
    }

    fn complete(&mut self, verb: &V, key: &K, artifact: A) -> ConvcacheResult<()> {
        self.owner.complete(verb, key, artifact)
    }

    fn de_flight(
        &mut self,
        verb: &V,
        key: &K,
        forward: Option<&ForwardAction<A>>,
    ) -> ConvcacheResult<()> {
        self.owner.de_flight(verb, key, forward)
    }
}
