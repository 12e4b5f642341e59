//! A holder for the current version of a persistent trie.
//!
//! `TrieStore` lets many readers look up values while writers publish new
//! snapshots one at a time. Readers only hold the root lock long enough to clone
//! the current `Trie`, then work on that snapshot without any lock.

use std::any::Any;
use std::fmt;
use std::hash::Hash;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::key_converter::TrieKey;
use crate::trie::Trie;

/// A value read from a [`TrieStore`].
///
/// The guard keeps the snapshot it was read from alive, so the value stays
/// readable even after later writes replace or remove it in the store.
pub struct ValueGuard<T, S = u8> {
    snapshot: Trie<S>,
    value: Arc<T>,
}

impl<T, S> ValueGuard<T, S> {
    /// Returns the snapshot this value was read from.
    pub fn snapshot(&self) -> &Trie<S> {
        &self.snapshot
    }
}

impl<T, S> Deref for ValueGuard<T, S> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug, S> fmt::Debug for ValueGuard<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueGuard").field(&*self.value).finish()
    }
}

/// A concurrent key-value store publishing successive [`Trie`] snapshots.
///
/// Writers are serialized, so each `put` or `remove` builds on the version
/// published by the previous one. Readers never wait for a writer to finish
/// building its snapshot.
///
/// # Examples
///
/// ```
/// use persistent_trie::TrieStore;
///
/// let store: TrieStore = TrieStore::new();
/// store.put("answer", 42u32);
///
/// let guard = store.get::<u32>("answer").unwrap();
/// store.remove("answer");
///
/// assert_eq!(*guard, 42);
/// assert!(store.get::<u32>("answer").is_none());
/// ```
pub struct TrieStore<S = u8> {
    /// The current version. Only held while cloning or swapping the root.
    root: Mutex<Trie<S>>,

    /// Serializes writers
    write_lock: Mutex<()>,
}

impl<S> TrieStore<S> {
    /// Creates a store holding the empty trie.
    pub fn new() -> Self {
        Self::from_trie(Trie::new())
    }

    /// Creates a store whose current version is `trie`.
    pub fn from_trie(trie: Trie<S>) -> Self {
        TrieStore {
            root: Mutex::new(trie),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the current version.
    pub fn snapshot(&self) -> Trie<S> {
        self.root.lock().clone()
    }
}

impl<S> TrieStore<S>
where
    S: Eq + Hash + Clone,
{
    /// Looks up `key` in the current version.
    ///
    /// Returns `None` if the key is absent or its value is not a `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &(impl TrieKey<S> + ?Sized)) -> Option<ValueGuard<T, S>> {
        let snapshot = self.snapshot();
        let value = snapshot.get_shared::<T>(key)?;

        Some(ValueGuard {
            snapshot,
            value,
        })
    }

    /// Stores `value` under `key` and publishes the resulting version.
    pub fn put<T: Any + Send + Sync>(&self, key: &(impl TrieKey<S> + ?Sized), value: T) {
        let _writer = self.write_lock.lock();

        let next = self.snapshot().put(key, value);
        self.publish(next);
    }

    /// Removes the value stored under `key` and publishes the resulting version.
    pub fn remove(&self, key: &(impl TrieKey<S> + ?Sized)) {
        let _writer = self.write_lock.lock();

        let current = self.snapshot();
        let next = current.remove(key);
        if next.ptr_eq(&current) {
            return;
        }
        self.publish(next);
    }

    // Must be called with the writer lock held.
    fn publish(&self, next: Trie<S>) {
        debug!(entries = next.len(), "publishing trie version");
        *self.root.lock() = next;
    }
}

impl<S> Default for TrieStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for TrieStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrieStore").field("root", &*self.root.lock()).finish()
    }
}
