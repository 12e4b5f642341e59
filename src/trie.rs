//! The main trie implementation.
//!
//! This module contains the `Trie` type, which provides the primary API for working
//! with the persistent trie data structure.

use std::any::{type_name, Any};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::trace;

use crate::key_converter::TrieKey;
use crate::node::{NodeValue, TrieNode};
use crate::{Error, Result};

/// An immutable trie with structural sharing.
///
/// A `Trie` is a snapshot of a key → value mapping. Operations that would modify
/// it return a new trie instead. The new trie owns fresh copies of the nodes along
/// the edited key path and shares every other subtree with the original via `Arc`,
/// so each edit costs O(key length) regardless of the size of the trie.
///
/// Values are type-tagged: the type is chosen per `put` and must match on `get`.
pub struct Trie<S = u8> {
    /// The root node of the trie, absent for the empty trie
    pub(crate) root: Option<Arc<TrieNode<S>>>,
}

/// Outcome of removing a key below a node.
enum Removal<S> {
    /// Nothing was stored under the key; the node is unchanged
    Absent,
    /// The node became valueless and childless and must be detached
    Pruned,
    /// The node was rebuilt
    Replaced(Arc<TrieNode<S>>),
}

impl<S> Clone for Trie<S> {
    fn clone(&self) -> Self {
        Trie {
            root: self.root.clone(),
        }
    }
}

impl<S> Trie<S> {
    /// Creates a new, empty trie.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_trie::ByteTrie;
    ///
    /// let trie = ByteTrie::new();
    /// assert!(trie.is_empty());
    /// assert!(trie.root().is_none());
    /// ```
    pub fn new() -> Self {
        Trie { root: None }
    }

    /// Creates a trie from an existing root node.
    ///
    /// The root is taken as is. A root that holds no value and has no children
    /// is normalized to the empty trie.
    pub fn from_root(root: Option<Arc<TrieNode<S>>>) -> Self {
        Trie {
            root: root.filter(|node| !node.is_dead()),
        }
    }

    /// Returns the root node, or `None` for the empty trie.
    pub fn root(&self) -> Option<&Arc<TrieNode<S>>> {
        self.root.as_ref()
    }

    /// Returns the number of values stored in the trie.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_trie::ByteTrie;
    ///
    /// let trie = ByteTrie::new().put("a", 1u8).put("ab", "two");
    /// assert_eq!(trie.len(), 2);
    /// ```
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.entry_count())
    }

    /// Returns `true` if the trie contains no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns `true` if both tries are the same snapshot, i.e. share one root.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<S> Trie<S>
where
    S: Eq + Hash + Clone,
{
    /// Retrieves a reference to the value stored for the given key, if any.
    ///
    /// Returns `None` if the key is absent or if its value was stored as a type
    /// other than `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_trie::ByteTrie;
    ///
    /// let trie = ByteTrie::new().put("hello", 42u32);
    ///
    /// assert_eq!(trie.get::<u32>("hello"), Some(&42));
    /// assert_eq!(trie.get::<u32>("world"), None);
    /// assert_eq!(trie.get::<i64>("hello"), None);
    /// ```
    pub fn get<T: Any>(&self, key: &(impl TrieKey<S> + ?Sized)) -> Option<&T> {
        self.find_node(&key.symbols())?.value::<T>()
    }

    /// Like [`Trie::get`], but reports why a lookup missed.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_trie::{ByteTrie, Error};
    ///
    /// let trie = ByteTrie::new().put("k", 1u32);
    ///
    /// assert_eq!(trie.get_checked::<u32>("k"), Ok(&1));
    /// assert_eq!(trie.get_checked::<u32>("x"), Err(Error::NotFound));
    /// assert_eq!(
    ///     trie.get_checked::<u8>("k"),
    ///     Err(Error::TypeMismatch { requested: "u8", found: "u32" })
    /// );
    /// ```
    pub fn get_checked<T: Any>(&self, key: &(impl TrieKey<S> + ?Sized)) -> Result<&T> {
        let value = self
            .find_node(&key.symbols())
            .and_then(|node| node.value.as_ref())
            .ok_or(Error::NotFound)?;

        value.downcast_ref::<T>().ok_or_else(|| Error::TypeMismatch {
            requested: type_name::<T>(),
            found: value.type_name(),
        })
    }

    /// Returns a shared handle to the value stored for the given key.
    ///
    /// The handle stays valid after the trie itself is dropped.
    pub fn get_shared<T: Any + Send + Sync>(&self, key: &(impl TrieKey<S> + ?Sized)) -> Option<Arc<T>> {
        self.find_node(&key.symbols())?.value.as_ref()?.downcast_arc::<T>()
    }

    /// Returns `true` if a value of any type is stored for the given key.
    pub fn contains_key(&self, key: &(impl TrieKey<S> + ?Sized)) -> bool {
        self.find_node(&key.symbols())
            .map_or(false, |node| node.is_value_node())
    }

    /// Inserts a key-value pair into the trie, returning a new trie.
    ///
    /// If the key already exists its value is replaced, whatever its previous type.
    /// The value is moved in and never cloned, so `T` need not be `Clone`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_trie::ByteTrie;
    ///
    /// let trie1 = ByteTrie::new();
    /// let trie2 = trie1.put("hello", 42u32);
    ///
    /// assert!(trie1.is_empty());
    /// assert_eq!(trie2.get::<u32>("hello"), Some(&42));
    /// ```
    pub fn put<T: Any + Send + Sync>(&self, key: &(impl TrieKey<S> + ?Sized), value: T) -> Self {
        let symbols = key.symbols();
        trace!(key_len = symbols.len(), value_type = type_name::<T>(), "trie put");

        let new_root = Self::put_path(self.root.as_ref(), &symbols, NodeValue::new(value));

        Trie {
            root: Some(new_root),
        }
    }

    // Rebuilds the path from `root` down `key` with `value` stored at its end.
    // Nodes on the path are copied (or created where the path does not exist
    // yet), siblings are shared. The path is rebuilt bottom-up from an explicit
    // stack so key length is not bounded by the call stack.
    fn put_path(root: Option<&Arc<TrieNode<S>>>, key: &[S], value: NodeValue) -> Arc<TrieNode<S>> {
        let mut path = Vec::with_capacity(key.len());
        let mut current = root;
        for symbol in key {
            path.push((current, symbol));
            current = current.and_then(|node| node.children.get(symbol));
        }

        let children = current.map(|node| node.children.clone()).unwrap_or_default();
        let mut rebuilt = Arc::new(TrieNode::with_value(children, value));

        while let Some((node, symbol)) = path.pop() {
            let mut new_node = match node {
                Some(node) => (**node).clone(),
                None => TrieNode::new(),
            };
            new_node.children.insert(symbol.clone(), rebuilt);
            rebuilt = Arc::new(new_node);
        }

        rebuilt
    }

    /// Removes the value stored for a key, returning a new trie.
    ///
    /// Nodes left without a value and without children are pruned, all the way up
    /// to the root. If nothing was stored under the key, the returned trie is the
    /// same snapshot as `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_trie::ByteTrie;
    ///
    /// let trie1 = ByteTrie::new().put("hello", 42u32);
    /// let trie2 = trie1.remove("hello");
    ///
    /// assert!(trie2.is_empty());
    /// assert_eq!(trie1.get::<u32>("hello"), Some(&42));
    ///
    /// let trie3 = trie1.remove("absent");
    /// assert!(trie3.ptr_eq(&trie1));
    /// ```
    pub fn remove(&self, key: &(impl TrieKey<S> + ?Sized)) -> Self {
        let symbols = key.symbols();

        let root = match &self.root {
            Some(root) => root,
            None => return self.clone(),
        };

        match Self::remove_path(root, &symbols) {
            Removal::Absent => {
                trace!(key_len = symbols.len(), "trie remove: key absent");
                self.clone()
            }
            Removal::Pruned => {
                trace!(key_len = symbols.len(), "trie remove: trie now empty");
                Trie::new()
            }
            Removal::Replaced(new_root) => {
                trace!(key_len = symbols.len(), "trie remove");
                Trie {
                    root: Some(new_root),
                }
            }
        }
    }

    // Copies the path from `root` down `key` without the value at its end.
    // Walking back up, a child left valueless and childless is detached, and
    // the same test is applied to each ancestor in turn.
    fn remove_path(root: &Arc<TrieNode<S>>, key: &[S]) -> Removal<S> {
        let mut path = Vec::with_capacity(key.len());
        let mut current = root;
        for symbol in key {
            let child = match current.children.get(symbol) {
                Some(child) => child,
                None => return Removal::Absent,
            };
            path.push((current, symbol));
            current = child;
        }

        if !current.is_value_node() {
            return Removal::Absent;
        }

        // `None` means the node below was pruned
        let mut rebuilt = if current.is_leaf() {
            None
        } else {
            let mut new_node = (**current).clone();
            new_node.value = None;
            Some(Arc::new(new_node))
        };

        while let Some((node, symbol)) = path.pop() {
            let mut new_node = (**node).clone();
            match rebuilt {
                Some(child) => {
                    new_node.children.insert(symbol.clone(), child);
                }
                None => {
                    new_node.children.remove(symbol);
                }
            }
            rebuilt = if new_node.is_dead() {
                None
            } else {
                Some(Arc::new(new_node))
            };
        }

        match rebuilt {
            Some(new_root) => Removal::Replaced(new_root),
            None => Removal::Pruned,
        }
    }

    // Walks the key from the root, returning the node it lands on.
    fn find_node(&self, key: &[S]) -> Option<&TrieNode<S>> {
        let mut current = self.root.as_ref()?;
        for symbol in key {
            current = current.children.get(symbol)?;
        }
        Some(&**current)
    }
}

impl<S> Default for Trie<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for Trie<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trie").field("root", &self.root).finish()
    }
}
