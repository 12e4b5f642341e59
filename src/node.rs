//! Node implementation for the persistent trie.
//!
//! This module contains the `TrieNode` structure that forms the backbone
//! of the trie. `TrieNode` instances are always wrapped in an `Arc` to enable
//! structural sharing between snapshots, and are never mutated once published.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use once_cell::sync::OnceCell;

/// A type-tagged payload stored at a value-bearing node.
///
/// The payload sits behind a single `Arc`, so cloning a node only copies the
/// handle. The payload itself is moved in once and never duplicated.
#[derive(Clone)]
pub(crate) struct NodeValue {
    payload: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl NodeValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        NodeValue {
            payload: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the payload if it was stored as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Returns a shared handle to the payload if it was stored as a `T`.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.payload).downcast::<T>().ok()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeValue").field(&self.type_name).finish()
    }
}

/// A node of the persistent trie.
///
/// Each node owns a map from key symbol to child node and, if it terminates a
/// stored key, a type-tagged value. Children are shared by reference between
/// every snapshot that reaches them.
#[derive(Debug)]
pub struct TrieNode<S> {
    /// Child nodes indexed by the next key symbol
    pub(crate) children: HashMap<S, Arc<TrieNode<S>>>,

    /// The value stored at this node, if any
    pub(crate) value: Option<NodeValue>,

    /// Cached number of values in this subtree
    ///
    /// Computed lazily. Shared subtrees keep their count across snapshots.
    entry_count: OnceCell<usize>,
}

impl<S> TrieNode<S> {
    /// Creates a new node with no value and no children
    pub(crate) fn new() -> Self {
        TrieNode {
            children: HashMap::new(),
            value: None,
            entry_count: OnceCell::new(),
        }
    }

    /// Creates a new node carrying `value` and the given children
    pub(crate) fn with_value(children: HashMap<S, Arc<TrieNode<S>>>, value: NodeValue) -> Self {
        TrieNode {
            children,
            value: Some(value),
            entry_count: OnceCell::new(),
        }
    }

    /// Returns `true` if this node terminates a stored key.
    pub fn is_value_node(&self) -> bool {
        self.value.is_some()
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Iterates over the direct children in unspecified order.
    pub fn children(&self) -> impl Iterator<Item = (&S, &Arc<TrieNode<S>>)> {
        self.children.iter()
    }

    /// Returns the value stored at this node if it was stored as a `T`.
    pub fn value<T: Any>(&self) -> Option<&T> {
        self.value.as_ref()?.downcast_ref::<T>()
    }

    /// Returns the name of the type the value was stored as.
    pub fn value_type_name(&self) -> Option<&'static str> {
        self.value.as_ref().map(NodeValue::type_name)
    }

    /// Returns the number of values stored in this subtree, including this node.
    ///
    /// Counts are cached per node, so only subtrees not counted before are visited.
    pub fn entry_count(&self) -> usize {
        if let Some(count) = self.entry_count.get() {
            return *count;
        }

        // Post-order walk: a node is counted once all of its children are.
        let mut stack = vec![(self, false)];
        while let Some((node, children_counted)) = stack.pop() {
            if node.entry_count.get().is_some() {
                continue;
            }
            if children_counted {
                let own = if node.value.is_some() { 1 } else { 0 };
                let below: usize = node
                    .children
                    .values()
                    .map(|child| child.entry_count.get().copied().unwrap_or(0))
                    .sum();
                // another reader may have stored the same count first
                let _ = node.entry_count.set(own + below);
            } else {
                stack.push((node, true));
                stack.extend(
                    node.children
                        .values()
                        .filter(|child| child.entry_count.get().is_none())
                        .map(|child| (&**child, false)),
                );
            }
        }

        self.entry_count.get().copied().unwrap_or(0)
    }

    /// A valueless node without children must never be reachable from a root.
    pub(crate) fn is_dead(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }
}

impl<S: Eq + Hash> TrieNode<S> {
    /// Returns the child reached through `symbol`.
    pub fn child(&self, symbol: &S) -> Option<&Arc<TrieNode<S>>> {
        self.children.get(symbol)
    }
}

impl<S: Clone> Clone for TrieNode<S> {
    fn clone(&self) -> Self {
        TrieNode {
            children: self.children.clone(),
            value: self.value.clone(),
            entry_count: OnceCell::new(), // the clone is about to be edited
        }
    }
}

// Children owned only by this node are unlinked onto a heap stack before they
// drop, so dropping a long chain does not recurse once per level.
impl<S> Drop for TrieNode<S> {
    fn drop(&mut self) {
        let mut orphans: Vec<Arc<TrieNode<S>>> = self.children.drain().map(|(_, child)| child).collect();
        while let Some(child) = orphans.pop() {
            if let Ok(mut node) = Arc::try_unwrap(child) {
                orphans.extend(node.children.drain().map(|(_, child)| child));
            }
        }
    }
}
