//! # Persistent Trie
//!
//! A copy-on-write prefix tree with structural sharing and type-tagged values.
//!
//! This crate provides an immutable trie keyed by symbol sequences. Every `put` and
//! `remove` returns a new snapshot that shares all untouched subtrees with the
//! previous one via `Arc`, so older snapshots stay valid and readable.
//!
//! ## Features
//!
//! - **Immutable API**: All modifying operations return a new trie instance
//! - **Structural Sharing**: Only the nodes along the edited key path are copied
//! - **Heterogeneous Values**: Each key decides its value type at insertion time;
//!   reading it back as another type yields `None`
//! - **Generic Alphabet**: Keys are sequences of any `Eq + Hash + Clone` symbol
//! - **Versioned Store**: `TrieStore` publishes successive snapshots to readers
//!
//! ## Example
//!
//! ```rust
//! use persistent_trie::ByteTrie;
//!
//! let t0 = ByteTrie::new();
//! let t1 = t0.put("hello", 1u32);
//! let t2 = t1.put("world", String::from("two"));
//!
//! assert_eq!(t2.get::<u32>("hello"), Some(&1));
//! assert_eq!(t2.get::<String>("world").map(String::as_str), Some("two"));
//!
//! // Asking for the wrong type is a miss, not a fault
//! assert_eq!(t2.get::<u64>("hello"), None);
//!
//! // Older snapshots are untouched
//! assert_eq!(t0.get::<u32>("hello"), None);
//! ```

mod key_converter;
pub mod node;
mod store;
mod trie;

use thiserror::Error;

// Re-export public types
pub use crate::key_converter::TrieKey;
pub use crate::node::TrieNode;
pub use crate::store::{TrieStore, ValueGuard};
pub use crate::trie::Trie;

/// A trie keyed by bytes. `&str` keys are read as their UTF-8 encoding.
pub type ByteTrie = Trie<u8>;

/// A trie keyed by Unicode scalar values.
pub type CharTrie = Trie<char>;

/// Result type alias for checked lookups
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in checked trie lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No value is stored under the key
    #[error("No value stored under key")]
    NotFound,

    /// A value is stored under the key, but as a different type
    #[error("Value stored as `{found}` was requested as `{requested}`")]
    TypeMismatch {
        /// The type the caller asked for
        requested: &'static str,
        /// The type the value was stored as
        found: &'static str,
    },
}
