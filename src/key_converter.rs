//! Defines the trait for converting trie keys into symbol sequences.
use std::borrow::Cow;

/// A type that can be read as a sequence of key symbols `S`.
///
/// `Cow` allows for borrowing if the key can provide a direct slice,
/// or owning (e.g. via `Vec<S>`) if a conversion is necessary.
///
/// Strings can be read with two alphabets: `u8` walks their UTF-8 bytes,
/// `char` walks their Unicode scalar values.
pub trait TrieKey<S: Clone> {
    /// Returns the symbols of this key, in order.
    fn symbols(&self) -> Cow<'_, [S]>;
}

impl<S: Clone> TrieKey<S> for [S] {
    fn symbols(&self) -> Cow<'_, [S]> {
        Cow::Borrowed(self)
    }
}

impl<S: Clone> TrieKey<S> for Vec<S> {
    fn symbols(&self) -> Cow<'_, [S]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl<S: Clone, const N: usize> TrieKey<S> for [S; N] {
    fn symbols(&self) -> Cow<'_, [S]> {
        Cow::Borrowed(&self[..])
    }
}

impl<S: Clone, K: TrieKey<S> + ?Sized> TrieKey<S> for &K {
    fn symbols(&self) -> Cow<'_, [S]> {
        (**self).symbols()
    }
}

impl TrieKey<u8> for str {
    fn symbols(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl TrieKey<u8> for String {
    fn symbols(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl TrieKey<char> for str {
    fn symbols(&self) -> Cow<'_, [char]> {
        Cow::Owned(self.chars().collect())
    }
}

impl TrieKey<char> for String {
    fn symbols(&self) -> Cow<'_, [char]> {
        Cow::Owned(self.chars().collect())
    }
}
