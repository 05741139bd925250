//! # Common Types
//!
//! Shared aliases used across the chunk reader, pre-tokenizer, and merge
//! engine.

/// The integer type used for token ids.
///
/// `0..=255` are reserved for raw bytes; ids `256..` are assigned
/// sequentially as merges are learned.
pub type TokenId = u32;

/// An ordered pair of adjacent token ids within a pretoken.
pub type Pair = (TokenId, TokenId);

/// A frequency count. Always `> 0` for live entries.
pub type Count = u64;

/// Hash map alias used throughout the crate.
///
/// Swapped for `ahash` over the stdlib `SipHash` default, which is a
/// meaningful win here: the merge engine's hot path is dominated by
/// hashing [`Pair`] and pretoken keys.
pub type CommonHashMap<K, V> = ahash::AHashMap<K, V>;

/// Hash set alias used throughout the crate.
pub type CommonHashSet<V> = ahash::AHashSet<V>;
