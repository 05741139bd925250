//! # Vocabulary and Merge List
//!
//! The two artifacts a training run produces: an append-only list of
//! [`Pair`] merges, and the [`Vocab`] mapping token ids to their byte
//! strings.

use crate::types::{CommonHashMap, Pair, TokenId};

/// Ordered list of merges. Position `i` is the pair promoted to token id
/// `256 + i`.
pub type Merges = Vec<Pair>;

/// Mapping from token id to its byte string.
///
/// Ids `0..=255` map to the single byte equal to the id. Ids `>= 256` map
/// to the concatenation of the byte strings of the merged pair. The final
/// `S` ids (`S` = number of special tokens) map to the UTF-8 bytes of the
/// special token strings.
#[derive(Debug, Clone, Default)]
pub struct Vocab {
    entries: CommonHashMap<TokenId, Vec<u8>>,
}

impl Vocab {
    /// Build the base vocabulary: one entry per byte value, `id == byte`.
    pub fn base_bytes() -> Self {
        let mut entries = CommonHashMap::with_capacity_and_hasher(256, Default::default());
        for b in 0u16..256 {
            entries.insert(b as TokenId, vec![b as u8]);
        }
        Self { entries }
    }

    /// Look up the byte string for a token id.
    pub fn get(
        &self,
        id: TokenId,
    ) -> Option<&[u8]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    /// Insert or overwrite a vocab entry.
    pub fn insert(
        &mut self,
        id: TokenId,
        bytes: Vec<u8>,
    ) {
        self.entries.insert(id, bytes);
    }

    /// Number of entries currently in the vocabulary.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the vocabulary empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(id, bytes)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &[u8])> {
        self.entries.iter().map(|(&id, bytes)| (id, bytes.as_slice()))
    }

    /// Concatenate the byte strings of `left` and `right` into a new entry
    /// for `new_id`. Used when recording a merge.
    ///
    /// # Panics
    /// If `left` or `right` aren't already present in the vocabulary; this
    /// would indicate a bug in the merge engine, which only ever merges
    /// known token ids.
    pub fn merge_into(
        &mut self,
        new_id: TokenId,
        left: TokenId,
        right: TokenId,
    ) {
        let mut bytes = Vec::with_capacity(
            self.get(left).map_or(0, <[u8]>::len) + self.get(right).map_or(0, <[u8]>::len),
        );
        bytes.extend_from_slice(self.get(left).expect("merged pair's left id must be known"));
        bytes.extend_from_slice(self.get(right).expect("merged pair's right id must be known"));
        self.insert(new_id, bytes);
    }
}
