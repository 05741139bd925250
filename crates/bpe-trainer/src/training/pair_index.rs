//! # Pair Index
//!
//! `PairCount` and `PairToPretokens` from §3 of the data model, built
//! together since every update touches both.

use crate::training::pretoken_buf::PretokenBuf;
use crate::types::{CommonHashMap, CommonHashSet, Count, Pair};

/// `Pair -> total weighted occurrence count`.
pub type PairCountMap = CommonHashMap<Pair, Count>;

/// `Pair -> indices of pretokens (in the engine's pretoken vector) that
/// contain it`.
pub type PairToPretokensMap = CommonHashMap<Pair, CommonHashSet<usize>>;

/// The pair-count and pair-adjacency indices, built together from an
/// initial pretoken table.
#[derive(Debug, Clone, Default)]
pub struct PairIndex {
    /// `pair_counts[p] = Σ over pretokens containing p of occurrences(p) × frequency`.
    pub pair_counts: PairCountMap,
    /// `pair_to_pretokens[p]` = indices of pretokens containing `p`.
    pub pair_to_pretokens: PairToPretokensMap,
}

impl PairIndex {
    /// Build the index from a pretoken table and its parallel frequency
    /// vector: `counts[i]` is the frequency of `pretokens[i]`.
    pub fn from_pretoken_table(
        pretokens: &[PretokenBuf],
        counts: &[Count],
    ) -> Self {
        let mut index = Self::default();

        for (i, pretoken) in pretokens.iter().enumerate() {
            let freq = counts[i];
            if freq == 0 || pretoken.len() < 2 {
                continue;
            }
            for pair in pretoken.pairs() {
                *index.pair_counts.entry(pair).or_default() += freq;
                index.pair_to_pretokens.entry(pair).or_default().insert(i);
            }
        }

        index
    }
}
