//! # Merge Engine
//!
//! Owns `PretokenCount`, `PairCount`, `PairToPretokens`, and `PairHeap`
//! during training, and performs one merge per [`MergeEngine::step`] call.
//! Strictly single-threaded: nothing here runs concurrently with anything
//! else.

use crate::training::pair_index::{PairIndex, PairToPretokensMap};
use crate::training::pretoken_buf::PretokenBuf;
use crate::types::{CommonHashMap, CommonHashSet, Count, Pair, TokenId};
use compact_str::CompactString;
use core::cmp::Ordering;
use dary_heap::OctonaryHeap;

/// A `PairHeap` entry: `(count, pair)`, ordered first by count and then by
/// pair value so that among equal counts the lexicographically greatest
/// pair sorts highest. `dary_heap::OctonaryHeap` is a max-heap, so this
/// `Ord` directly implements the required tie-break.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct MergeJob {
    count: Count,
    pair: Pair,
}

impl MergeJob {
    fn heap_key(&self) -> (Count, Pair) {
        (self.count, self.pair)
    }
}

impl Ord for MergeJob {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

impl PartialOrd for MergeJob {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The incremental BPE merge engine described in §4.4.
pub struct MergeEngine {
    pretokens: Vec<PretokenBuf>,
    pretoken_counts: Vec<Count>,
    pair_counts: CommonHashMap<Pair, Count>,
    pair_to_pretokens: PairToPretokensMap,
    heap: OctonaryHeap<MergeJob>,
}

impl MergeEngine {
    /// Take ownership of a pretoken frequency table (string pretokens,
    /// already UTF-8-encoded to bytes by the caller) and build the pair
    /// indices and heap.
    pub fn new(pretoken_freq: &CommonHashMap<CompactString, Count>) -> Self {
        let mut pretokens = Vec::with_capacity(pretoken_freq.len());
        let mut pretoken_counts = Vec::with_capacity(pretoken_freq.len());
        for (pretoken, &count) in pretoken_freq {
            pretokens.push(PretokenBuf::from_bytes(pretoken.as_bytes()));
            pretoken_counts.push(count);
        }

        let PairIndex { pair_counts, pair_to_pretokens } =
            PairIndex::from_pretoken_table(&pretokens, &pretoken_counts);

        let mut heap = OctonaryHeap::with_capacity(pair_counts.len());
        for (&pair, &count) in &pair_counts {
            heap.push(MergeJob { pair, count });
        }

        Self {
            pretokens,
            pretoken_counts,
            pair_counts,
            pair_to_pretokens,
            heap,
        }
    }

    /// Is there any pair left to merge?
    pub fn is_empty(&self) -> bool {
        self.pair_counts.is_empty()
    }

    /// Pop the max entry, discarding stale entries until a fresh one is
    /// found (or the heap is drained).
    fn most_common_pair(&mut self) -> Option<Pair> {
        loop {
            let mut job = self.heap.pop()?;
            let current = *self.pair_counts.get(&job.pair).unwrap_or(&0);
            if job.count != current {
                if current > 0 {
                    job.count = current;
                    self.heap.push(job);
                }
                continue;
            }
            if current == 0 {
                return None;
            }
            return Some(job.pair);
        }
    }

    /// Perform one merge step: select the most frequent pair, rewrite every
    /// pretoken containing it, assign it `new_id`, and return the merged
    /// pair. Returns `None` when no pairs remain.
    pub fn step(
        &mut self,
        new_id: TokenId,
    ) -> Option<Pair> {
        let top_pair = self.most_common_pair()?;

        let affected: Vec<usize> = self
            .pair_to_pretokens
            .get(&top_pair)
            .expect("a pair with positive count must have a non-empty pretoken set")
            .iter()
            .copied()
            .collect();

        let mut new_pairs_seen: CommonHashSet<Pair> = CommonHashSet::default();

        for idx in affected {
            let freq = self.pretoken_counts[idx];
            debug_assert!(freq > 0, "pretoken frequency must be positive");

            let old_pairs: CommonHashSet<Pair> = self.pretokens[idx].pairs().collect();

            self.pretokens[idx].merge_pair_cb(top_pair, new_id, &mut |pair, delta| {
                let entry = self.pair_counts.entry(pair).or_insert(0);
                if delta > 0 {
                    *entry += freq;
                } else {
                    *entry = entry
                        .checked_sub(freq)
                        .expect("pair count underflow: invariant violation");
                }
                if *entry == 0 {
                    self.pair_counts.remove(&pair);
                }
            });

            let new_pairs: CommonHashSet<Pair> = self.pretokens[idx].pairs().collect();

            for pair in old_pairs.difference(&new_pairs) {
                if let Some(set) = self.pair_to_pretokens.get_mut(pair) {
                    set.remove(&idx);
                    if set.is_empty() {
                        self.pair_to_pretokens.remove(pair);
                    }
                }
            }
            for &pair in new_pairs.difference(&old_pairs) {
                self.pair_to_pretokens.entry(pair).or_default().insert(idx);
                new_pairs_seen.insert(pair);
            }
        }

        // These all contain `new_id` and have never had a heap entry before.
        for pair in new_pairs_seen {
            if let Some(&count) = self.pair_counts.get(&pair) {
                self.heap.push(MergeJob { pair, count });
            }
        }

        Some(top_pair)
    }
}
