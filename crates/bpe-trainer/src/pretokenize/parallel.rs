//! # Parallel Pre-Tokenizer
//!
//! Fans a stream of text segments out across a `rayon` worker pool, each
//! worker running [`PretokenCounter`] over its share of segments, then
//! reduces the per-worker frequency tables into one. Reduction is
//! commutative integer addition, so results are identical regardless of
//! how segments are batched across workers.

use crate::error::Result;
use crate::pretokenize::worker::PretokenCounter;
use crate::types::{CommonHashMap, Count};
use compact_str::CompactString;
use fancy_regex::Regex;
use rayon::iter::{ParallelBridge, ParallelIterator};
use std::io;

/// Pre-tokenize every segment yielded by `segments` in parallel, returning
/// the combined pretoken frequency table.
///
/// `segments` is typically a [`crate::chunking::ChunkReader`]; any I/O
/// error it raises short-circuits the whole run.
pub fn parallel_pretokenize<I>(
    segments: I,
    regex: &Regex,
) -> Result<CommonHashMap<CompactString, Count>>
where
    I: Iterator<Item = io::Result<String>> + Send,
{
    segments
        .par_bridge()
        .try_fold(
            || PretokenCounter::new(regex),
            |mut counter, segment| -> Result<PretokenCounter> {
                let segment = segment?;
                counter.update_from_text(&segment)?;
                Ok(counter)
            },
        )
        .try_reduce(
            || PretokenCounter::new(regex),
            |mut a, b| {
                a.merge(b);
                Ok(a)
            },
        )
        .map(PretokenCounter::release)
}
