//! # Pre-Tokenizer Worker
//!
//! Splits a text segment on the GPT-2 word pattern and accumulates a
//! frequency table of pretoken strings. One worker instance is used per
//! parallel task in [`super::parallel`].

use crate::types::{CommonHashMap, Count};
use compact_str::CompactString;
use fancy_regex::Regex;

/// Accumulates pretoken frequency counts from one or more text segments.
pub struct PretokenCounter<'r> {
    regex: &'r Regex,
    counts: CommonHashMap<CompactString, Count>,
}

impl<'r> PretokenCounter<'r> {
    /// Build a counter using `regex` to split incoming text.
    pub fn new(regex: &'r Regex) -> Self {
        Self {
            regex,
            counts: CommonHashMap::with_capacity_and_hasher(4096, Default::default()),
        }
    }

    /// Match `text` against the pattern and bump the count of each match.
    ///
    /// Malformed input can only come from a `fancy-regex` backtracking
    /// failure; that's surfaced rather than silently dropping text.
    pub fn update_from_text(
        &mut self,
        text: &str,
    ) -> Result<(), fancy_regex::Error> {
        for mat in self.regex.find_iter(text) {
            let mat = mat?;
            *self.counts.entry(CompactString::new(mat.as_str())).or_default() += 1;
        }
        Ok(())
    }

    /// Merge another counter's counts into this one, consuming it.
    pub fn merge(
        &mut self,
        other: Self,
    ) {
        for (pretoken, count) in other.counts {
            *self.counts.entry(pretoken).or_default() += count;
        }
    }

    /// Release the accumulated frequency table.
    pub fn release(self) -> CommonHashMap<CompactString, Count> {
        self.counts
    }
}
