//! # Trainer Facade

use crate::chunking::ChunkReader;
use crate::error::{Result, TrainerError};
use crate::pattern::{build_special_delimiter, compile_gpt2_pattern, strip_matches};
use crate::pretokenize::{parallel_pretokenize, PretokenCounter};
use crate::training::engine::MergeEngine;
use crate::types::{CommonHashMap, Count, TokenId};
use crate::vocab::{Merges, Vocab};
use compact_str::CompactString;
use std::path::Path;

/// Bytes read per chunk-reader iteration when training from a file. Not
/// load-bearing for correctness, only throughput and peak memory.
const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Margin added to the longest special token's length when computing the
/// chunk reader's `overlap_size`, so that no pretoken can span a chunk
/// boundary. 64 comfortably covers the longest realistic GPT-2 pretoken.
const OVERLAP_MARGIN: usize = 64;

/// Learns byte-pair-encoding merges and a vocabulary from a corpus.
///
/// Each call to [`Trainer::train`] or [`Trainer::train_from_file`] resets
/// all state before doing anything else; there is no incremental
/// retraining.
#[derive(Debug, Default)]
pub struct Trainer {
    merges: Merges,
    vocab: Vocab,
}

impl Trainer {
    /// Build a trainer with empty state (256 base-byte vocab entries, no
    /// merges).
    pub fn new() -> Self {
        Self {
            merges: Merges::new(),
            vocab: Vocab::base_bytes(),
        }
    }

    /// The learned merges, in the order they were applied.
    pub fn merges(&self) -> &Merges {
        &self.merges
    }

    /// The learned vocabulary.
    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    /// Train on an in-memory string.
    ///
    /// Special token occurrences are stripped (replaced with the empty
    /// string, not a space) before pre-tokenization; this can fuse
    /// pretokens that were only separated by a special token. See the
    /// module docs on [`crate::pattern::strip_matches`] for the rationale.
    pub fn train(
        &mut self,
        text: &str,
        vocab_size: usize,
        special_tokens: &[String],
    ) -> Result<()> {
        self.reset();
        Self::validate_vocab_size(vocab_size, special_tokens.len())?;

        let pattern = compile_gpt2_pattern();
        let mut counter = PretokenCounter::new(&pattern);

        if special_tokens.is_empty() {
            counter.update_from_text(text)?;
        } else {
            let delimiter = build_special_delimiter(special_tokens);
            let stripped = strip_matches(text, &delimiter)?;
            counter.update_from_text(&stripped)?;
        }

        self.run(counter.release(), vocab_size, special_tokens)
    }

    /// Train on a corpus streamed from disk.
    ///
    /// Requires at least one special token: it's the delimiter the chunk
    /// reader splits the corpus on, so no pretoken can be cut in half by
    /// a chunk boundary.
    pub fn train_from_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        vocab_size: usize,
        special_tokens: &[String],
    ) -> Result<()> {
        self.reset();
        Self::validate_vocab_size(vocab_size, special_tokens.len())?;
        if special_tokens.is_empty() {
            return Err(TrainerError::NoSpecialTokens);
        }

        let delimiter = build_special_delimiter(special_tokens);
        let overlap_size =
            special_tokens.iter().map(String::len).max().unwrap_or(0) + OVERLAP_MARGIN;

        let chunk_reader = ChunkReader::open(path, delimiter, DEFAULT_CHUNK_SIZE, overlap_size)?;
        let pattern = compile_gpt2_pattern();
        let freq = parallel_pretokenize(chunk_reader, &pattern)?;

        self.run(freq, vocab_size, special_tokens)
    }

    /// Drive the merge engine to completion (or early stop) and append
    /// special-token vocab entries.
    fn run(
        &mut self,
        pretoken_freq: CommonHashMap<CompactString, Count>,
        vocab_size: usize,
        special_tokens: &[String],
    ) -> Result<()> {
        let num_merges = vocab_size - 256 - special_tokens.len();
        let mut engine = MergeEngine::new(&pretoken_freq);

        let mut next_id: TokenId = 256;
        for i in 0..num_merges {
            match engine.step(next_id) {
                Some(pair) => {
                    self.vocab.merge_into(next_id, pair.0, pair.1);
                    self.merges.push(pair);
                    next_id += 1;
                }
                None => {
                    log::info!(
                        "no more pairs to merge after {i}/{num_merges} merges; stopping early"
                    );
                    break;
                }
            }
        }

        let specials_start = 256 + self.merges.len() as TokenId;
        for (j, special) in special_tokens.iter().enumerate() {
            self.vocab.insert(specials_start + j as TokenId, special.as_bytes().to_vec());
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.merges.clear();
        self.vocab = Vocab::base_bytes();
    }

    fn validate_vocab_size(
        vocab_size: usize,
        specials: usize,
    ) -> Result<()> {
        let min = 256 + specials;
        if vocab_size < min {
            return Err(TrainerError::VocabSizeTooSmall { vocab_size, min, specials });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiki_example() {
        let mut trainer = Trainer::new();
        trainer.train("aaabdaaabac", 259, &[]).unwrap();

        assert_eq!(
            trainer.merges(),
            &vec![(b'a' as TokenId, b'a' as TokenId), (256, b'a' as TokenId), (257, b'b' as TokenId)]
        );
        assert_eq!(trainer.vocab().get(256), Some(&b"aa"[..]));
        assert_eq!(trainer.vocab().get(257), Some(&b"aaa"[..]));
        assert_eq!(trainer.vocab().get(258), Some(&b"aaab"[..]));
    }

    #[test]
    fn special_token_stripping() {
        let mut trainer = Trainer::new();
        trainer.train("ab<tok>ab", 258, &["<tok>".to_string()]).unwrap();

        assert_eq!(trainer.merges(), &vec![(b'a' as TokenId, b'b' as TokenId)]);
        assert_eq!(trainer.vocab().get(256), Some(&b"ab"[..]));
        assert_eq!(trainer.vocab().get(257), Some(&b"<tok>"[..]));
    }

    #[test]
    fn equivalence_under_stripping() {
        let mut plain = Trainer::new();
        plain.train("abab", 257, &[]).unwrap();

        let mut with_special = Trainer::new();
        with_special.train("ab<tok>ab", 258, &["<tok>".to_string()]).unwrap();

        assert_eq!(plain.merges(), with_special.merges());
        assert_eq!(plain.vocab().get(256), with_special.vocab().get(256));
    }

    #[test]
    fn retraining_resets_state() {
        let mut trainer = Trainer::new();
        trainer.merges.push((1, 2));
        trainer.vocab.insert(999, b"XXX".to_vec());

        trainer.train("abab", 257, &[]).unwrap();

        assert_eq!(trainer.merges(), &vec![(b'a' as TokenId, b'b' as TokenId)]);
        assert_eq!(trainer.vocab().get(999), None);
        for i in 0u16..256 {
            assert_eq!(trainer.vocab().get(i as TokenId), Some(&[i as u8][..]));
        }
        assert_eq!(trainer.vocab().get(256), Some(&b"ab"[..]));
    }

    #[test]
    fn vocab_size_floor_performs_zero_merges() {
        let mut trainer = Trainer::new();
        trainer.train("hello world", 256, &[]).unwrap();
        assert!(trainer.merges().is_empty());
        assert_eq!(trainer.vocab().len(), 256);
    }

    #[test]
    fn vocab_size_too_small_is_rejected() {
        let mut trainer = Trainer::new();
        let err = trainer.train("x", 255, &[]).unwrap_err();
        assert!(matches!(err, TrainerError::VocabSizeTooSmall { .. }));
    }

    #[test]
    fn train_from_file_requires_a_special_token() {
        let mut trainer = Trainer::new();
        let err = trainer.train_from_file("/nonexistent", 300, &[]).unwrap_err();
        assert!(matches!(err, TrainerError::NoSpecialTokens));
    }
}
