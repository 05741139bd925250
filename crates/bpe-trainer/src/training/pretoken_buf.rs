//! # Pretoken Buffer

use crate::types::{Pair, TokenId};

/// A mutable sequence of token ids (one pretoken).
///
/// Rewritten in place as merges are applied; length strictly decreases on
/// each merge that touches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PretokenBuf {
    tokens: Vec<TokenId>,
}

impl PretokenBuf {
    /// Build a pretoken from the UTF-8 bytes of a matched pretoken string.
    /// Each byte becomes its own token id (the base vocab is the identity
    /// mapping `id == byte`).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            tokens: bytes.iter().map(|&b| b as TokenId).collect(),
        }
    }

    /// View the tokens as a slice.
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Length in tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is this pretoken empty? Never true in practice — minimum length is 1.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over adjacent `(TokenId, TokenId)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.tokens.windows(2).map(|w| (w[0], w[1]))
    }

    /// Merge every non-overlapping occurrence of `pair -> replacement`,
    /// invoking `on_merge(pair, delta)` for each pair-count delta caused by
    /// the rewrite (`delta` is `-1` for a pair removed, `+1` for one added).
    ///
    /// `aaa` with pair `(a,a)` merges to `(replacement, a)`, not
    /// `(a, replacement)`: the first match wins and the engine does not
    /// look for overlapping occurrences.
    pub fn merge_pair_cb<F>(
        &mut self,
        pair: Pair,
        replacement: TokenId,
        on_merge: &mut F,
    ) where
        F: FnMut(Pair, i32),
    {
        let (a, b) = pair;
        let n = self.tokens.len();
        if n < 2 {
            return;
        }

        let mut new_tokens = Vec::with_capacity(n);
        let mut i = 0;
        while i < n {
            let current = self.tokens[i];

            if i + 1 < n && pair == (current, self.tokens[i + 1]) {
                if let Some(&u) = new_tokens.last() {
                    on_merge((u, a), -1);
                    on_merge((u, replacement), 1);
                }

                on_merge(pair, -1);

                if i + 2 < n {
                    let v = self.tokens[i + 2];
                    on_merge((b, v), -1);
                    on_merge((replacement, v), 1);
                }

                new_tokens.push(replacement);
                i += 2;
            } else {
                new_tokens.push(current);
                i += 1;
            }
        }

        self.tokens = new_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_adjacent_windows() {
        let buf = PretokenBuf::from_bytes(&[1, 2, 3]);
        assert_eq!(buf.pairs().collect::<Vec<_>>(), vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn merge_pair_cb_matches_reference_deltas() {
        let mut buf = PretokenBuf {
            tokens: vec![1, 2, 3, 1, 2, 2, 1],
        };
        let mut deltas = vec![];
        buf.merge_pair_cb((1, 2), 9, &mut |p, d| deltas.push((p, d)));

        assert_eq!(buf.tokens(), &[9, 3, 9, 2, 9]);
        assert_eq!(
            deltas,
            vec![
                ((1, 2), -1),
                ((2, 3), -1),
                ((1, 3), 1),
                ((3, 1), -1),
                ((3, 9), 1),
                ((1, 2), -1),
                ((2, 2), -1),
                ((1, 9), 1),
            ]
        );
    }

    #[test]
    fn non_overlapping_merge_of_aaa() {
        let mut buf = PretokenBuf::from_bytes(b"aaa");
        buf.merge_pair_cb((b'a' as TokenId, b'a' as TokenId), 256, &mut |_, _| {});
        assert_eq!(buf.tokens(), &[256, b'a' as TokenId]);
    }

    #[test]
    fn non_overlapping_merge_of_aaaa() {
        let mut buf = PretokenBuf::from_bytes(b"aaaa");
        buf.merge_pair_cb((b'a' as TokenId, b'a' as TokenId), 256, &mut |_, _| {});
        assert_eq!(buf.tokens(), &[256, 256]);
    }
}
