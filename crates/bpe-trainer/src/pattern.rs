//! # Pre-Tokenization Pattern
//!
//! The GPT-2 word-split regex, used verbatim by the pre-tokenizer worker.
//! `\s+(?!\S)` requires a negative lookahead that the `regex` crate can't
//! express, so this is compiled with `fancy-regex`.

use fancy_regex::Regex;

/// The GPT-2 pre-tokenization split pattern.
///
/// From <https://github.com/openai/tiktoken/pull/234/files>.
pub const GPT2_SPLIT_PATTERN: &str =
    r"'(?:[sdmt]|ll|ve|re)| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// Compile [`GPT2_SPLIT_PATTERN`].
///
/// # Panics
/// Never, in practice: the pattern is a compile-time constant verified by
/// [`tests::gpt2_pattern_compiles`].
pub fn compile_gpt2_pattern() -> Regex {
    Regex::new(GPT2_SPLIT_PATTERN).expect("GPT2_SPLIT_PATTERN is a fixed valid pattern")
}

/// Build a delimiter pattern matching one-or-more runs of any of `specials`.
///
/// Each special string is escaped so it's matched literally. The resulting
/// pattern looks like `(?:esc(s1)|esc(s2)|...)+`, matching maximal runs of
/// adjacent specials so that back-to-back delimiters collapse into a single
/// match (see [`crate::chunking::ChunkReader`]).
pub fn build_special_delimiter<S: AsRef<str>>(specials: &[S]) -> Regex {
    let alternatives = specials
        .iter()
        .map(|s| fancy_regex::escape(s.as_ref()))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!("(?:{alternatives})+");
    Regex::new(&pattern).expect("escaped literal alternatives always form a valid pattern")
}

/// Remove every match of `delimiter` from `text`, replacing each with the
/// empty string.
///
/// Used by the in-memory training path to strip special tokens. Note this
/// can fuse adjacent pretokens that were only separated by a special
/// token (`"ab<s>cd"` -> `"abcd"`); that's documented, deliberate
/// behavior, not a bug — `fancy-regex` has no `replace_all`, so this walks
/// matches manually the same way [`crate::chunking::ChunkReader`] does.
pub fn strip_matches(
    text: &str,
    delimiter: &Regex,
) -> Result<String, fancy_regex::Error> {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for m in delimiter.find_iter(text) {
        let m = m?;
        out.push_str(&text[cursor..m.start()]);
        cursor = m.end();
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}
