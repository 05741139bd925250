//! # Pre-Tokenization
//!
//! Turns raw text segments into a pretoken frequency table: the input to
//! the merge engine in [`crate::training`].

mod parallel;
mod worker;

pub use parallel::parallel_pretokenize;
pub use worker::PretokenCounter;
