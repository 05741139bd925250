//! End-to-end properties spanning the trainer facade, persisted state, and
//! the parallel pre-tokenizer, beyond what the unit tests in each module
//! already cover.

use bpe_trainer::pattern::compile_gpt2_pattern;
use bpe_trainer::pretokenize::{parallel_pretokenize, PretokenCounter};
use bpe_trainer::state::{load_state, save_state};
use bpe_trainer::Trainer;
use std::io;
use tempdir::TempDir;

#[test]
fn training_is_deterministic() {
    let text = "aaabdaaabac the quick brown fox the lazy dog aaabdaaabac";
    let mut a = Trainer::new();
    a.train(text, 280, &[]).unwrap();

    let mut b = Trainer::new();
    b.train(text, 280, &[]).unwrap();

    assert_eq!(a.merges(), b.merges());
    for (id, bytes) in a.vocab().iter() {
        assert_eq!(b.vocab().get(id), Some(bytes));
    }
    assert_eq!(a.vocab().len(), b.vocab().len());
}

#[test]
fn state_round_trips_through_save_and_load() {
    let mut trainer = Trainer::new();
    trainer
        .train("aaabdaaabac", 259, &["<eos>".to_string()])
        .unwrap();

    let dir = TempDir::new("bpe-trainer-integration").unwrap();
    save_state(trainer.merges(), trainer.vocab(), "wiki", dir.path()).unwrap();
    let (loaded_merges, loaded_vocab) = load_state("wiki", dir.path()).unwrap();

    assert_eq!(&loaded_merges, trainer.merges());
    assert_eq!(loaded_vocab.len(), trainer.vocab().len());
    for (id, bytes) in trainer.vocab().iter() {
        assert_eq!(loaded_vocab.get(id), Some(bytes));
    }
}

#[test]
fn parallel_pretokenization_matches_single_threaded() {
    let segments = vec![
        "hello there second with äöß".to_string(),
        " just third  last! 123and me".to_string(),
    ];

    let pattern = compile_gpt2_pattern();

    let mut serial = PretokenCounter::new(&pattern);
    for segment in &segments {
        serial.update_from_text(segment).unwrap();
    }
    let serial_counts = serial.release();

    let parallel_counts = parallel_pretokenize(
        segments.clone().into_iter().map(Ok::<_, io::Error>),
        &pattern,
    )
    .unwrap();

    let mut serial_bytes: Vec<(Vec<u8>, u64)> = serial_counts
        .into_iter()
        .map(|(s, c)| (s.as_bytes().to_vec(), c))
        .collect();
    let mut parallel_bytes: Vec<(Vec<u8>, u64)> = parallel_counts
        .into_iter()
        .map(|(s, c)| (s.as_bytes().to_vec(), c))
        .collect();
    serial_bytes.sort();
    parallel_bytes.sort();

    assert_eq!(serial_bytes, parallel_bytes);
}

#[test]
fn file_and_in_memory_paths_agree_on_merge_boundaries() {
    let dir = TempDir::new("bpe-trainer-integration").unwrap();
    let path = dir.path().join("corpus.txt");
    std::fs::write(&path, "ab<tok>ab").unwrap();

    let mut from_file = Trainer::new();
    from_file
        .train_from_file(&path, 258, &["<tok>".to_string()])
        .unwrap();

    let mut in_memory = Trainer::new();
    in_memory.train("abab", 257, &[]).unwrap();

    assert_eq!(from_file.merges(), &[(97, 98)]);
    assert_eq!(in_memory.merges(), &[(97, 98)]);
    assert_eq!(from_file.vocab().get(256), in_memory.vocab().get(256));
}
