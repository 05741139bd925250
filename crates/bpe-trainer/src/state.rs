//! # Persisted State
//!
//! Saves and loads a trained vocabulary/merge list as JSON, per §6 of the
//! external interface contract.

use crate::error::{Result, TrainerError};
use crate::types::TokenId;
use crate::vocab::{Merges, Vocab};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk representation of trained tokenizer state.
///
/// `vocab` keys are decimal token ids as strings and values are
/// lowercase-hex-encoded byte strings, matching the wire format other
/// tools in this ecosystem already use for byte vocabularies.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    merges: Vec<[TokenId; 2]>,
    vocab: std::collections::BTreeMap<String, String>,
}

const CURRENT_VERSION: u32 = 1;

/// Save `merges`/`vocab` to `<folder>/<sanitized_prefix>_tokenizer.json`.
///
/// `prefix` is sanitized to its final path component, so a prefix of
/// `"../etc/passwd"` is written as `passwd_tokenizer.json`. The write is
/// atomic: a temp file is written in `folder` and renamed into place.
///
/// Returns the path written to.
pub fn save_state(
    merges: &Merges,
    vocab: &Vocab,
    prefix: &str,
    folder: &Path,
) -> Result<PathBuf> {
    if folder.exists() && !folder.is_dir() {
        return Err(TrainerError::NotADirectory(folder.to_path_buf()));
    }
    fs::create_dir_all(folder)?;

    let sanitized = sanitize_prefix(prefix);
    let path = folder.join(format!("{sanitized}_tokenizer.json"));

    let state = StateFile {
        version: CURRENT_VERSION,
        merges: merges.iter().map(|&(l, r)| [l, r]).collect(),
        vocab: vocab
            .iter()
            .map(|(id, bytes)| (id.to_string(), hex::encode(bytes)))
            .collect(),
    };

    let tmp_path = folder.join(format!(".{sanitized}_tokenizer.json.tmp"));
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &state)?;
        writer.flush()?;
    }
    fs::rename(&tmp_path, &path)?;

    Ok(path)
}

/// Load tokenizer state previously written by [`save_state`].
pub fn load_state(
    prefix: &str,
    folder: &Path,
) -> Result<(Merges, Vocab)> {
    if folder.exists() && !folder.is_dir() {
        return Err(TrainerError::NotADirectory(folder.to_path_buf()));
    }

    let sanitized = sanitize_prefix(prefix);
    let path = folder.join(format!("{sanitized}_tokenizer.json"));
    if !path.is_file() {
        return Err(TrainerError::NotFound(path));
    }

    let file = File::open(&path)?;
    let state: StateFile = serde_json::from_reader(BufReader::new(file))?;

    if state.version != CURRENT_VERSION {
        return Err(TrainerError::UnsupportedVersion(state.version));
    }

    let merges: Merges = state.merges.into_iter().map(|[l, r]| (l, r)).collect();

    let mut vocab = Vocab::default();
    for (id_str, hex_str) in state.vocab {
        let id: TokenId =
            id_str.parse().map_err(|_| TrainerError::InvalidTokenId(id_str.clone()))?;
        let bytes = hex::decode(&hex_str)
            .map_err(|_| TrainerError::InvalidHex { token: id, value: hex_str })?;
        vocab.insert(id, bytes);
    }

    Ok((merges, vocab))
}

/// Reduce a prefix to its final path component, discarding any directory
/// parts so callers can't write outside `folder`.
fn sanitize_prefix(prefix: &str) -> String {
    Path::new(prefix)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = TempDir::new("bpe-trainer-state").unwrap();
        let merges: Merges = vec![(97, 98), (256, 99)];
        let mut vocab = Vocab::base_bytes();
        vocab.merge_into(256, 97, 98);
        vocab.merge_into(257, 256, 99);

        let path = save_state(&merges, &vocab, "demo", dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "demo_tokenizer.json");

        let (loaded_merges, loaded_vocab) = load_state("demo", dir.path()).unwrap();
        assert_eq!(loaded_merges, merges);
        assert_eq!(loaded_vocab.get(256), vocab.get(256));
        assert_eq!(loaded_vocab.get(257), vocab.get(257));
    }

    #[test]
    fn prefix_is_sanitized_to_final_component() {
        assert_eq!(sanitize_prefix("../etc/passwd"), "passwd");
        assert_eq!(sanitize_prefix("plain"), "plain");
    }

    #[test]
    fn load_rejects_unsupported_version() {
        let dir = TempDir::new("bpe-trainer-state").unwrap();
        let path = dir.path().join("bad_tokenizer.json");
        fs::write(&path, r#"{"version":2,"merges":[],"vocab":{}}"#).unwrap();

        let err = load_state("bad", dir.path()).unwrap_err();
        assert!(matches!(err, TrainerError::UnsupportedVersion(2)));
    }

    #[test]
    fn load_rejects_invalid_token_id() {
        let dir = TempDir::new("bpe-trainer-state").unwrap();
        let path = dir.path().join("bad_tokenizer.json");
        fs::write(&path, r#"{"version":1,"merges":[],"vocab":{"notanumber":"61"}}"#).unwrap();

        let err = load_state("bad", dir.path()).unwrap_err();
        assert!(matches!(err, TrainerError::InvalidTokenId(_)));
    }

    #[test]
    fn load_rejects_invalid_hex() {
        let dir = TempDir::new("bpe-trainer-state").unwrap();
        let path = dir.path().join("bad_tokenizer.json");
        fs::write(&path, r#"{"version":1,"merges":[],"vocab":{"0":"zz"}}"#).unwrap();

        let err = load_state("bad", dir.path()).unwrap_err();
        assert!(matches!(err, TrainerError::InvalidHex { .. }));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = TempDir::new("bpe-trainer-state").unwrap();
        let err = load_state("nope", dir.path()).unwrap_err();
        assert!(matches!(err, TrainerError::NotFound(_)));
    }
}
