//! # Chunk Reader
//!
//! Streams a corpus file and splits it on a delimiter regex (typically a
//! disjunction of special tokens), yielding text segments that are safe to
//! pre-tokenize independently: no segment contains a delimiter match, and
//! no pretoken is split across a segment boundary provided `overlap_size`
//! is at least as long as the longest possible pretoken.

use fancy_regex::Regex;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Lazily splits a byte stream into delimiter-free text segments.
///
/// See the module docs for the boundary guarantees this relies on.
pub struct ChunkReader<R> {
    reader: R,
    delimiter: Regex,
    chunk_size: usize,
    overlap_size: usize,
    buffer: String,
    incomplete_utf8: Vec<u8>,
    pending: VecDeque<String>,
    finished: bool,
}

impl ChunkReader<BufReader<File>> {
    /// Open `path` and stream it in chunks split on `delimiter`.
    pub fn open<P: AsRef<Path>>(
        path: P,
        delimiter: Regex,
        chunk_size: usize,
        overlap_size: usize,
    ) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(
            BufReader::new(file),
            delimiter,
            chunk_size,
            overlap_size,
        ))
    }
}

impl<R: Read> ChunkReader<R> {
    /// Wrap an arbitrary [`Read`] source.
    pub fn new(
        reader: R,
        delimiter: Regex,
        chunk_size: usize,
        overlap_size: usize,
    ) -> Self {
        Self {
            reader,
            delimiter,
            chunk_size,
            overlap_size,
            buffer: String::new(),
            incomplete_utf8: Vec::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Read and decode the next raw chunk, appending it to `self.buffer`.
    ///
    /// Returns whether the underlying reader is exhausted.
    fn read_chunk(&mut self) -> io::Result<bool> {
        let mut raw = vec![0u8; self.chunk_size];
        let n = self.reader.read(&mut raw)?;
        let eof = n == 0;
        raw.truncate(n);
        self.incomplete_utf8.extend_from_slice(&raw);

        let decoded = match std::str::from_utf8(&self.incomplete_utf8) {
            Ok(s) => {
                let s = s.to_string();
                self.incomplete_utf8.clear();
                s
            }
            Err(e) if e.error_len().is_none() => {
                // A multi-byte sequence was split across the chunk boundary;
                // decode the valid prefix and keep the tail for next read.
                let valid_len = e.valid_up_to();
                let valid =
                    std::str::from_utf8(&self.incomplete_utf8[..valid_len]).unwrap().to_string();
                self.incomplete_utf8.drain(..valid_len);
                if eof && !self.incomplete_utf8.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "corpus is not valid UTF-8",
                    ));
                }
                valid
            }
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "corpus is not valid UTF-8",
                ));
            }
        };

        self.buffer.push_str(&decoded);
        Ok(eof)
    }

    /// Scan `self.buffer` for delimiter matches, queueing the segments
    /// between them, and carry the unscanned remainder back into
    /// `self.buffer` for the next round.
    fn scan(
        &mut self,
        eof: bool,
    ) -> io::Result<()> {
        let current_len = self.buffer.len();
        let effective_size = current_len as i64 - self.overlap_size as i64;

        let current = std::mem::take(&mut self.buffer);
        let mut cursor = 0usize;

        for m in self.delimiter.find_iter(&current) {
            let m = m.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
            let (start, end) = (m.start(), m.end());
            if start > cursor {
                self.pending.push_back(current[cursor..start].to_string());
            }
            cursor = end;
            if !eof && start as i64 >= effective_size {
                break;
            }
        }

        if eof {
            if cursor < current.len() {
                self.pending.push_back(current[cursor..].to_string());
            }
            self.finished = true;
        } else {
            self.buffer = current[cursor..].to_string();
        }

        Ok(())
    }

    /// Read and scan until at least one segment is queued, or the stream
    /// is exhausted.
    fn fill(&mut self) -> io::Result<()> {
        loop {
            let eof = self.read_chunk()?;

            let effective_size = self.buffer.len() as i64 - self.overlap_size as i64;
            if effective_size <= 0 && !eof {
                continue;
            }

            self.scan(eof)?;

            if !self.pending.is_empty() || self.finished {
                return Ok(());
            }
        }
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(segment) = self.pending.pop_front() {
                if segment.is_empty() {
                    continue;
                }
                return Some(Ok(segment));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.fill() {
                return Some(Err(e));
            }
        }
    }
}
