//! Binary codecs for traces and motifs.
//!
//! # Encoding
//!
//! ```text
//! integer      = i64, little-endian (8 bytes)
//! string       = length:integer || utf-8 bytes
//! opt string   = -1 for none, otherwise string
//! ```
//!
//! Layouts are fixed and versionless. Decoders only check structural
//! integrity (counts, lengths, tags, ranges); semantic invariants are the
//! parsers' job.

pub mod motif;
pub mod trace;

pub use motif::{decode_motifs, encode_motifs, motif_path, read_motifs, write_motifs};
pub use trace::{decode_trace, encode_trace, read_trace, write_trace};

use crate::utils::error::TraceError;

const WORD: usize = 8;

/// Append-only little-endian encoder
#[derive(Debug, Default)]
pub(crate) struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Counts and indices; in-memory sizes always fit an i64
    pub(crate) fn usize(&mut self, value: usize) {
        self.i64(value as i64);
    }

    pub(crate) fn str(&mut self, value: &str) {
        self.usize(value.len());
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub(crate) fn opt_str(&mut self, value: Option<&str>) {
        match value {
            Some(s) => self.str(s),
            None => self.i64(-1),
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked reader over an encoded buffer
#[derive(Debug)]
pub(crate) struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], TraceError> {
        if len > self.remaining() {
            return Err(TraceError::FormatIntegrity(format!(
                "truncated while reading {} at byte {} (need {}, have {})",
                what,
                self.pos,
                len,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn i64(&mut self, what: &str) -> Result<i64, TraceError> {
        let mut word = [0u8; WORD];
        word.copy_from_slice(self.take(WORD, what)?);
        Ok(i64::from_le_bytes(word))
    }

    /// A non-negative integer used as an index
    pub(crate) fn index(&mut self, what: &str) -> Result<usize, TraceError> {
        let value = self.i64(what)?;
        usize::try_from(value)
            .map_err(|_| TraceError::FormatIntegrity(format!("negative {}: {}", what, value)))
    }

    /// An element count, checked against the bytes left in the buffer
    ///
    /// `min_element_size` is the smallest encoding of one element, so a
    /// count the payload cannot possibly hold is rejected before allocating.
    pub(crate) fn count(&mut self, what: &str, min_element_size: usize) -> Result<usize, TraceError> {
        let count = self.index(what)?;
        if count.saturating_mul(min_element_size) > self.remaining() {
            return Err(TraceError::FormatIntegrity(format!(
                "declared {} {} but only {} bytes follow",
                count,
                what,
                self.remaining()
            )));
        }
        Ok(count)
    }

    pub(crate) fn str(&mut self, what: &str) -> Result<String, TraceError> {
        let len = self.index(what)?;
        let bytes = self.take(len, what)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| TraceError::FormatIntegrity(format!("{} is not utf-8: {}", what, e)))
    }

    pub(crate) fn opt_str(&mut self, what: &str) -> Result<Option<String>, TraceError> {
        let len = self.i64(what)?;
        if len == -1 {
            return Ok(None);
        }
        let len = usize::try_from(len)
            .map_err(|_| TraceError::FormatIntegrity(format!("bad {} length {}", what, len)))?;
        let bytes = self.take(len, what)?;
        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|e| TraceError::FormatIntegrity(format!("{} is not utf-8: {}", what, e)))
    }

    /// Every byte must have been consumed
    pub(crate) fn finish(self) -> Result<(), TraceError> {
        if self.remaining() != 0 {
            return Err(TraceError::FormatIntegrity(format!(
                "{} trailing bytes after payload",
                self.remaining()
            )));
        }
        Ok(())
    }
}
