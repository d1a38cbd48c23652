//! Incremental accumulator for string and number token text.
//!
//! Bytes are collected in a scratch buffer and decoded into the logical
//! string on [`BufferedString::flush`]. With a capacity the scratch buffer is
//! flushed whenever the next append would overflow it, so its allocation stays
//! fixed no matter how long the token grows. Without one, decoding is deferred
//! until the text is read.
//!
//! Callers only ever append whole UTF-8 sequences in one call, so a flush never
//! splits a character. Malformed UTF-8 decodes to U+FFFD.
use alloc::{string::String, vec::Vec};
use core::mem;

use bstr::ByteSlice;

#[derive(Debug)]
pub(crate) struct BufferedString {
    scratch: Vec<u8>,
    capacity: Option<usize>,
    decoded: String,
}

impl BufferedString {
    /// An accumulator whose scratch buffer grows with the token.
    pub fn unbounded() -> Self {
        Self {
            scratch: Vec::new(),
            capacity: None,
            decoded: String::new(),
        }
    }

    /// An accumulator that flushes every `capacity` bytes.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            scratch: Vec::with_capacity(capacity),
            capacity: Some(capacity),
            decoded: String::new(),
        }
    }

    pub fn reset(&mut self) {
        self.scratch.clear();
        self.decoded.clear();
    }

    pub fn push_byte(&mut self, byte: u8) {
        self.push_bytes(core::slice::from_ref(&byte));
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        if self
            .capacity
            .is_some_and(|cap| self.scratch.len() + bytes.len() > cap)
        {
            self.flush();
        }
        self.scratch.extend_from_slice(bytes);
    }

    pub fn push_char(&mut self, c: char) {
        let mut buf = [0; 4];
        self.push_bytes(c.encode_utf8(&mut buf).as_bytes());
    }

    /// Decodes the scratch buffer into the logical string.
    pub fn flush(&mut self) {
        if self.scratch.is_empty() {
            return;
        }
        self.decoded.push_str(&self.scratch.to_str_lossy());
        self.scratch.clear();
    }

    /// The text accumulated so far.
    pub fn as_str(&mut self) -> &str {
        self.flush();
        &self.decoded
    }

    /// Takes the accumulated text, leaving the accumulator empty.
    pub fn take(&mut self) -> String {
        self.flush();
        mem::take(&mut self.decoded)
    }
}
