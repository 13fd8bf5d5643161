//! In-memory byte storage for a loaded executable image.

use std::slice::Chunks;

use crate::error::{Error, Result};

/// Full contents of a binary file.
///
/// The length is fixed once loaded; patching only overwrites bytes in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSequence {
    bytes: Vec<u8>,
}

impl ByteSequence {
    /// Wrap externally supplied bytes. Fails on zero-length input.
    pub fn load(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(Self { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a loaded sequence; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Fixed-size chunks over the sequence; the last chunk may be shorter.
    ///
    /// The returned iterator is `Clone`, so it can be restarted freely.
    /// A `chunk_size` of zero is treated as one.
    pub fn chunks(&self, chunk_size: usize) -> Chunks<'_, u8> {
        self.bytes.chunks(chunk_size.max(1))
    }

    /// Overwrite bytes starting at `start` with `data`. Caller checks bounds.
    pub(crate) fn overwrite(&mut self, start: usize, data: &[u8]) {
        self.bytes[start..start + data.len()].copy_from_slice(data);
    }
}
