//! Ordered list of generated text chunks.
use std::io::{self, Write};

/// An append-only, ordered sequence of owned output chunks.
///
/// Chunks are written out once, in insertion order, and released together when
/// the list is dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkList {
    chunks: Vec<Vec<u8>>,
}

impl ChunkList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    /// Appends a chunk at the end of the list. Empty chunks are not stored.
    pub fn push(&mut self, chunk: Vec<u8>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    /// Number of stored chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total byte length of all chunks.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.chunks.iter().map(Vec::as_slice)
    }

    /// Writes every chunk, in order, to `out`.
    ///
    /// # Errors
    /// Returns the first error reported by `out`.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        for chunk in &self.chunks {
            out.write_all(chunk)?;
        }
        Ok(())
    }

    /// Concatenates all chunks into a single buffer.
    #[must_use]
    pub fn concat(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}
