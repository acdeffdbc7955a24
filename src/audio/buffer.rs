//! In-memory buffer of recorded chunks

/// Ordered sequence of raw byte chunks, in the order they were read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    chunks: Vec<Vec<u8>>,
    byte_len: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `chunks` chunks
    pub fn with_capacity(chunks: usize) -> Self {
        Self {
            chunks: Vec::with_capacity(chunks),
            byte_len: 0,
        }
    }

    /// Appends a chunk after every chunk already stored
    pub fn push(&mut self, chunk: Vec<u8>) {
        self.byte_len += chunk.len();
        self.chunks.push(chunk);
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total number of bytes across all chunks
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn is_empty(&self) -> bool {
        self.byte_len == 0
    }

    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> {
        self.chunks.iter().map(Vec::as_slice)
    }

    /// Concatenates all chunks in order
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_len);
        for chunk in &self.chunks {
            bytes.extend_from_slice(chunk);
        }
        bytes
    }
}
