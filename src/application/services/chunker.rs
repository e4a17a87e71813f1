#[derive(Debug, PartialEq)]
pub enum ChunkerError {
    InvalidConfiguration(String),
}

impl std::fmt::Display for ChunkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkerError::InvalidConfiguration(msg) => {
                write!(f, "Invalid chunker configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for ChunkerError {}

/// Splits extracted text into overlapping fixed-size windows, measured in
/// characters. Consecutive chunks share exactly `overlap` characters (the
/// final chunk may be shorter), and the union of chunk ranges covers the
/// whole text with no gap. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;
    pub const DEFAULT_OVERLAP: usize = 200;

    /// Requires `0 < overlap < chunk_size`; anything else would loop forever
    /// or drop text, so it is rejected up front.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ChunkerError> {
        if chunk_size == 0 {
            return Err(ChunkerError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap == 0 {
            return Err(ChunkerError::InvalidConfiguration(
                "overlap must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(ChunkerError::InvalidConfiguration(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Emits zero chunks for empty text and exactly one chunk for text
    /// shorter than `chunk_size`.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut cursor = 0usize;
        loop {
            let end = (cursor + self.chunk_size).min(chars.len());
            chunks.push(chars[cursor..end].iter().collect());
            if end == chars.len() {
                break;
            }
            cursor += self.chunk_size - self.overlap;
        }
        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}
