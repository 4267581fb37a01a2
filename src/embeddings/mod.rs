//! Word embedding tables.
//!
//! A table maps a word (case-sensitive) to a fixed-size vector. It is loaded
//! once at startup and shared read-only between requests:
//! - word2vec binary files (`.bin`, optionally gzipped)
//! - word2vec / GloVe text files
//! - a word list embedded with a fastembed model

mod model;

pub use model::EmbeddingModel;

use flate2::read::GzDecoder;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

/// Words embedded per fastembed batch.
const EMBED_BATCH_SIZE: usize = 256;

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Invalid model name: {0}")]
    InvalidModel(String),

    #[error("Malformed vector file: {0}")]
    MalformedFile(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),
}

/// Read-only word -> vector lookup.
pub trait WordEmbeddings: Send + Sync {
    /// Length of every vector.
    fn vector_size(&self) -> usize;

    fn get(&self, word: &str) -> Option<&[f32]>;

    fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    /// Number of words in the table.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory embedding table.
#[derive(Debug, Clone)]
pub struct WordVectors {
    vectors: HashMap<String, Vec<f32>>,
    dimensions: usize,
}

impl WordEmbeddings for WordVectors {
    fn vector_size(&self) -> usize {
        self.dimensions
    }

    fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }
}

/// Open `path`, transparently decompressing `.gz` files.
fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, EmbeddingError> {
    let file = File::open(path)?;
    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");

    if is_gzip {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parse a `<count> <dimensions>` header line.
fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let count = parts.next()?.parse().ok()?;
    let dimensions = parts.next()?.parse().ok()?;
    match parts.next() {
        Some(_) => None,
        None => Some((count, dimensions)),
    }
}

impl WordVectors {
    pub fn new(dimensions: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            dimensions,
        }
    }

    /// Insert or replace the vector of `word`.
    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) -> Result<(), EmbeddingError> {
        if vector.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                got: vector.len(),
            });
        }

        self.vectors.insert(word.into(), vector);
        Ok(())
    }

    /// Load a word2vec binary file: a `<count> <dimensions>` header line,
    /// then for every word its bytes up to a space followed by `dimensions`
    /// little-endian f32 values.
    pub fn load_binary(path: &Path, max_words: Option<usize>) -> Result<Self, EmbeddingError> {
        Self::read_binary(open_reader(path)?, max_words)
    }

    pub fn read_binary<R: BufRead>(mut reader: R, max_words: Option<usize>) -> Result<Self, EmbeddingError> {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let (count, dimensions) = parse_header(&header)
            .ok_or_else(|| EmbeddingError::MalformedFile(format!("bad header {:?}", header.trim())))?;

        let limit = max_words.map_or(count, |max| max.min(count));
        let mut table = Self::new(dimensions);
        table.vectors.reserve(limit);

        let mut word = Vec::new();
        let mut raw = vec![0u8; dimensions * 4];

        for n in 0..limit {
            word.clear();
            reader.read_until(b' ', &mut word)?;
            if word.last() != Some(&b' ') {
                return Err(EmbeddingError::MalformedFile(format!(
                    "unexpected end of file at word {n} of {count}"
                )));
            }
            word.pop();

            reader.read_exact(&mut raw)?;
            let vector = raw
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();

            // entries are newline separated in most writers
            let word = String::from_utf8_lossy(&word).trim_start_matches('\n').to_string();
            table.vectors.insert(word, vector);
        }

        Ok(table)
    }

    /// Load a text vector file: one `word v1 v2 ...` entry per line, with an
    /// optional word2vec `<count> <dimensions>` header.
    pub fn load_text(path: &Path, max_words: Option<usize>) -> Result<Self, EmbeddingError> {
        Self::read_text(open_reader(path)?, max_words)
    }

    pub fn read_text<R: BufRead>(reader: R, max_words: Option<usize>) -> Result<Self, EmbeddingError> {
        let mut table: Option<Self> = None;
        let limit = max_words.unwrap_or(usize::MAX);

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            if line_no == 0 {
                if let Some((_, dimensions)) = parse_header(&line) {
                    table = Some(Self::new(dimensions));
                    continue;
                }
            }

            if table.as_ref().is_some_and(|t| t.len() >= limit) {
                break;
            }

            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else { continue };
            let vector = parts
                .map(str::parse::<f32>)
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| EmbeddingError::MalformedFile(format!("line {}: {e}", line_no + 1)))?;

            let table = table.get_or_insert_with(|| Self::new(vector.len()));
            table.insert(word, vector)?;
        }

        table.ok_or_else(|| EmbeddingError::MalformedFile("no vectors found".to_string()))
    }

    /// Embed every word of `vocabulary` with a sentence embedding model.
    pub fn from_model(model: &EmbeddingModel, vocabulary: &[String]) -> Result<Self, EmbeddingError> {
        let mut table = Self::new(model.dimensions());

        for batch in vocabulary.chunks(EMBED_BATCH_SIZE) {
            let vectors = model.embed_batch(batch)?;
            for (word, vector) in batch.iter().zip(vectors) {
                table.insert(word.clone(), vector)?;
            }
        }

        Ok(table)
    }
}
