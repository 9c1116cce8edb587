use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Malformed RLE stream: truncated run at offset {offset}")]
    MalformedStream { offset: usize },
    #[error("Size mismatch for '{name}': expected {expected} bytes, got {actual}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Table parse error at line {line}: {reason}")]
    GrammarParse { line: usize, reason: String },
    #[error("Invalid record name: {0:?}")]
    InvalidName(String),
    #[error("Duplicate record name: {0:?}")]
    DuplicateName(String),
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PackError>;
