use std::path::PathBuf;
use thiserror::Error;

/// The structure source could not be read or understood.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read structure file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing tag: {0}")]
    MissingTag(String),
    #[error("atom loop has no '{0}' column")]
    MissingColumn(String),
    #[error("failed to parse '{value}' as a number (line {line})")]
    InvalidNumber { value: String, line: usize },
    #[error("no atoms found in structure")]
    NoAtoms,
    #[error("malformed structure: {0}")]
    Malformed(String),
    #[error("lattice has zero or near-zero volume")]
    DegenerateLattice,
    #[error("unsupported structure format: {0:?}")]
    UnsupportedFormat(PathBuf),
}

/// A species label that does not map onto a known element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element '{symbol}' (from label '{label}')")]
pub struct UnknownElementError {
    pub symbol: String,
    pub label: String,
}

/// Invalid constraint bounds. Indices are the 0-based values that were attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("row range [{start}, {end}] is outside the valid domain [0, {}] or reversed", last_index(.len))]
pub struct RangeError {
    pub start: i64,
    pub end: i64,
    pub len: usize,
}

fn last_index(len: &usize) -> i64 {
    *len as i64 - 1
}

/// The rendered input could not be persisted.
#[derive(Debug, Error)]
#[error("failed to write {path:?}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Fatal errors of the conversion itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error(transparent)]
    UnknownElement(#[from] UnknownElementError),
}
