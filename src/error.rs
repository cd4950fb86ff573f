use std::io;

use thiserror::Error;

use crate::tree::Symbol;

/// Everything that can go wrong while compressing or decompressing.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input cannot be compressed or decoded, e.g. an empty source or a malformed tree header.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A symbol that had to be encoded has no leaf in the tree.
    #[error("the tree has no code for {0}")]
    UnsupportedSymbol(Symbol),

    /// The bitstream ran out before a full group of bits could be read.
    #[error("bitstream underflow: asked for {requested} bits but only {available} remained")]
    Underflow { requested: usize, available: usize },

    /// An internal node was assembled with a frequency or value that does not match its children.
    #[error("tree construction invariant violated: {0}")]
    ConstructionInvariant(String),
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
