//! Huffman prefix-code compression.
//!
//! A compressed file is a bit-packed (MSB-first) sequence of:
//!
//! ```text
//! [tree header][code of every input symbol, in order][end-of-stream code][zero padding to a byte]
//! ```
//!
//! The tree header is `Node := '0' Node Node | '1' <16-bit value>`, written pre-order, left first.
//! There are no magic bytes, length fields or checksums; the header grammar is the only framing.

#[macro_export]
macro_rules! if_tracing {
    {$($body:tt)*} => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                $($body)*
            }
        }
    };
}

pub mod bitstream;
pub mod codec;
pub mod compressor;
pub mod config;
pub mod error;
pub mod frequency;
pub mod symbols;
pub mod tree;

#[cfg(test)]
mod tests;

pub use crate::bitstream::{BitReader, BitString, BitWriter};
pub use crate::codec::{
    CompressionReport, CompressionStats, DecompressionReport, DecompressionStats, compress_file, compress_stream, decompress_file,
    decompress_stream,
};
pub use crate::compressor::{Compressor, HuffmanCoding};
pub use crate::config::CodecConfig;
pub use crate::error::{CodecError, Result};
pub use crate::symbols::{Alphabet, SymbolSink, SymbolSource};
pub use crate::tree::{HuffmanTree, SENTINEL_VALUE, Symbol, TreeElement};
