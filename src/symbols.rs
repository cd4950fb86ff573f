//! Sources and sinks of 16-bit symbols.
//!
//! The codec never sees files directly: it pulls symbols from a [`SymbolSource`] and pushes decoded symbols
//! into a [`SymbolSink`]. The [`Alphabet`] decides how bytes on disk map to symbols.
use std::io::{self, BufRead, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

mod bytes;
mod text;

pub use self::bytes::{ByteReader, ByteWriter};
pub use self::text::{TextReader, TextWriter};

/// Yields symbols one at a time until the end of input.
pub trait SymbolSource {
    fn next_symbol(&mut self) -> io::Result<Option<u16>>;
}

/// Receives decoded symbols.
pub trait SymbolSink {
    fn write_symbol(&mut self, symbol: u16) -> io::Result<()>;

    /// Writes out anything still buffered. No symbol may be written afterwards.
    fn finish(&mut self) -> io::Result<()>;
}

impl<S: SymbolSource + ?Sized> SymbolSource for Box<S> {
    fn next_symbol(&mut self) -> io::Result<Option<u16>> {
        (**self).next_symbol()
    }
}

impl<S: SymbolSink + ?Sized> SymbolSink for Box<S> {
    fn write_symbol(&mut self, symbol: u16) -> io::Result<()> {
        (**self).write_symbol(symbol)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// How the bytes of an uncompressed file are turned into symbols.
///
/// The alphabet is not recorded in the compressed file, so both sides have to agree on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    /// UTF-8 text, one symbol per UTF-16 code unit.
    #[default]
    Text,
    /// Arbitrary binary data, one symbol per byte.
    Bytes,
}

impl Alphabet {
    pub fn source<'a, R: BufRead + 'a>(self, reader: R) -> Box<dyn SymbolSource + 'a> {
        match self {
            Self::Text => Box::new(TextReader::new(reader)),
            Self::Bytes => Box::new(ByteReader::new(reader)),
        }
    }

    pub fn sink<'a, W: Write + 'a>(self, writer: W) -> Box<dyn SymbolSink + 'a> {
        match self {
            Self::Text => Box::new(TextWriter::new(writer)),
            Self::Bytes => Box::new(ByteWriter::new(writer)),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bytes => "bytes",
        }
    }
}

/// Drains a source into a vector. Mostly useful in tests.
pub fn read_all<S: SymbolSource + ?Sized>(source: &mut S) -> io::Result<Vec<u16>> {
    let mut symbols = Vec::new();
    while let Some(symbol) = source.next_symbol()? {
        symbols.push(symbol);
    }
    Ok(symbols)
}
