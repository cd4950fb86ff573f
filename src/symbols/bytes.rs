use std::io::{self, BufRead, Write};

use super::{SymbolSink, SymbolSource};

/// Yields every byte of the input as its own symbol.
pub struct ByteReader<R: BufRead> {
    inner: R,
}

impl<R: BufRead> ByteReader<R> {
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: BufRead> SymbolSource for ByteReader<R> {
    fn next_symbol(&mut self) -> io::Result<Option<u16>> {
        let byte = match self.inner.fill_buf()? {
            [] => return Ok(None),
            [first, ..] => *first,
        };
        self.inner.consume(1);
        Ok(Some(u16::from(byte)))
    }
}

/// Writes every symbol as a single byte.
pub struct ByteWriter<W: Write> {
    inner: W,
}

impl<W: Write> ByteWriter<W> {
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> SymbolSink for ByteWriter<W> {
    fn write_symbol(&mut self, symbol: u16) -> io::Result<()> {
        let byte = u8::try_from(symbol).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("symbol {:#06x} does not fit in a byte", symbol),
            )
        })?;
        self.inner.write_all(&[byte])
    }

    fn finish(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::read_all;

    #[test]
    fn every_byte_is_a_symbol() {
        let data = [0u8, 0xFF, b'\n', 0x80];
        let symbols = read_all(&mut ByteReader::new(&data[..])).unwrap();
        assert_eq!(symbols, vec![0, 0xFF, 0x0A, 0x80]);
    }

    #[test]
    fn wide_symbols_are_rejected() {
        let mut out = Vec::new();
        let mut writer = ByteWriter::new(&mut out);
        writer.write_symbol(0x41).unwrap();
        assert_eq!(writer.write_symbol(0x100).unwrap_err().kind(), io::ErrorKind::InvalidData);
        writer.finish().unwrap();
        assert_eq!(out, b"A");
    }
}
