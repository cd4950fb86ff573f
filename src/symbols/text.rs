use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::str;

use super::{SymbolSink, SymbolSource};

/// Reads UTF-8 text line by line and yields its UTF-16 code units.
pub struct TextReader<R: BufRead> {
    inner: R,
    line: Vec<u8>,
    pending: VecDeque<u16>,
}

impl<R: BufRead> TextReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: Vec::new(),
            pending: VecDeque::new(),
        }
    }
}

impl<R: BufRead> SymbolSource for TextReader<R> {
    fn next_symbol(&mut self) -> io::Result<Option<u16>> {
        loop {
            if let Some(unit) = self.pending.pop_front() {
                return Ok(Some(unit));
            }

            self.line.clear();
            // '\n' never occurs inside a multi-byte sequence, so every line is decodable on its own.
            if self.inner.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            let text = str::from_utf8(&self.line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.pending.extend(text.encode_utf16());
        }
    }
}

/// Joins UTF-16 code units back into characters and writes them as UTF-8.
pub struct TextWriter<W: Write> {
    inner: W,
    high_surrogate: Option<u16>,
}

impl<W: Write> TextWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            high_surrogate: None,
        }
    }

    fn write_char(&mut self, c: char) -> io::Result<()> {
        let mut scratch = [0u8; 4];
        self.inner.write_all(c.encode_utf8(&mut scratch).as_bytes())
    }
}

fn unpaired_surrogate(unit: u16) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("unpaired UTF-16 surrogate {:#06x}", unit))
}

impl<W: Write> SymbolSink for TextWriter<W> {
    fn write_symbol(&mut self, symbol: u16) -> io::Result<()> {
        if let Some(high) = self.high_surrogate.take() {
            return match char::decode_utf16([high, symbol]).next() {
                Some(Ok(c)) => self.write_char(c),
                _ => Err(unpaired_surrogate(high)),
            };
        }

        if (0xD800..=0xDBFF).contains(&symbol) {
            self.high_surrogate = Some(symbol);
            return Ok(());
        }

        let c = char::from_u32(u32::from(symbol)).ok_or_else(|| unpaired_surrogate(symbol))?;
        self.write_char(c)
    }

    fn finish(&mut self) -> io::Result<()> {
        if let Some(high) = self.high_surrogate.take() {
            return Err(unpaired_surrogate(high));
        }
        self.inner.flush()
    }
}
