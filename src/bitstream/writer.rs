use std::collections::VecDeque;
use std::io::Write;

use super::BitString;
use crate::error::Result;

if_tracing! {
    use tracing::trace;
}

/// Accumulates bits and writes them out one full byte at a time.
///
/// Callers append codes of any width; only the writer knows where byte boundaries fall. The last partial byte
/// is only written by [`flush`](BitWriter::flush) or [`close`](BitWriter::close), zero-padded on the right, so
/// flushing in the middle of a stream corrupts it.
pub struct BitWriter<W: Write> {
    inner: W,
    buffer: VecDeque<bool>,
    bytes_written: u64,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: VecDeque::with_capacity(32),
            bytes_written: 0,
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.buffer.push_back(bit);
        self.bits_written += 1;
        self.emit_full_bytes()
    }

    /// Appends `bits` and writes every complete byte now available.
    pub fn write_bits(&mut self, bits: &BitString) -> Result<()> {
        self.buffer.extend(bits.iter());
        self.bits_written += bits.len() as u64;
        self.emit_full_bytes()
    }

    /// Pads the pending bits with zeros up to a byte boundary and writes them.
    pub fn flush(&mut self) -> Result<()> {
        let padding = (8 - self.buffer.len() % 8) % 8;
        self.buffer.extend(core::iter::repeat_n(false, padding));
        self.emit_full_bytes()?;
        self.inner.flush()?;
        if_tracing! {
            trace!(target: "bitstream", padding, bytes_written = self.bytes_written, "bit writer flushed");
        }
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn close(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }

    /// Bits appended so far, not counting padding.
    pub const fn bits_written(&self) -> u64 {
        self.bits_written
    }

    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Bits waiting for their byte to fill up.
    pub fn pending_bits(&self) -> usize {
        self.buffer.len()
    }

    fn emit_full_bytes(&mut self) -> Result<()> {
        while self.buffer.len() >= 8 {
            let byte = self.buffer.drain(..8).fold(0u8, |acc, bit| (acc << 1) | u8::from(bit));
            self.inner.write_all(&[byte])?;
            self.bytes_written += 1;
        }
        Ok(())
    }
}
