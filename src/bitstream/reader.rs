use std::collections::VecDeque;
use std::io::{self, Read};

use super::{BitString, SYMBOL_WIDTH};
use crate::error::{CodecError, Result};

if_tracing! {
    use tracing::trace;
}

/// Reads single bits, or fixed-width groups of bits, from a byte source.
///
/// Bytes are pulled from the source one at a time and only when the buffered bits cannot satisfy a request,
/// so wrap unbuffered sources in a [`BufReader`](std::io::BufReader).
pub struct BitReader<R: Read> {
    inner: R,
    buffer: VecDeque<bool>,
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: VecDeque::with_capacity(32),
            bytes_read: 0,
        }
    }

    /// Next bit of the stream.
    ///
    /// # Errors
    ///
    /// [`CodecError::Underflow`] if the source is exhausted, [`CodecError::Io`] if it fails.
    pub fn read_bit(&mut self) -> Result<bool> {
        self.fill(1)?;
        self.buffer.pop_front().ok_or(CodecError::Underflow { requested: 1, available: 0 })
    }

    /// Next [`SYMBOL_WIDTH`] bits of the stream, as stored for a leaf of the tree header.
    pub fn read_symbol_bits(&mut self) -> Result<BitString> {
        self.read_bits(SYMBOL_WIDTH)
    }

    /// Next `count` bits of the stream.
    ///
    /// Either all `count` bits are returned or none are consumed.
    pub fn read_bits(&mut self, count: usize) -> Result<BitString> {
        self.fill(count)?;
        if self.buffer.len() < count {
            return Err(CodecError::Underflow {
                requested: count,
                available: self.buffer.len(),
            });
        }
        Ok(self.buffer.drain(..count).collect())
    }

    /// Returns and forgets the bits that were already pulled from the source but not consumed.
    ///
    /// Does not read anything further from the source.
    pub fn drain_remaining(&mut self) -> BitString {
        BitString::from(core::mem::take(&mut self.buffer))
    }

    /// Number of whole bytes pulled from the source so far.
    pub const fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Drops the source and hands back whatever buffered bits were left over.
    pub fn close(mut self) -> BitString {
        let leftover = self.drain_remaining();
        if_tracing! {
            trace!(target: "bitstream", bytes_read = self.bytes_read, leftover_bits = leftover.len(), "bit reader closed");
        }
        leftover
    }

    fn fill(&mut self, quantity: usize) -> Result<()> {
        let mut byte = [0u8; 1];
        while self.buffer.len() < quantity {
            match self.inner.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    self.bytes_read += 1;
                    self.buffer.extend((0..8).rev().map(|shift| (byte[0] >> shift) & 1 == 1));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
