//! Bit-granular I/O on top of byte-oriented readers and writers.
//!
//! Bits are packed MSB-first within each byte on both sides.
use core::fmt;
use std::collections::VecDeque;
use std::str::FromStr;

mod reader;
mod writer;

pub use self::reader::BitReader;
pub use self::writer::BitWriter;

/// Width of a symbol value in the tree header.
pub const SYMBOL_WIDTH: usize = 16;

/// An owned, growable run of bits, first bit first.
///
/// Used for Huffman codes and for the fixed-width symbol values of the tree header.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    pub const fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// The low `width` bits of `value`, most significant first, zero-padded on the left.
    pub fn from_value(value: u16, width: usize) -> Self {
        debug_assert!(width <= SYMBOL_WIDTH, "a u16 has at most 16 bits");
        let bits = (0..width).rev().map(|shift| (value >> shift) & 1 == 1).collect();
        Self { bits }
    }

    /// Interprets the bits as an unsigned big-endian number. Bits beyond the last 16 are shifted out.
    pub fn to_value(&self) -> u16 {
        self.bits.iter().fold(0u16, |acc, &bit| (acc << 1) | u16::from(bit))
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.bits.pop()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn starts_with(&self, prefix: &BitString) -> bool {
        self.bits.starts_with(&prefix.bits)
    }
}

impl From<Vec<bool>> for BitString {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl From<VecDeque<bool>> for BitString {
    fn from(bits: VecDeque<bool>) -> Self {
        Self { bits: bits.into() }
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

/// Parses a string of `'0'` and `'1'` characters.
impl FromStr for BitString {
    type Err = char;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(other),
            })
            .collect()
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString(\"{}\")", self)
    }
}
