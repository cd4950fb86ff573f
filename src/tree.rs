//! The Huffman prefix-code tree.
//!
//! Construction is the greedy Huffman merge with a fixed tie-break order, so two runs over the same frequency
//! list always produce the same tree (and so the same header bits):
//!
//! 1. the list is stable-sorted by frequency alone,
//! 2. each step removes the two smallest elements by `(frequency, value)`, scanning the list from the front and
//!    keeping the first of any exact ties,
//! 3. their parent is appended to the back of the list.
use core::cmp::Ordering;
use core::fmt;
use core::mem;
use std::io::{Read, Write};

use crate::bitstream::{BitReader, BitString, BitWriter, SYMBOL_WIDTH};
use crate::error::{CodecError, Result};

if_tracing! {
    use tracing::{debug, trace};
}

/// Wire value of the end-of-stream symbol.
pub const SENTINEL_VALUE: u16 = 0;

/// Frequency of leaves rebuilt from a tree header, which carries no frequencies.
pub const UNSET_FREQUENCY: u64 = 0;

/// Internal nodes nested deeper than this in a tree header are treated as corruption.
pub const MAX_HEADER_DEPTH: usize = 256;

/// What a leaf stands for.
///
/// The end-of-stream marker is its own variant so that a data symbol with the sentinel's value never gets
/// confused with it, even though both are written as [`SENTINEL_VALUE`] in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Char(u16),
    EndOfStream,
}

impl Symbol {
    /// The value written to the tree header.
    pub const fn value(self) -> u16 {
        match self {
            Self::Char(value) => value,
            Self::EndOfStream => SENTINEL_VALUE,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Char(value) => write!(f, "'{}' ({:#06x})", Literal(value), value),
            Self::EndOfStream => f.write_str("end-of-stream"),
        }
    }
}

/// Prints a symbol value as a character, escaping control characters.
pub struct Literal(pub u16);

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0x0A => f.write_str("\\n"),
            0x0D => f.write_str("\\r"),
            0x09 => f.write_str("\\t"),
            0x08 => f.write_str("\\b"),
            0x0C => f.write_str("\\f"),
            0x00 => f.write_str("\\0"),
            value => match char::from_u32(u32::from(value)) {
                Some(c) if !c.is_control() => write!(f, "{}", c),
                _ => write!(f, "\\u{{{:04x}}}", value),
            },
        }
    }
}

/// A node of the tree.
///
/// An internal node always owns exactly two children. Its value is copied from its right child and only
/// serves the tie-break order during construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeElement {
    Leaf {
        symbol: Symbol,
        frequency: u64,
    },
    Internal {
        value: u16,
        frequency: u64,
        left: Box<TreeElement>,
        right: Box<TreeElement>,
    },
}

impl TreeElement {
    pub const fn leaf(symbol: Symbol, frequency: u64) -> Self {
        Self::Leaf { symbol, frequency }
    }

    /// Assembles an internal node from explicit parts, checking that they agree with the children.
    ///
    /// # Errors
    ///
    /// [`CodecError::ConstructionInvariant`] if `frequency` is not the sum of the children's frequencies or
    /// `value` is not the right child's value.
    pub fn internal(value: u16, frequency: u64, left: TreeElement, right: TreeElement) -> Result<Self> {
        let sum = left.frequency().checked_add(right.frequency());
        if sum != Some(frequency) {
            return Err(CodecError::ConstructionInvariant(format!(
                "frequency {} is not the sum of the children's frequencies {} and {}",
                frequency,
                left.frequency(),
                right.frequency()
            )));
        }
        if value != right.value() {
            return Err(CodecError::ConstructionInvariant(format!(
                "value {:#06x} differs from the right child's value {:#06x}",
                value,
                right.value()
            )));
        }
        Ok(Self::Internal {
            value,
            frequency,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Parent of `left` and `right` with the derived frequency and value.
    pub fn merge(left: TreeElement, right: TreeElement) -> Self {
        Self::Internal {
            value: right.value(),
            frequency: left.frequency().saturating_add(right.frequency()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn value(&self) -> u16 {
        match self {
            Self::Leaf { symbol, .. } => symbol.value(),
            Self::Internal { value, .. } => *value,
        }
    }

    pub const fn frequency(&self) -> u64 {
        match self {
            Self::Leaf { frequency, .. } | Self::Internal { frequency, .. } => *frequency,
        }
    }

    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    pub const fn symbol(&self) -> Option<Symbol> {
        match self {
            Self::Leaf { symbol, .. } => Some(*symbol),
            Self::Internal { .. } => None,
        }
    }

    /// Child reached by `bit`: `false` is left, `true` is right. `None` on a leaf.
    pub fn child(&self, bit: bool) -> Option<&TreeElement> {
        match self {
            Self::Leaf { .. } => None,
            Self::Internal { left, right, .. } => Some(if bit { right } else { left }),
        }
    }

    /// Construction order: frequency first, then value.
    pub fn rank_cmp(&self, other: &TreeElement) -> Ordering {
        self.frequency().cmp(&other.frequency()).then(self.value().cmp(&other.value()))
    }

    fn trace_path(&self, target: Symbol, path: &mut BitString) -> bool {
        match self {
            Self::Leaf { symbol, .. } => *symbol == target,
            Self::Internal { left, right, .. } => {
                for (bit, child) in [(false, left), (true, right)] {
                    path.push(bit);
                    if child.trace_path(target, path) {
                        return true;
                    }
                    path.pop();
                }
                false
            }
        }
    }

    fn collect_codes(&self, path: &mut BitString, out: &mut Vec<(Symbol, BitString)>) {
        match self {
            Self::Leaf { symbol, .. } => out.push((*symbol, path.clone())),
            Self::Internal { left, right, .. } => {
                for (bit, child) in [(false, left), (true, right)] {
                    path.push(bit);
                    child.collect_codes(path, out);
                    path.pop();
                }
            }
        }
    }

    fn encode<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        match self {
            Self::Leaf { symbol, .. } => {
                writer.write_bit(true)?;
                writer.write_bits(&BitString::from_value(symbol.value(), SYMBOL_WIDTH))
            }
            Self::Internal { left, right, .. } => {
                writer.write_bit(false)?;
                left.encode(writer)?;
                right.encode(writer)
            }
        }
    }

    fn decode<R: Read>(reader: &mut BitReader<R>, depth: usize) -> Result<Self> {
        if reader.read_bit()? {
            let value = reader.read_symbol_bits()?.to_value();
            return Ok(Self::leaf(Symbol::Char(value), UNSET_FREQUENCY));
        }

        if depth >= MAX_HEADER_DEPTH {
            return Err(CodecError::InvalidInput(format!(
                "tree header nests deeper than {} levels",
                MAX_HEADER_DEPTH
            )));
        }
        let left = Self::decode(reader, depth + 1)?;
        let right = Self::decode(reader, depth + 1)?;
        let frequency = left.frequency() + right.frequency();
        Self::internal(right.value(), frequency, left, right)
    }

    fn validate(&self) -> Result<()> {
        if let Self::Internal {
            value,
            frequency,
            left,
            right,
        } = self
        {
            left.validate()?;
            right.validate()?;
            if left.frequency().checked_add(right.frequency()) != Some(*frequency) {
                return Err(CodecError::ConstructionInvariant(format!(
                    "node frequency {} is not the sum of its children's",
                    frequency
                )));
            }
            if *value != right.value() {
                return Err(CodecError::ConstructionInvariant(format!(
                    "node value {:#06x} is not its right child's value",
                    value
                )));
            }
        }
        Ok(())
    }

    fn leaves_mut<'a>(&'a mut self, out: &mut Vec<&'a mut TreeElement>) {
        if self.is_leaf() {
            out.push(self);
        } else if let Self::Internal { left, right, .. } = self {
            left.leaves_mut(out);
            right.leaves_mut(out);
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl fmt::Display for TreeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf {
                symbol: Symbol::EndOfStream,
                frequency,
            } => write!(f, "{{ f = {}, v = EOF }}", frequency),
            Self::Leaf {
                symbol: Symbol::Char(value),
                frequency,
            } => write!(f, "{{ f = {}, v = '{}' }}", frequency, Literal(*value)),
            Self::Internal {
                value,
                frequency,
                left,
                right,
            } => write!(f, "{{ f = {}, v = '{}', L = {}, R = {} }}", frequency, Literal(*value), left, right),
        }
    }
}

/// A complete prefix-code tree. The root is always an internal node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanTree {
    root: TreeElement,
}

impl HuffmanTree {
    /// Builds the tree from a frequency list, consuming it. Clone the list first to keep it.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidInput`] if the list holds fewer than two elements.
    pub fn build(mut elements: Vec<TreeElement>) -> Result<Self> {
        if elements.len() < 2 {
            return Err(CodecError::InvalidInput(format!(
                "a tree needs at least two elements, got {}",
                elements.len()
            )));
        }

        if_tracing! {
            debug!(target: "tree", elements = elements.len(), "building tree");
        }

        elements.sort_by_key(TreeElement::frequency);
        while elements.len() > 1 {
            let x = take_smallest(&mut elements);
            let y = take_smallest(&mut elements);
            if_tracing! {
                trace!(target: "tree", left_frequency = x.frequency(), right_frequency = y.frequency(), "merging");
            }
            elements.push(TreeElement::merge(x, y));
        }

        let root = elements
            .pop()
            .ok_or_else(|| CodecError::ConstructionInvariant("merging left no root".to_string()))?;
        let mut tree = Self { root };
        tree.settle_sentinel();

        if_tracing! {
            debug!(target: "tree", leaves = tree.leaf_count(), depth = tree.depth(), "tree built");
        }
        Ok(tree)
    }

    /// Wraps an externally assembled root after checking every node.
    ///
    /// If a data leaf shares the sentinel's value, the end-of-stream leaf is moved behind it in header order,
    /// the same way [`build`](HuffmanTree::build) does.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidInput`] if the root is a leaf, [`CodecError::ConstructionInvariant`] if any internal
    /// node disagrees with its children.
    pub fn from_root(root: TreeElement) -> Result<Self> {
        if root.is_leaf() {
            return Err(CodecError::InvalidInput("the root of a tree must have two children".to_string()));
        }
        root.validate()?;
        let mut tree = Self { root };
        tree.settle_sentinel();
        Ok(tree)
    }

    pub const fn root(&self) -> &TreeElement {
        &self.root
    }

    pub fn into_root(self) -> TreeElement {
        self.root
    }

    /// Code of `symbol`, read from the root: `false` for left, `true` for right.
    ///
    /// `None` if no leaf holds the symbol. A present symbol always has a code of at least one bit.
    pub fn code_for(&self, symbol: Symbol) -> Option<BitString> {
        let mut path = BitString::new();
        self.root.trace_path(symbol, &mut path).then_some(path)
    }

    /// Every leaf with its code, in header order.
    pub fn codes(&self) -> Vec<(Symbol, BitString)> {
        let mut out = Vec::with_capacity(self.leaf_count());
        self.root.collect_codes(&mut BitString::new(), &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Length of the longest code.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Bits taken by the serialized header: one per internal node, 17 per leaf.
    pub fn header_bits(&self) -> usize {
        let leaves = self.leaf_count();
        (leaves - 1) + leaves * (1 + SYMBOL_WIDTH)
    }

    /// Writes the tree header: pre-order, left first; `0` for an internal node, `1` and the 16-bit value for a
    /// leaf. Frequencies are not written.
    pub fn encode_header<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        self.root.encode(writer)?;
        if_tracing! {
            debug!(target: "tree", header_bits = self.header_bits(), "tree header written");
        }
        Ok(())
    }

    /// Reads a tree header written by [`encode_header`](HuffmanTree::encode_header).
    ///
    /// Leaves come back with [`UNSET_FREQUENCY`]. The last leaf (in header order) carrying [`SENTINEL_VALUE`]
    /// becomes the end-of-stream leaf.
    ///
    /// # Errors
    ///
    /// [`CodecError::Underflow`] if the stream ends inside the header, [`CodecError::InvalidInput`] if the
    /// header is a lone leaf or nests too deeply, [`CodecError::UnsupportedSymbol`] if no leaf can serve as
    /// the end-of-stream marker.
    pub fn decode_header<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let root = TreeElement::decode(reader, 0)?;
        if root.is_leaf() {
            return Err(CodecError::InvalidInput(
                "tree header describes a single leaf".to_string(),
            ));
        }

        let mut tree = Self { root };
        let mut leaves = Vec::new();
        tree.root.leaves_mut(&mut leaves);
        let sentinel = leaves
            .into_iter()
            .rev()
            .find(|leaf| leaf.value() == SENTINEL_VALUE)
            .ok_or(CodecError::UnsupportedSymbol(Symbol::EndOfStream))?;
        if let TreeElement::Leaf { symbol, .. } = sentinel {
            *symbol = Symbol::EndOfStream;
        }

        if_tracing! {
            debug!(target: "tree", leaves = tree.leaf_count(), depth = tree.depth(), "tree header read");
        }
        Ok(tree)
    }

    /// Makes the end-of-stream leaf the last leaf in header order carrying [`SENTINEL_VALUE`], which is the one
    /// [`decode_header`](HuffmanTree::decode_header) picks.
    ///
    /// Only matters when the data itself contains the sentinel's value. The two leaves trade symbols and keep
    /// their frequencies, so the header bits do not change.
    fn settle_sentinel(&mut self) {
        let mut leaves = Vec::new();
        self.root.leaves_mut(&mut leaves);
        let mut reserved: Vec<&mut TreeElement> =
            leaves.into_iter().filter(|leaf| leaf.value() == SENTINEL_VALUE).collect();

        let Some(position) = reserved
            .iter()
            .position(|leaf| leaf.symbol() == Some(Symbol::EndOfStream))
        else {
            return;
        };
        let last = reserved.len() - 1;
        if position == last {
            return;
        }

        let (head, tail) = reserved.split_at_mut(last);
        if let (TreeElement::Leaf { symbol: a, .. }, TreeElement::Leaf { symbol: b, .. }) =
            (&mut *head[position], &mut *tail[0])
        {
            mem::swap(a, b);
        }
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Removes the smallest element by [`TreeElement::rank_cmp`]; the earliest one wins exact ties.
///
/// `elements` must not be empty.
fn take_smallest(elements: &mut Vec<TreeElement>) -> TreeElement {
    let mut smallest = 0;
    for (i, element) in elements.iter().enumerate().skip(1) {
        if element.rank_cmp(&elements[smallest]) == Ordering::Less {
            smallest = i;
        }
    }
    elements.remove(smallest)
}
