//! Symbol statistics for tree construction.
use std::collections::BTreeMap;

use crate::error::Result;
use crate::symbols::SymbolSource;
use crate::tree::{Symbol, TreeElement};

if_tracing! {
    use tracing::debug;
}

/// Counts every symbol of `source` and returns one leaf per distinct symbol plus the end-of-stream leaf.
///
/// Leaves come out in ascending symbol value, followed by the end-of-stream leaf with frequency 1. This order
/// decides how equal frequencies tie during [`HuffmanTree::build`](crate::tree::HuffmanTree::build), so it is
/// part of the file format.
pub fn collect<S: SymbolSource + ?Sized>(source: &mut S) -> Result<Vec<TreeElement>> {
    let mut counts: BTreeMap<u16, u64> = BTreeMap::new();
    while let Some(symbol) = source.next_symbol()? {
        *counts.entry(symbol).or_default() += 1;
    }

    if_tracing! {
        debug!(target: "frequency", symbols = counts.values().sum::<u64>(), distinct = counts.len(), "frequencies collected");
    }

    let mut leaves: Vec<TreeElement> = counts
        .into_iter()
        .map(|(value, frequency)| TreeElement::leaf(Symbol::Char(value), frequency))
        .collect();
    leaves.push(TreeElement::leaf(Symbol::EndOfStream, 1));
    Ok(leaves)
}
