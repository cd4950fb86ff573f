//! Compression and decompression of whole streams.
//!
//! Compressing reads the source twice: once to count symbols and build the tree, once to encode. The output
//! is the tree header, the code of every symbol, the end-of-stream code and zero padding up to a byte.
//! Decompressing reads the header back and walks the tree bit by bit until it reaches the end-of-stream leaf.
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bitstream::{BitReader, BitString, BitWriter};
use crate::error::{CodecError, Result};
use crate::frequency;
use crate::symbols::{Alphabet, SymbolSink, SymbolSource};
use crate::tree::{HuffmanTree, Symbol, TreeElement};
use voxell_timer::time_fn;

if_tracing! {
    use tracing::{debug, info, warn};
}

/// Codes looked up in a tree, each computed once per run.
pub struct CodeTable<'t> {
    tree: &'t HuffmanTree,
    codes: HashMap<Symbol, BitString>,
}

impl<'t> CodeTable<'t> {
    pub fn new(tree: &'t HuffmanTree) -> Self {
        Self {
            tree,
            codes: HashMap::new(),
        }
    }

    /// # Errors
    ///
    /// [`CodecError::UnsupportedSymbol`] if the tree has no leaf for `symbol`.
    pub fn code(&mut self, symbol: Symbol) -> Result<&BitString> {
        match self.codes.entry(symbol) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let code = self.tree.code_for(symbol).ok_or(CodecError::UnsupportedSymbol(symbol))?;
                Ok(entry.insert(code))
            }
        }
    }

    /// Number of distinct symbols looked up so far.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// What a compression run wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Symbols encoded, not counting the end-of-stream marker.
    pub symbols: u64,
    pub distinct_symbols: usize,
    pub header_bits: u64,
    /// Code bits of the symbols and the end-of-stream marker.
    pub payload_bits: u64,
    pub padding_bits: u64,
    pub compressed_bytes: u64,
}

/// What a decompression run read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecompressionStats {
    /// Symbols decoded, not counting the end-of-stream marker.
    pub symbols: u64,
    pub leaves: usize,
    /// Bytes pulled from the compressed stream, up to the one holding the end of the end-of-stream code.
    pub compressed_bytes: u64,
    /// Bits left over after the end-of-stream code, which are never interpreted.
    pub padding_bits: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompressionReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub source_bytes: u64,
    pub stats: CompressionStats,
    pub elapsed: Duration,
}

impl CompressionReport {
    /// `compressed size / source size`.
    pub fn ratio(&self) -> f64 {
        if self.source_bytes == 0 {
            return 0.0;
        }
        self.stats.compressed_bytes as f64 / self.source_bytes as f64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecompressionReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub decompressed_bytes: u64,
    pub stats: DecompressionStats,
    pub elapsed: Duration,
}

/// Counts the symbols of `source` and builds its tree.
///
/// # Errors
///
/// [`CodecError::InvalidInput`] if the source is empty, since the end-of-stream leaf alone cannot form a tree.
pub fn tree_for<S: SymbolSource + ?Sized>(source: &mut S) -> Result<HuffmanTree> {
    let leaves = frequency::collect(source)?;
    if leaves.len() < 2 {
        return Err(CodecError::InvalidInput("the source is empty, there is nothing to compress".to_string()));
    }
    HuffmanTree::build(leaves)
}

/// Writes the header of `tree`, the codes of every symbol of `source` and the end-of-stream code, then pads
/// and flushes `destination`.
///
/// # Errors
///
/// [`CodecError::UnsupportedSymbol`] if `source` holds a symbol the tree has no leaf for, or the tree has no
/// end-of-stream leaf.
pub fn compress_with_tree<S, W>(tree: &HuffmanTree, source: &mut S, destination: W) -> Result<CompressionStats>
where
    S: SymbolSource + ?Sized,
    W: Write,
{
    let mut writer = BitWriter::new(destination);
    tree.encode_header(&mut writer)?;
    let header_bits = writer.bits_written();

    let mut table = CodeTable::new(tree);
    let mut symbols = 0u64;
    while let Some(value) = source.next_symbol()? {
        writer.write_bits(table.code(Symbol::Char(value))?)?;
        symbols += 1;
    }
    writer.write_bits(table.code(Symbol::EndOfStream)?)?;

    let bits = writer.bits_written();
    writer.close()?;

    let stats = CompressionStats {
        symbols,
        distinct_symbols: table.len() - 1,
        header_bits,
        payload_bits: bits - header_bits,
        padding_bits: bits.div_ceil(8) * 8 - bits,
        compressed_bytes: bits.div_ceil(8),
    };
    if_tracing! {
        debug!(target: "codec", symbols, header_bits, payload_bits = stats.payload_bits, compressed_bytes = stats.compressed_bytes, "payload encoded");
    }
    Ok(stats)
}

/// Compresses a source that can be opened twice, once for counting and once for encoding.
pub fn compress_stream<F, R, W>(mut open_source: F, alphabet: Alphabet, destination: W) -> Result<CompressionStats>
where
    F: FnMut() -> io::Result<R>,
    R: BufRead,
    W: Write,
{
    let tree = tree_for(&mut alphabet.source(open_source()?))?;
    compress_with_tree(&tree, &mut alphabet.source(open_source()?), destination)
}

/// Walks `tree` one bit at a time, pushing every leaf reached into `sink`, until the end-of-stream leaf.
///
/// Returns the number of symbols written.
///
/// # Errors
///
/// [`CodecError::Underflow`] if the stream ends before the end-of-stream code.
pub fn decode_symbols<R, S>(tree: &HuffmanTree, reader: &mut BitReader<R>, sink: &mut S) -> Result<u64>
where
    R: Read,
    S: SymbolSink + ?Sized,
{
    let root = tree.root();
    let mut node = root;
    let mut symbols = 0u64;
    loop {
        let bit = reader.read_bit()?;
        node = node
            .child(bit)
            .ok_or_else(|| CodecError::ConstructionInvariant("decoding walked past a leaf".to_string()))?;

        match node {
            TreeElement::Leaf {
                symbol: Symbol::EndOfStream,
                ..
            } => return Ok(symbols),
            TreeElement::Leaf {
                symbol: Symbol::Char(value),
                ..
            } => {
                sink.write_symbol(*value)?;
                symbols += 1;
                node = root;
            }
            TreeElement::Internal { .. } => {}
        }
    }
}

/// Reads a tree header from `source`, then decodes symbols into `destination` until the end-of-stream code.
pub fn decompress_stream<R, W>(source: R, alphabet: Alphabet, destination: W) -> Result<DecompressionStats>
where
    R: Read,
    W: Write,
{
    let mut reader = BitReader::new(source);
    let tree = HuffmanTree::decode_header(&mut reader)?;

    let mut sink = alphabet.sink(destination);
    let symbols = decode_symbols(&tree, &mut reader, &mut sink)?;
    sink.finish()?;

    let compressed_bytes = reader.bytes_read();
    let padding_bits = reader.close().len();
    if_tracing! {
        debug!(target: "codec", symbols, compressed_bytes, padding_bits, "payload decoded");
    }
    Ok(DecompressionStats {
        symbols,
        leaves: tree.leaf_count(),
        compressed_bytes,
        padding_bits,
    })
}

/// Compresses the file at `source` into a new file at `destination`.
///
/// Nothing is created for an empty source, and a destination left behind by a failed run is removed.
pub fn compress_file(source: &Path, destination: &Path, alphabet: Alphabet) -> Result<CompressionReport> {
    let open = || File::open(source).map(BufReader::new);
    let (stats, elapsed) = time_fn(|| -> Result<CompressionStats> {
        let tree = tree_for(&mut alphabet.source(open()?))?;
        let file = File::create(destination)?;
        let result = compress_with_tree(&tree, &mut alphabet.source(open()?), BufWriter::new(file));
        discard_on_error(result, destination)
    });
    let stats = stats?;

    let report = CompressionReport {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source_bytes: fs::metadata(source)?.len(),
        stats,
        elapsed,
    };
    if_tracing! {
        info!(target: "codec", source = %source.display(), destination = %destination.display(), source_bytes = report.source_bytes, compressed_bytes = stats.compressed_bytes, elapsed_us = %report.elapsed.as_micros(), "compression finished");
    }
    Ok(report)
}

/// Decompresses the file at `source` into a new file at `destination`.
///
/// A destination left behind by a failed run is removed, so a truncated input never leaves partial output.
pub fn decompress_file(source: &Path, destination: &Path, alphabet: Alphabet) -> Result<DecompressionReport> {
    let mut input = BufReader::new(File::open(source)?);
    let mut output = BufWriter::new(File::create(destination)?);

    let (result, elapsed) = time_fn(|| decompress_stream(&mut input, alphabet, &mut output));
    drop(output);
    let stats = discard_on_error(result, destination)?;

    let report = DecompressionReport {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        decompressed_bytes: fs::metadata(destination)?.len(),
        stats,
        elapsed,
    };
    if_tracing! {
        info!(target: "codec", source = %source.display(), destination = %destination.display(), decompressed_bytes = report.decompressed_bytes, elapsed_us = %report.elapsed.as_micros(), "decompression finished");
    }
    Ok(report)
}

fn discard_on_error<T>(result: Result<T>, path: &Path) -> Result<T> {
    if let Err(ref _err) = result {
        if_tracing! {
            warn!(target: "codec", path = %path.display(), error = %_err, "removing incomplete output");
        }
        let _ = fs::remove_file(path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn compress(data: &[u8], alphabet: Alphabet) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        compress_stream(|| Ok(data), alphabet, &mut out)?;
        Ok(out)
    }

    fn decompress(data: &[u8], alphabet: Alphabet) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        decompress_stream(data, alphabet, &mut out)?;
        Ok(out)
    }

    #[test]
    fn abracadabra_end_to_end() {
        let mut compressed = Vec::new();
        let stats = compress_stream(|| Ok(&b"abracadabra"[..]), Alphabet::Text, &mut compressed).unwrap();

        assert_eq!(stats.symbols, 11);
        assert_eq!(stats.distinct_symbols, 5);
        assert_eq!(stats.header_bits, 107);
        // 5 * 'a' (1) + 2 * 'b' (3) + 2 * 'r' (3) + 'c' (4) + 'd' (3) + end-of-stream (4)
        assert_eq!(stats.payload_bits, 28);
        assert_eq!(stats.padding_bits, 1);
        assert_eq!(compressed.len(), 17);
        assert_eq!(stats.compressed_bytes, 17);

        let mut restored = Vec::new();
        let back = decompress_stream(&compressed[..], Alphabet::Text, &mut restored).unwrap();
        assert_eq!(restored, b"abracadabra");
        assert_eq!(back.symbols, 11);
        assert_eq!(back.leaves, 6);
        assert_eq!(back.padding_bits, 1);
    }

    #[test]
    fn single_distinct_symbol() {
        let compressed = compress(b"aaaa", Alphabet::Text).unwrap();
        // header: '0', '1' + 0x0000, '1' + 'a' (35 bits); payload: 4 * '1' + '0'
        assert_eq!(compressed.len(), 5);
        assert_eq!(decompress(&compressed, Alphabet::Text).unwrap(), b"aaaa");
    }

    #[test]
    fn empty_source_is_invalid_input() {
        assert!(matches!(compress(b"", Alphabet::Text), Err(CodecError::InvalidInput(_))));
        assert!(matches!(compress(b"", Alphabet::Bytes), Err(CodecError::InvalidInput(_))));
    }

    #[test]
    fn truncated_stream_underflows() {
        let compressed = compress(b"abracadabra", Alphabet::Text).unwrap();
        let result = decompress(&compressed[..compressed.len() - 1], Alphabet::Text);
        assert!(matches!(result, Err(CodecError::Underflow { .. })));
        assert!(matches!(decompress(&[], Alphabet::Text), Err(CodecError::Underflow { .. })));
    }

    #[test]
    fn sentinel_value_as_data_round_trips() {
        for data in [&b"\0"[..], &b"\0\0\0"[..], &b"\0a"[..], &b"a\0b\0\0c"[..]] {
            for alphabet in [Alphabet::Text, Alphabet::Bytes] {
                let compressed = compress(data, alphabet).unwrap();
                assert_eq!(decompress(&compressed, alphabet).unwrap(), data, "{:?} with {:?}", data, alphabet);
            }
        }
    }

    #[test]
    fn text_alphabet_keeps_astral_characters() {
        let text = "naïve 😀 façade\r\nzweite Zeile 😀";
        let compressed = compress(text.as_bytes(), Alphabet::Text).unwrap();
        assert_eq!(decompress(&compressed, Alphabet::Text).unwrap(), text.as_bytes());
    }

    #[test]
    fn bytes_alphabet_keeps_binary_data() {
        let data: Vec<u8> = (0..=255u8).chain((0..=255u8).rev()).chain([0xFF; 10]).collect();
        let compressed = compress(&data, Alphabet::Bytes).unwrap();
        assert_eq!(decompress(&compressed, Alphabet::Bytes).unwrap(), data);
    }

    #[test]
    fn foreign_tree_reports_unsupported_symbol() {
        let tree = tree_for(&mut Alphabet::Text.source(&b"ab"[..])).unwrap();
        let result = compress_with_tree(&tree, &mut Alphabet::Text.source(&b"abc"[..]), Vec::new());
        assert!(matches!(result, Err(CodecError::UnsupportedSymbol(Symbol::Char(0x63)))));

        let no_sentinel = HuffmanTree::from_root(TreeElement::merge(
            TreeElement::leaf(Symbol::Char(0x61), 1),
            TreeElement::leaf(Symbol::Char(0x62), 1),
        ))
        .unwrap();
        let result = compress_with_tree(&no_sentinel, &mut Alphabet::Text.source(&b"ab"[..]), Vec::new());
        assert!(matches!(result, Err(CodecError::UnsupportedSymbol(Symbol::EndOfStream))));
    }

    #[test]
    fn assembled_tree_with_nul_round_trips() {
        let orders = [
            (Symbol::EndOfStream, Symbol::Char(0)),
            (Symbol::Char(0), Symbol::EndOfStream),
        ];
        for (left, right) in orders {
            let tree = HuffmanTree::from_root(TreeElement::merge(
                TreeElement::leaf(left, 1),
                TreeElement::leaf(right, 1),
            ))
            .unwrap();
            assert_eq!(tree.codes().last().map(|(symbol, _)| *symbol), Some(Symbol::EndOfStream));

            let mut compressed = Vec::new();
            compress_with_tree(&tree, &mut Alphabet::Bytes.source(&b"\0\0"[..]), &mut compressed).unwrap();

            let mut restored = Vec::new();
            let stats = decompress_stream(&compressed[..], Alphabet::Bytes, &mut restored).unwrap();
            assert_eq!(stats.symbols, 2);
            assert_eq!(restored, b"\0\0");
        }
    }

    #[test]
    fn code_table_memoizes() {
        let tree = tree_for(&mut Alphabet::Text.source(&b"abracadabra"[..])).unwrap();
        let mut table = CodeTable::new(&tree);
        assert!(table.is_empty());
        let first = table.code(Symbol::Char(0x61)).unwrap().clone();
        assert_eq!(table.code(Symbol::Char(0x61)).unwrap(), &first);
        assert_eq!(table.len(), 1);
        assert!(table.code(Symbol::Char(0x7A)).is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn files_round_trip() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("input.txt");
        let compressed = dir.path().join("input.txt.huf");
        let restored = dir.path().join("dec_input.txt");
        fs::write(&source, "the quick brown fox jumps over the lazy dog\n".repeat(20)).unwrap();

        let report = compress_file(&source, &compressed, Alphabet::Text).unwrap();
        assert_eq!(report.source_bytes, 880);
        assert_eq!(report.stats.compressed_bytes, fs::metadata(&compressed).unwrap().len());
        assert!(report.ratio() < 1.0);

        let back = decompress_file(&compressed, &restored, Alphabet::Text).unwrap();
        assert_eq!(back.decompressed_bytes, 880);
        assert_eq!(fs::read(&source).unwrap(), fs::read(&restored).unwrap());
    }

    #[test]
    fn failed_runs_leave_no_output() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.txt");
        let compressed = dir.path().join("empty.txt.huf");
        fs::write(&empty, "").unwrap();
        assert!(matches!(
            compress_file(&empty, &compressed, Alphabet::Text),
            Err(CodecError::InvalidInput(_))
        ));
        assert!(!compressed.exists());

        let source = dir.path().join("text.txt");
        let truncated = dir.path().join("text.txt.huf");
        let restored = dir.path().join("dec_text.txt");
        let mut bytes = compress(b"abracadabra", Alphabet::Text).unwrap();
        bytes.pop();
        fs::write(&source, "abracadabra").unwrap();
        fs::write(&truncated, bytes).unwrap();
        assert!(matches!(
            decompress_file(&truncated, &restored, Alphabet::Text),
            Err(CodecError::Underflow { .. })
        ));
        assert!(!restored.exists());
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = tempdir().unwrap();
        let result = compress_file(&dir.path().join("nope"), &dir.path().join("nope.huf"), Alphabet::Text);
        assert!(matches!(result, Err(CodecError::Io(_))));
    }
}
