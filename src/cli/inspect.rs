use std::fs::File;
use std::io::BufReader;

use anyhow::Result;
use hufpack::codec;
use hufpack::config::CodecConfig;
use hufpack::tree::{HuffmanTree, Symbol};

use crate::cli::{InspectArgs, require_file};

pub fn inspect(args: InspectArgs, config: &CodecConfig) -> Result<()> {
    require_file(&args.input)?;
    let mut source = config.alphabet.source(BufReader::new(File::open(&args.input)?));
    let tree = codec::tree_for(&mut source)?;

    println!("Tree: {}", tree);
    println!(
        "Leaves: {}, depth: {}, header: {} bits",
        tree.leaf_count(),
        tree.depth(),
        tree.header_bits()
    );

    match &args.symbols {
        Some(symbols) => print_requested(&tree, symbols),
        None => {
            for (symbol, code) in tree.codes() {
                println!("Code of {} = {}", symbol, code);
            }
        }
    }
    Ok(())
}

fn print_requested(tree: &HuffmanTree, symbols: &str) {
    for unit in symbols.encode_utf16() {
        let symbol = Symbol::Char(unit);
        match tree.code_for(symbol) {
            Some(code) => println!("Code of {} = {}", symbol, code),
            None => println!("Code of {} = not present in the tree", symbol),
        }
    }
}
