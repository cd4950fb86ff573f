use std::fs;

use anyhow::{Result, bail};
use hufpack::compressor::{Compressor, HuffmanCoding};
use hufpack::config::CodecConfig;

use crate::cli::{TestArgs, require_file};

pub fn test(args: TestArgs, config: &CodecConfig) -> Result<()> {
    require_file(&args.input)?;
    let data = fs::read(&args.input)?;
    let mut compressor = HuffmanCoding::new(config.alphabet);
    let result = compressor.test_roundtrip(&data)?;

    println!(
        "{}: {} -> {} bytes, ratio {:.1}%",
        args.input.display(),
        data.len(),
        result.get_compressed().len(),
        result.ratio() * 100.0
    );
    if !result.is_successful() {
        bail!(
            "roundtrip mismatch: expected {} bytes, got {} bytes",
            data.len(),
            result.get_decompressed().len()
        );
    }
    println!("PASSED");
    Ok(())
}
