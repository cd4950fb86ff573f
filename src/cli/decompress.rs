use anyhow::Result;
use hufpack::codec;
use hufpack::config::CodecConfig;

use crate::cli::{DecompressArgs, require_dir, require_file};

pub fn decompress(args: DecompressArgs, config: &CodecConfig) -> Result<()> {
    require_file(&args.input)?;
    require_dir(&args.output_dir)?;
    let destination = config.decompressed_path(&args.input, &args.output_dir)?;

    let report = codec::decompress_file(&args.input, &destination, config.alphabet)?;
    if_tracing! {
        tracing::info!(target: "cli", event = "decompress_complete", input = %args.input.display(), output = %destination.display(), elapsed_us = %report.elapsed.as_micros(), symbols = report.stats.symbols, "decompress finished");
    }

    println!("Decompressed file: {}", destination.display());
    Ok(())
}
