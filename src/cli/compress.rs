use anyhow::Result;
use hufpack::codec;
use hufpack::config::CodecConfig;

use crate::cli::{CompressArgs, require_dir, require_file};

pub fn compress(args: CompressArgs, config: &CodecConfig) -> Result<()> {
    require_file(&args.input)?;
    require_dir(&args.output_dir)?;
    let destination = config.compressed_path(&args.input, &args.output_dir)?;

    let report = codec::compress_file(&args.input, &destination, config.alphabet)?;
    if_tracing! {
        tracing::info!(target: "cli", event = "compress_complete", input = %args.input.display(), output = %destination.display(), elapsed_us = %report.elapsed.as_micros(), "compress finished");
    }

    let ratio = report.ratio();
    println!("Compressed file: {}", destination.display());
    println!(
        "Compression ratio = {} / {} = {:.4} ({:.2} %)",
        report.stats.compressed_bytes,
        report.source_bytes,
        ratio,
        ratio * 100.0
    );
    Ok(())
}
