use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};
use hufpack::compressor::{Compressor, HuffmanCoding};
use hufpack::config::CodecConfig;
use voxell_timer::time_fn;
use walkdir::WalkDir;

use crate::cli::{CorpusArgs, require_dir};

pub fn corpus(args: CorpusArgs, config: &CodecConfig) -> Result<()> {
    require_dir(&args.input_dir)?;
    let mut compressor = HuffmanCoding::new(config.alphabet);
    let mut failures = 0usize;

    for entry in WalkDir::new(&args.input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let input = fs::read(path)?;

        let (compressed, comp_dur) = time_fn(|| compressor.compress_bytes(&input));
        let (decompressed, decomp_dur) = time_fn(|| match &compressed {
            Ok(bytes) => compressor.decompress_bytes(bytes),
            Err(_) => Ok(Vec::new()),
        });

        let outcome = match (compressed, decompressed) {
            (Ok(compressed), Ok(decompressed)) => Outcome {
                error: None,
                compressed,
                decompressed,
            },
            (Err(e), _) | (Ok(_), Err(e)) => Outcome {
                error: Some(e),
                compressed: Vec::new(),
                decompressed: Vec::new(),
            },
        };
        if !validate_and_print_results(outcome, path, &input, comp_dur, decomp_dur) {
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} file(s) failed the roundtrip", failures);
    }
    Ok(())
}

struct Outcome {
    error: Option<anyhow::Error>,
    compressed: Vec<u8>,
    decompressed: Vec<u8>,
}

fn validate_and_print_results(
    outcome: Outcome,
    path: &Path,
    expected: &[u8],
    compression_time: Duration,
    decompression_time: Duration,
) -> bool {
    let equality = expected == outcome.decompressed.as_slice();
    let original_size = expected.len();
    let compressed_size = outcome.compressed.len();
    let decompressed_size = outcome.decompressed.len();

    let ratio = if original_size == 0 {
        1.0
    } else {
        compressed_size as f64 / original_size as f64
    };

    let bytes_saved = original_size as isize - compressed_size as isize;
    let percent_saved = if original_size == 0 {
        0.0
    } else {
        (bytes_saved as f64) / (original_size as f64) * 100.0
    };

    let passed = equality && outcome.error.is_none();
    let passed_string = if passed { "PASSED" } else { "FAILED" };
    eprintln!(
        "======== {} {} ========\n\t{:.0?} encode\n\t{:.0?} decode\n\toriginal: {} bytes\n\tcompressed: {} bytes\n\tdecompressed: {} bytes\n\tratio: {:.1}% (compressed/original)\n\tsaved: {:+} bytes ({:+.1}%)\n\t{}",
        passed_string,
        path.display(),
        compression_time,
        decompression_time,
        original_size,
        compressed_size,
        decompressed_size,
        ratio * 100.0,
        bytes_saved,
        percent_saved,
        match &outcome.error {
            Some(e) => format!("error: {:#}", e),
            None if !equality => "error: decompressed data differs from the original".to_string(),
            None => String::new(),
        }
    );
    passed
}
