//! cli component of the hufpack project.
//!
//! `$exename` stands for the executable name, `<description>` denotes a required argument and
//! `[description]` an optional one.
//!
//! > `$exename compress <path to file> <output directory> [--alphabet text|bytes] [--config <file>]`
//!
//! writes `<output directory>/<file name>.huf` and prints the compression ratio (compressed size / original size).
//!
//! > `$exename decompress <path to file.huf> <output directory> [--alphabet text|bytes] [--config <file>]`
//!
//! the input must carry the configured suffix (`.huf` by default). the output is written to
//! `<output directory>/dec_<file name without the suffix>`. the alphabet is not stored in the compressed
//! file, so it has to match the one used for compression.
//!
//! > `$exename test <path to file>`
//!
//! compresses the file in memory, immediately decompresses it and compares the result with the original.
//!
//! > `$exename corpus <path to folder>`
//!
//! runs the round trip of `test` over every file below the folder and prints a report per file.
//!
//! > `$exename inspect <path to file> [--symbols <characters>]`
//!
//! prints the tree built for the file and the code of every symbol (or only of the given characters).
//!
//! > `$exename config save <output path>`
//!
//! writes the effective configuration as json, to be passed back with `--config`.
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use hufpack::config::{CodecConfig, ConfigError};
use hufpack::symbols::Alphabet;
use thiserror::Error;

pub mod compress;
pub mod config;
pub mod corpus;
pub mod decompress;
pub mod inspect;
pub mod test;

/// Error types for CLI preconditions
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0} does not exist or is not a file")]
    NotAFile(PathBuf),

    #[error("{0} does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// CLI arguments for the hufpack application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands for hufpack
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a file into a directory
    #[command(alias = "c")]
    Compress(CompressArgs),

    /// Decompress a .huf file into a directory
    #[command(alias = "d")]
    Decompress(DecompressArgs),

    /// Test the compression/decompression roundtrip of a file
    Test(TestArgs),

    /// Test the roundtrip of every file below a directory
    Corpus(CorpusArgs),

    /// Print the tree and codes built for a file
    Inspect(InspectArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Options shared by every command
#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Load settings from a JSON file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// How file contents map to symbols, overriding the configuration
    #[arg(long, global = true, value_enum)]
    pub alphabet: Option<Alphabet>,
}

impl SettingsArgs {
    /// The configuration file, if any, with command line overrides applied.
    pub fn resolve(&self) -> Result<CodecConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => CodecConfig::from_file(path)?,
            None => CodecConfig::default(),
        };
        if let Some(alphabet) = self.alphabet {
            config.alphabet = alphabet;
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Path to the file to compress
    pub input: PathBuf,

    /// Directory receiving the compressed file
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct DecompressArgs {
    /// Path to the compressed file
    pub input: PathBuf,

    /// Directory receiving the decompressed file
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to the file to round-trip
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct CorpusArgs {
    /// Directory whose files are round-tripped
    #[arg(default_value = "./test_data")]
    pub input_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the file whose tree is printed
    pub input: PathBuf,

    /// Only print the codes of these characters
    #[arg(long)]
    pub symbols: Option<String>,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Save the effective configuration to a file
    Save {
        /// Output file path
        output_path: PathBuf,
    },
}

pub fn require_file(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::NotAFile(path.to_path_buf()))
    }
}

pub fn require_dir(path: &Path) -> Result<(), CliError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CliError::NotADirectory(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_options_after_the_command() {
        let cli = Cli::try_parse_from(["hufpack", "c", "in.txt", "out", "--alphabet", "bytes"]).unwrap();
        assert!(matches!(cli.command, Command::Compress(_)));
        assert_eq!(cli.settings.resolve().unwrap().alphabet, Alphabet::Bytes);
    }

    #[test]
    fn defaults_without_config() {
        let cli = Cli::try_parse_from(["hufpack", "decompress", "in.txt.huf", "out"]).unwrap();
        assert_eq!(cli.settings.resolve().unwrap(), CodecConfig::default());
    }

    #[test]
    fn rejects_missing_paths() {
        assert!(matches!(require_file(Path::new("/definitely/not/here")), Err(CliError::NotAFile(_))));
        assert!(matches!(require_dir(Path::new("/definitely/not/here")), Err(CliError::NotADirectory(_))));
    }
}
