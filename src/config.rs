//! Persistent codec settings.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::symbols::Alphabet;

pub const DEFAULT_SUFFIX: &str = ".huf";
pub const DEFAULT_DECOMPRESSED_PREFIX: &str = "dec_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("path has no usable file name: {0}")]
    InvalidPath(PathBuf),

    #[error("file {path} should end with the {suffix} suffix")]
    MissingSuffix { path: PathBuf, suffix: String },
}

/// Settings shared by compression and decompression, stored as JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CodecConfig {
    /// How uncompressed bytes map to symbols. Must match between compression and decompression.
    pub alphabet: Alphabet,

    /// Appended to the file name of compressed files, and required on files to decompress.
    pub suffix: String,

    /// Prepended to the file name of decompressed files.
    pub decompressed_prefix: String,

    /// Version of the tool that wrote the configuration.
    pub version: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::default(),
            suffix: DEFAULT_SUFFIX.to_string(),
            decompressed_prefix: DEFAULT_DECOMPRESSED_PREFIX.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl CodecConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// `directory/<file name of source><suffix>`
    pub fn compressed_path(&self, source: &Path, directory: &Path) -> Result<PathBuf, ConfigError> {
        let name = file_name(source)?;
        Ok(directory.join(format!("{}{}", name, self.suffix)))
    }

    /// `directory/<prefix><file name of source without the suffix>`
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingSuffix`] if the source file name does not end with the suffix.
    pub fn decompressed_path(&self, source: &Path, directory: &Path) -> Result<PathBuf, ConfigError> {
        let name = file_name(source)?;
        let stem = name
            .strip_suffix(self.suffix.as_str())
            .ok_or_else(|| ConfigError::MissingSuffix {
                path: source.to_path_buf(),
                suffix: self.suffix.clone(),
            })?;
        Ok(directory.join(format!("{}{}", self.decompressed_prefix, stem)))
    }
}

fn file_name(path: &Path) -> Result<&str, ConfigError> {
    path.file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ConfigError::InvalidPath(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn output_names() {
        let config = CodecConfig::default();
        let out = Path::new("/tmp/out");
        assert_eq!(
            config.compressed_path(Path::new("docs/notes.txt"), out).unwrap(),
            out.join("notes.txt.huf")
        );
        assert_eq!(
            config.decompressed_path(Path::new("docs/notes.txt.huf"), out).unwrap(),
            out.join("dec_notes.txt")
        );
    }

    #[test]
    fn decompression_requires_the_suffix() {
        let config = CodecConfig::default();
        let err = config
            .decompressed_path(Path::new("notes.txt"), Path::new("."))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSuffix { .. }));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: CodecConfig = serde_json::from_str(r#"{ "alphabet": "bytes" }"#).unwrap();
        assert_eq!(config.alphabet, Alphabet::Bytes);
        assert_eq!(config.suffix, DEFAULT_SUFFIX);
        assert_eq!(config.decompressed_prefix, DEFAULT_DECOMPRESSED_PREFIX);
    }

    #[test]
    fn saves_and_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hufpack.json");
        let config = CodecConfig {
            alphabet: Alphabet::Bytes,
            suffix: ".hz".to_string(),
            ..CodecConfig::default()
        };
        config.save_to_file(&path).unwrap();
        assert_eq!(CodecConfig::from_file(&path).unwrap(), config);
    }
}
