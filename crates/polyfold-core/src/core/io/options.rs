use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Wire encoding a writer serializes records with.
///
/// Readers never consult this: each record's encoding is detected from its
/// leading byte, so containers written by differently-configured tools
/// merge-append into one readable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Human-readable, line-delimited fields.
    #[default]
    Text,
    /// Packed fixed-width numeric fields.
    Binary,
}

/// Configuration for silent-file reading and writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SilentOptions {
    /// Encoding used when writing records.
    pub encoding: Encoding,
    /// Treat a record cut short by end of file as "stream ends early"
    /// instead of an error. Off by default: a short read is corruption
    /// unless a concurrent writer's unflushed tail is expected.
    pub tolerate_truncated_tail: bool,
}

impl SilentOptions {
    /// Options with binary output, the usual choice for production runs.
    pub fn binary() -> Self {
        Self {
            encoding: Encoding::Binary,
            ..Self::default()
        }
    }

    /// Loads options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, OptionsLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| OptionsLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| OptionsLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

#[derive(Debug, Error)]
pub enum OptionsLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}
