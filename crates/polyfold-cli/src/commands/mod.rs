pub mod build;
pub mod convert;
pub mod list;

use crate::error::{CliError, Result};
use polyfold::core::io::options::{Encoding, SilentOptions};
use std::path::Path;

/// Resolves silent-file options from an optional TOML file plus an
/// optional encoding override, in that precedence order.
pub fn resolve_options(
    options_path: Option<&Path>,
    encoding: Option<&str>,
) -> Result<SilentOptions> {
    let mut options = match options_path {
        Some(path) => SilentOptions::load(path)?,
        None => SilentOptions::default(),
    };
    if let Some(name) = encoding {
        options.encoding = parse_encoding(name)?;
    }
    Ok(options)
}

pub fn parse_encoding(name: &str) -> Result<Encoding> {
    match name.trim().to_ascii_lowercase().as_str() {
        "text" => Ok(Encoding::Text),
        "binary" => Ok(Encoding::Binary),
        other => Err(CliError::Argument(format!(
            "unknown encoding '{other}' (expected 'text' or 'binary')"
        ))),
    }
}
