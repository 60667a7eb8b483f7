use polyfold::core::build::BuildError;
use polyfold::core::io::codec::CodecError;
use polyfold::core::io::container::ContainerError;
use polyfold::core::io::options::OptionsLoadError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Options error: {0}")]
    Options(#[from] OptionsLoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),
}
