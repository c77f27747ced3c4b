//! Error type shared by the packing pipeline, the glue writer and the build helper.
use std::{io, path::PathBuf};

/// A specialized `Result` type for packing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while packing resources into C source.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("Deflate stream error ({0:?})")]
    Compress(miniz_oxide::deflate::core::TDEFLStatus),
    #[error("Could not inflate embedded data")]
    Decompress(#[source] io::Error),
    #[error("Environment variable '{0}' not set by Cargo")]
    Var(&'static str),
    #[error("Path '{0}' has unsupported file type")]
    UnsupportedFileType(String),
    #[error("File '{}' does not exist or cannot be opened for reading", path.display())]
    ResourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Original size mismatch (total: {actual}, length: {expected})")]
    IntegrityMismatch { expected: u64, actual: u64 },
    #[error("Output '{}' cannot be opened for writing", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No glue resource named '{0}'")]
    UnknownGlue(String),
    #[error("'{0}' is not a valid C identifier")]
    InvalidIdentifier(String),
    #[error("Setting '{0}' must be greater than zero")]
    InvalidSetting(&'static str),
    #[error("Malformed string literal: {0}")]
    MalformedLiteral(String),
}
