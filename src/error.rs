// Error types for dockerize
use camino::Utf8PathBuf;
use std::io;
use std::process::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Couldn't open binary {path}: {source}")]
    OpenBinary {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Interp of {path} is not valid UTF-8: {source}")]
    InvalidInterpreter {
        path: Utf8PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Couldn't read interp fully from {path}: declared {declared} bytes, {available} available")]
    TruncatedInterpreter {
        path: Utf8PathBuf,
        declared: u64,
        available: u64,
    },

    #[error("Couldn't run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed on {binary} ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        binary: Utf8PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Couldn't resolve {library} needed by {binary}")]
    UnresolvedLibrary {
        binary: Utf8PathBuf,
        library: String,
    },

    #[error("Need at least a binary as argument")]
    NoBinaries,

    #[error("Error opening output file {path}: {source}")]
    CreateOutput {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error writing output file {path}: {source}")]
    WriteOutput {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Couldn't archive {path}: {source}")]
    Archive {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}
