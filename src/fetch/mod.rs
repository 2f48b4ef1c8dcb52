pub mod classify;
pub mod file;
pub mod repo;
pub mod runner;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} failed ({detail})")]
    CommandFailed { command: String, detail: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("download failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: Box<FetchError>,
    },
}
