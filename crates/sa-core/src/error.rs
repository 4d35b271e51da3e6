//! Error types for the dispatcher's actions.
//!
//! Only [`ConfigError`] is fatal. The others are caught by the dispatcher,
//! printed, and the loop continues.

use std::io;
use std::path::PathBuf;

use sa_backend::ApiError;
use thiserror::Error;

/// Startup failure; aborts before the loop begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{env_var} is not set and no api_key_cmd is configured (check your .env file)")]
    MissingCredential { env_var: &'static str },
    #[error("unknown backend '{0}' (expected 'openai' or 'anthropic')")]
    UnknownBackend(String),
    #[error("failed to initialize chat client: {0}")]
    Client(#[from] ApiError),
}

/// Failure retrieving a remote script.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("timed out after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failure preparing or launching a script.
///
/// A script that runs and exits non-zero is not an error; it produces a
/// normal `ExecutionResult`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("launch failure: {0}")]
    Launch(String),
}
