//! Application error kinds and their exit behavior.
//!
//! Every variant is terminal for the invocation: printed once, exit 1,
//! never retried. A child that starts and fails is not an error here; its
//! exit code is relayed as the router's own.

use crate::registry::UnsupportedMajor;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command name not specified.")]
    Usage,

    #[error("invalid arguments: {0}")]
    Arguments(String),

    #[error("'{0}' not located.")]
    Anchor(String),

    #[error("command '{0}' not supported.")]
    NotSupported(String),

    #[error("cannot resolve command '{command}': {source}")]
    Resolution {
        command: String,
        #[source]
        source: wedge_resolve::Error,
    },

    #[error("cannot detect version for '{tool}': {source}")]
    VersionDetect {
        tool: String,
        #[source]
        source: wedge_resolve::Error,
    },

    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedMajor),

    #[error("adapter module '{name}' not found under '{root}'")]
    AdapterMissing { name: String, root: PathBuf },

    #[error("cannot locate the adapters directory: {0}")]
    AdapterRoot(#[source] std::io::Error),

    #[error("runtime binary not found: {0}")]
    Runtime(#[source] which::Error),

    #[error("cannot spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("channel key '{0}' missing or invalid")]
    Channel(&'static str),
}
