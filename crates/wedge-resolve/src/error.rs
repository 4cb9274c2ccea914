//! Error types for command and version resolution.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command '{0}' not found under the binaries directory")]
    NotFound(String),

    #[error("cannot read indirection for command '{command}': {source}")]
    Indirection {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no shim target recognized in '{0}'")]
    ShimTarget(PathBuf),

    #[error("no package descriptor found above '{0}'")]
    DescriptorMissing(PathBuf),

    #[error("cannot read package descriptor '{path}': {source}")]
    DescriptorRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("package descriptor '{0}' has no version field")]
    VersionMissing(PathBuf),

    #[error("invalid version '{version}' in '{path}': {source}")]
    VersionParse {
        version: String,
        path: PathBuf,
        #[source]
        source: semver::Error,
    },

    #[error("dependency '{dependency}' not installed anywhere above '{from}'")]
    DependencyMissing { dependency: String, from: PathBuf },
}
