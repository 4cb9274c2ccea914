//! Tool version discovery from package descriptors.
//!
//! A tool's version lives in the nearest `package.json` above its
//! executable. A wrapped dependency's version lives in that dependency's
//! own installation root, found the way the module loader would see it
//! from the executable's directory.

use crate::error::{Error, Result};
use semver::Version;
use serde::Deserialize;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

pub const DESCRIPTOR: &str = "package.json";

/// Declared semantic version of a tool. Only the major component drives
/// adapter dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolVersion {
    raw: Version,
}

impl ToolVersion {
    pub fn major(&self) -> u64 {
        self.raw.major
    }

    pub fn raw(&self) -> &Version {
        &self.raw
    }
}

impl Deref for ToolVersion {
    type Target = Version;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl std::fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[derive(Debug, Deserialize)]
struct PackageDescriptor {
    version: Option<String>,
}

/// Version of the tool owning `executable`, read from the nearest
/// descriptor above it.
pub fn command_version(executable: &Path) -> Result<ToolVersion> {
    let start = executable.parent().unwrap_or(Path::new("."));
    read_version(&find_descriptor(start)?)
}

/// Version of `dependency` as installed for the tool owning `executable`.
pub fn dependency_version(executable: &Path, dependency: &str) -> Result<ToolVersion> {
    let start = executable.parent().unwrap_or(Path::new("."));
    let descriptor = start
        .ancestors()
        .map(|dir| dir.join("node_modules").join(dependency).join(DESCRIPTOR))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Error::DependencyMissing {
            dependency: dependency.to_string(),
            from: start.to_path_buf(),
        })?;
    read_version(&descriptor)
}

fn find_descriptor(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(DESCRIPTOR))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Error::DescriptorMissing(start.to_path_buf()))
}

fn read_version(descriptor: &Path) -> Result<ToolVersion> {
    let content = fs::read_to_string(descriptor).map_err(|source| Error::DescriptorRead {
        path: descriptor.to_path_buf(),
        source,
    })?;
    let parsed: PackageDescriptor = serde_json::from_str(&content)
        .map_err(|_| Error::VersionMissing(descriptor.to_path_buf()))?;
    let version = parsed
        .version
        .ok_or_else(|| Error::VersionMissing(descriptor.to_path_buf()))?;
    let raw = Version::parse(&version).map_err(|source| Error::VersionParse {
        version,
        path: descriptor.to_path_buf(),
        source,
    })?;
    Ok(ToolVersion { raw })
}
