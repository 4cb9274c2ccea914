//! Command shim resolution and tool version discovery.
//!
//! # Architecture
//!
//! - `resolver.rs` - binaries-directory entry resolution (symlink or
//!   dispatch shim)
//! - `version.rs` - package descriptor walking and semver parsing
//!
//! Both halves are pure filesystem lookups; policy about which major
//! versions are supported lives with the caller.

pub use error::{Error, Result};
pub use resolver::{normalize, resolve_command, ResolvedCommand, BIN_DIR};
pub use version::{command_version, dependency_version, ToolVersion, DESCRIPTOR};

mod error;
mod resolver;
mod version;
