//! Closed adapter registry.
//!
//! Adapter modules intercept a tool's configuration-construction step and
//! are versioned by the tool's major release, using the fixed
//! `<tool>__<major>.x` naming convention. The mapping is a static table:
//! an unmapped major is a typed failure, never a fallback to the nearest
//! known adapter.

use crate::channel;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("no adapter mapped for {tool} major version {major}")]
pub struct UnsupportedMajor {
    pub tool: &'static str,
    pub major: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebpackMajor {
    V4,
    V5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactScriptsMajor {
    V3,
    V4,
    V5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JestMajor {
    V24,
    V25,
    V26,
    V27,
}

/// One supported adapter family per variant; construction is the only
/// place a raw major number is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adapter {
    Webpack(WebpackMajor),
    ReactScripts(ReactScriptsMajor),
    Jest(JestMajor),
    /// Razzle's configuration API never left 3.x.
    Razzle,
    /// Runtime-like tools (`node`, `mocha`) share one unversioned adapter.
    NodeLike,
}

impl Adapter {
    pub fn webpack(major: u64) -> Result<Self, UnsupportedMajor> {
        match major {
            4 => Ok(Self::Webpack(WebpackMajor::V4)),
            5 => Ok(Self::Webpack(WebpackMajor::V5)),
            major => Err(UnsupportedMajor {
                tool: "webpack",
                major,
            }),
        }
    }

    pub fn react_scripts(major: u64) -> Result<Self, UnsupportedMajor> {
        match major {
            3 => Ok(Self::ReactScripts(ReactScriptsMajor::V3)),
            4 => Ok(Self::ReactScripts(ReactScriptsMajor::V4)),
            5 => Ok(Self::ReactScripts(ReactScriptsMajor::V5)),
            major => Err(UnsupportedMajor {
                tool: "react-scripts",
                major,
            }),
        }
    }

    pub fn jest(major: u64) -> Result<Self, UnsupportedMajor> {
        match major {
            24 => Ok(Self::Jest(JestMajor::V24)),
            25 => Ok(Self::Jest(JestMajor::V25)),
            26 => Ok(Self::Jest(JestMajor::V26)),
            27 => Ok(Self::Jest(JestMajor::V27)),
            major => Err(UnsupportedMajor {
                tool: "jest",
                major,
            }),
        }
    }

    /// Adapter module name under the adapters directory.
    pub fn module_name(&self) -> &'static str {
        match self {
            Self::Webpack(WebpackMajor::V4) => "webpack__4.x",
            Self::Webpack(WebpackMajor::V5) => "webpack__5.x",
            Self::ReactScripts(ReactScriptsMajor::V3) => "react-scripts__3.x",
            Self::ReactScripts(ReactScriptsMajor::V4) => "react-scripts__4.x",
            Self::ReactScripts(ReactScriptsMajor::V5) => "react-scripts__5.x",
            Self::Jest(JestMajor::V24) => "jest__24.x",
            Self::Jest(JestMajor::V25) => "jest__25.x",
            Self::Jest(JestMajor::V26) => "jest__26.x",
            Self::Jest(JestMajor::V27) => "jest__27.x",
            Self::Razzle => "razzle__3.x",
            Self::NodeLike => "node",
        }
    }

    /// Whether this adapter ships a configuration pre-processing hook.
    pub fn has_pre_config(&self) -> bool {
        matches!(self, Self::ReactScripts(_) | Self::Razzle)
    }
}

/// Filesystem lookup of adapter modules under a fixed root.
#[derive(Clone, Debug)]
pub struct AdapterDir {
    root: PathBuf,
}

impl AdapterDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Adapters live beside the router executable unless overridden
    /// through the channel key.
    pub fn locate() -> crate::error::Result<Self> {
        if let Some(root) = env::var_os(channel::ADAPTER_DIR) {
            return Ok(Self::new(PathBuf::from(root)));
        }
        let exe = env::current_exe().map_err(crate::error::Error::AdapterRoot)?;
        let dir = exe.parent().unwrap_or(Path::new(".")).join("adapters");
        Ok(Self::new(dir))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an adapter to its module file: `<name>.js`, or
    /// `<name>/index.js` for directory-shaped adapters.
    pub fn module(&self, adapter: Adapter) -> crate::error::Result<PathBuf> {
        let name = adapter.module_name();
        let file = self.root.join(format!("{name}.js"));
        if file.is_file() {
            return Ok(file);
        }
        let index = self.root.join(name).join("index.js");
        if index.is_file() {
            return Ok(index);
        }
        Err(crate::error::Error::AdapterMissing {
            name: name.to_string(),
            root: self.root.clone(),
        })
    }

    /// Resolve an adapter's configuration pre-processing hook.
    pub fn pre_config(&self, adapter: Adapter) -> crate::error::Result<PathBuf> {
        let name = adapter.module_name();
        let hook = self.root.join(name).join("pre-config.js");
        if hook.is_file() {
            return Ok(hook);
        }
        Err(crate::error::Error::AdapterMissing {
            name: format!("{name}/pre-config"),
            root: self.root.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn jest_27_maps_to_its_versioned_module() {
        let adapter = Adapter::jest(27).unwrap();
        assert_eq!(adapter.module_name(), "jest__27.x");
    }

    #[test]
    fn unmapped_major_is_a_typed_failure() {
        let err = Adapter::jest(99).unwrap_err();
        assert_eq!(err.tool, "jest");
        assert_eq!(err.major, 99);
        assert!(Adapter::webpack(3).is_err());
        assert!(Adapter::react_scripts(6).is_err());
    }

    #[test]
    fn module_lookup_prefers_flat_file_then_directory() {
        let dir = tempfile::tempdir().unwrap();
        let adapters = AdapterDir::new(dir.path().to_path_buf());

        fs::write(dir.path().join("node.js"), "").unwrap();
        assert_eq!(
            adapters.module(Adapter::NodeLike).unwrap(),
            dir.path().join("node.js")
        );

        fs::create_dir_all(dir.path().join("razzle__3.x")).unwrap();
        fs::write(dir.path().join("razzle__3.x/index.js"), "").unwrap();
        fs::write(dir.path().join("razzle__3.x/pre-config.js"), "").unwrap();
        assert_eq!(
            adapters.module(Adapter::Razzle).unwrap(),
            dir.path().join("razzle__3.x/index.js")
        );
        assert_eq!(
            adapters.pre_config(Adapter::Razzle).unwrap(),
            dir.path().join("razzle__3.x/pre-config.js")
        );
    }

    #[test]
    fn missing_adapter_module_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let adapters = AdapterDir::new(dir.path().to_path_buf());
        assert!(adapters.module(Adapter::Razzle).is_err());
    }
}
