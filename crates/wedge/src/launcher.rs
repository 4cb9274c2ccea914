//! Child process assembly and exit relay.
//!
//! The launcher owns the runtime binary choice and the final argument
//! vector: `[node_args..., front_end?, exec_args...]` where `exec_args`
//! already carries the preload flags and the target executable. Stdio is
//! inherited directly; the parent blocks until the child exits and relays
//! its status. No retries at this level: a child that cannot start or
//! fails is terminal for the invocation.

use crate::channel::LaunchContext;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

pub const NODE_BIN: &str = "WEDGE_NODE_BIN";

/// Alternate front-ends that cannot host a preload themselves.
static FRONT_END_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"node_modules[\\/]ts-node").unwrap(),
        Regex::new(r"ts-node(\.exe)?$").unwrap(),
    ]
});

#[derive(Clone, Debug)]
pub struct Launcher {
    /// The base runtime binary to spawn.
    node: PathBuf,
    /// A TypeScript-executing shim the invocation originally named; it is
    /// re-inserted as the first argument so the preload still attaches to
    /// a process that understands it.
    front_end: Option<PathBuf>,
}

impl Launcher {
    /// Pick the runtime: the configured binary, or `node` from PATH.
    pub fn from_env() -> Result<Self> {
        match env::var_os(NODE_BIN).map(PathBuf::from) {
            Some(configured) => Ok(Self::with_runtime(configured)?),
            None => {
                let node = which::which("node").map_err(Error::Runtime)?;
                Ok(Self {
                    node,
                    front_end: None,
                })
            }
        }
    }

    /// Build a launcher around an explicit runtime path, demoting an
    /// alternate front-end to a first argument of the real runtime.
    pub fn with_runtime(runtime: PathBuf) -> Result<Self> {
        if is_front_end(&runtime) {
            let node = which::which("node").map_err(Error::Runtime)?;
            Ok(Self {
                node,
                front_end: Some(runtime),
            })
        } else {
            Ok(Self {
                node: runtime,
                front_end: None,
            })
        }
    }

    /// The binary that will actually be spawned.
    pub fn node_path(&self) -> &Path {
        &self.node
    }

    /// Spawn the runtime with the channel applied and block until it
    /// exits. Returns the child's exit code; a signal-killed child counts
    /// as failure.
    pub fn launch(
        &self,
        node_args: &[String],
        exec_args: &[String],
        context: &LaunchContext,
    ) -> Result<i32> {
        let mut command = Command::new(&self.node);
        command.args(node_args);
        if let Some(front_end) = &self.front_end {
            command.arg(front_end);
        }
        command.args(exec_args);
        context.apply(&mut command);

        debug!(
            runtime = %self.node.display(),
            front_end = ?self.front_end,
            ?node_args,
            ?exec_args,
            "spawning child"
        );

        let status = command.status().map_err(|source| Error::Spawn {
            program: self.node.to_string_lossy().into_owned(),
            source,
        })?;
        Ok(status.code().unwrap_or(1))
    }
}

fn is_front_end(runtime: &Path) -> bool {
    let text = runtime.to_string_lossy();
    FRONT_END_PATTERNS.iter().any(|p| p.is_match(&text))
}
