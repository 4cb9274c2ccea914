//! Parent-to-child environment channel.
//!
//! The whole channel is one immutable [`LaunchContext`] built by the
//! parent, written into the child's environment immediately before spawn
//! and read back exactly once on the child side. Structured values cross
//! as JSON; everything else as plain strings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::process::Command;

pub const COMMAND_NAME: &str = "WEDGE_COMMAND_NAME";
pub const COMMAND_ARGS: &str = "WEDGE_COMMAND_ARGS";
pub const PROJECT_ANCHOR: &str = "WEDGE_PROJECT_ANCHOR";
pub const NODE_LIKE_EXTRA_OPTIONS: &str = "WEDGE_NODE_LIKE_EXTRA_OPTIONS";
pub const PRE_CONFIG: &str = "WEDGE_PRE_CONFIG";
pub const SKIP_PREFLIGHT_CHECK: &str = "WEDGE_SKIP_PREFLIGHT_CHECK";
pub const NODE_PATH: &str = "WEDGE_NODE_PATH";
pub const ADAPTER_DIR: &str = "WEDGE_ADAPTER_DIR";

/// Extra options for runtime-like tools (`node`, `mocha`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLikeExtraOptions {
    pub exts: Vec<String>,
}

/// Everything the child side may ask about the invocation that spawned it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchContext {
    pub command_name: String,
    pub args: Vec<String>,
    /// Runtime binary actually driving the child process.
    pub node_path: PathBuf,
    pub pre_config: Option<PathBuf>,
    pub extra_options: Option<NodeLikeExtraOptions>,
    pub skip_preflight_check: bool,
}

impl LaunchContext {
    pub fn new(command_name: impl Into<String>, args: Vec<String>, node_path: PathBuf) -> Self {
        Self {
            command_name: command_name.into(),
            args,
            node_path,
            pre_config: None,
            extra_options: None,
            skip_preflight_check: false,
        }
    }

    /// First pass-through argument, i.e. the wrapped tool's sub-command.
    pub fn sub_command(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// The channel as environment key/value pairs.
    pub fn env_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (COMMAND_NAME, self.command_name.clone()),
            (
                COMMAND_ARGS,
                serde_json::to_string(&self.args).unwrap_or_else(|_| "[]".into()),
            ),
            (NODE_PATH, self.node_path.to_string_lossy().into_owned()),
        ];
        if let Some(pre_config) = &self.pre_config {
            pairs.push((PRE_CONFIG, pre_config.to_string_lossy().into_owned()));
        }
        if let Some(extra) = &self.extra_options {
            pairs.push((
                NODE_LIKE_EXTRA_OPTIONS,
                serde_json::to_string(extra).unwrap_or_else(|_| "{}".into()),
            ));
        }
        if self.skip_preflight_check {
            pairs.push((SKIP_PREFLIGHT_CHECK, "true".into()));
        }
        pairs
    }

    /// Write the channel onto a command about to be spawned.
    pub fn apply(&self, command: &mut Command) {
        for (key, value) in self.env_pairs() {
            command.env(key, value);
        }
    }

    /// Child-side read from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Child-side read through an arbitrary lookup, for tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let command_name = lookup(COMMAND_NAME).ok_or(Error::Channel(COMMAND_NAME))?;
        let args: Vec<String> = lookup(COMMAND_ARGS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .ok_or(Error::Channel(COMMAND_ARGS))?;
        let node_path = PathBuf::from(lookup(NODE_PATH).ok_or(Error::Channel(NODE_PATH))?);
        let extra_options = match lookup(NODE_LIKE_EXTRA_OPTIONS) {
            Some(raw) => Some(
                serde_json::from_str(&raw).map_err(|_| Error::Channel(NODE_LIKE_EXTRA_OPTIONS))?,
            ),
            None => None,
        };
        Ok(Self {
            command_name,
            args,
            node_path,
            pre_config: lookup(PRE_CONFIG).map(PathBuf::from),
            extra_options,
            skip_preflight_check: lookup(SKIP_PREFLIGHT_CHECK).as_deref() == Some("true"),
        })
    }
}
