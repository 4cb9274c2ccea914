//! Command routing: one dispatch branch per tool family.
//!
//! Control flow is strictly resolve → dispatch → write channel → spawn
//! and block → relay exit code. Tools wedge knows by name get their own
//! branch; everything else falls through to the generic path, which
//! treats the command as a bundler wrapper and keys the adapter off the
//! wrapped bundler's version.

use crate::channel::LaunchContext;
use crate::cli::{self, App, Invocation};
use crate::error::{Error, Result};
use crate::launcher::Launcher;
use crate::project;
use crate::registry::{Adapter, AdapterDir};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;
use wedge_resolve::{
    command_version, dependency_version, resolve_command, ResolvedCommand,
};

/// Per-invocation lookup roots, separated from ambient process state so
/// dispatch is testable.
#[derive(Clone, Debug)]
pub struct Session {
    pub root: PathBuf,
    pub adapters: AdapterDir,
}

impl Session {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            root: project::locate_root()?,
            adapters: AdapterDir::locate()?,
        })
    }
}

/// Parse argv, dispatch, and hand back the exit code to relay.
pub fn run() -> Result<i32> {
    let invocation = App::parse().into_invocation()?;
    let session = Session::from_env()?;
    dispatch(&session, invocation)
}

pub fn dispatch(session: &Session, invocation: Invocation) -> Result<i32> {
    debug!(command = %invocation.command, args = ?invocation.args, "dispatching");
    match invocation.command.as_str() {
        "react-scripts" => launch_react_scripts(session, &invocation),
        "razzle" => launch_razzle(session, &invocation),
        "node" => launch_node(session, &invocation),
        "mocha" => launch_mocha(session, &invocation),
        "jest" => launch_jest(session, &invocation),
        _ => launch_generic(session, &invocation),
    }
}

/// Webpack itself, and every tool that wraps it without further ceremony
/// (electron-webpack, next, taro, the storybook commands, anything
/// unknown): preload the adapter for the webpack version the tool
/// actually depends on.
fn launch_generic(session: &Session, invocation: &Invocation) -> Result<i32> {
    let prepared: std::result::Result<(ResolvedCommand, u64), wedge_resolve::Error> = (|| {
        let resolved = resolve_command(&session.root, &invocation.command)?;
        let version = dependency_version(&resolved.path, "webpack")?;
        Ok((resolved, version.major()))
    })();
    let (resolved, major) =
        prepared.map_err(|_| Error::NotSupported(invocation.command.clone()))?;
    let register = session.adapters.module(Adapter::webpack(major)?)?;
    let launcher = Launcher::from_env()?;
    let context = base_context(invocation, &launcher);
    let exec = exec_args(&register, Some(&resolved.path), &invocation.args);
    launcher.launch(&[], &exec, &context)
}

fn launch_react_scripts(session: &Session, invocation: &Invocation) -> Result<i32> {
    let resolved = resolve_named(session, invocation)?;
    let version = command_version(&resolved.path).map_err(|source| Error::VersionDetect {
        tool: invocation.command.clone(),
        source,
    })?;
    let adapter = Adapter::react_scripts(version.major())?;
    let register = session.adapters.module(adapter)?;
    let launcher = Launcher::from_env()?;
    let mut context = base_context(invocation, &launcher);
    context.pre_config = Some(session.adapters.pre_config(adapter)?);
    context.skip_preflight_check = true;
    let exec = exec_args(&register, Some(&resolved.path), &invocation.args);
    launcher.launch(&[], &exec, &context)
}

fn launch_razzle(session: &Session, invocation: &Invocation) -> Result<i32> {
    let resolved = resolve_named(session, invocation)?;
    let adapter = Adapter::Razzle;
    let register = session.adapters.module(adapter)?;
    let launcher = Launcher::from_env()?;
    let mut context = base_context(invocation, &launcher);
    context.pre_config = Some(session.adapters.pre_config(adapter)?);
    let exec = exec_args(&register, Some(&resolved.path), &invocation.args);
    launcher.launch(&[], &exec, &context)
}

fn launch_node(session: &Session, invocation: &Invocation) -> Result<i32> {
    let (extra, rest) = cli::parse_node_like(&invocation.args)?;
    let register = session.adapters.module(Adapter::NodeLike)?;
    let launcher = Launcher::from_env()?;
    let mut context = base_context(invocation, &launcher);
    context.extra_options = extra;
    let exec = exec_args(&register, None, &rest);
    launcher.launch(&[], &exec, &context)
}

/// Mocha is runtime-like, but the preload rides its own `-r` flag so the
/// adapter lands inside mocha's module loading, not just node's.
fn launch_mocha(session: &Session, invocation: &Invocation) -> Result<i32> {
    let (extra, rest) = cli::parse_node_like(&invocation.args)?;
    let resolved = resolve_named(session, invocation)?;
    let register = session.adapters.module(Adapter::NodeLike)?;
    let launcher = Launcher::from_env()?;
    let mut context = base_context(invocation, &launcher);
    context.extra_options = extra;
    let mut exec = vec![
        resolved.path.to_string_lossy().into_owned(),
        "-r".to_string(),
        register.to_string_lossy().into_owned(),
    ];
    exec.extend(rest);
    launcher.launch(&[], &exec, &context)
}

fn launch_jest(session: &Session, invocation: &Invocation) -> Result<i32> {
    let extra = cli::parse_jest(&invocation.args)?;
    let resolved = resolve_named(session, invocation)?;
    let version = command_version(&resolved.path).map_err(|source| Error::VersionDetect {
        tool: invocation.command.clone(),
        source,
    })?;
    let register = session.adapters.module(Adapter::jest(version.major())?)?;
    let launcher = Launcher::from_env()?;
    let context = base_context(invocation, &launcher);
    let mut exec = vec![
        "-r".to_string(),
        register.to_string_lossy().into_owned(),
        resolved.path.to_string_lossy().into_owned(),
    ];
    exec.extend(extra.jest_args.iter().cloned());
    exec.extend(extra.rest.iter().cloned());
    launcher.launch(&extra.node_args, &exec, &context)
}

fn resolve_named(session: &Session, invocation: &Invocation) -> Result<ResolvedCommand> {
    resolve_command(&session.root, &invocation.command).map_err(|source| Error::Resolution {
        command: invocation.command.clone(),
        source,
    })
}

fn base_context(invocation: &Invocation, launcher: &Launcher) -> LaunchContext {
    LaunchContext::new(
        invocation.command.clone(),
        invocation.args.clone(),
        launcher.node_path().to_path_buf(),
    )
}

fn exec_args(register: &Path, target: Option<&Path>, args: &[String]) -> Vec<String> {
    let mut exec = vec!["-r".to_string(), register.to_string_lossy().into_owned()];
    if let Some(target) = target {
        exec.push(target.to_string_lossy().into_owned());
    }
    exec.extend(args.iter().cloned());
    exec
}
