//! Command-line surfaces.
//!
//! The router itself takes one tool name and passes everything after it
//! through untouched. A couple of tools additionally understand wedge-side
//! flags (`--ext` for runtime-like tools, inspector flags for jest); those
//! parsers only engage when the flag is actually present, so arbitrary
//! tool arguments never trip them.

use crate::channel::NodeLikeExtraOptions;
use crate::error::{Error, Result};
use clap::Parser;

/// `wedge <toolName> [args...]`
#[derive(Clone, Debug, Parser)]
#[command(
    name = "wedge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run a build/test tool with configuration injected into its pipeline",
    long_about = None
)]
pub struct App {
    /// Tool to run.
    #[arg(allow_hyphen_values = true)]
    pub command: Option<String>,

    /// Arguments passed through to the tool.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// The captured invocation, immutable once read from process start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
}

impl App {
    pub fn into_invocation(self) -> Result<Invocation> {
        let command = self.command.ok_or(Error::Usage)?;
        Ok(Invocation {
            command,
            args: self.args,
        })
    }
}

/// True when any of `flags` occurs in `args`, bare or `=`-assigned.
fn mentions(args: &[String], flags: &[&str]) -> bool {
    args.iter().any(|arg| {
        flags
            .iter()
            .any(|flag| arg == flag || arg.starts_with(&format!("{flag}=")))
    })
}

#[derive(Clone, Debug, Parser)]
#[command(name = "wedge node", no_binary_name = true, disable_help_flag = true)]
struct NodeLikeArgs {
    /// File extensions for module resolution, comma separated.
    #[arg(long = "ext")]
    ext: Option<String>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

/// Split runtime-like extra options out of the argument list. Returns the
/// options (when the flag is present) and the arguments to pass through.
pub fn parse_node_like(args: &[String]) -> Result<(Option<NodeLikeExtraOptions>, Vec<String>)> {
    if !mentions(args, &["--ext"]) {
        return Ok((None, args.to_vec()));
    }
    let parsed =
        NodeLikeArgs::try_parse_from(args).map_err(|e| Error::Arguments(e.to_string()))?;
    let exts = parsed
        .ext
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    Ok((Some(NodeLikeExtraOptions { exts }), parsed.rest))
}

#[derive(Clone, Debug, Parser)]
#[command(name = "wedge jest", no_binary_name = true, disable_help_flag = true)]
struct JestArgs {
    /// Activate the inspector.
    #[arg(long = "inspect", num_args = 0..=1, require_equals = true, default_missing_value = "")]
    inspect: Option<String>,

    /// Activate the inspector and break at the start of the script.
    #[arg(long = "inspect-brk", num_args = 0..=1, require_equals = true, default_missing_value = "")]
    inspect_brk: Option<String>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

/// Inspector flags lifted from a jest invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JestExtra {
    /// Flags for the runtime itself.
    pub node_args: Vec<String>,
    /// Flags forced onto jest so inspection is usable.
    pub jest_args: Vec<String>,
    /// Remaining pass-through arguments.
    pub rest: Vec<String>,
}

pub fn parse_jest(args: &[String]) -> Result<JestExtra> {
    if !mentions(args, &["--inspect", "--inspect-brk"]) {
        return Ok(JestExtra {
            rest: args.to_vec(),
            ..Default::default()
        });
    }
    let parsed = JestArgs::try_parse_from(args).map_err(|e| Error::Arguments(e.to_string()))?;
    let mut node_args = Vec::new();
    if let Some(address) = parsed.inspect {
        node_args = vec![if address.is_empty() {
            "--inspect".to_string()
        } else {
            format!("--inspect={address}")
        }];
    }
    // --inspect-brk wins when both are given
    if let Some(address) = parsed.inspect_brk {
        node_args = vec![if address.is_empty() {
            "--inspect-brk".to_string()
        } else {
            format!("--inspect-brk={address}")
        }];
    }
    let jest_args = if node_args.is_empty() {
        Vec::new()
    } else {
        // the inspector is only usable with a single worker
        vec!["--runInBand".to_string()]
    };
    Ok(JestExtra {
        node_args,
        jest_args,
        rest: parsed.rest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_command_is_a_usage_error() {
        let app = App::try_parse_from(["wedge"]).unwrap();
        assert!(matches!(app.into_invocation(), Err(Error::Usage)));
    }

    #[test]
    fn tool_flags_pass_through_untouched() {
        let app = App::try_parse_from(["wedge", "webpack", "--config", "w.js"]).unwrap();
        let invocation = app.into_invocation().unwrap();
        assert_eq!(invocation.command, "webpack");
        assert_eq!(invocation.args, args(&["--config", "w.js"]));
    }

    #[test]
    fn node_like_options_only_engage_when_present() {
        let (options, rest) = parse_node_like(&args(&["script.js", "--watch"])).unwrap();
        assert_eq!(options, None);
        assert_eq!(rest, args(&["script.js", "--watch"]));
    }

    #[test]
    fn node_like_ext_list_is_split() {
        let (options, rest) = parse_node_like(&args(&["--ext", ".ts,.tsx", "main.ts"])).unwrap();
        assert_eq!(
            options.unwrap().exts,
            vec![".ts".to_string(), ".tsx".to_string()]
        );
        assert_eq!(rest, args(&["main.ts"]));
    }

    #[test]
    fn jest_inspect_brk_wins_and_forces_single_worker() {
        let extra = parse_jest(&args(&["--inspect", "--inspect-brk=127.0.0.1:9229", "suite"]))
            .unwrap();
        assert_eq!(extra.node_args, args(&["--inspect-brk=127.0.0.1:9229"]));
        assert_eq!(extra.jest_args, args(&["--runInBand"]));
        assert_eq!(extra.rest, args(&["suite"]));
    }

    #[test]
    fn jest_without_inspect_flags_is_untouched() {
        let extra = parse_jest(&args(&["--coverage"])).unwrap();
        assert_eq!(extra, JestExtra {
            rest: args(&["--coverage"]),
            ..Default::default()
        });
    }
}
