//! Rewrite rules applied inside child processes.
//!
//! Razzle spawns a second runtime process internally to run its own
//! bundler step. Without rewriting its bin module, that inner process
//! would run unmodified and the adapter would never reach it. The rule
//! splices the appropriate preload into the array razzle builds for its
//! synchronous spawn, and points the spawned `'node'` literal at the
//! runtime driving this invocation.

use crate::channel::LaunchContext;
use crate::error::Result;
use crate::registry::{Adapter, AdapterDir, JestMajor, WebpackMajor};
use once_cell::sync::Lazy;
use regex::Regex;
use wedge_rewrite::{CallShape, RewriteRule, SpliceOp};

static RAZZLE_BIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"node_modules[\\/]razzle[\\/]bin[\\/]razzle\.js$").unwrap());

/// Rules active for the current invocation's tool.
pub fn rules_for(context: &LaunchContext, adapters: &AdapterDir) -> Result<Vec<RewriteRule>> {
    match context.command_name.as_str() {
        "razzle" => Ok(vec![razzle_rule(context, adapters)?]),
        _ => Ok(Vec::new()),
    }
}

/// The adapter razzle's inner process needs, keyed on the sub-command
/// this invocation was started with: `test` runs the wrapped test runner,
/// everything else the wrapped bundler.
fn nested_adapter(context: &LaunchContext) -> Adapter {
    match context.sub_command() {
        Some("test") => Adapter::Jest(JestMajor::V24),
        _ => Adapter::Webpack(WebpackMajor::V4),
    }
}

fn razzle_rule(context: &LaunchContext, adapters: &AdapterDir) -> Result<RewriteRule> {
    let register = adapters.module(nested_adapter(context))?;
    let spawn_sync = CallShape::new("spawn", "sync");
    Ok(RewriteRule::new(
        RAZZLE_BIN.clone(),
        vec![
            SpliceOp::PrependToArray {
                within: spawn_sync.clone(),
                containing: CallShape::new("require", "resolve"),
                items: vec![
                    "-r".to_string(),
                    register.to_string_lossy().into_owned(),
                ],
            },
            SpliceOp::ReplaceString {
                within: spawn_sync,
                from: "node".to_string(),
                to: context.node_path.to_string_lossy().into_owned(),
            },
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn adapters_with_modules(dir: &std::path::Path) -> AdapterDir {
        fs::write(dir.join("webpack__4.x.js"), "").unwrap();
        fs::write(dir.join("jest__24.x.js"), "").unwrap();
        AdapterDir::new(dir.to_path_buf())
    }

    fn context(args: &[&str]) -> LaunchContext {
        LaunchContext::new(
            "razzle",
            args.iter().map(|s| s.to_string()).collect(),
            PathBuf::from("/usr/bin/node"),
        )
    }

    #[test]
    fn test_sub_command_selects_the_runner_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let adapters = adapters_with_modules(dir.path());
        let rules = rules_for(&context(&["test"]), &adapters).unwrap();
        let SpliceOp::PrependToArray { items, .. } = &rules[0].ops[0] else {
            panic!("expected a prepend op first");
        };
        assert_eq!(items[0], "-r");
        assert!(items[1].ends_with("jest__24.x.js"));
    }

    #[test]
    fn other_sub_commands_select_the_bundler_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let adapters = adapters_with_modules(dir.path());
        for sub in [&["build"][..], &["start"][..], &[][..]] {
            let rules = rules_for(&context(sub), &adapters).unwrap();
            let SpliceOp::PrependToArray { items, .. } = &rules[0].ops[0] else {
                panic!("expected a prepend op first");
            };
            assert!(items[1].ends_with("webpack__4.x.js"));
        }
    }

    #[test]
    fn non_razzle_invocations_carry_no_rules() {
        let dir = tempfile::tempdir().unwrap();
        let adapters = AdapterDir::new(dir.path().to_path_buf());
        let mut ctx = context(&[]);
        ctx.command_name = "webpack".to_string();
        assert!(rules_for(&ctx, &adapters).unwrap().is_empty());
    }
}
