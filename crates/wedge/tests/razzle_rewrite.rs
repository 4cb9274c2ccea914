//! End-to-end rewrite of a razzle-style bin module through the rule set
//! the filter bridge applies.

use std::fs;
use std::path::{Path, PathBuf};
use wedge::channel::LaunchContext;
use wedge::registry::AdapterDir;
use wedge::rules;
use wedge_rewrite::Rewriter;

const RAZZLE_BIN: &str = r#"#! /usr/bin/env node
'use strict';

process.on('unhandledRejection', err => {
  throw err;
});

const spawn = require('react-dev-utils/crossSpawn');
const args = process.argv.slice(2);

const scriptIndex = args.findIndex(x => x === 'build' || x === 'start' || x === 'test');
const script = scriptIndex === -1 ? args[0] : args[scriptIndex];
const nodeArgs = scriptIndex > 0 ? args.slice(0, scriptIndex) : [];

switch (script) {
  case 'build':
  case 'start':
  case 'test': {
    const result = spawn.sync(
      'node',
      nodeArgs
        .concat([require.resolve('../scripts/' + script)])
        .concat(args.slice(scriptIndex + 1)),
      { stdio: 'inherit' }
    );
    process.exit(result.status);
    break;
  }
  default:
    console.log('Unknown script "' + script + '".');
    break;
}
"#;

fn adapters() -> (tempfile::TempDir, AdapterDir) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("webpack__4.x.js"), "").unwrap();
    fs::write(dir.path().join("jest__24.x.js"), "").unwrap();
    let adapter_dir = AdapterDir::new(dir.path().to_path_buf());
    (dir, adapter_dir)
}

fn context(args: &[&str]) -> LaunchContext {
    LaunchContext::new(
        "razzle",
        args.iter().map(|s| s.to_string()).collect(),
        PathBuf::from("/usr/bin/node"),
    )
}

fn rewrite(args: &[&str], module_path: &str) -> String {
    let (_dir, adapter_dir) = adapters();
    let rules = rules::rules_for(&context(args), &adapter_dir).unwrap();
    let mut rewriter = Rewriter::new(rules);
    rewriter
        .maybe_rewrite(Path::new(module_path), RAZZLE_BIN)
        .unwrap()
        .into_owned()
}

#[test]
fn build_invocation_injects_the_bundler_adapter() {
    let (dir, adapter_dir) = adapters();
    let register = dir.path().join("webpack__4.x.js");
    let rules = rules::rules_for(&context(&["build"]), &adapter_dir).unwrap();
    let mut rewriter = Rewriter::new(rules);
    let out = rewriter
        .maybe_rewrite(
            Path::new("/proj/node_modules/razzle/bin/razzle.js"),
            RAZZLE_BIN,
        )
        .unwrap();

    let expected = RAZZLE_BIN
        .replacen(
            "[require.resolve",
            &format!("['-r', '{}', require.resolve", register.display()),
            1,
        )
        .replacen("'node',", "'/usr/bin/node',", 1);
    assert_eq!(out.as_ref(), expected);
}

#[test]
fn test_invocation_injects_the_runner_adapter() {
    let out = rewrite(&["test"], "/proj/node_modules/razzle/bin/razzle.js");
    assert!(out.contains("jest__24.x.js"));
    assert!(!out.contains("webpack__4.x.js"));
}

#[test]
fn unrelated_module_paths_pass_through_borrowed() {
    let out = rewrite(&["build"], "/proj/node_modules/razzle/lib/other.js");
    assert_eq!(out, RAZZLE_BIN);
}

#[test]
fn rewriting_is_deterministic() {
    let (_dir, adapter_dir) = adapters();
    let path = Path::new("/proj/node_modules/razzle/bin/razzle.js");
    let outputs: Vec<String> = (0..2)
        .map(|_| {
            let rules = rules::rules_for(&context(&["build"]), &adapter_dir).unwrap();
            Rewriter::new(rules)
                .maybe_rewrite(path, RAZZLE_BIN)
                .unwrap()
                .into_owned()
        })
        .collect();
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn string_literals_outside_the_spawn_call_survive() {
    let out = rewrite(&["build"], "/proj/node_modules/razzle/bin/razzle.js");
    // the switch arms compare against plain literals and must not change
    assert!(out.contains("case 'build':"));
    assert!(out.contains("x === 'test'"));
    assert!(out.contains("'Unknown script \"'"));
}
