//! Child-side module filter bridge.
//!
//! A preload hook pipes the text of a module it is about to evaluate
//! through this binary: module path as the single argument, source on
//! stdin, rewritten source on stdout. Rewriting happens on the in-memory
//! copy only; the module's file on disk is never touched. A source that
//! fails to parse exits non-zero so the host tool's own error handling
//! sees the failure instead of evaluating half-rewritten text.

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;
use wedge::channel::LaunchContext;
use wedge::registry::AdapterDir;
use wedge::rules;
use wedge_rewrite::Rewriter;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let module_path = std::env::args()
        .nth(1)
        .context("usage: wedge-filter <module-path>")?;
    let context = LaunchContext::from_env()?;
    let adapters = AdapterDir::locate()?;

    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("reading module source")?;

    let mut rewriter = Rewriter::new(rules::rules_for(&context, &adapters)?);
    let output = rewriter.maybe_rewrite(Path::new(&module_path), &source)?;
    std::io::stdout()
        .write_all(output.as_bytes())
        .context("writing rewritten source")?;
    Ok(())
}
