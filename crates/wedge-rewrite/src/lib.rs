//! Rule-based, in-memory source rewriting for modules a wrapped tool is
//! about to load.
//!
//! # Architecture
//!
//! - `lexer.rs` - byte-preserving JavaScript lexer
//! - `tree.rs` - balanced delimiter tree and rendering
//! - `splice.rs` - declarative splice operations and the traversal driver
//!
//! A [`RewriteRule`] pairs a module-path predicate with a list of
//! [`SpliceOp`]s. The [`Rewriter`] applies the first matching rule to a
//! module's text at most once per path and never touches the file on disk;
//! non-matching modules come back borrowed and unchanged.

pub use error::{Error, Result};
pub use lexer::js_string;
pub use splice::{CallShape, SpliceOp};

mod error;
pub mod lexer;
pub mod splice;
pub mod tree;

use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A module-path predicate plus the edits to apply there.
#[derive(Clone, Debug)]
pub struct RewriteRule {
    pub path: Regex,
    pub ops: Vec<SpliceOp>,
}

impl RewriteRule {
    pub fn new(path: Regex, ops: Vec<SpliceOp>) -> Self {
        Self { path, ops }
    }

    pub fn matches(&self, module_path: &Path) -> bool {
        self.path.is_match(&module_path.to_string_lossy())
    }

    /// Lex, nest, splice, render. Deterministic for a fixed input.
    pub fn apply(&self, source: &str) -> Result<String> {
        let mut nodes = tree::build(lexer::tokenize(source)?)?;
        for op in &self.ops {
            op.apply(&mut nodes);
        }
        Ok(tree::render(&nodes))
    }
}

/// Applies rules to module text as the loader presents it.
#[derive(Debug, Default)]
pub struct Rewriter {
    rules: Vec<RewriteRule>,
    // one rewrite per distinct module path per process lifetime
    done: HashMap<PathBuf, String>,
}

impl Rewriter {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self {
            rules,
            done: HashMap::new(),
        }
    }

    /// Rewrite `source` if `module_path` matches a rule, otherwise hand the
    /// original text back untouched. A path already rewritten in this
    /// process is served from cache without re-parsing.
    pub fn maybe_rewrite<'a>(
        &mut self,
        module_path: &Path,
        source: &'a str,
    ) -> Result<Cow<'a, str>> {
        if let Some(cached) = self.done.get(module_path) {
            return Ok(Cow::Owned(cached.clone()));
        }
        let Some(rule) = self.rules.iter().find(|r| r.matches(module_path)) else {
            return Ok(Cow::Borrowed(source));
        };
        let rewritten = rule.apply(source)?;
        self.done
            .insert(module_path.to_path_buf(), rewritten.clone());
        Ok(Cow::Owned(rewritten))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_rule() -> RewriteRule {
        RewriteRule::new(
            Regex::new(r"bin[\\/]runner\.js$").unwrap(),
            vec![SpliceOp::PrependToArray {
                within: CallShape::new("spawn", "sync"),
                containing: CallShape::new("require", "resolve"),
                items: vec!["-r".into(), "/adapters/reg.js".into()],
            }],
        )
    }

    #[test]
    fn non_matching_path_is_identity() {
        let mut rewriter = Rewriter::new(vec![spawn_rule()]);
        let src = "spawn.sync('node', [require.resolve('x')]);";
        let out = rewriter
            .maybe_rewrite(Path::new("/p/lib/other.js"), src)
            .unwrap();
        assert!(matches!(out, Cow::Borrowed(s) if s == src));
    }

    #[test]
    fn matching_path_is_rewritten_and_deterministic() {
        let src = "spawn.sync('node', [require.resolve('x')]);";
        let expected = "spawn.sync('node', ['-r', '/adapters/reg.js', require.resolve('x')]);";
        let first = Rewriter::new(vec![spawn_rule()])
            .maybe_rewrite(Path::new("/p/bin/runner.js"), src)
            .unwrap()
            .into_owned();
        let second = Rewriter::new(vec![spawn_rule()])
            .maybe_rewrite(Path::new("/p/bin/runner.js"), src)
            .unwrap()
            .into_owned();
        assert_eq!(first, expected);
        assert_eq!(first, second);
    }

    #[test]
    fn repeated_loads_are_served_from_cache() {
        let mut rewriter = Rewriter::new(vec![spawn_rule()]);
        let src = "spawn.sync('node', [require.resolve('x')]);";
        let path = Path::new("/p/bin/runner.js");
        let first = rewriter.maybe_rewrite(path, src).unwrap().into_owned();
        // second load passes garbage to prove the parse is not repeated
        let second = rewriter.maybe_rewrite(path, "((((").unwrap().into_owned();
        assert_eq!(first, second);
    }

    #[test]
    fn parse_failure_propagates() {
        let mut rewriter = Rewriter::new(vec![spawn_rule()]);
        assert!(rewriter
            .maybe_rewrite(Path::new("/p/bin/runner.js"), "const s = 'oops")
            .is_err());
    }
}
