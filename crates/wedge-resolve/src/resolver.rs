//! Binaries-directory entry resolution.
//!
//! Package managers expose a tool either as a symlink into the package's
//! own `bin/` or, on platforms without symlinks, as a generated dispatch
//! file pointing at the real script. Both indirections resolve to the same
//! thing: a path relative to the entry's directory.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Binaries directory relative to the project root.
pub const BIN_DIR: &str = "node_modules/.bin";

/// Batch dispatch shims quote the target as `"%~dp0\..\pkg\bin\tool.js"`.
static CMD_SHIM_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""%(?:~dp0|dp0%)[\\/]([^"]+)""#).unwrap());

/// POSIX dispatch shims quote the target as `"$basedir/../pkg/bin/tool.js"`.
static SH_SHIM_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""\$basedir/([^"]+)""#).unwrap());

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Absolute, normalized path of the real executable script.
    pub path: PathBuf,
    /// The raw indirection text the entry pointed at.
    pub target: String,
}

/// Resolve a command name against `<project_root>/node_modules/.bin`.
///
/// Tries a direct symlink read first and falls back to parsing the entry
/// as a dispatch shim. Neither form resolving means the command is
/// unknown; there is no default.
pub fn resolve_command(project_root: &Path, name: &str) -> Result<ResolvedCommand> {
    let entry = project_root.join(BIN_DIR).join(name);
    let target = match fs::read_link(&entry) {
        Ok(link) => link.to_string_lossy().into_owned(),
        Err(_) => {
            if !entry.exists() {
                return Err(Error::NotFound(name.to_string()));
            }
            let content = fs::read_to_string(&entry).map_err(|source| Error::Indirection {
                command: name.to_string(),
                source,
            })?;
            shim_target(&content).ok_or_else(|| Error::ShimTarget(entry.clone()))?
        }
    };
    let base = entry.parent().unwrap_or(Path::new("."));
    let path = normalize(&base.join(target.replace('\\', "/")));
    Ok(ResolvedCommand { path, target })
}

fn shim_target(content: &str) -> Option<String> {
    CMD_SHIM_TARGET
        .captures(content)
        .or_else(|| SH_SHIM_TARGET.captures(content))
        .map(|c| c[1].to_string())
}

/// Lexical normalization: fold `.` and `..` without touching the
/// filesystem, so dangling targets still produce a canonical-looking path.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_parent_components() {
        assert_eq!(
            normalize(Path::new("/p/node_modules/.bin/../pkg/bin/tool.js")),
            PathBuf::from("/p/node_modules/pkg/bin/tool.js")
        );
    }

    #[test]
    fn cmd_shim_target_is_extracted() {
        let content = "@ECHO off\r\n\"%~dp0\\..\\razzle\\bin\\razzle.js\" %*\r\n";
        assert_eq!(
            shim_target(content).as_deref(),
            Some("..\\razzle\\bin\\razzle.js")
        );
    }

    #[test]
    fn sh_shim_target_is_extracted() {
        let content = "#!/bin/sh\nbasedir=$(dirname \"$0\")\nexec node  \"$basedir/../razzle/bin/razzle.js\" \"$@\"\n";
        assert_eq!(
            shim_target(content).as_deref(),
            Some("../razzle/bin/razzle.js")
        );
    }

    #[test]
    fn missing_entry_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_command(dir.path(), "webpack").unwrap_err();
        assert!(matches!(err, Error::NotFound(name) if name == "webpack"));
    }

    #[test]
    fn shim_file_resolves_relative_to_entry_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join(BIN_DIR);
        fs::create_dir_all(&bin).unwrap();
        fs::write(
            bin.join("razzle"),
            "#!/bin/sh\nexec node  \"$basedir/../razzle/bin/razzle.js\" \"$@\"\n",
        )
        .unwrap();
        let resolved = resolve_command(dir.path(), "razzle").unwrap();
        assert_eq!(
            resolved.path,
            normalize(&dir.path().join("node_modules/razzle/bin/razzle.js"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_entry_resolves_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join(BIN_DIR);
        fs::create_dir_all(&bin).unwrap();
        std::os::unix::fs::symlink("../pkg/bin/tool.js", bin.join("tool")).unwrap();
        let resolved = resolve_command(dir.path(), "tool").unwrap();
        assert_eq!(
            resolved.path,
            normalize(&dir.path().join("node_modules/pkg/bin/tool.js"))
        );
        assert_eq!(resolved.target, "../pkg/bin/tool.js");
    }
}
