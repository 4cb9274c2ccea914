//! Project root discovery.
//!
//! The root is wherever the anchor file sits, walking upward from the
//! working directory. The anchor defaults to the package descriptor and
//! can be overridden through the channel key.

use crate::channel;
use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_ANCHOR: &str = "package.json";

pub fn anchor_name() -> String {
    env::var(channel::PROJECT_ANCHOR).unwrap_or_else(|_| DEFAULT_ANCHOR.to_string())
}

/// Project root for the current working directory.
pub fn locate_root() -> Result<PathBuf> {
    let anchor = anchor_name();
    let cwd = env::current_dir().map_err(|_| Error::Anchor(anchor.clone()))?;
    root_from(&cwd, &anchor)
}

/// Project root for an explicit starting directory.
pub fn root_from(start: &Path, anchor: &str) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(anchor).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::Anchor(anchor.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_up_to_the_anchor() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        let nested = dir.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(root_from(&nested, "package.json").unwrap(), dir.path());
    }

    #[test]
    fn missing_anchor_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = root_from(dir.path(), "definitely-absent.json").unwrap_err();
        assert!(matches!(err, Error::Anchor(name) if name == "definitely-absent.json"));
    }
}
