//! Error types for source rewriting.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A module that fails to scan or nest propagates upward unchanged;
/// the engine has no fallback text to substitute.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unterminated {kind} starting at byte {at}")]
    Unterminated { kind: &'static str, at: usize },

    #[error("unexpected closing delimiter '{found}' at byte {at}")]
    Unbalanced { found: char, at: usize },

    #[error("mismatched delimiter at byte {at}: expected '{expected}', found '{found}'")]
    Mismatched {
        expected: char,
        found: char,
        at: usize,
    },

    #[error("unclosed delimiter '{open}' opened at byte {at}")]
    Unclosed { open: char, at: usize },
}
