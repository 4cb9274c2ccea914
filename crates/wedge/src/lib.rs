//! Run JavaScript build and test tools with configuration injected into
//! their pipeline, without touching the tools' installed files.
//!
//! # Architecture
//!
//! - `cli.rs` - router argument surface and tool-side extra flags
//! - `project.rs` - anchor-file project root discovery
//! - `registry.rs` - closed (tool, major) → adapter table and lookup
//! - `channel.rs` - the parent→child environment channel
//! - `launcher.rs` - child assembly, spawn, exit relay
//! - `router.rs` - per-tool dispatch branches
//! - `rules.rs` - rewrite rules the `wedge-filter` bridge applies
//! - `error.rs` - terminal error kinds

pub use error::{Error, Result};

pub mod channel;
pub mod cli;
pub mod error;
pub mod launcher;
pub mod project;
pub mod registry;
pub mod router;
pub mod rules;
