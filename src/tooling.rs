//! Tooling & Integration Layer
//!
//! Command-line access to the builders and the reader.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
