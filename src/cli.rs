//! Command line interface definition using clap.
//!
//! The generator takes two switches and nothing else. Trailing positionals
//! are collected rather than rejected by clap so the runner can report them
//! with its own usage error and exit code.

use clap::Parser;

use crate::platform::BuildMode;

/// Generate the Ninja build file for the debugger and its vendored libraries.
#[derive(Debug, Default, Clone, PartialEq, Eq, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Generate a debug build: debug runtime, no optimisation, precompiled
    /// headers on Windows.
    #[arg(long)]
    pub debug: bool,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Unexpected trailing arguments.
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

impl Cli {
    /// Build mode selected by `--debug`.
    #[must_use]
    pub const fn mode(&self) -> BuildMode {
        BuildMode::from_debug_flag(self.debug)
    }
}
