//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly. The `unused_assignments` lint fires in some Rust versions due to
//! thiserror/miette derive macro expansion.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// Exit status for usage errors and failures without a child status.
pub const USAGE_EXIT_CODE: u8 = 1;

/// Errors raised while driving a run.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// Positional arguments were supplied; the generator takes none.
    #[error("extra unparsed command-line arguments: {}", .args.join(" "))]
    #[diagnostic(
        code(sg_configure::runner::unexpected_arguments),
        help("the only options are --debug and --verbose")
    )]
    UnexpectedArguments {
        /// Arguments that were not recognized.
        args: Vec<String>,
    },

    /// An external step ran but reported failure.
    #[error("{step} failed{}", .status.map(|status| format!(" with exit code {status}")).unwrap_or_default())]
    #[diagnostic(code(sg_configure::runner::step_failed))]
    StepFailed {
        /// Human-readable step name.
        step: &'static str,
        /// Child exit code, absent when terminated by a signal.
        status: Option<i32>,
    },

    /// An external step could not be started.
    #[error("failed to start {step}")]
    #[diagnostic(code(sg_configure::runner::step_spawn))]
    StepSpawn {
        /// Human-readable step name.
        step: &'static str,
        /// Spawn failure.
        #[source]
        source: io::Error,
    },
}

impl RunnerError {
    /// Process exit status for this error.
    ///
    /// Failed steps propagate the child's status when it fits in a byte.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::StepFailed {
                status: Some(status),
                ..
            } => u8::try_from(*status)
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(USAGE_EXIT_CODE),
            Self::UnexpectedArguments { .. }
            | Self::StepFailed { status: None, .. }
            | Self::StepSpawn { .. } => USAGE_EXIT_CODE,
        }
    }
}
