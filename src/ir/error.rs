//! Errors raised while assembling the build graph.
//!
//! Both variants indicate a mistake in the generator's static configuration
//! rather than a runtime condition; they abort the run before any Ninja text
//! is written.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Graph integrity violations.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum IrGenError {
    /// Two build statements claim the same output path.
    #[error("duplicate output {output}: produced by both {first} and {second}")]
    #[diagnostic(
        code(sg_configure::ir::duplicate_output),
        help("rename one of the modules so their object paths differ")
    )]
    DuplicateOutput {
        /// Output path claimed twice.
        output: Utf8PathBuf,
        /// Statement that claimed the path first.
        first: String,
        /// Statement that claimed it again.
        second: String,
    },

    /// A target links an object that no compile node produces.
    #[error("target {target} links {input}, which no build node produces")]
    #[diagnostic(code(sg_configure::ir::unknown_input))]
    UnknownInput {
        /// Target name.
        target: String,
        /// Input with no producer.
        input: Utf8PathBuf,
    },

    /// A target is ordered after another target that is not in the graph.
    #[error("target {target} is ordered after {predecessor}, which is not a target")]
    #[diagnostic(code(sg_configure::ir::unknown_predecessor))]
    UnknownPredecessor {
        /// Target name.
        target: String,
        /// Order-only predecessor with no producer.
        predecessor: Utf8PathBuf,
    },
}
