//! CLI execution logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! drives a whole run: argument checks, the external preparation steps,
//! graph synthesis, and writing the build file. Nothing is written unless
//! every earlier step succeeds.

mod error;
mod external;
mod file_io;

pub use error::{RunnerError, USAGE_EXIT_CODE};
pub use external::{Collaborators, NINJA_DIR, SystemCollaborators, ninja_binary};
pub use file_io::write_build_file;

use crate::catalog::Catalog;
use crate::cli::Cli;
use crate::pipeline::{self, Invocation};
use crate::platform::Platform;
use crate::{ninja_gen, toolchain};
use anyhow::{Context, Result};
use camino::Utf8Path;
use mockable::Env;
use tracing::{debug, info};

/// Wrapper around generated Ninja build file text.
#[derive(Debug, Clone)]
pub struct NinjaContent(String);
impl NinjaContent {
    /// Store the provided build file text.
    #[must_use]
    pub const fn new(content: String) -> Self {
        Self(content)
    }
    /// Borrow the underlying text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Execute the parsed [`Cli`] against the current directory and host.
///
/// # Errors
///
/// Returns an error if argument validation, an external step, synthesis, or
/// writing the build file fails.
pub fn run(cli: &Cli, env: &impl Env) -> Result<()> {
    let platform = Platform::host()?;
    run_in(
        Utf8Path::new("."),
        platform,
        cli,
        &Invocation::from_process(),
        &SystemCollaborators::from_env(env),
        env,
    )
}

/// Execute a run rooted at `root` for `platform`.
///
/// # Errors
///
/// Returns an error if argument validation, an external step, synthesis, or
/// writing the build file fails.
pub fn run_in(
    root: &Utf8Path,
    platform: Platform,
    cli: &Cli,
    invocation: &Invocation,
    collaborators: &impl Collaborators,
    env: &impl Env,
) -> Result<()> {
    ensure_no_extra_args(cli)?;

    info!("Updating git submodules");
    collaborators
        .sync_submodules(root)
        .context("couldn't update git submodules")?;
    collaborators
        .bootstrap_ninja(root, platform)
        .context("failed to bootstrap ninja")?;

    let ninja = generate_ninja(root, platform, cli, invocation, env)?;
    write_build_file(root, &ninja)?;
    Ok(())
}

fn ensure_no_extra_args(cli: &Cli) -> Result<(), RunnerError> {
    if cli.extra.is_empty() {
        Ok(())
    } else {
        Err(RunnerError::UnexpectedArguments {
            args: cli.extra.clone(),
        })
    }
}

/// Synthesize the build file text for one run.
///
/// # Errors
///
/// Returns an error if the catalog cannot be discovered or the graph fails
/// validation.
pub fn generate_ninja(
    root: &Utf8Path,
    platform: Platform,
    cli: &Cli,
    invocation: &Invocation,
    env: &impl Env,
) -> Result<NinjaContent> {
    let catalog = Catalog::discover(root).context("discovering sources")?;
    let config = toolchain::resolve(platform, cli.mode(), env);
    let graph = pipeline::synthesize(&catalog, &config, invocation)
        .context("synthesizing the build graph")?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        let json = serde_json::to_string_pretty(&graph).context("serialising build graph")?;
        debug!("build graph:\n{json}");
    }
    let ninja = ninja_gen::generate(&graph).context("rendering the build file")?;
    Ok(NinjaContent::new(ninja))
}

/// Process exit status for a failed run.
///
/// Runner errors map through [`RunnerError::exit_code`]; anything else exits
/// with [`USAGE_EXIT_CODE`].
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<RunnerError>()
        .map_or(USAGE_EXIT_CODE, RunnerError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;
    use std::env::VarError;

    #[rstest]
    fn extra_arguments_are_rejected() {
        let cli = Cli {
            extra: vec!["fast".to_owned()],
            ..Cli::default()
        };
        let err = ensure_no_extra_args(&cli).expect_err("extra args");
        assert!(matches!(err, RunnerError::UnexpectedArguments { .. }));
    }

    #[rstest]
    fn run_rejects_extra_arguments_before_any_step() {
        let mut env = MockEnv::new();
        env.expect_raw().returning(|_| Err(VarError::NotPresent));
        let cli = Cli {
            extra: vec!["release".to_owned(), "fast".to_owned()],
            ..Cli::default()
        };
        let err = run(&cli, &env).expect_err("extra args");
        assert!(matches!(
            err.downcast_ref::<RunnerError>(),
            Some(RunnerError::UnexpectedArguments { args }) if args.len() == 2
        ));
        assert_eq!(exit_code(&err), USAGE_EXIT_CODE);
    }

    #[rstest]
    fn exit_code_sees_through_context() {
        let err = anyhow::Error::new(RunnerError::StepFailed {
            step: "git submodule update",
            status: Some(4),
        })
        .context("couldn't update git submodules");
        assert_eq!(exit_code(&err), 4);
    }

    #[rstest]
    fn exit_code_defaults_for_other_errors() {
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), USAGE_EXIT_CODE);
    }
}
