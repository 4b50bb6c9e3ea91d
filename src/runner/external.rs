//! External collaborators invoked before synthesis.
//!
//! Both steps are opaque subprocesses: only their success or failure matters.
//! The [`Collaborators`] seam lets tests substitute them.

use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use configure_env::{DEFAULT_PYTHON, PYTHON_ENV};
use mockable::Env;
use tracing::{debug, info};

use super::RunnerError;
use crate::platform::Platform;

/// Checkout of the Ninja sources, relative to the repository root.
pub const NINJA_DIR: &str = "third_party/ninja";

/// Path of the bootstrapped Ninja executable.
#[must_use]
pub fn ninja_binary(root: &Utf8Path, platform: Platform) -> Utf8PathBuf {
    root.join(NINJA_DIR)
        .join(format!("ninja{}", platform.executable_suffix()))
}

/// Steps that prepare the checkout before the build file is written.
pub trait Collaborators {
    /// Bring vendored submodules up to date.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the synchronization fails.
    fn sync_submodules(&self, root: &Utf8Path) -> Result<(), RunnerError>;

    /// Build the Ninja executable when it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the bootstrap fails.
    fn bootstrap_ninja(&self, root: &Utf8Path, platform: Platform) -> Result<(), RunnerError>;
}

/// Collaborators backed by real subprocesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemCollaborators {
    python: String,
}

impl SystemCollaborators {
    /// Use `python` to run the Ninja bootstrap script.
    #[must_use]
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Read the interpreter from `SG_PYTHON`, falling back to `python3`.
    #[must_use]
    pub fn from_env(env: &impl Env) -> Self {
        Self::new(
            env.raw(PYTHON_ENV)
                .unwrap_or_else(|_| DEFAULT_PYTHON.to_owned()),
        )
    }
}

fn run_step(step: &'static str, cmd: &mut Command) -> Result<(), RunnerError> {
    info!(step, command = ?cmd, "running external step");
    let status = cmd
        .status()
        .map_err(|source| RunnerError::StepSpawn { step, source })?;
    if status.success() {
        Ok(())
    } else {
        Err(RunnerError::StepFailed {
            step,
            status: status.code(),
        })
    }
}

impl Collaborators for SystemCollaborators {
    fn sync_submodules(&self, root: &Utf8Path) -> Result<(), RunnerError> {
        run_step(
            "git submodule update",
            Command::new("git")
                .args(["submodule", "update", "--init"])
                .current_dir(root),
        )
    }

    fn bootstrap_ninja(&self, root: &Utf8Path, platform: Platform) -> Result<(), RunnerError> {
        let binary = ninja_binary(root, platform);
        if binary.is_file() {
            debug!(path = %binary, "ninja already built");
            return Ok(());
        }
        info!(path = %binary, "ninja binary doesn't exist, trying to build it");
        run_step(
            "ninja bootstrap",
            Command::new(&self.python)
                .arg("bootstrap.py")
                .current_dir(root.join(NINJA_DIR)),
        )
    }
}
