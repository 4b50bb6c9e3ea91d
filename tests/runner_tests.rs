//! Tests for the run sequence with substituted external steps.
//!
//! The collaborators are mocked so these tests never touch git or Python;
//! they check step ordering and that failures leave the checkout untouched.

use anyhow::{Context, Result, ensure};
use camino::Utf8Path;
use mockall::{Sequence, mock};
use sg_configure::cli::Cli;
use sg_configure::pipeline::Invocation;
use sg_configure::platform::Platform;
use sg_configure::runner::{self, Collaborators, RunnerError};
use test_support::Checkout;
use test_support::env::empty_env;

mock! {
    pub Steps {}
    impl Collaborators for Steps {
        fn sync_submodules(&self, root: &Utf8Path) -> Result<(), RunnerError>;
        fn bootstrap_ninja(&self, root: &Utf8Path, platform: Platform) -> Result<(), RunnerError>;
    }
}

fn invocation() -> Invocation {
    Invocation::new("/opt/sg/sg-configure", Vec::new())
}

fn succeeding_steps() -> MockSteps {
    let mut steps = MockSteps::new();
    let mut seq = Sequence::new();
    steps
        .expect_sync_submodules()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    steps
        .expect_bootstrap_ninja()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    steps
}

#[test]
fn successful_run_writes_build_file() -> Result<()> {
    let checkout = Checkout::new()?;
    runner::run_in(
        checkout.root(),
        Platform::Linux,
        &Cli::default(),
        &invocation(),
        &succeeding_steps(),
        &empty_env(),
    )?;
    let ninja = checkout.read_build_file()?;
    ensure!(ninja.contains("build $builddir/obj/at_exit.o: cxx third_party/base/at_exit.cc"));
    ensure!(!ninja.contains("file_util_win"), "windows source on linux");
    ensure!(!ninja.contains("base64"), "reviewed exclusion was built");
    ensure!(checkout.root().join("out").is_dir(), "output directory missing");
    Ok(())
}

#[test]
fn rerun_produces_identical_build_file() -> Result<()> {
    let checkout = Checkout::new()?;
    let cli = Cli {
        debug: true,
        ..Cli::default()
    };
    runner::run_in(
        checkout.root(),
        Platform::Windows,
        &cli,
        &invocation(),
        &succeeding_steps(),
        &empty_env(),
    )?;
    let first = checkout.read_build_file()?;
    runner::run_in(
        checkout.root(),
        Platform::Windows,
        &cli,
        &invocation(),
        &succeeding_steps(),
        &empty_env(),
    )?;
    ensure!(checkout.read_build_file()? == first, "rerun changed the build file");
    Ok(())
}

#[test]
fn failed_sync_stops_the_run() -> Result<()> {
    let checkout = Checkout::new()?;
    let mut steps = MockSteps::new();
    steps.expect_sync_submodules().times(1).returning(|_| {
        Err(RunnerError::StepFailed {
            step: "git submodule update",
            status: Some(3),
        })
    });
    steps.expect_bootstrap_ninja().times(0);

    let err = runner::run_in(
        checkout.root(),
        Platform::Linux,
        &Cli::default(),
        &invocation(),
        &steps,
        &empty_env(),
    )
    .err()
    .context("sync failure should fail the run")?;

    ensure!(runner::exit_code(&err) == 3, "child status not propagated");
    ensure!(!checkout.build_file().exists(), "build file written");
    Ok(())
}

#[test]
fn failed_bootstrap_writes_nothing() -> Result<()> {
    let checkout = Checkout::new()?;
    let mut steps = MockSteps::new();
    steps.expect_sync_submodules().returning(|_| Ok(()));
    steps
        .expect_bootstrap_ninja()
        .withf(|_, platform| *platform == Platform::Mac)
        .returning(|_, _| {
            Err(RunnerError::StepFailed {
                step: "ninja bootstrap",
                status: None,
            })
        });

    let err = runner::run_in(
        checkout.root(),
        Platform::Mac,
        &Cli::default(),
        &invocation(),
        &steps,
        &empty_env(),
    )
    .err()
    .context("bootstrap failure should fail the run")?;

    ensure!(runner::exit_code(&err) == runner::USAGE_EXIT_CODE);
    ensure!(format!("{err:#}").contains("failed to bootstrap ninja"));
    ensure!(!checkout.build_file().exists(), "build file written");
    Ok(())
}

#[test]
fn extra_arguments_skip_every_step() -> Result<()> {
    let checkout = Checkout::new()?;
    let mut steps = MockSteps::new();
    steps.expect_sync_submodules().times(0);
    steps.expect_bootstrap_ninja().times(0);
    let cli = Cli {
        extra: vec!["release".to_owned()],
        ..Cli::default()
    };

    let err = runner::run_in(
        checkout.root(),
        Platform::Linux,
        &cli,
        &invocation(),
        &steps,
        &empty_env(),
    )
    .err()
    .context("extra arguments should fail the run")?;

    ensure!(matches!(
        err.downcast_ref::<RunnerError>(),
        Some(RunnerError::UnexpectedArguments { .. })
    ));
    ensure!(runner::exit_code(&err) == runner::USAGE_EXIT_CODE);
    ensure!(!checkout.build_file().exists(), "build file written");
    Ok(())
}

#[test]
fn missing_library_root_fails_before_writing() -> Result<()> {
    let temp = tempfile::tempdir().context("create temp dir")?;
    let root = Utf8Path::from_path(temp.path()).context("temp dir is not UTF-8")?;
    let mut steps = MockSteps::new();
    steps.expect_sync_submodules().returning(|_| Ok(()));
    steps.expect_bootstrap_ninja().returning(|_, _| Ok(()));

    let result = runner::run_in(
        root,
        Platform::Linux,
        &Cli::default(),
        &invocation(),
        &steps,
        &empty_env(),
    );

    ensure!(result.is_err(), "run without third_party/base succeeded");
    ensure!(!root.join("build.ninja").exists(), "build file written");
    Ok(())
}
