//! Tests for the rendered Ninja text of complete graphs.

use anyhow::{Context, Result, ensure};
use camino::Utf8PathBuf;
use rstest::rstest;
use sg_configure::catalog::Catalog;
use sg_configure::ninja_gen::generate;
use sg_configure::pipeline::{Invocation, synthesize};
use sg_configure::platform::{BuildMode, Platform};
use sg_configure::toolchain;
use test_support::env::{compiler_env, empty_env};

fn render(platform: Platform, mode: BuildMode, program: &str) -> Result<String> {
    let catalog = Catalog::with_base_files(vec![
        Utf8PathBuf::from("at_exit.cc"),
        Utf8PathBuf::from("logging.cc"),
    ]);
    let config = toolchain::resolve(platform, mode, &empty_env());
    let invocation = Invocation::new(program, vec!["--debug".to_owned()]);
    let graph = synthesize(&catalog, &config, &invocation).context("synthesize")?;
    generate(&graph).context("generate")
}

fn position(text: &str, needle: &str) -> Result<usize> {
    text.find(needle)
        .with_context(|| format!("missing `{needle}` in build file"))
}

#[rstest]
fn blocks_appear_in_file_order() -> Result<()> {
    let ninja = render(Platform::Linux, BuildMode::Release, "/opt/sg/sg-configure")?;
    ensure!(
        ninja.starts_with("# The arguments passed to sg-configure, for rerunning it.\nconfigure_args = --debug\n\n"),
        "header missing:\n{ninja}"
    );
    let markers = [
        "builddir = out\n",
        "cflags = -g -Wall",
        "rule cxx\n",
        "rule link\n",
        "# Core sources.\n",
        "# Platform-base library.\n",
        "# Regular expression engine.\n",
        "# Font rasterizer.\n",
        "# Main executable is the application objects plus main() and startup code.\n",
        "# Tests all build into the sg_test executable.\n",
        "# Standalone reader/writer stress test.\n",
        "# Main executable.\n",
        "# Unit tests.\n",
        "# Reader/writer stress test.\n",
        "# Regenerate build files if the generator changes.\n",
        "build all: phony",
    ];
    let mut last = 0;
    for marker in markers {
        let at = position(&ninja, marker)?;
        ensure!(at >= last, "`{marker}` is out of order");
        last = at;
    }
    ensure!(
        ninja.ends_with(
            "build all: phony $builddir/sg $builddir/sg_test $builddir/reader_writer_test\n"
        ),
        "unexpected tail:\n{ninja}"
    );
    Ok(())
}

#[rstest]
fn targets_get_phony_aliases_and_ordering() -> Result<()> {
    let ninja = render(Platform::Linux, BuildMode::Debug, "/opt/sg/sg-configure")?;
    for name in ["sg", "sg_test", "reader_writer_test"] {
        position(&ninja, &format!("build {name}: phony $builddir/{name}\n"))?;
    }
    let sg_test = ninja
        .lines()
        .find(|line| line.starts_with("build $builddir/sg_test: link "))
        .context("sg_test link line")?;
    ensure!(sg_test.ends_with(" || $builddir/sg"), "no order-only edge: {sg_test}");
    let reader_writer = ninja
        .lines()
        .find(|line| line.starts_with("build $builddir/reader_writer_test: link "))
        .context("reader_writer_test link line")?;
    ensure!(
        reader_writer == "build $builddir/reader_writer_test: link $builddir/obj/backend/reader_writer_test.o || $builddir/sg",
        "unexpected link line: {reader_writer}"
    );
    Ok(())
}

#[rstest]
fn gcc_links_with_empty_library_list() -> Result<()> {
    let ninja = render(Platform::Mac, BuildMode::Release, "/opt/sg/sg-configure")?;
    position(&ninja, "  command = $cxx $ldflags -o $out $in $libs\n")?;
    position(&ninja, "ccflags = -DFT2_BUILD_LIBRARY\n")?;
    position(&ninja, "cxxflags =\n")?;
    ensure!(!ninja.contains("  libs ="), "gcc targets carry no libs");
    ensure!(!ninja.contains("rule rc"), "resource rule on a gcc platform");
    Ok(())
}

#[rstest]
fn windows_debug_renders_precompiled_header() -> Result<()> {
    let ninja = render(
        Platform::Windows,
        BuildMode::Debug,
        "C:/tools/sg-configure.exe",
    )?;
    position(
        &ninja,
        "build $builddir/obj/sg_pch.obj | $builddir/obj/sg.pch: cxx_pch sg/sg_pch.cc\n  objname = $builddir/obj/sg_pch.obj\n",
    )?;
    position(
        &ninja,
        "build $builddir/obj/lexer.obj: cxx sg/lexer.cc | $builddir/obj/sg.pch\n",
    )?;
    position(
        &ninja,
        "build $builddir/obj/sg.obj: rc sg/sg.rc | art/sg.ico\n",
    )?;
    position(&ninja, "/Fp$builddir/obj/sg.pch /Yusg/global.h")?;
    position(&ninja, "  libs = advapi32.lib")?;
    position(&ninja, "  ldflags = /DEBUG /SUBSYSTEM:WINDOWS /INCREMENTAL /SUBSYSTEM:CONSOLE\n")?;
    position(
        &ninja,
        "rule configure\n  command = cmd /c C:/tools/sg-configure.exe $configure_args\n",
    )?;
    position(
        &ninja,
        "build build.ninja: configure | C$:/tools/sg-configure.exe\n",
    )?;
    Ok(())
}

#[rstest]
fn windows_release_has_no_precompiled_header() -> Result<()> {
    let ninja = render(
        Platform::Windows,
        BuildMode::Release,
        "C:/tools/sg-configure.exe",
    )?;
    ensure!(!ninja.contains("cxx_pch"), "pch rule in release");
    ensure!(!ninja.contains("sg.pch"), "pch artifact in release");
    position(&ninja, "build $builddir/obj/lexer.obj: cxx sg/lexer.cc\n")?;
    Ok(())
}

#[rstest]
fn compiler_overrides_reach_globals() -> Result<()> {
    let catalog = Catalog::with_base_files(Vec::new());
    let config = toolchain::resolve(
        Platform::Linux,
        BuildMode::Release,
        &compiler_env("clang", "clang++"),
    );
    let graph = synthesize(&catalog, &config, &Invocation::new("sg-configure", Vec::new()))?;
    let ninja = generate(&graph)?;
    position(&ninja, "cxx = clang++\ncc = clang\n")?;
    position(&ninja, "configure_args =\n")?;
    Ok(())
}

#[rstest]
fn rendering_is_byte_identical_across_runs() -> Result<()> {
    for platform in Platform::ALL {
        for mode in [BuildMode::Debug, BuildMode::Release] {
            let first = render(platform, mode, "/opt/sg/sg-configure")?;
            let second = render(platform, mode, "/opt/sg/sg-configure")?;
            ensure!(first == second, "{platform} output differs between runs");
        }
    }
    Ok(())
}
