//! Ninja file generator.
//!
//! This module converts a [`crate::ir::BuildGraph`] into the textual
//! representation expected by the Ninja build system. Output follows the
//! graph's own ordering, so identical graphs always produce byte-identical
//! text and Ninja's up-to-date checks stay quiet across reruns.

use crate::ir::{BuildGraph, BuildNode, Rule, Target, Variable};
use camino::Utf8PathBuf;
use itertools::Itertools;
use miette::Diagnostic;
use std::fmt::{self, Display, Formatter, Write};
use thiserror::Error;

macro_rules! write_kv {
    ($f:expr, $key:expr, $opt:expr) => {
        if let Some(val) = $opt {
            writeln!($f, "  {} = {}", $key, val)?;
        }
    };
}

macro_rules! write_flag {
    ($f:expr, $key:expr, $cond:expr) => {
        if $cond {
            writeln!($f, "  {} = 1", $key)?;
        }
    };
}

/// Errors raised while rendering the build file.
#[derive(Debug, Error, Diagnostic)]
pub enum NinjaGenError {
    /// A formatter reported failure.
    #[error("failed to render the build file")]
    #[diagnostic(code(sg_configure::ninja_gen::format))]
    Format(#[from] fmt::Error),
}

/// Generate a Ninja build file as a string.
///
/// # Errors
///
/// Returns [`NinjaGenError::Format`] if a formatter fails, which does not
/// happen when writing into a `String`.
pub fn generate(graph: &BuildGraph) -> Result<String, NinjaGenError> {
    let mut out = String::new();
    generate_into(graph, &mut out)?;
    Ok(out)
}

/// Write the build file for `graph` into `out`.
///
/// # Errors
///
/// Propagates formatter failures from `out`.
pub fn generate_into(graph: &BuildGraph, out: &mut impl Write) -> fmt::Result {
    writeln!(out, "# The arguments passed to sg-configure, for rerunning it.")?;
    write_variables(out, &graph.header)?;
    write_variables(out, &graph.globals)?;
    write_variables(out, &graph.flags)?;

    for rule in &graph.rules {
        write!(out, "{}", DisplayRule(rule))?;
    }

    for section in &graph.sections {
        writeln!(out, "# {}", section.comment)?;
        for node in &section.nodes {
            write!(out, "{}", DisplayNode(node))?;
        }
        writeln!(out)?;
    }

    for target in &graph.targets {
        write!(out, "{}", DisplayTarget(target))?;
    }

    if let Some(rule) = &graph.regeneration.rule {
        writeln!(out, "# Regenerate build files if the generator changes.")?;
        write!(out, "{}", DisplayRule(rule))?;
        write!(out, "build {}: {}", escape_path(graph.regeneration.output.as_str()), rule.name)?;
        if !graph.regeneration.implicit.is_empty() {
            write!(out, " | {}", join(&graph.regeneration.implicit))?;
        }
        writeln!(out)?;
        writeln!(out)?;
    }

    let binaries: Vec<Utf8PathBuf> = graph
        .targets
        .iter()
        .map(|target| target.output.clone())
        .collect();
    writeln!(out, "build all: phony {}", join(&binaries))
}

fn write_variables(out: &mut impl Write, variables: &[Variable]) -> fmt::Result {
    for variable in variables {
        write!(out, "{}", DisplayVariable(variable, ""))?;
    }
    writeln!(out)
}

/// Escape a path for use in a build statement.
///
/// Spaces and colons are significant in build lines. Dollar signs are left
/// alone so paths may reference variables such as `$builddir`.
#[must_use]
pub fn escape_path(path: &str) -> String {
    path.replace("$ ", "$$ ")
        .replace(' ', "$ ")
        .replace(':', "$:")
}

/// Convert a slice of paths into a space-separated, escaped string.
fn join(paths: &[Utf8PathBuf]) -> String {
    paths.iter().map(|path| escape_path(path.as_str())).join(" ")
}

/// Wrapper struct to display a variable binding at a given indent.
struct DisplayVariable<'a>(&'a Variable, &'a str);

impl Display for DisplayVariable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self(variable, indent) = self;
        if variable.value.is_empty() {
            writeln!(f, "{indent}{} =", variable.name)
        } else {
            writeln!(f, "{indent}{} = {}", variable.name, variable.value)
        }
    }
}

/// Wrapper struct to display a rule declaration.
struct DisplayRule<'a>(&'a Rule);

impl Display for DisplayRule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rule = self.0;
        writeln!(f, "rule {}", rule.name)?;
        writeln!(f, "  command = {}", rule.command)?;
        write_kv!(f, "description", &rule.description);
        write_kv!(f, "depfile", &rule.depfile);
        write_flag!(f, "generator", rule.generator);
        writeln!(f)
    }
}

/// Wrapper struct to display a compile node.
struct DisplayNode<'a>(&'a BuildNode);

impl Display for DisplayNode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let node = self.0;
        write!(f, "build {}", escape_path(node.output.as_str()))?;
        if !node.implicit_outputs.is_empty() {
            write!(f, " | {}", join(&node.implicit_outputs))?;
        }
        write!(f, ": {} {}", node.rule, escape_path(node.input.as_str()))?;
        if !node.implicit.is_empty() {
            write!(f, " | {}", join(&node.implicit))?;
        }
        writeln!(f)?;
        for variable in &node.variables {
            write!(f, "{}", DisplayVariable(variable, "  "))?;
        }
        Ok(())
    }
}

/// Wrapper struct to display a link statement followed by its phony alias.
struct DisplayTarget<'a>(&'a Target);

impl Display for DisplayTarget<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let target = self.0;
        writeln!(f, "# {}", target.comment)?;
        let output = escape_path(target.output.as_str());
        write!(f, "build {output}: link {}", join(&target.inputs))?;
        if !target.implicit.is_empty() {
            write!(f, " | {}", join(&target.implicit))?;
        }
        if !target.order_only.is_empty() {
            write!(f, " || {}", join(&target.order_only))?;
        }
        writeln!(f)?;
        for variable in target.variables() {
            write!(f, "{}", DisplayVariable(&variable, "  "))?;
        }
        writeln!(f, "build {}: phony {output}", target.name)?;
        writeln!(f)
    }
}
