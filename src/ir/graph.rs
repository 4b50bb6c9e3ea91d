//! Core build graph types and integrity checks.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

use super::IrGenError;

/// A `name = value` binding, at file scope or on a build statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Value, written verbatim.
    pub value: String,
}

impl Variable {
    /// Create a binding.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a binding whose value is `values` joined by spaces.
    #[must_use]
    pub fn list(name: impl Into<String>, values: &[String]) -> Self {
        Self::new(name, values.join(" "))
    }
}

/// A rule declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Identifier referenced by build statements.
    pub name: String,
    /// Command template.
    pub command: String,
    /// Status line shown while the command runs.
    pub description: Option<String>,
    /// Compiler-written dependency file.
    pub depfile: Option<String>,
    /// Marks the rule that regenerates the build file itself.
    pub generator: bool,
}

/// One compile step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildNode {
    /// Object file produced.
    pub output: Utf8PathBuf,
    /// Extra files the step writes, such as a precompiled header.
    pub implicit_outputs: Vec<Utf8PathBuf>,
    /// Rule identifier.
    pub rule: String,
    /// Primary source.
    pub input: Utf8PathBuf,
    /// Files that trigger a rebuild without appearing in `$in`.
    pub implicit: Vec<Utf8PathBuf>,
    /// Per-statement variable overrides.
    pub variables: Vec<Variable>,
}

impl BuildNode {
    /// Create a node with no implicit files or overrides.
    #[must_use]
    pub fn new(
        output: impl Into<Utf8PathBuf>,
        rule: impl Into<String>,
        input: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            output: output.into(),
            implicit_outputs: Vec::new(),
            rule: rule.into(),
            input: input.into(),
            implicit: Vec::new(),
            variables: Vec::new(),
        }
    }

    fn outputs(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        std::iter::once(&self.output).chain(&self.implicit_outputs)
    }
}

/// A commented run of build nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSection {
    /// Comment written above the section.
    pub comment: String,
    /// Nodes in emission order.
    pub nodes: Vec<BuildNode>,
}

impl NodeSection {
    /// Create a section.
    #[must_use]
    pub fn new(comment: impl Into<String>, nodes: Vec<BuildNode>) -> Self {
        Self {
            comment: comment.into(),
            nodes,
        }
    }
}

/// A link step producing a binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Short name, exposed as a phony alias.
    pub name: String,
    /// Linked executable.
    pub output: Utf8PathBuf,
    /// Object files, in link order.
    pub inputs: Vec<Utf8PathBuf>,
    /// Files that trigger a relink without being linked.
    pub implicit: Vec<Utf8PathBuf>,
    /// Outputs that must exist first but are not linked.
    pub order_only: Vec<Utf8PathBuf>,
    /// Libraries, attached verbatim.
    pub libs: Vec<String>,
    /// Link flags replacing the file-scope `ldflags`.
    pub ldflags: Option<Vec<String>>,
    /// Comment written above the link statement.
    pub comment: String,
}

impl Target {
    /// Per-statement variable overrides, in output order.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        let mut variables = Vec::new();
        if let Some(ldflags) = &self.ldflags {
            variables.push(Variable::list("ldflags", ldflags));
        }
        if !self.libs.is_empty() {
            variables.push(Variable::list("libs", &self.libs));
        }
        variables
    }
}

/// The statement that reruns the generator when its inputs change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Regeneration {
    /// Generator rule.
    pub rule: Option<Rule>,
    /// Build file the rule writes.
    pub output: Utf8PathBuf,
    /// Inputs whose change triggers regeneration.
    pub implicit: Vec<Utf8PathBuf>,
}

/// The complete graph for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildGraph {
    /// Variables echoing the invocation.
    pub header: Vec<Variable>,
    /// Output directory and compiler executables.
    pub globals: Vec<Variable>,
    /// Flag groups.
    pub flags: Vec<Variable>,
    /// Compile, link, and resource rules.
    pub rules: Vec<Rule>,
    /// Compile nodes grouped by subsystem.
    pub sections: Vec<NodeSection>,
    /// Link targets, in build order.
    pub targets: Vec<Target>,
    /// Self-regeneration statement.
    pub regeneration: Regeneration,
}

impl BuildGraph {
    /// Every compile node, in emission order.
    pub fn nodes(&self) -> impl Iterator<Item = &BuildNode> {
        self.sections.iter().flat_map(|section| &section.nodes)
    }

    /// Look up a target by name.
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|target| target.name == name)
    }

    /// Check graph integrity and return the graph unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError::DuplicateOutput`] when two statements share an
    /// output, [`IrGenError::UnknownInput`] when a target links an object no
    /// node produces, and [`IrGenError::UnknownPredecessor`] when an
    /// order-only predecessor is not a target in this graph.
    pub fn validated(self) -> Result<Self, IrGenError> {
        let producers = self.producers()?;
        for target in &self.targets {
            for input in target.inputs.iter().chain(&target.implicit) {
                if !producers.contains_key(input.as_path()) {
                    return Err(IrGenError::UnknownInput {
                        target: target.name.clone(),
                        input: input.clone(),
                    });
                }
            }
            for predecessor in &target.order_only {
                if self.targets.iter().all(|other| &other.output != predecessor) {
                    return Err(IrGenError::UnknownPredecessor {
                        target: target.name.clone(),
                        predecessor: predecessor.clone(),
                    });
                }
            }
        }
        Ok(self)
    }

    fn producers(&self) -> Result<IndexMap<&Utf8Path, String>, IrGenError> {
        let mut producers: IndexMap<&Utf8Path, String> = IndexMap::new();
        let node_outputs = self.nodes().flat_map(|node| {
            node.outputs()
                .map(move |output| (output.as_path(), node.input.to_string()))
        });
        let target_outputs = self
            .targets
            .iter()
            .map(|target| (target.output.as_path(), format!("target {}", target.name)));
        for (output, origin) in node_outputs.chain(target_outputs) {
            if let Some(first) = producers.get(output) {
                return Err(IrGenError::DuplicateOutput {
                    output: output.to_owned(),
                    first: first.clone(),
                    second: origin,
                });
            }
            producers.insert(output, origin);
        }
        tracing::debug!(
            outputs = producers.len(),
            targets = %self.targets.iter().map(|target| target.name.as_str()).join(","),
            "validated build graph"
        );
        Ok(producers)
    }
}
