//! Compile node emission.
//!
//! An [`Emitter`] turns one [`Module`] into one [`BuildNode`] and records the
//! object it produces in the caller's [`ObjectGroup`]. Output paths are a
//! pure function of the module's object stem and the platform's object
//! suffix, so two modules that collide are caught by
//! [`BuildGraph::validated`](super::BuildGraph::validated).

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use super::{BUILD_DIR_VAR, BuildNode, Variable, rules};
use crate::catalog::{self, Module, SourceKind};
use crate::platform::{BuildMode, Platform, precompiled_headers_enabled};
use crate::toolchain::GLOBAL_HEADER;

/// Path of the object built from `stem`.
#[must_use]
pub fn object_path(stem: &Utf8Path, platform: Platform) -> Utf8PathBuf {
    Utf8PathBuf::from(format!(
        "{BUILD_DIR_VAR}/obj/{stem}{}",
        platform.object_suffix()
    ))
}

/// The shared precompiled header used by C++ compiles on runs that enable it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrecompiledHeader {
    /// Module compiled to create the header.
    pub source: Module,
    /// Object linked alongside the application objects.
    pub object: Utf8PathBuf,
    /// Header artifact every C++ compile depends on.
    pub artifact: Utf8PathBuf,
}

impl PrecompiledHeader {
    /// The precompiled header for this run, or `None` when disabled.
    #[must_use]
    pub fn for_run(platform: Platform, mode: BuildMode) -> Option<Self> {
        if !precompiled_headers_enabled(platform, mode) {
            return None;
        }
        let source = catalog::precompiled_header_source();
        Some(Self {
            object: object_path(source.object_stem(), platform),
            artifact: Utf8PathBuf::from(format!("{BUILD_DIR_VAR}/obj/sg.pch")),
            source,
        })
    }

    /// Flags that make a compile consume the header.
    #[must_use]
    pub fn use_flags(&self) -> String {
        format!("/Fp{} /Yu{GLOBAL_HEADER}", self.artifact)
    }

    /// Flags that make a compile create the header.
    #[must_use]
    pub fn create_flags(&self) -> String {
        format!("/Fp{} /Yc{GLOBAL_HEADER}", self.artifact)
    }

    /// The node that builds the object and the header artifact together.
    #[must_use]
    pub fn node(&self) -> BuildNode {
        let mut node = BuildNode::new(
            self.object.clone(),
            rules::CXX_PCH,
            self.source.source_path(),
        );
        node.implicit_outputs.push(self.artifact.clone());
        node.variables
            .push(Variable::new("objname", self.object.as_str()));
        node
    }
}

/// Objects accumulated for one subsystem, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectGroup {
    objects: Vec<Utf8PathBuf>,
}

impl ObjectGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object.
    pub fn push(&mut self, object: Utf8PathBuf) {
        self.objects.push(object);
    }

    /// Objects in emission order.
    #[must_use]
    pub fn objects(&self) -> &[Utf8PathBuf] {
        &self.objects
    }
}

/// Maps modules onto compile nodes for one run.
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'a> {
    platform: Platform,
    pch: Option<&'a PrecompiledHeader>,
}

impl<'a> Emitter<'a> {
    /// Create an emitter for `platform`, optionally wiring in a precompiled
    /// header.
    #[must_use]
    pub const fn new(platform: Platform, pch: Option<&'a PrecompiledHeader>) -> Self {
        Self { platform, pch }
    }

    /// Emit a node with the run's default flags.
    pub fn emit(&self, module: &Module, group: &mut ObjectGroup) -> BuildNode {
        self.emit_with(module, Vec::new(), group)
    }

    /// Emit a node whose statement overrides some flag variables.
    pub fn emit_with(
        &self,
        module: &Module,
        overrides: Vec<Variable>,
        group: &mut ObjectGroup,
    ) -> BuildNode {
        let output = object_path(module.object_stem(), self.platform);
        let rule = match module.kind() {
            SourceKind::C => rules::CC,
            SourceKind::Cxx | SourceKind::Cpp => rules::CXX,
            SourceKind::Resource => rules::RC,
        };
        let mut node = BuildNode::new(output.clone(), rule, module.source_path());
        match module.kind() {
            SourceKind::Cxx | SourceKind::Cpp => {
                if let Some(pch) = self.pch {
                    node.implicit.push(pch.artifact.clone());
                }
            }
            SourceKind::Resource => node.implicit.extend(module.assets().iter().cloned()),
            SourceKind::C => {}
        }
        node.variables = overrides;
        group.push(output);
        node
    }

    /// Emit every module in order.
    pub fn emit_all(&self, modules: &[Module], group: &mut ObjectGroup) -> Vec<BuildNode> {
        modules
            .iter()
            .map(|module| self.emit(module, group))
            .collect()
    }
}
