//! Intermediate Representation structures.
//!
//! This module defines the build graph synthesized for one platform and
//! build mode. The IR mirrors Ninja's model (variables, rules, and build
//! statements) without embedding Ninja syntax, which is left to
//! [`crate::ninja_gen`].
//!
//! # Examples
//!
//! ```
//! use sg_configure::ir::{BuildGraph, BuildNode, NodeSection, Regeneration, Variable};
//! use camino::Utf8PathBuf;
//!
//! let node = BuildNode::new("$builddir/obj/lexer.o", "cxx", "sg/lexer.cc");
//! let graph = BuildGraph {
//!     header: vec![Variable::new("configure_args", "")],
//!     globals: Vec::new(),
//!     flags: Vec::new(),
//!     rules: Vec::new(),
//!     sections: vec![NodeSection::new("Core sources.", vec![node])],
//!     targets: Vec::new(),
//!     regeneration: Regeneration::default(),
//! };
//! assert!(graph.validated().is_ok());
//! ```

mod compose;
mod emit;
mod error;
mod graph;
pub mod rules;

pub use compose::{TargetSpec, binary_path, compose};
pub use emit::{Emitter, ObjectGroup, PrecompiledHeader, object_path};
pub use error::IrGenError;
pub use graph::{BuildGraph, BuildNode, NodeSection, Regeneration, Rule, Target, Variable};

/// Ninja variable naming the output directory.
pub const BUILD_DIR_VAR: &str = "$builddir";
