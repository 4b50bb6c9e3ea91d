//! Build graph synthesizer for the sg debugger.
//!
//! This library selects the translation units that apply to a platform,
//! resolves compiler flags for a build mode, assembles the compile and link
//! graph, and renders it as a Ninja build file. The [`runner`] module ties
//! the stages to the process environment.

pub mod catalog;
pub mod cli;
pub mod filter;
pub mod ir;
pub mod ninja_gen;
pub mod pipeline;
pub mod platform;
pub mod runner;
pub mod toolchain;
