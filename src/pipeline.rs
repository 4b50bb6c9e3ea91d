//! Build graph synthesis.
//!
//! [`synthesize`] runs the generator's pure stages in order: select modules
//! from the catalog, emit compile nodes, compose link targets, and validate
//! the resulting graph. It performs no I/O; the runner supplies the catalog,
//! the compiler configuration, and a record of the invocation.

use camino::Utf8PathBuf;
use itertools::Itertools;
use tracing::{debug, info};

use crate::catalog::{self, Catalog, Module};
use crate::ir::{
    BuildGraph, BuildNode, Emitter, IrGenError, NodeSection, ObjectGroup, PrecompiledHeader,
    Regeneration, TargetSpec, Variable, compose, rules,
};
use crate::platform::Platform;
use crate::toolchain::CompilerConfig;

/// Directory receiving objects and binaries.
pub const BUILD_DIR: &str = "out";

/// Build file written at the repository root.
pub const BUILD_FILE: &str = "build.ninja";

/// The command line that produced a graph, recorded so it can be rerun.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Generator executable.
    pub program: String,
    /// Arguments after the program name.
    pub args: Vec<String>,
}

impl Invocation {
    /// Record an invocation.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Describe the running process.
    ///
    /// The program is the resolved executable path when it is valid UTF-8,
    /// falling back to `argv[0]`.
    #[must_use]
    pub fn from_process() -> Self {
        let mut argv = std::env::args();
        let argv0 = argv.next().unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());
        let program = std::env::current_exe()
            .ok()
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
            .map_or(argv0, Utf8PathBuf::into_string);
        Self::new(program, argv.collect())
    }

    /// Arguments joined for the `configure_args` variable.
    #[must_use]
    pub fn configure_args(&self) -> String {
        shlex::try_join(self.args.iter().map(String::as_str))
            .unwrap_or_else(|_| self.args.join(" "))
    }
}

/// Modules surviving the platform filter, per list.
#[derive(Debug)]
struct Selection {
    core: Vec<Module>,
    main: Vec<Module>,
    tests: Vec<Module>,
    vendored: Vec<(&'static str, Vec<Module>)>,
}

fn select(catalog: &Catalog, platform: Platform) -> Selection {
    let vendored = [
        ("Platform-base library.", &catalog.base),
        ("Regular expression engine.", &catalog.re2),
        ("Font rasterizer.", &catalog.freetype),
    ]
    .into_iter()
    .map(|(comment, list)| (comment, list.select(platform)))
    .collect();
    let selection = Selection {
        core: catalog.core.select(platform),
        main: catalog.main.select(platform),
        tests: catalog.tests.select(platform),
        vendored,
    };
    info!(
        platform = %platform,
        core = selection.core.len(),
        main = selection.main.len(),
        tests = selection.tests.len(),
        vendored = %selection.vendored.iter().map(|(_, modules)| modules.len()).join("/"),
        "selected modules"
    );
    selection
}

/// Compile nodes and the object groups they fed.
#[derive(Debug, Default)]
struct Emitted {
    sections: Vec<NodeSection>,
    pch: ObjectGroup,
    app: Vec<ObjectGroup>,
    main: ObjectGroup,
    tests: ObjectGroup,
    reader_writer: ObjectGroup,
}

fn emit(
    selection: &Selection,
    config: &CompilerConfig,
    pch: Option<&PrecompiledHeader>,
) -> Emitted {
    let emitter = Emitter::new(config.platform, pch);
    let mut out = Emitted::default();

    if let Some(pch) = pch {
        out.pch.push(pch.object.clone());
        out.sections
            .push(NodeSection::new("Build the precompiled header.", vec![pch.node()]));
    }

    let mut core = ObjectGroup::new();
    let nodes = emitter.emit_all(&selection.core, &mut core);
    out.sections.push(NodeSection::new("Core sources.", nodes));
    out.app.push(core);

    for (comment, modules) in &selection.vendored {
        let mut group = ObjectGroup::new();
        let nodes = emitter.emit_all(modules, &mut group);
        out.sections.push(NodeSection::new(*comment, nodes));
        out.app.push(group);
    }

    let mut main_nodes = emitter.emit_all(&selection.main, &mut out.main);
    if config.platform == Platform::Windows {
        main_nodes.push(emitter.emit(&catalog::resource_script(), &mut out.main));
    }
    out.sections.push(NodeSection::new(
        "Main executable is the application objects plus main() and startup code.",
        main_nodes,
    ));

    let gtest_cflags = Variable::list("cflags", &config.gtest_cflags());
    let test_cflags = Variable::list("cflags", &config.test_cflags());
    let mut test_nodes: Vec<BuildNode> = catalog::test_framework()
        .iter()
        .map(|module| emitter.emit_with(module, vec![gtest_cflags.clone()], &mut out.tests))
        .collect();
    test_nodes.extend(
        selection
            .tests
            .iter()
            .map(|module| emitter.emit_with(module, vec![test_cflags.clone()], &mut out.tests)),
    );
    out.sections.push(NodeSection::new(
        "Tests all build into the sg_test executable.",
        test_nodes,
    ));

    let reader_writer =
        emitter.emit(&catalog::reader_writer_test(), &mut out.reader_writer);
    out.sections.push(NodeSection::new(
        "Standalone reader/writer stress test.",
        vec![reader_writer],
    ));

    debug!(
        nodes = out.sections.iter().map(|section| section.nodes.len()).sum::<usize>(),
        "emitted compile nodes"
    );
    out
}

/// Synthesize the complete build graph for one run.
///
/// # Errors
///
/// Returns [`IrGenError`] when two modules map onto the same object path or a
/// target references an object that was never emitted.
pub fn synthesize(
    catalog: &Catalog,
    config: &CompilerConfig,
    invocation: &Invocation,
) -> Result<BuildGraph, IrGenError> {
    let platform = config.platform;
    let pch = PrecompiledHeader::for_run(platform, config.mode);
    let selection = select(catalog, platform);
    let emitted = emit(&selection, config, pch.as_ref());

    let app_groups: Vec<&ObjectGroup> = emitted
        .app
        .iter()
        .chain(std::iter::once(&emitted.pch))
        .collect();

    let sg = compose(
        TargetSpec {
            name: "sg",
            comment: "Main executable.",
            groups: std::iter::once(&emitted.main)
                .chain(app_groups.iter().copied())
                .collect(),
            libs: config.libs.clone(),
            ..TargetSpec::default()
        },
        config,
    );
    // The order-only edges keep test links from racing the main link on the
    // shared intermediate debug symbol database.
    let sg_test = compose(
        TargetSpec {
            name: "sg_test",
            comment: "Unit tests.",
            groups: std::iter::once(&emitted.tests)
                .chain(app_groups.iter().copied())
                .collect(),
            libs: config.libs.clone(),
            ldflags: Some(config.test_ldflags()),
            order_only: Some(&sg),
            ..TargetSpec::default()
        },
        config,
    );
    let reader_writer_test = compose(
        TargetSpec {
            name: "reader_writer_test",
            comment: "Reader/writer stress test.",
            groups: vec![&emitted.reader_writer, &emitted.pch],
            ldflags: Some(config.test_ldflags()),
            implicit: pch.iter().map(|pch| pch.artifact.clone()).collect(),
            order_only: Some(&sg),
            ..TargetSpec::default()
        },
        config,
    );

    let graph = BuildGraph {
        header: vec![Variable::new("configure_args", invocation.configure_args())],
        globals: vec![
            Variable::new("builddir", BUILD_DIR),
            Variable::new("cxx", config.cxx.as_str()),
            Variable::new("cc", config.cc.as_str()),
        ],
        flags: vec![
            Variable::list("cflags", &config.cflags),
            Variable::list("ccflags", &config.ccflags),
            Variable::list("cxxflags", &config.cxxflags),
            Variable::list("ldflags", &config.ldflags),
        ],
        rules: rules::declarations(config, pch.as_ref()),
        sections: emitted.sections,
        targets: vec![sg, sg_test, reader_writer_test],
        regeneration: Regeneration {
            rule: Some(rules::regeneration(platform, &invocation.program)),
            output: Utf8PathBuf::from(BUILD_FILE),
            implicit: vec![Utf8PathBuf::from(invocation.program.as_str())],
        },
    };
    graph.validated()
}
