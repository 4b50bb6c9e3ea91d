//! Module catalog.
//!
//! Static registries of translation units per subsystem, plus discovery of
//! the vendored platform-base library, whose file list is taken from disk.
//! Names are path-like and extension-less; the extension comes from the
//! subsystem's convention or, for discovered files, from the file itself.

use crate::filter::{self, SubsystemKind};
use crate::platform::Platform;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// An independent collection of sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    /// The debugger's own sources.
    Core,
    /// Vendored Chromium `base` library.
    Base,
    /// Vendored RE2 regular expression engine.
    Re2,
    /// Vendored FreeType font rasterizer.
    Freetype,
    /// Vendored googletest, used only by the unit-test binary.
    Gtest,
}

impl Subsystem {
    /// Source root relative to the repository.
    #[must_use]
    pub const fn root(self) -> &'static str {
        match self {
            Self::Core => "sg",
            Self::Base => "third_party/base",
            Self::Re2 => "third_party/re2",
            Self::Freetype => "third_party/freetype",
            Self::Gtest => "third_party/testing/gtest",
        }
    }

    /// Filter stages that apply to this subsystem's file lists.
    #[must_use]
    pub const fn kind(self) -> SubsystemKind {
        match self {
            Self::Core => SubsystemKind::Application,
            Self::Base | Self::Re2 | Self::Freetype | Self::Gtest => SubsystemKind::Library,
        }
    }

    /// Extension used by statically listed modules.
    #[must_use]
    pub const fn default_kind(self) -> SourceKind {
        match self {
            Self::Freetype => SourceKind::C,
            Self::Core | Self::Base | Self::Re2 | Self::Gtest => SourceKind::Cxx,
        }
    }
}

/// Source language, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `.c`
    C,
    /// `.cc`
    Cxx,
    /// `.cpp`
    Cpp,
    /// `.rc` Windows resource script.
    Resource,
}

impl SourceKind {
    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cxx => "cc",
            Self::Cpp => "cpp",
            Self::Resource => "rc",
        }
    }

    /// Map an extension onto a compilable kind.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "c" => Some(Self::C),
            "cc" => Some(Self::Cxx),
            "cpp" => Some(Self::Cpp),
            "rc" => Some(Self::Resource),
            _ => None,
        }
    }

    /// Whether the kind is compiled as C++ and may use the precompiled header.
    #[must_use]
    pub const fn is_cxx(self) -> bool {
        matches!(self, Self::Cxx | Self::Cpp)
    }
}

/// One translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    subsystem: Subsystem,
    name: Utf8PathBuf,
    kind: SourceKind,
    object_stem: Utf8PathBuf,
    assets: Vec<Utf8PathBuf>,
}

impl Module {
    /// Create a module named `name` within `subsystem`.
    #[must_use]
    pub fn new(subsystem: Subsystem, name: impl AsRef<str>, kind: SourceKind) -> Self {
        let normalized = normalize(name.as_ref());
        Self {
            subsystem,
            object_stem: normalized.clone(),
            name: normalized,
            kind,
            assets: Vec::new(),
        }
    }

    /// Override the object file stem, for sources whose object name differs.
    #[must_use]
    pub fn with_object_stem(mut self, stem: impl AsRef<str>) -> Self {
        self.object_stem = normalize(stem.as_ref());
        self
    }

    /// Record an asset the source references, such as an icon.
    #[must_use]
    pub fn with_asset(mut self, asset: impl AsRef<str>) -> Self {
        self.assets.push(normalize(asset.as_ref()));
        self
    }

    /// Subsystem the module belongs to.
    #[must_use]
    pub const fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    /// Logical, extension-less name.
    #[must_use]
    pub fn name(&self) -> &Utf8Path {
        &self.name
    }

    /// Source language.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Stem of the object file path below the object directory.
    #[must_use]
    pub fn object_stem(&self) -> &Utf8Path {
        &self.object_stem
    }

    /// Assets the source references.
    #[must_use]
    pub fn assets(&self) -> &[Utf8PathBuf] {
        &self.assets
    }

    /// Source path relative to the repository root.
    #[must_use]
    pub fn source_path(&self) -> Utf8PathBuf {
        let mut path = Utf8PathBuf::from(self.subsystem.root());
        path.push(format!("{}.{}", self.name, self.kind.extension()));
        path
    }
}

/// Normalize a path-like name: `/` separators, no `.` components, no
/// redundant separators.
#[must_use]
pub fn normalize(raw: &str) -> Utf8PathBuf {
    let unified = raw.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for component in Utf8Path::new(&unified).components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if parts.pop().is_none() {
                    parts.push("..");
                }
            }
            other => parts.push(other.as_str()),
        }
    }
    Utf8PathBuf::from(parts.join("/"))
}

/// Errors raised while building the catalog.
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    /// A vendored source root is missing; submodules may be out of date.
    #[error("source root {path} does not exist")]
    #[diagnostic(
        code(sg_configure::catalog::missing_root),
        help("run `git submodule update --init`")
    )]
    MissingRoot {
        /// Root that was expected.
        path: Utf8PathBuf,
    },
    /// Walking a source root failed.
    #[error("failed to list {root}")]
    #[diagnostic(code(sg_configure::catalog::walk))]
    Walk {
        /// Root being listed.
        root: Utf8PathBuf,
        /// Underlying traversal error.
        #[source]
        source: walkdir::Error,
    },
    /// A discovered path is not valid UTF-8.
    #[error("source path {path} is not valid UTF-8")]
    #[diagnostic(code(sg_configure::catalog::non_utf8))]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },
}

const CORE_SOURCES: &[&str] = &[
    "app_thread",
    "backend/debug_core_gdb",
    "backend/gdb_mi_parse",
    "backend/gdb_to_generic_converter",
    "backend/subprocess_win",
    "cpp_lexer",
    "debug_presenter",
    "debug_presenter_display",
    "display_util",
    "lexer",
    "lexer_state",
    "locals_view",
    "main_loop",
    "render/renderer",
    "render/scoped_render_offset",
    "render/texture",
    "source_files",
    "source_view",
    "status_bar",
    "stack_view",
    "ui/dockable",
    "ui/docking_resizer",
    "ui/docking_split_container",
    "ui/docking_tool_window",
    "ui/docking_workspace",
    "ui/focus",
    "ui/scroll_helper",
    "ui/scrolling_output_view",
    "ui/skin",
    "ui/tool_window_dragger",
    "ui/tree_view_helper",
    "workspace",
];

const MAIN_SOURCES: &[&str] = &[
    "application",
    "render/application_window_win",
    "render/gpu_win",
    "render/direct2d_win",
    "main_win",
];

const TEST_SOURCES: &[&str] = &[
    "lexer_test",
    "backend/debug_core_gdb_test",
    "backend/gdb_mi_parse_test",
    "backend/subprocess_test",
    "ui/docking_test",
];

const RE2_SOURCES: &[&str] = &[
    "re2/bitstate",
    "re2/compile",
    "re2/dfa",
    "re2/filtered_re2",
    "re2/mimics_pcre",
    "re2/nfa",
    "re2/onepass",
    "re2/parse",
    "re2/perl_groups",
    "re2/prefilter",
    "re2/prefilter_tree",
    "re2/prog",
    "re2/re2",
    "re2/regexp",
    "re2/set",
    "re2/simplify",
    "re2/tostring",
    "re2/unicode_casefold",
    "re2/unicode_groups",
    "util/arena",
    "util/hash",
    "util/rune",
    "util/stringpiece",
    "util/stringprintf",
    "util/strutil",
    "util/valgrind",
];

const FREETYPE_SOURCES: &[&str] = &[
    "src/autofit/autofit",
    "src/base/ftbase",
    "src/base/ftbbox",
    "src/base/ftbitmap",
    "src/base/ftdebug",
    "src/base/ftfstype",
    "src/base/ftgasp",
    "src/base/ftglyph",
    "src/base/ftgxval",
    "src/base/ftinit",
    "src/base/ftlcdfil",
    "src/base/ftmm",
    "src/base/ftpatent",
    "src/base/ftpfr",
    "src/base/ftstroke",
    "src/base/ftsynth",
    "src/base/ftsystem",
    "src/base/fttype1",
    "src/base/ftwinfnt",
    "src/base/ftxf86",
    "src/bdf/bdf",
    "src/cache/ftcache",
    "src/cff/cff",
    "src/cid/type1cid",
    "src/gzip/ftgzip",
    "src/lzw/ftlzw",
    "src/pcf/pcf",
    "src/pfr/pfr",
    "src/psaux/psaux",
    "src/pshinter/pshinter",
    "src/psnames/psmodule",
    "src/raster/raster",
    "src/sfnt/sfnt",
    "src/smooth/smooth",
    "src/truetype/truetype",
    "src/type1/type1",
    "src/type42/type42",
    "src/winfonts/winfnt",
];

/// A raw, unfiltered list of source names for one subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceList {
    /// Owning subsystem.
    pub subsystem: Subsystem,
    /// Path-like names relative to the subsystem root.
    pub paths: Vec<Utf8PathBuf>,
}

impl SourceList {
    /// Build a list from static names.
    #[must_use]
    pub fn from_names(subsystem: Subsystem, names: &[&str]) -> Self {
        Self {
            subsystem,
            paths: names.iter().map(|name| normalize(name)).collect(),
        }
    }

    /// Filter the list for `platform` and turn survivors into modules.
    ///
    /// Names with a compilable extension use it; extension-less names take
    /// the subsystem's convention. Files with other extensions are dropped.
    #[must_use]
    pub fn select(&self, platform: Platform) -> Vec<Module> {
        filter::filter(&self.paths, platform, self.subsystem.kind())
            .iter()
            .filter_map(|path| self.module_for(path))
            .collect()
    }

    fn module_for(&self, path: &Utf8Path) -> Option<Module> {
        match path.extension() {
            None => Some(Module::new(
                self.subsystem,
                path.as_str(),
                self.subsystem.default_kind(),
            )),
            Some(ext) => {
                let Some(kind) = SourceKind::from_extension(ext) else {
                    debug!(path = %path, "skipping file without a compile rule");
                    return None;
                };
                // Only the application's own resource script is compiled.
                if kind == SourceKind::Resource && self.subsystem != Subsystem::Core {
                    debug!(path = %path, "skipping vendored resource script");
                    return None;
                }
                Some(Module::new(
                    self.subsystem,
                    path.with_extension("").as_str(),
                    kind,
                ))
            }
        }
    }
}

/// Every raw source list the generator knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    /// Core sources linked into every binary.
    pub core: SourceList,
    /// Startup sources linked only into the main binary.
    pub main: SourceList,
    /// Unit tests linked into the unit-test binary.
    pub tests: SourceList,
    /// Vendored platform-base library, as discovered on disk.
    pub base: SourceList,
    /// Vendored regex engine.
    pub re2: SourceList,
    /// Vendored font rasterizer.
    pub freetype: SourceList,
}

impl Catalog {
    /// Build the catalog with the given platform-base file list.
    #[must_use]
    pub fn with_base_files(base_files: Vec<Utf8PathBuf>) -> Self {
        Self {
            core: SourceList::from_names(Subsystem::Core, CORE_SOURCES),
            main: SourceList::from_names(Subsystem::Core, MAIN_SOURCES),
            tests: SourceList::from_names(Subsystem::Core, TEST_SOURCES),
            base: SourceList {
                subsystem: Subsystem::Base,
                paths: base_files,
            },
            re2: SourceList::from_names(Subsystem::Re2, RE2_SOURCES),
            freetype: SourceList::from_names(Subsystem::Freetype, FREETYPE_SOURCES),
        }
    }

    /// Build the catalog, discovering the platform-base library under `repo_root`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the library root is missing or cannot
    /// be listed.
    pub fn discover(repo_root: &Utf8Path) -> Result<Self, CatalogError> {
        let base_files = discover_files(&repo_root.join(Subsystem::Base.root()))?;
        Ok(Self::with_base_files(base_files))
    }
}

/// The precompiled-header source.
#[must_use]
pub fn precompiled_header_source() -> Module {
    Module::new(Subsystem::Core, "sg_pch", SourceKind::Cxx)
}

/// The Windows resource script and the icon it embeds.
#[must_use]
pub fn resource_script() -> Module {
    Module::new(Subsystem::Core, "sg", SourceKind::Resource).with_asset("art/sg.ico")
}

/// The googletest amalgamation and its `main`.
#[must_use]
pub fn test_framework() -> [Module; 2] {
    [
        Module::new(Subsystem::Gtest, "src/gtest-all", SourceKind::Cxx).with_object_stem("gtest-all"),
        Module::new(Subsystem::Core, "main_test", SourceKind::Cxx).with_object_stem("gtest_main"),
    ]
}

/// The standalone reader/writer stress test.
#[must_use]
pub fn reader_writer_test() -> Module {
    Module::new(Subsystem::Core, "backend/reader_writer_test", SourceKind::Cxx)
}

/// List every file under `root`, relative to it, sorted by name.
///
/// # Errors
///
/// Returns [`CatalogError`] when `root` is missing, cannot be traversed, or
/// contains non-UTF-8 names.
pub fn discover_files(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, CatalogError> {
    if !root.is_dir() {
        return Err(CatalogError::MissingRoot {
            path: root.to_owned(),
        });
    }
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git");
    for entry in walker {
        let entry = entry.map_err(|source| CatalogError::Walk {
            root: root.to_owned(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let utf8 = Utf8Path::from_path(relative).ok_or_else(|| CatalogError::NonUtf8Path {
            path: relative.to_string_lossy().into_owned(),
        })?;
        files.push(normalize(utf8.as_str()));
    }
    debug!(root = %root, count = files.len(), "discovered sources");
    Ok(files)
}
