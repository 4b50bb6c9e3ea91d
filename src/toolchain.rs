//! Compiler configuration selection.
//!
//! [`resolve`] derives, for one platform and build mode, the compiler
//! executables and four flag groups: general compile flags, C-only flags,
//! C++-only flags, and link flags. Groups are concatenated onto command lines
//! by the rules; nothing here merges or deduplicates them.
//!
//! The Windows warning suppressions in [`MSVC_SUPPRESSED_WARNINGS`] are a
//! compatibility contract with the codebase: each identifier stands for a
//! warning the sources are known to trigger under `/W4 /WX`.

use crate::platform::{BuildMode, Platform};
use configure_env::{CC_ENV, CXX_ENV, DEFAULT_CC, DEFAULT_CXX};
use mockable::Env;
use serde::Serialize;
use tracing::debug;

/// MSVC warnings suppressed with `/wd`, in command-line order.
pub const MSVC_SUPPRESSED_WARNINGS: [u16; 22] = [
    4530, 4100, 4706, 4245, 4018, 4512, 4800, 4702, 4819, 4355, 4996, 4481, 4127, 4310, 4244,
    4701, 4201, 4389, 4722, 4703, 4510, 4610,
];

/// Include paths shared by every compile.
const INCLUDE_DIRS: [&str; 5] = [
    ".",
    "third_party",
    "third_party/re2",
    "build",
    "third_party/freetype/include",
];

/// Header force-included into every translation unit.
pub const GLOBAL_HEADER: &str = "sg/global.h";

/// Root of the vendored googletest checkout.
pub const GTEST_ROOT: &str = "third_party/testing/gtest";

const MSVC_LIBS: [&str; 13] = [
    "advapi32.lib",
    "comdlg32.lib",
    "dbghelp.lib",
    "d2d1.lib",
    "dwrite.lib",
    "gdi32.lib",
    "ole32.lib",
    "oleaut32.lib",
    "opengl32.lib",
    "shell32.lib",
    "user32.lib",
    "version.lib",
    "windowscodecs.lib",
];

/// Compiler executables and flag groups for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerConfig {
    /// Platform the flags target.
    pub platform: Platform,
    /// Build mode the flags were selected for.
    pub mode: BuildMode,
    /// C compiler executable.
    pub cc: String,
    /// C++ compiler executable.
    pub cxx: String,
    /// Flags passed to every compile.
    pub cflags: Vec<String>,
    /// Flags passed only to C compiles.
    pub ccflags: Vec<String>,
    /// Flags passed only to C++ compiles.
    pub cxxflags: Vec<String>,
    /// Flags passed to every link.
    pub ldflags: Vec<String>,
    /// System libraries linked into the application binaries.
    pub libs: Vec<String>,
}

fn owned(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|flag| (*flag).to_owned()).collect()
}

/// Select the compiler configuration for `platform` and `mode`.
///
/// On non-Windows platforms the compilers come from `CC` and `CXX` in `env`,
/// falling back to `gcc` and `g++`.
#[must_use]
pub fn resolve(platform: Platform, mode: BuildMode, env: &impl Env) -> CompilerConfig {
    let config = match platform {
        Platform::Windows => msvc(mode),
        Platform::Linux | Platform::Mac => gcc(platform, mode, env),
    };
    debug!(
        platform = %platform,
        mode = ?mode,
        cc = %config.cc,
        cxx = %config.cxx,
        "resolved compiler configuration"
    );
    config
}

fn msvc(mode: BuildMode) -> CompilerConfig {
    let mut cflags = owned(&["/nologo", "/Zi", "/W4", "/WX"]);
    cflags.extend(MSVC_SUPPRESSED_WARNINGS.iter().map(|id| format!("/wd{id}")));
    cflags.extend(owned(&[
        "/GR-",
        "/DNOMINMAX",
        "/D_CRT_SECURE_NO_WARNINGS",
        "/DUNICODE",
        "/D_UNICODE",
        "/D_CRT_RAND_S",
        "/DWIN32",
        "/D_WIN32",
        "/D_WIN32_WINNT=0x0601",
        "/D_VARIADIC_MAX=10",
        "/DDYNAMIC_ANNOTATIONS_ENABLED=0",
    ]));
    cflags.extend(INCLUDE_DIRS.iter().map(|dir| format!("-I{dir}")));
    cflags.push(format!("-FI{GLOBAL_HEADER}"));

    let mut ldflags = owned(&["/DEBUG", "/SUBSYSTEM:WINDOWS"]);
    match mode {
        BuildMode::Debug => {
            cflags.extend(owned(&["/D_DEBUG", "/MTd"]));
            ldflags.push("/INCREMENTAL".to_owned());
        }
        BuildMode::Release => {
            cflags.extend(owned(&["/DNDEBUG", "/MT"]));
            cflags.extend(owned(&["/Ox", "/DNDEBUG", "/GL"]));
            ldflags.extend(owned(&["/LTCG", "/OPT:REF", "/OPT:ICF"]));
        }
    }

    CompilerConfig {
        platform: Platform::Windows,
        mode,
        cc: "cl".to_owned(),
        cxx: "cl".to_owned(),
        cflags,
        ccflags: owned(&[
            "/DFT2_BUILD_LIBRARY",
            "/wd4146",
            "/Fd$builddir\\sg_cc_intermediate.pdb",
        ]),
        cxxflags: owned(&["/Fd$builddir\\sg_cxx_intermediate.pdb"]),
        ldflags,
        libs: owned(&MSVC_LIBS),
    }
}

fn gcc(platform: Platform, mode: BuildMode, env: &impl Env) -> CompilerConfig {
    let mut cflags = owned(&[
        "-g",
        "-Wall",
        "-Wextra",
        "-Wno-deprecated",
        "-Wno-unused-parameter",
        "-Wno-sign-compare",
        "-fno-rtti",
        "-fno-exceptions",
        "-fvisibility=hidden",
        "-pipe",
        "-Wno-missing-field-initializers",
    ]);
    cflags.extend(INCLUDE_DIRS.iter().map(|dir| format!("-I{dir}")));
    cflags.extend(owned(&["-include", GLOBAL_HEADER]));
    match mode {
        BuildMode::Debug => {
            cflags.extend(owned(&["-D_GLIBCXX_DEBUG", "-D_GLIBCXX_DEBUG_PEDANTIC"]));
            // Pedantic libstdc++ debug mode needs RTTI.
            cflags.retain(|flag| flag != "-fno-rtti");
        }
        BuildMode::Release => cflags.extend(owned(&["-O2", "-DNDEBUG"])),
    }

    CompilerConfig {
        platform,
        mode,
        cc: env.raw(CC_ENV).unwrap_or_else(|_| DEFAULT_CC.to_owned()),
        cxx: env.raw(CXX_ENV).unwrap_or_else(|_| DEFAULT_CXX.to_owned()),
        cflags,
        ccflags: owned(&["-DFT2_BUILD_LIBRARY"]),
        cxxflags: Vec::new(),
        ldflags: owned(&["-L$builddir"]),
        libs: Vec::new(),
    }
}

impl CompilerConfig {
    /// Compile flags for the googletest sources.
    #[must_use]
    pub fn gtest_cflags(&self) -> Vec<String> {
        let mut flags = self.cflags.clone();
        flags.push(format!("-I{GTEST_ROOT}"));
        flags.push(format!("-I{GTEST_ROOT}/include"));
        flags
    }

    /// Compile flags for unit-test sources.
    #[must_use]
    pub fn test_cflags(&self) -> Vec<String> {
        let mut flags = self.cflags.clone();
        flags.push("-DGTEST_HAS_RTTI=0".to_owned());
        flags.push(format!("-I{GTEST_ROOT}/include"));
        flags
    }

    /// Link flags for console test binaries.
    #[must_use]
    pub fn test_ldflags(&self) -> Vec<String> {
        let mut flags = self.ldflags.clone();
        if self.platform == Platform::Windows {
            flags.push("/SUBSYSTEM:CONSOLE".to_owned());
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::{fixture, rstest};
    use std::env::VarError;

    #[fixture]
    fn empty_env() -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_raw().returning(|_| Err(VarError::NotPresent));
        env
    }

    fn has(flags: &[String], flag: &str) -> bool {
        flags.iter().any(|candidate| candidate == flag)
    }

    #[rstest]
    fn msvc_suppresses_exact_warning_list(empty_env: MockEnv) {
        let config = resolve(Platform::Windows, BuildMode::Debug, &empty_env);
        let suppressed: Vec<&str> = config
            .cflags
            .iter()
            .filter_map(|flag| flag.strip_prefix("/wd"))
            .collect();
        assert_eq!(
            suppressed,
            [
                "4530", "4100", "4706", "4245", "4018", "4512", "4800", "4702", "4819", "4355",
                "4996", "4481", "4127", "4310", "4244", "4701", "4201", "4389", "4722", "4703",
                "4510", "4610",
            ]
        );
        assert!(has(&config.ccflags, "/wd4146"));
    }

    #[rstest]
    fn msvc_debug_uses_debug_runtime_and_incremental_link(empty_env: MockEnv) {
        let config = resolve(Platform::Windows, BuildMode::Debug, &empty_env);
        assert!(has(&config.cflags, "/MTd"));
        assert!(has(&config.cflags, "/D_DEBUG"));
        assert!(has(&config.ldflags, "/INCREMENTAL"));
        assert!(!has(&config.cflags, "/GL"));
        assert!(!has(&config.ldflags, "/LTCG"));
    }

    #[rstest]
    fn msvc_release_enables_whole_program_optimisation(empty_env: MockEnv) {
        let config = resolve(Platform::Windows, BuildMode::Release, &empty_env);
        for flag in ["/Ox", "/GL", "/MT", "/DNDEBUG"] {
            assert!(has(&config.cflags, flag), "missing {flag}");
        }
        for flag in ["/LTCG", "/OPT:REF", "/OPT:ICF"] {
            assert!(has(&config.ldflags, flag), "missing {flag}");
        }
        assert!(!has(&config.cflags, "/MTd"));
        assert!(!has(&config.cflags, "/D_DEBUG"));
        assert!(!has(&config.ldflags, "/INCREMENTAL"));
    }

    #[rstest]
    fn msvc_disables_rtti_and_uses_cl(empty_env: MockEnv) {
        let config = resolve(Platform::Windows, BuildMode::Release, &empty_env);
        assert!(has(&config.cflags, "/GR-"));
        assert!(!config.cflags.iter().any(|flag| flag.starts_with("/EH")));
        assert_eq!((config.cc.as_str(), config.cxx.as_str()), ("cl", "cl"));
        assert_eq!(config.libs.len(), MSVC_LIBS.len());
    }

    #[rstest]
    #[case(Platform::Linux)]
    #[case(Platform::Mac)]
    fn gcc_release_optimises_and_drops_assertions(empty_env: MockEnv, #[case] platform: Platform) {
        let config = resolve(platform, BuildMode::Release, &empty_env);
        for flag in ["-O2", "-DNDEBUG", "-fno-rtti", "-fno-exceptions"] {
            assert!(has(&config.cflags, flag), "missing {flag}");
        }
        assert!(!has(&config.cflags, "-D_GLIBCXX_DEBUG"));
        assert!(!has(&config.cflags, "-D_GLIBCXX_DEBUG_PEDANTIC"));
    }

    #[rstest]
    fn gcc_debug_adds_libstdcxx_instrumentation(empty_env: MockEnv) {
        let config = resolve(Platform::Linux, BuildMode::Debug, &empty_env);
        assert!(has(&config.cflags, "-D_GLIBCXX_DEBUG"));
        assert!(has(&config.cflags, "-D_GLIBCXX_DEBUG_PEDANTIC"));
        assert!(has(&config.cflags, "-fno-exceptions"));
        assert!(!has(&config.cflags, "-fno-rtti"));
        assert!(!has(&config.cflags, "-O2"));
    }

    #[rstest]
    fn gcc_suppresses_short_warning_list(empty_env: MockEnv) {
        let config = resolve(Platform::Linux, BuildMode::Release, &empty_env);
        let suppressed: Vec<&str> = config
            .cflags
            .iter()
            .filter(|flag| flag.starts_with("-Wno-"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            suppressed,
            [
                "-Wno-deprecated",
                "-Wno-unused-parameter",
                "-Wno-sign-compare",
                "-Wno-missing-field-initializers",
            ]
        );
    }

    #[rstest]
    fn gcc_defaults_compilers_when_unset(empty_env: MockEnv) {
        let config = resolve(Platform::Linux, BuildMode::Release, &empty_env);
        assert_eq!((config.cc.as_str(), config.cxx.as_str()), ("gcc", "g++"));
    }

    #[rstest]
    fn gcc_honours_compiler_overrides() {
        let mut env = MockEnv::new();
        env.expect_raw().returning(|key| match key {
            "CC" => Ok("clang".to_owned()),
            "CXX" => Ok("clang++".to_owned()),
            _ => Err(VarError::NotPresent),
        });
        let config = resolve(Platform::Mac, BuildMode::Debug, &env);
        assert_eq!((config.cc.as_str(), config.cxx.as_str()), ("clang", "clang++"));
    }

    #[rstest]
    fn test_link_flags_add_console_subsystem_on_windows_only(empty_env: MockEnv) {
        let windows = resolve(Platform::Windows, BuildMode::Debug, &empty_env);
        assert_eq!(windows.test_ldflags().last().map(String::as_str), Some("/SUBSYSTEM:CONSOLE"));
        let linux = resolve(Platform::Linux, BuildMode::Debug, &empty_env);
        assert_eq!(linux.test_ldflags(), linux.ldflags);
    }

    #[rstest]
    fn test_compile_flags_extend_general_flags(empty_env: MockEnv) {
        let config = resolve(Platform::Linux, BuildMode::Release, &empty_env);
        let gtest = config.gtest_cflags();
        assert!(gtest.starts_with(&config.cflags));
        assert!(has(&gtest, "-Ithird_party/testing/gtest"));
        let tests = config.test_cflags();
        assert!(has(&tests, "-DGTEST_HAS_RTTI=0"));
    }
}
