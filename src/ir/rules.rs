//! Rule declarations.
//!
//! Commands reference the flag variables written at file scope (`$cflags`,
//! `$ccflags`, `$cxxflags`, `$ldflags`) and the per-target `$libs`, so build
//! statements only need to override a variable to change a step's flags.

use std::borrow::Cow;

use super::{PrecompiledHeader, Rule};
use crate::platform::Platform;
use crate::toolchain::CompilerConfig;

/// C++ compile rule.
pub const CXX: &str = "cxx";
/// C compile rule.
pub const CC: &str = "cc";
/// Precompiled-header creation rule.
pub const CXX_PCH: &str = "cxx_pch";
/// Link rule.
pub const LINK: &str = "link";
/// Windows resource compile rule.
pub const RC: &str = "rc";
/// Generator rule that rewrites the build file.
pub const CONFIGURE: &str = "configure";

fn rule(name: &str, command: String, description: &str, depfile: Option<String>) -> Rule {
    Rule {
        name: name.to_owned(),
        command,
        description: Some(description.to_owned()),
        depfile,
        generator: false,
    }
}

fn msvc_compile(output: &str, compiler: &str, flags: &[&str]) -> String {
    let mut parts = vec![
        "ninja -t msvc -o".to_owned(),
        output.to_owned(),
        "--".to_owned(),
        compiler.to_owned(),
        "/showIncludes".to_owned(),
    ];
    parts.extend(flags.iter().map(|flag| (*flag).to_owned()));
    parts.extend(["-c $in".to_owned(), format!("/Fo{output}")]);
    parts.join(" ")
}

/// Declare every compile, link, and resource rule the run needs.
///
/// The resource rule is Windows only; the precompiled-header rule appears
/// only when `pch` is set.
#[must_use]
pub fn declarations(config: &CompilerConfig, pch: Option<&PrecompiledHeader>) -> Vec<Rule> {
    let depfile = Some("$out.d".to_owned());
    let mut rules = Vec::new();
    match config.platform {
        Platform::Windows => {
            let use_pch = pch.map(PrecompiledHeader::use_flags);
            let mut cxx_flags = vec!["$cflags", "$cxxflags"];
            if let Some(flags) = &use_pch {
                cxx_flags.push(flags.as_str());
            }
            rules.push(rule(
                CXX,
                msvc_compile("$out", "$cxx", &cxx_flags),
                "CXX $out",
                depfile.clone(),
            ));
            rules.push(rule(
                CC,
                msvc_compile("$out", "$cc", &["$cflags", "$ccflags"]),
                "CC $out",
                depfile,
            ));
            rules.push(rule(
                LINK,
                "$cxx $in $libs /nologo /link $ldflags /out:$out".to_owned(),
                "LINK $out",
                None,
            ));
            rules.push(rule(
                RC,
                "rc /r /nologo /fo $out $in".to_owned(),
                "RC $out",
                None,
            ));
            if let Some(pch) = pch {
                let create = pch.create_flags();
                rules.push(rule(
                    CXX_PCH,
                    msvc_compile("$objname", "$cxx", &["$cflags", "$cxxflags", create.as_str()]),
                    "CXX $out",
                    Some(format!("{}.d", pch.object)),
                ));
            }
        }
        Platform::Linux | Platform::Mac => {
            rules.push(rule(
                CXX,
                "$cxx -MMD -MT $out -MF $out.d $cflags $cxxflags -c $in -o $out".to_owned(),
                "CXX $out",
                depfile.clone(),
            ));
            rules.push(rule(
                CC,
                "$cc -MMD -MT $out -MF $out.d $cflags $ccflags -c $in -o $out".to_owned(),
                "CC $out",
                depfile,
            ));
            rules.push(rule(
                LINK,
                "$cxx $ldflags -o $out $in $libs".to_owned(),
                "LINK $out",
                None,
            ));
        }
    }
    rules
}

/// The generator rule that reruns `program` with the recorded arguments.
#[must_use]
pub fn regeneration(platform: Platform, program: &str) -> Rule {
    let command = match platform {
        Platform::Windows => {
            let program = if program.contains(' ') {
                Cow::Owned(format!("\"{program}\""))
            } else {
                Cow::Borrowed(program)
            };
            format!("cmd /c {program} $configure_args")
        }
        Platform::Linux | Platform::Mac => {
            let program = shlex::try_quote(program).unwrap_or(Cow::Borrowed(program));
            format!("{program} $configure_args")
        }
    };
    Rule {
        name: CONFIGURE.to_owned(),
        command,
        description: None,
        depfile: None,
        generator: true,
    }
}
