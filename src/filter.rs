//! Platform-aware source filtering.
//!
//! Each [`FilterRule`] is a named list of patterns. Library rules exclude a
//! path when any pattern occurs anywhere in it; the curated application lists
//! use variant rules, which only look at the end of the extension-less name
//! so that `tool_window` is not mistaken for a `_win` variant. [`filter`]
//! applies the rules as a pipeline of pure predicates over an immutable list:
//! the always-excluded rule, the rule for the requested platform, and the
//! library noise rules for vendored code. Survivors keep their input order.

use crate::platform::Platform;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, warn};

/// Which filter stages apply to a source list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubsystemKind {
    /// The application's own sources.
    Application,
    /// Vendored library sources, which also carry docs, tests, and metadata.
    Library,
}

/// How a rule's patterns are compared against a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// The pattern occurs anywhere in the path.
    Substring,
    /// The path, minus its extension, ends with the pattern.
    VariantSuffix,
}

/// A named set of exclusion patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRule {
    /// Name reported in logs.
    pub name: &'static str,
    /// Patterns that exclude a path when they match.
    pub patterns: &'static [&'static str],
    /// How patterns are matched.
    pub matcher: Matcher,
    /// Exclusions whose intent is unclear; every removal is logged as a warning.
    pub under_review: bool,
}

impl FilterRule {
    /// Whether `path` matches any of this rule's patterns.
    #[must_use]
    pub fn excludes(&self, path: &str) -> bool {
        match self.matcher {
            Matcher::Substring => self.patterns.iter().any(|pattern| path.contains(pattern)),
            Matcher::VariantSuffix => {
                let stem = Utf8Path::new(path).with_extension("");
                self.patterns
                    .iter()
                    .any(|pattern| stem.as_str().ends_with(pattern))
            }
        }
    }
}

/// Files that are never built, whatever the platform.
pub const ALWAYS_EXCLUDED: FilterRule = FilterRule {
    name: "always",
    patterns: &[
        "file_path_watcher_stub.cc",
        "dtoa.cc",
        "event_recorder_stubs.cc",
        "_mock.cc",
        "check_example.cc",
        // C sources would need their own rule and flags.
        "dynamic_annotations.c",
        "debug_message.cc",
        // Allocator shims need per-user configuration.
        "allocator/",
        // Winsock inclusion order breaks the build; unused.
        "field_trial.cc",
        // Requires ICU.
        "i18n/",
        // Unused everywhere despite the platform-looking names.
        "linux_",
        "sha1_win.cc",
    ],
    matcher: Matcher::Substring,
    under_review: false,
};

/// Sources that do not build for Windows.
pub const WINDOWS_EXCLUDED: FilterRule = FilterRule {
    name: "windows",
    patterns: &[
        "_posix",
        "_mac",
        "_android",
        "_linux",
        "_ios",
        "_solaris",
        ".java",
        "_gcc",
        ".mm",
        "android/",
        "_libevent",
        "chromeos/",
        "data/",
        "_freebsd",
        "_nacl",
        "_glib",
        "_gtk",
        "mac/",
        "unix_",
        "file_descriptor",
        "_aurax11",
        "_openbsd",
        "xdg_mime",
        "_kqueue",
        "symbolize",
        "string16.cc",
        "_chromeos",
        "nix/",
        "xdg_",
    ],
    matcher: Matcher::Substring,
    under_review: false,
};

/// Sources that do not build for Linux.
pub const LINUX_EXCLUDED: FilterRule = FilterRule {
    name: "linux",
    patterns: &[
        "_win",
        "_mac",
        "_android",
        "_ios",
        "_solaris",
        ".java",
        ".mm",
        "android/",
        "_libevent",
        "chromeos/",
        "data/",
        "_freebsd",
        "_nacl",
        "_glib",
        "_gtk",
        "mac/",
        "file_descriptor",
        "_aurax11",
        "_openbsd",
        "xdg_mime",
        "_kqueue",
        "symbolize",
        "string16.cc",
        "_chromeos",
        "xdg_",
        "win/",
    ],
    matcher: Matcher::Substring,
    under_review: false,
};

/// Sources that do not build for macOS.
///
/// Objective-C++ (`.mm`) is excluded because no compile rule handles it.
pub const MAC_EXCLUDED: FilterRule = FilterRule {
    name: "mac",
    patterns: &[
        "_win",
        "win/",
        "_linux",
        "_android",
        "_ios",
        "_solaris",
        ".java",
        ".mm",
        "android/",
        "_libevent",
        "chromeos/",
        "data/",
        "_freebsd",
        "_nacl",
        "_glib",
        "_gtk",
        "file_descriptor",
        "_aurax11",
        "_openbsd",
        "xdg_mime",
        "symbolize",
        "string16.cc",
        "_chromeos",
        "xdg_",
    ],
    matcher: Matcher::Substring,
    under_review: false,
};

/// Documentation, tests, and build metadata shipped with vendored libraries.
pub const LIBRARY_NOISE: FilterRule = FilterRule {
    name: "library-noise",
    patterns: &[
        "README",
        "LICENSE",
        "OWNERS",
        ".h",
        ".patch",
        "unittest",
        "PRESUBMIT",
        "DEPS",
        ".gyp",
        ".py",
        ".isolate",
        ".nc",
        "test/",
        ".git",
        "_browsertest.cc",
    ],
    matcher: Matcher::Substring,
    under_review: false,
};

/// Library exclusions carried over as temporary and not yet confirmed as policy.
pub const LIBRARY_PENDING_REVIEW: FilterRule = FilterRule {
    name: "library-pending-review",
    patterns: &["base64.cc"],
    matcher: Matcher::Substring,
    under_review: true,
};

/// Curated sources that are variants for another platform than Windows.
pub const WINDOWS_VARIANTS: FilterRule = FilterRule {
    name: "windows-variants",
    patterns: &["_linux", "_mac"],
    matcher: Matcher::VariantSuffix,
    under_review: false,
};

/// Curated sources that are variants for another platform than Linux.
pub const LINUX_VARIANTS: FilterRule = FilterRule {
    name: "linux-variants",
    patterns: &["_win", "_mac"],
    matcher: Matcher::VariantSuffix,
    under_review: false,
};

/// Curated sources that are variants for another platform than macOS.
pub const MAC_VARIANTS: FilterRule = FilterRule {
    name: "mac-variants",
    patterns: &["_win", "_linux"],
    matcher: Matcher::VariantSuffix,
    under_review: false,
};

/// The platform exclusion rule for `platform` and `kind`.
#[must_use]
pub const fn platform_rule(platform: Platform, kind: SubsystemKind) -> &'static FilterRule {
    match (kind, platform) {
        (SubsystemKind::Library, Platform::Windows) => &WINDOWS_EXCLUDED,
        (SubsystemKind::Library, Platform::Linux) => &LINUX_EXCLUDED,
        (SubsystemKind::Library, Platform::Mac) => &MAC_EXCLUDED,
        (SubsystemKind::Application, Platform::Windows) => &WINDOWS_VARIANTS,
        (SubsystemKind::Application, Platform::Linux) => &LINUX_VARIANTS,
        (SubsystemKind::Application, Platform::Mac) => &MAC_VARIANTS,
    }
}

/// The ordered stages applied for `platform` and `kind`.
#[must_use]
pub fn stages(platform: Platform, kind: SubsystemKind) -> Vec<&'static FilterRule> {
    let mut rules = vec![&ALWAYS_EXCLUDED, platform_rule(platform, kind)];
    if kind == SubsystemKind::Library {
        rules.push(&LIBRARY_NOISE);
        rules.push(&LIBRARY_PENDING_REVIEW);
    }
    rules
}

/// Remove every path excluded for `platform` and `kind`.
///
/// The result is a subsequence of `paths`: nothing is reordered or added, and
/// a rule with no matches leaves the list untouched.
///
/// # Examples
///
/// ```
/// use camino::{Utf8Path, Utf8PathBuf};
/// use sg_configure::filter::{SubsystemKind, filter};
/// use sg_configure::platform::Platform;
///
/// let paths: Vec<Utf8PathBuf> = ["foo_win.cc", "foo_linux.cc", "shared.cc"]
///     .into_iter()
///     .map(Utf8PathBuf::from)
///     .collect();
/// let kept = filter(&paths, Platform::Linux, SubsystemKind::Application);
/// assert_eq!(kept, [Utf8PathBuf::from("foo_linux.cc"), Utf8PathBuf::from("shared.cc")]);
/// ```
#[must_use]
pub fn filter(
    paths: &[Utf8PathBuf],
    platform: Platform,
    kind: SubsystemKind,
) -> Vec<Utf8PathBuf> {
    stages(platform, kind)
        .into_iter()
        .fold(paths.to_vec(), |survivors, rule| apply_rule(survivors, rule))
}

fn apply_rule(paths: Vec<Utf8PathBuf>, rule: &FilterRule) -> Vec<Utf8PathBuf> {
    let before = paths.len();
    let kept: Vec<Utf8PathBuf> = paths
        .into_iter()
        .filter(|path| {
            let excluded = rule.excludes(path.as_str());
            if excluded && rule.under_review {
                warn!(path = %path, rule = rule.name, "excluded by a rule pending review");
            }
            !excluded
        })
        .collect();
    debug!(
        rule = rule.name,
        excluded = before - kept.len(),
        kept = kept.len(),
        "applied filter rule"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn paths(names: &[&str]) -> Vec<Utf8PathBuf> {
        names.iter().copied().map(Utf8PathBuf::from).collect()
    }

    #[rstest]
    #[case(Platform::Linux, SubsystemKind::Application, &["foo_linux.ext", "shared.ext"])]
    #[case(Platform::Windows, SubsystemKind::Application, &["foo_win.ext", "shared.ext"])]
    #[case(Platform::Mac, SubsystemKind::Application, &["foo_mac.ext", "shared.ext"])]
    #[case(Platform::Linux, SubsystemKind::Library, &["foo_linux.ext", "shared.ext"])]
    #[case(Platform::Windows, SubsystemKind::Library, &["foo_win.ext", "shared.ext"])]
    #[case(Platform::Mac, SubsystemKind::Library, &["foo_mac.ext", "shared.ext"])]
    fn keeps_only_matching_platform_variants(
        #[case] platform: Platform,
        #[case] kind: SubsystemKind,
        #[case] expected: &[&str],
    ) {
        let input = paths(&["foo_win.ext", "foo_linux.ext", "foo_mac.ext", "shared.ext"]);
        assert_eq!(filter(&input, platform, kind), paths(expected));
    }

    #[rstest]
    #[case(Platform::Windows, &["foo_win.cc", "win/registry.cc", "shared.cc"])]
    #[case(Platform::Linux, &["foo_linux.cc", "shared.cc"])]
    #[case(Platform::Mac, &["foo_mac.cc", "mac/bundle_locations.cc", "shared.cc"])]
    fn library_sets_keep_files_named_for_their_platform(
        #[case] platform: Platform,
        #[case] expected: &[&str],
    ) {
        let input = paths(&[
            "foo_linux.cc",
            "linux_util.cc",
            "foo_win.cc",
            "sha1_win.cc",
            "win/registry.cc",
            "foo_mac.cc",
            "mac/bundle_locations.cc",
            "shared.cc",
        ]);
        assert_eq!(
            filter(&input, platform, SubsystemKind::Library),
            paths(expected)
        );
    }

    #[rstest]
    fn shared_exclusions_live_in_the_always_rule() {
        for pattern in ["linux_", "sha1_win.cc"] {
            assert!(ALWAYS_EXCLUDED.patterns.contains(&pattern));
            for rule in [&WINDOWS_EXCLUDED, &LINUX_EXCLUDED, &MAC_EXCLUDED] {
                assert!(!rule.patterns.contains(&pattern), "{pattern} in {}", rule.name);
            }
        }
    }

    #[rstest]
    fn variant_rules_ignore_names_that_merely_contain_a_suffix() {
        let input = paths(&["ui/docking_tool_window", "ui/tool_window_dragger", "main_win"]);
        assert_eq!(
            filter(&input, Platform::Linux, SubsystemKind::Application),
            paths(&["ui/docking_tool_window", "ui/tool_window_dragger"])
        );
    }

    #[rstest]
    fn library_stage_strips_docs_tests_and_metadata() {
        let input = paths(&[
            "README.chromium",
            "at_exit.cc",
            "at_exit.h",
            "at_exit_unittest.cc",
            "test/test_suite.cc",
            "base.gyp",
            "OWNERS",
            "values.cc",
        ]);
        assert_eq!(
            filter(&input, Platform::Linux, SubsystemKind::Library),
            paths(&["at_exit.cc", "values.cc"])
        );
    }

    #[rstest]
    fn application_kind_skips_library_noise() {
        let input = paths(&["lexer_test", "ui/docking_test"]);
        assert_eq!(
            filter(&input, Platform::Linux, SubsystemKind::Application),
            input
        );
    }

    #[rstest]
    fn pending_review_rule_still_excludes() {
        let input = paths(&["base64.cc", "md5.cc"]);
        assert_eq!(
            filter(&input, Platform::Windows, SubsystemKind::Library),
            paths(&["md5.cc"])
        );
    }

    #[rstest]
    fn always_excluded_applies_to_every_platform() {
        let input = paths(&["allocator/allocator_shim.cc", "dtoa.cc", "i18n/icu_util.cc"]);
        for platform in Platform::ALL {
            assert!(filter(&input, platform, SubsystemKind::Application).is_empty());
        }
    }

    #[rstest]
    fn result_is_a_subsequence_of_input() {
        let input = paths(&[
            "zeta.cc",
            "file_util_posix.cc",
            "alpha.cc",
            "process_win.cc",
            "mac/scoped_nsobject.cc",
            "beta.cc",
        ]);
        for platform in Platform::ALL {
            for kind in [SubsystemKind::Application, SubsystemKind::Library] {
                let kept = filter(&input, platform, kind);
                let mut remaining = input.iter();
                for path in &kept {
                    assert!(
                        remaining.any(|candidate| candidate == path),
                        "{path} out of order for {platform}"
                    );
                }
            }
        }
    }

    #[rstest]
    fn unmatched_rule_is_a_no_op() {
        let input = paths(&["plain.cc"]);
        assert_eq!(apply_rule(input.clone(), &LIBRARY_PENDING_REVIEW), input);
    }

    #[rstest]
    fn stages_include_library_rules_only_for_libraries() {
        let names = |kind| {
            stages(Platform::Linux, kind)
                .iter()
                .map(|rule| rule.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            names(SubsystemKind::Application),
            ["always", "linux-variants"]
        );
        assert_eq!(
            names(SubsystemKind::Library),
            ["always", "linux", "library-noise", "library-pending-review"]
        );
    }
}
