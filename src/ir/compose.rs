//! Link target composition.

use camino::Utf8PathBuf;

use super::{BUILD_DIR_VAR, ObjectGroup, Target};
use crate::platform::Platform;
use crate::toolchain::CompilerConfig;

/// Path of the executable named `name`.
#[must_use]
pub fn binary_path(name: &str, platform: Platform) -> Utf8PathBuf {
    Utf8PathBuf::from(format!(
        "{BUILD_DIR_VAR}/{name}{}",
        platform.executable_suffix()
    ))
}

/// Everything needed to describe one link step.
#[derive(Debug, Clone, Default)]
pub struct TargetSpec<'a> {
    /// Target name.
    pub name: &'a str,
    /// Comment written above the link statement.
    pub comment: &'a str,
    /// Object groups, concatenated in the given order.
    pub groups: Vec<&'a ObjectGroup>,
    /// Libraries, attached verbatim.
    pub libs: Vec<String>,
    /// Link flags replacing the file-scope ones.
    pub ldflags: Option<Vec<String>>,
    /// Files that trigger a relink without being linked.
    pub implicit: Vec<Utf8PathBuf>,
    /// Target that must finish linking first.
    pub order_only: Option<&'a Target>,
}

/// Compose a link target from accumulated object groups.
///
/// Group order is preserved and libraries are neither deduplicated nor
/// validated.
#[must_use]
pub fn compose(spec: TargetSpec<'_>, config: &CompilerConfig) -> Target {
    let inputs = spec
        .groups
        .iter()
        .flat_map(|group| group.objects().iter().cloned())
        .collect();
    Target {
        name: spec.name.to_owned(),
        output: binary_path(spec.name, config.platform),
        inputs,
        implicit: spec.implicit,
        order_only: spec
            .order_only
            .map(|predecessor| vec![predecessor.output.clone()])
            .unwrap_or_default(),
        libs: spec.libs,
        ldflags: spec.ldflags,
        comment: spec.comment.to_owned(),
    }
}
