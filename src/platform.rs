//! Target platform and build mode selection.
//!
//! Both values are resolved once per invocation and never change afterwards.
//! [`Platform`] is a closed set: hosts outside it are rejected rather than
//! mapped onto a default.

use miette::Diagnostic;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Operating system the generated graph targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Microsoft Windows with the MSVC toolchain.
    Windows,
    /// Linux with a GCC-compatible toolchain.
    Linux,
    /// macOS with a GCC-compatible toolchain.
    Mac,
}

/// Errors raised while resolving the target platform.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum PlatformError {
    /// The host or requested platform is not one of the supported values.
    #[error("unsupported platform `{name}`; expected one of windows, linux, mac")]
    #[diagnostic(code(sg_configure::platform::unsupported))]
    Unsupported {
        /// The rejected platform name.
        name: String,
    },
}

impl Platform {
    /// Every supported platform, in a stable order.
    pub const ALL: [Self; 3] = [Self::Windows, Self::Linux, Self::Mac];

    /// Resolve the platform of the running host.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] when the host operating system
    /// is not Windows, Linux, or macOS.
    pub fn host() -> Result<Self, PlatformError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a [`std::env::consts::OS`] value onto a platform.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] for any other operating system.
    pub fn from_os(os: &str) -> Result<Self, PlatformError> {
        match os {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Mac),
            other => Err(PlatformError::Unsupported {
                name: other.to_owned(),
            }),
        }
    }

    /// Lower-case name used in logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Mac => "mac",
        }
    }

    /// Suffix appended to object files.
    #[must_use]
    pub const fn object_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".obj",
            Self::Linux | Self::Mac => ".o",
        }
    }

    /// Suffix appended to linked executables.
    #[must_use]
    pub const fn executable_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Linux | Self::Mac => "",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str() == s)
            .ok_or_else(|| PlatformError::Unsupported { name: s.to_owned() })
    }
}

/// Optimisation profile selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Unoptimised build with debug runtime and instrumentation.
    Debug,
    /// Optimised build with assertions disabled.
    Release,
}

impl BuildMode {
    /// Select the mode from the `--debug` flag.
    #[must_use]
    pub const fn from_debug_flag(debug: bool) -> Self {
        if debug { Self::Debug } else { Self::Release }
    }
}

/// Whether the shared precompiled header is built and consumed.
///
/// Only debug builds on Windows use it; the header is C++-only.
#[must_use]
pub const fn precompiled_headers_enabled(platform: Platform, mode: BuildMode) -> bool {
    matches!((platform, mode), (Platform::Windows, BuildMode::Debug))
}
