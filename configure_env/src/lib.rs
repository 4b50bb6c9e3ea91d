#![forbid(unsafe_code)]

//! Environment variable names shared by the generator, its tests, and the
//! test helpers.

/// Environment variable overriding the C compiler on non-Windows hosts.
///
/// # Examples
///
/// ```
/// use configure_env::{CC_ENV, DEFAULT_CC};
/// let cc = std::env::var(CC_ENV).unwrap_or_else(|_| DEFAULT_CC.to_owned());
/// assert!(!cc.is_empty());
/// ```
pub const CC_ENV: &str = "CC";

/// Environment variable overriding the C++ compiler on non-Windows hosts.
pub const CXX_ENV: &str = "CXX";

/// Environment variable overriding the interpreter used to bootstrap Ninja.
pub const PYTHON_ENV: &str = "SG_PYTHON";

/// C compiler used when [`CC_ENV`] is unset.
pub const DEFAULT_CC: &str = "gcc";

/// C++ compiler used when [`CXX_ENV`] is unset.
pub const DEFAULT_CXX: &str = "g++";

/// Interpreter used when [`PYTHON_ENV`] is unset.
pub const DEFAULT_PYTHON: &str = "python3";
