//! Mocked environments for compiler and interpreter lookups.

use configure_env::{CC_ENV, CXX_ENV};
use mockable::MockEnv;
use std::env::VarError;

/// An environment in which no variable is set.
pub fn empty_env() -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_raw().returning(|_| Err(VarError::NotPresent));
    env
}

/// An environment that overrides the C and C++ compilers.
pub fn compiler_env(cc: &str, cxx: &str) -> MockEnv {
    let cc = cc.to_owned();
    let cxx = cxx.to_owned();
    let mut env = MockEnv::new();
    env.expect_raw().returning(move |key| match key {
        CC_ENV => Ok(cc.clone()),
        CXX_ENV => Ok(cxx.clone()),
        _ => Err(VarError::NotPresent),
    });
    env
}
