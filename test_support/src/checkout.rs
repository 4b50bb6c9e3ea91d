//! Minimal repository layout for running the generator end to end.
//!
//! Only the platform-base library is discovered from disk, so a checkout
//! needs nothing more than that directory and a prebuilt Ninja stand-in.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Platform-base files written by [`Checkout::new`].
pub const DEFAULT_BASE_FILES: &[&str] = &[
    "at_exit.cc",
    "base64.cc",
    "file_util_posix.cc",
    "file_util_win.cc",
    "logging.cc",
    "strings/string_util.cc",
    "values.h",
];

/// A temporary checkout containing `third_party/base` and a Ninja binary.
#[derive(Debug)]
pub struct Checkout {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Checkout {
    /// Create a checkout with [`DEFAULT_BASE_FILES`].
    pub fn new() -> Result<Self> {
        Self::with_base_files(DEFAULT_BASE_FILES)
    }

    /// Create a checkout whose platform-base library holds `files`.
    pub fn with_base_files(files: &[&str]) -> Result<Self> {
        let dir = TempDir::new().context("create checkout")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("checkout path {} is not UTF-8", path.display()))?;
        let base = root.join("third_party/base");
        for file in files {
            let path = base.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
            }
            fs::write(&path, "").with_context(|| format!("write {path}"))?;
        }
        fs::create_dir_all(&base).context("create base root")?;
        let ninja = root.join("third_party/ninja");
        fs::create_dir_all(&ninja).context("create ninja dir")?;
        for binary in ["ninja", "ninja.exe"] {
            fs::write(ninja.join(binary), "").with_context(|| format!("write {binary}"))?;
        }
        Ok(Self { _dir: dir, root })
    }

    /// Repository root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the generated build file.
    pub fn build_file(&self) -> Utf8PathBuf {
        self.root.join("build.ninja")
    }

    /// Read the generated build file.
    pub fn read_build_file(&self) -> Result<String> {
        let path = self.build_file();
        fs::read_to_string(&path).with_context(|| format!("read {path}"))
    }
}
