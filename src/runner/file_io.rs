//! Build file writing through a capability-based directory handle.
//!
//! The file is written under a temporary name, synced, and renamed into
//! place so an interrupted run never leaves a truncated `build.ninja`.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::Write;
use tracing::info;

use super::NinjaContent;
use crate::pipeline::{BUILD_DIR, BUILD_FILE};

const TEMP_SUFFIX: &str = ".tmp";

/// Create the output directory and write `content` to the build file under
/// `root`, returning the path written.
///
/// # Errors
///
/// Returns an error if the directory cannot be opened or any write fails.
pub fn write_build_file(root: &Utf8Path, content: &NinjaContent) -> Result<Utf8PathBuf> {
    let dir = Dir::open_ambient_dir(root, ambient_authority())
        .with_context(|| format!("opening {root}"))?;
    dir.create_dir_all(BUILD_DIR)
        .with_context(|| format!("creating {}", root.join(BUILD_DIR)))?;

    let temp = format!("{BUILD_FILE}{TEMP_SUFFIX}");
    {
        let mut file = dir
            .create(&temp)
            .with_context(|| format!("creating {}", root.join(&temp)))?;
        file.write_all(content.as_str().as_bytes())
            .with_context(|| format!("writing {}", root.join(&temp)))?;
        file.flush()
            .with_context(|| format!("flushing {}", root.join(&temp)))?;
        file.sync_all()
            .with_context(|| format!("syncing {}", root.join(&temp)))?;
    }
    dir.rename(&temp, &dir, BUILD_FILE)
        .with_context(|| format!("renaming {temp} to {BUILD_FILE}"))?;

    let path = root.join(BUILD_FILE);
    info!("wrote {path}");
    Ok(path)
}
