//! Utilities for locating `node_modules/` installations and the surrounding
//! project root for a given package directory, by walking the filesystem
//! upward from a starting directory.
//!
//! Everything here is read-only: existence probes, plus one manifest read
//! per lock-file-bearing ancestor during root detection. Each filesystem
//! check is awaited before the next ancestor step begins; there is no
//! parallelism within a walk, and no state is shared across calls.
//!
//! The filesystem is treated as an external resource that may change
//! underneath a walk. A directory observed by an existence check may be
//! gone by the time a later read happens; that race is accepted.

use std::path::{Path, PathBuf};

mod error;
mod root;
mod walker;

pub use error::ModulePathsError;
pub use root::get_project_root_path;
pub use walker::AncestorWalker;

use error::Result;

const NODE_MODULES_DIR: &str = "node_modules";

/// Returns every existing `node_modules/<module_name>` directory found
/// while walking from `start_dir` upward, deepest-first.
///
/// With `project_root` supplied, the walk is bounded so that `project_root`
/// itself is the last directory probed. Without it, the walk continues only
/// while each ancestor past the starting directory still contains a
/// `package.json`, which keeps a scan started anywhere from running past
/// the surrounding project's boundary.
pub async fn search_for_module(
    start_dir: impl AsRef<Path>,
    module_name: impl AsRef<Path>,
    project_root: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let module_name = module_name.as_ref().to_path_buf();
    let walker = AncestorWalker::new(move |dir: &Path| {
        dir.join(NODE_MODULES_DIR).join(&module_name)
    });
    match project_root {
        Some(root) => walker.root_boundary(root).walk(start_dir).await,
        None => walker.stop_at_manifest(true).walk(start_dir).await,
    }
}

/// Returns every existing bare `node_modules` directory found while walking
/// from `start_dir` upward, deepest-first. Bounded the same way as
/// [`search_for_module`].
pub async fn search_for_node_modules(
    start_dir: impl AsRef<Path>,
    project_root: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let walker = AncestorWalker::new(|dir: &Path| dir.join(NODE_MODULES_DIR));
    match project_root {
        Some(root) => walker.root_boundary(root).walk(start_dir).await,
        None => walker.stop_at_manifest(true).walk(start_dir).await,
    }
}
