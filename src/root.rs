use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ModulePathsError, Result};
use crate::walker::{absolutize, path_exists, MANIFEST_FILE_NAME};

/// Lock file names that mark a manifest-bearing directory as a potential
/// project root.
pub(crate) const LOCKFILE_NAMES: [&str; 2] = ["package-lock.json", "yarn.lock"];

/// An ancestor directory that contains a `package.json`.
#[derive(Debug)]
struct ManifestDir {
    dir: PathBuf,
    manifest_path: PathBuf,
    has_lockfile: bool,
}

/// Minimal view of a `package.json`, read only to detect workspace roots.
/// The value of `workspaces` is ignored; its presence is the signal.
#[derive(Debug, Default, Deserialize)]
struct WorkspaceManifest {
    #[serde(default)]
    workspaces: Option<serde_json::Value>,
}

/// Returns the best-guess project root for `start_dir`.
///
/// Walks from `start_dir` toward the filesystem root. The deepest ancestor
/// with both a `package.json` and a recognized lock file
/// (`package-lock.json` or `yarn.lock`) becomes the running candidate, but
/// a shallower ancestor that also has both will override it. The exception
/// is a manifest that declares a `workspaces` property: that directory is
/// accepted immediately, shallower lockfile directories notwithstanding.
///
/// Never fails just because nothing matched: with no manifest+lockfile
/// ancestor at all, the (absolutized) starting directory itself is
/// returned. I/O failures and malformed manifest JSON do propagate.
pub async fn get_project_root_path(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = absolutize(start_dir.as_ref())?;
    let mut candidate = start.clone();
    for dir in start.ancestors() {
        let entry = match manifest_dir(dir).await? {
            Some(entry) => entry,
            None => continue,
        };
        if !entry.has_lockfile {
            continue;
        }
        candidate = entry.dir;
        tracing::debug!("Project root candidate: {}", candidate.display());
        if declares_workspaces(&entry.manifest_path).await? {
            tracing::debug!("Accepting workspace root at {}", candidate.display());
            return Ok(candidate);
        }
    }
    Ok(candidate)
}

async fn manifest_dir(dir: &Path) -> Result<Option<ManifestDir>> {
    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    if !path_exists(&manifest_path).await? {
        return Ok(None);
    }
    let mut has_lockfile = false;
    for lockfile in LOCKFILE_NAMES {
        if path_exists(&dir.join(lockfile)).await? {
            has_lockfile = true;
            break;
        }
    }
    Ok(Some(ManifestDir {
        dir: dir.to_path_buf(),
        manifest_path,
        has_lockfile,
    }))
}

async fn declares_workspaces(manifest_path: &Path) -> Result<bool> {
    let json = async_std::fs::read(manifest_path)
        .await
        .map_err(|err| ModulePathsError::FsError(err, manifest_path.to_path_buf()))?;
    let manifest: WorkspaceManifest = serde_json::from_slice(&json[..])
        .map_err(|err| ModulePathsError::ManifestParseError(err, manifest_path.to_path_buf()))?;
    Ok(manifest.workspaces.is_some())
}
