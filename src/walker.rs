use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{ModulePathsError, Result};

pub(crate) const MANIFEST_FILE_NAME: &str = "package.json";

/// Walks upward through ancestor directories, evaluating a probe at each
/// step and collecting the probed paths that exist on the filesystem.
///
/// The probe maps a directory to a candidate path to test for existence,
/// e.g. `<dir>/node_modules/<name>`. It should be pure: stateless,
/// deterministic, and free of side effects.
///
/// ```no_run
/// use std::path::Path;
///
/// use oro_module_paths::AncestorWalker;
///
/// # #[async_std::main]
/// # async fn main() -> Result<(), oro_module_paths::ModulePathsError> {
/// let caches = AncestorWalker::new(|dir: &Path| dir.join(".cache"))
///     .max_matches(3)
///     .walk("/some/deep/package/dir")
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct AncestorWalker<P> {
    probe: P,
    root_boundary: Option<PathBuf>,
    max_matches: Option<usize>,
    stop_at_manifest: bool,
}

impl<P> AncestorWalker<P>
where
    P: Fn(&Path) -> PathBuf,
{
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            root_boundary: None,
            max_matches: None,
            stop_at_manifest: false,
        }
    }

    /// Bound the walk so that `boundary` is the last directory probed.
    /// Takes precedence over [`AncestorWalker::stop_at_manifest`].
    pub fn root_boundary(mut self, boundary: impl AsRef<Path>) -> Self {
        self.root_boundary = Some(boundary.as_ref().to_path_buf());
        self
    }

    /// Cap the number of collected matches. The walk stops as soon as the
    /// cap is reached.
    pub fn max_matches(mut self, max: usize) -> Self {
        self.max_matches = Some(max);
        self
    }

    /// After the starting directory, only continue into ancestors that
    /// themselves contain a `package.json`. Ignored when a root boundary is
    /// set.
    pub fn stop_at_manifest(mut self, stop: bool) -> Self {
        self.stop_at_manifest = stop;
        self
    }

    /// Walk from `start_dir` toward the filesystem root, returning every
    /// probed candidate that exists, deepest-first.
    ///
    /// With a root boundary set, the walk ends once the cursor steps past
    /// the boundary's own parent, so a walk starting at that parent probes
    /// nothing. With [`AncestorWalker::stop_at_manifest`] the starting
    /// directory is always probed, even when it has no manifest of its own;
    /// the manifest condition only gates directories after the first.
    pub async fn walk(&self, start_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let mut cursor = absolutize(start_dir.as_ref())?;
        let boundary = self
            .root_boundary
            .as_deref()
            .map(absolutize)
            .transpose()?;
        let mut matches = Vec::new();
        loop {
            if let Some(boundary) = &boundary {
                if Some(cursor.as_path()) == boundary.parent() {
                    break;
                }
            }
            let candidate = (self.probe)(&cursor);
            tracing::trace!("Probing for {}", candidate.display());
            if path_exists(&candidate).await? {
                matches.push(candidate);
            }
            let parent = match cursor.parent() {
                Some(parent) => parent.to_path_buf(),
                None => break,
            };
            if let Some(max) = self.max_matches {
                if matches.len() >= max {
                    break;
                }
            }
            if boundary.is_none()
                && self.stop_at_manifest
                && !path_exists(&parent.join(MANIFEST_FILE_NAME)).await?
            {
                break;
            }
            cursor = parent;
        }
        Ok(matches)
    }
}

/// Existence check that treats not-found as `false` but propagates every
/// other I/O failure (permissions, transient errors).
pub(crate) async fn path_exists(path: &Path) -> Result<bool> {
    match async_std::fs::metadata(path).await {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(ModulePathsError::FsError(err, path.to_path_buf())),
    }
}

/// Resolves a possibly-relative path against the current working directory
/// and lexically normalizes it. Does not canonicalize: symlinks are left
/// alone and no filesystem access happens for already-absolute paths.
pub(crate) fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .map_err(ModulePathsError::CurrentDirError)?
    };
    Ok(normalize(&absolute))
}

/// Lexically removes `.` and `..` components, so that stepping to
/// [`Path::parent`] from the result always reaches a real ancestor and no
/// directory is visited under two spellings. `..` at the root is dropped.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            component => normalized.push(component.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolutize_joins_relative_paths_onto_cwd() {
        let abs = absolutize(Path::new("some/relative/dir")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("some/relative/dir"));
    }

    #[test]
    fn absolutize_leaves_absolute_paths_alone() {
        let path = std::env::temp_dir().join("already-absolute");
        assert_eq!(path, absolutize(&path).unwrap());
    }

    #[test]
    fn absolutize_removes_dot_and_dot_dot_components() {
        let tmp = std::env::temp_dir();
        let path = tmp.join("a").join("..").join("b").join(".").join("c");
        assert_eq!(tmp.join("b").join("c"), absolutize(&path).unwrap());
    }

    #[test]
    fn normalize_drops_parent_components_at_the_root() {
        let root = PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
        assert_eq!(root, normalize(&root.join("..").join("..")));
    }
}
