use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type returned by all oro-module-paths operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ModulePathsError {
    /// A filesystem check or read failed for a reason other than the path
    /// not existing. Refer to the error message for more details.
    #[error("Filesystem operation failed at {}.", .1.display())]
    #[diagnostic(code(oro_module_paths::fs_error))]
    FsError(#[source] std::io::Error, PathBuf),

    /// A `package.json` at a lock-file-bearing root candidate failed to
    /// parse. A malformed manifest at a candidate root is a hard error
    /// rather than something to skip, since skipping it could misidentify
    /// the project root.
    #[error("Failed to parse manifest at {}.", .1.display())]
    #[diagnostic(code(oro_module_paths::manifest_parse_error))]
    ManifestParseError(#[source] serde_json::Error, PathBuf),

    /// The current working directory could not be resolved while turning a
    /// relative starting path into an absolute one.
    #[error("Failed to resolve the current working directory.")]
    #[diagnostic(code(oro_module_paths::current_dir_error))]
    CurrentDirError(#[source] std::io::Error),
}

pub(crate) type Result<T> = std::result::Result<T, ModulePathsError>;
