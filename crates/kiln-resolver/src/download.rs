//! Downloading resolved dependency sets into a directory.

use std::fs;
use std::path::{Path, PathBuf};

use kiln_core::dependency_set::DependencySet;
use kiln_util::errors::{KilnError, KilnResult};

use crate::resolver::DependencyResolver;
use crate::session::Session;

/// Download every dependency of `dependencies` into `directory`, in set
/// order. Stops at the first failure.
pub fn download_all(
    dependencies: &DependencySet,
    session: &Session,
    directory: &Path,
) -> KilnResult<Vec<PathBuf>> {
    validate_directory(directory)?;
    dependencies
        .iter()
        .map(|dependency| {
            DependencyResolver::new(session.clone(), dependency.clone())
                .download_into_directory(directory)
        })
        .collect()
}

/// The target must exist, be a directory and be writable.
pub(crate) fn validate_directory(directory: &Path) -> KilnResult<()> {
    let invalid = |reason: &str| KilnError::InvalidArgument {
        message: format!("directory '{}' {reason}", directory.display()),
    };
    let metadata = fs::metadata(directory).map_err(|_| invalid("doesn't exist"))?;
    if !metadata.is_dir() {
        return Err(invalid("is not a directory"));
    }
    // Permission bits don't tell whether this process may write here.
    tempfile::Builder::new()
        .prefix(".kiln-")
        .tempfile_in(directory)
        .map(drop)
        .map_err(|_| invalid("can't be written to"))
}
