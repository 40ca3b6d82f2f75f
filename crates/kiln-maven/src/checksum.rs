//! Checksum sidecars (`.sha256`, `.sha1`, `.md5`) used to skip downloads
//! of files that are already present locally.

use std::path::Path;

use kiln_util::errors::FetchError;
use kiln_util::hash::ChecksumAlgorithm;

use crate::transport::{Deadline, Transport};

/// Sidecars in the order they are tried.
pub const SIDECARS: [ChecksumAlgorithm; 3] = [
    ChecksumAlgorithm::Sha256,
    ChecksumAlgorithm::Sha1,
    ChecksumAlgorithm::Md5,
];

/// Whether `file` already holds the content published at `file_url`.
///
/// The first sidecar the repository publishes decides. A missing file, a
/// repository without sidecars, or an unreadable sidecar all mean "no": the
/// caller downloads again. Only an expired deadline or a cancellation is
/// reported as an error.
pub fn matches_remote(
    transport: &dyn Transport,
    deadline: &Deadline,
    file_url: &str,
    file: &Path,
) -> Result<bool, FetchError> {
    if !file.is_file() {
        return Ok(false);
    }

    for algorithm in SIDECARS {
        let sidecar_url = format!("{file_url}.{}", algorithm.extension());
        let content = match transport.fetch_text(&sidecar_url, deadline) {
            Ok(Some(content)) => content,
            Ok(None) => continue,
            Err(e @ (FetchError::DeadlineExceeded | FetchError::Cancelled)) => return Err(e),
            Err(e) => {
                tracing::debug!("Couldn't retrieve {sidecar_url}: {e}");
                return Ok(false);
            }
        };

        let expected = extract_hash(&content);
        let actual = match algorithm.hash_file(file) {
            Ok(actual) => actual,
            Err(e) => {
                tracing::debug!("Couldn't hash {}: {e}", file.display());
                return Ok(false);
            }
        };
        let matches = actual.eq_ignore_ascii_case(expected);
        if matches {
            tracing::debug!("{algorithm} ok for {}", file.display());
        } else {
            tracing::debug!("{algorithm} mismatch for {file_url}: expected {expected}, got {actual}");
        }
        return Ok(matches);
    }

    tracing::debug!("No checksum sidecar found for {file_url}");
    Ok(false)
}

/// Sidecars hold either the bare digest or `digest  filename`.
fn extract_hash(content: &str) -> &str {
    content.split_whitespace().next().unwrap_or("")
}
