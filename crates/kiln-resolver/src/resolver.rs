//! Resolution of a single dependency against the session's repositories.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use kiln_core::dependency::{Dependency, Scope};
use kiln_core::dependency_set::DependencySet;
use kiln_core::version::VersionNumber;
use kiln_maven::checksum;
use kiln_maven::metadata::{self, MavenMetadata};
use kiln_maven::pom::{Manifest, ManifestDependency, ParentRef, ParentSource};
use kiln_maven::repository::Repository;
use kiln_util::errors::{FetchError, KilnError, KilnResult};

use crate::closure;
use crate::download;
use crate::session::Session;

/// Resolves one dependency: its versions, its manifest, its dependencies
/// and its files.
///
/// Metadata and the manifest are fetched on first use and kept for the
/// lifetime of the resolver. A resolver is meant for one caller; concurrent
/// first use from several threads may fetch twice, with one result kept.
#[derive(Debug)]
pub struct DependencyResolver {
    session: Session,
    dependency: Dependency,
    /// Manifests being built below this one, outermost first.
    lineage: Vec<String>,
    metadata: OnceLock<Arc<MavenMetadata>>,
    snapshot_metadata: OnceLock<Arc<MavenMetadata>>,
    manifest: OnceLock<Arc<Manifest>>,
}

impl DependencyResolver {
    pub fn new(session: Session, dependency: Dependency) -> Self {
        Self {
            session,
            dependency,
            lineage: Vec::new(),
            metadata: OnceLock::new(),
            snapshot_metadata: OnceLock::new(),
            manifest: OnceLock::new(),
        }
    }

    /// A resolver for another dependency in the same session.
    pub fn nested(&self, dependency: Dependency) -> Self {
        Self::new(self.session.clone(), dependency)
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether the artifact is published and, if a version was requested,
    /// whether that version is listed. Not-found and retrieval failures
    /// count as "doesn't exist"; anything else is returned.
    pub fn exists(&self) -> KilnResult<bool> {
        match self.metadata() {
            Ok(metadata) => {
                let requested = self.dependency.version();
                Ok(requested.is_unknown() || metadata.versions.contains(requested))
            }
            Err(e) if e.is_lookup_failure() => {
                tracing::debug!("{}: {e}", self.dependency);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// The requested version, or the latest published one when none was requested.
    pub fn resolve_version(&self) -> KilnResult<VersionNumber> {
        let version = self.dependency.version();
        if version.is_unknown() {
            self.latest_version()
        } else {
            Ok(version.clone())
        }
    }

    pub fn list_versions(&self) -> KilnResult<Vec<VersionNumber>> {
        Ok(self.metadata()?.versions.clone())
    }

    pub fn latest_version(&self) -> KilnResult<VersionNumber> {
        Ok(self.metadata()?.latest.clone())
    }

    pub fn release_version(&self) -> KilnResult<VersionNumber> {
        Ok(self.metadata()?.release.clone())
    }

    /// Artifact-level metadata location in every repository, in probe order.
    pub fn metadata_urls(&self) -> Vec<String> {
        self.repositories()
            .iter()
            .map(|repo| repo.metadata_url(&self.dependency))
            .collect()
    }

    /// Version-level metadata location for the resolved version.
    pub fn snapshot_metadata_urls(&self) -> KilnResult<Vec<String>> {
        let version = self.resolve_version()?;
        Ok(self
            .repositories()
            .iter()
            .map(|repo| repo.snapshot_metadata_url(&self.dependency, &version))
            .collect())
    }

    /// Manifest location in every repository.
    pub fn pom_urls(&self) -> KilnResult<Vec<String>> {
        let filename = format!("{}-{}.pom", self.dependency.artifact_id(), self.file_version()?);
        self.version_file_urls(&filename)
    }

    /// Candidate artifact locations, one per repository, in probe order.
    ///
    /// Snapshots are named after their timestamped build, e.g.
    /// `1.0-SNAPSHOT/a-1.0-20240615.143022-42.jar`.
    pub fn download_urls(&self) -> KilnResult<Vec<String>> {
        let mut filename = format!("{}-{}", self.dependency.artifact_id(), self.file_version()?);
        if !self.dependency.classifier().is_empty() {
            filename.push('-');
            filename.push_str(self.dependency.classifier());
        }
        filename.push('.');
        filename.push_str(self.dependency.type_());
        self.version_file_urls(&filename)
    }

    /// Download the artifact into `directory` from the first repository that
    /// has it, returning the local file.
    ///
    /// A local file whose checksum matches the repository's sidecar is kept
    /// as is. "Not found" moves on to the next repository; any other
    /// failure aborts.
    pub fn download_into_directory(&self, directory: &Path) -> KilnResult<PathBuf> {
        download::validate_directory(directory)?;

        let urls = self.download_urls()?;
        for url in &urls {
            let filename = url.rsplit('/').next().unwrap_or(url);
            let file = directory.join(filename);

            let current = checksum::matches_remote(
                self.session.transport(),
                self.session.deadline(),
                url,
                &file,
            )
            .map_err(|source| self.download_error(url, &file, source))?;
            if current {
                tracing::info!("{} is up to date", file.display());
                return Ok(file);
            }

            tracing::debug!("Downloading {url}");
            let body = match self.session.transport().open(url, self.session.deadline()) {
                Ok(Some(body)) => body,
                Ok(None) => {
                    tracing::debug!("{url}: not found");
                    continue;
                }
                Err(source) => return Err(self.download_error(url, &file, source)),
            };

            write_file(&file, body).map_err(|source| self.download_error(url, &file, source))?;
            tracing::info!("Downloaded {url} to {}", file.display());
            return Ok(file);
        }

        Err(KilnError::ArtifactNotFound {
            artifact: self.dependency.to_string(),
            locations: urls.join(", "),
        })
    }

    /// Download the artifact and its transitive dependencies for `scopes`.
    pub fn download_transitively_into_directory(
        &self,
        directory: &Path,
        scopes: &[Scope],
    ) -> KilnResult<Vec<PathBuf>> {
        download::validate_directory(directory)?;
        let dependencies = self.all_dependencies(scopes)?;
        download::download_all(&dependencies, &self.session, directory)
    }

    /// Dependencies the manifest declares for `scopes`.
    pub fn direct_dependencies(&self, scopes: &[Scope]) -> KilnResult<DependencySet> {
        Ok(self
            .manifest_dependencies(scopes)?
            .iter()
            .map(ManifestDependency::to_dependency)
            .collect())
    }

    /// This dependency and everything it pulls in for `scopes`.
    pub fn all_dependencies(&self, scopes: &[Scope]) -> KilnResult<DependencySet> {
        closure::transitive_closure(self, scopes)
    }

    /// The manifest with its parent chain merged in.
    pub fn manifest(&self) -> KilnResult<Arc<Manifest>> {
        if let Some(manifest) = self.manifest.get() {
            return Ok(Arc::clone(manifest));
        }
        let urls = self.pom_urls()?;
        let (url, content) = self.fetch_document(&urls)?;
        let manifest = Manifest::parse(&content, &url, &self.dependency.to_string(), self)?;
        Ok(Arc::clone(self.manifest.get_or_init(|| Arc::new(manifest))))
    }

    pub(crate) fn manifest_dependencies(&self, scopes: &[Scope]) -> KilnResult<Vec<ManifestDependency>> {
        Ok(self.manifest()?.dependencies(scopes))
    }

    fn repositories(&self) -> &[Repository] {
        self.session.repositories()
    }

    fn metadata(&self) -> KilnResult<Arc<MavenMetadata>> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(Arc::clone(metadata));
        }
        let parsed = self.parse_metadata(&self.metadata_urls())?;
        Ok(Arc::clone(self.metadata.get_or_init(|| Arc::new(parsed))))
    }

    fn snapshot_metadata(&self) -> KilnResult<Arc<MavenMetadata>> {
        if let Some(metadata) = self.snapshot_metadata.get() {
            return Ok(Arc::clone(metadata));
        }
        let parsed = self.parse_metadata(&self.snapshot_metadata_urls()?)?;
        Ok(Arc::clone(self.snapshot_metadata.get_or_init(|| Arc::new(parsed))))
    }

    fn parse_metadata(&self, urls: &[String]) -> KilnResult<MavenMetadata> {
        let (url, content) = self.fetch_document(urls)?;
        metadata::parse_metadata(&content).map_err(|e| KilnError::ManifestParsing {
            artifact: self.dependency.to_string(),
            url,
            errors: e.messages,
        })
    }

    /// The version used in file names: the timestamped build for snapshots.
    fn file_version(&self) -> KilnResult<VersionNumber> {
        let version = self.resolve_version()?;
        if version.is_snapshot() {
            Ok(self.snapshot_metadata()?.snapshot_version(&version))
        } else {
            Ok(version)
        }
    }

    fn version_file_urls(&self, filename: &str) -> KilnResult<Vec<String>> {
        let version = self.resolve_version()?;
        Ok(self
            .repositories()
            .iter()
            .map(|repo| repo.version_file_url(&self.dependency, &version, filename))
            .collect())
    }

    /// First repository that has the document wins. A retrieval failure
    /// stops the search even when later repositories might have it.
    fn fetch_document(&self, urls: &[String]) -> KilnResult<(String, String)> {
        for url in urls {
            tracing::debug!("Fetching {url}");
            match self
                .session
                .transport()
                .fetch_text(url, self.session.deadline())
            {
                Ok(Some(content)) => return Ok((url.clone(), content)),
                Ok(None) => tracing::debug!("{url}: not found"),
                Err(source) => {
                    return Err(KilnError::ArtifactRetrieval {
                        artifact: self.dependency.to_string(),
                        url: url.clone(),
                        source,
                    })
                }
            }
        }
        Err(KilnError::ArtifactNotFound {
            artifact: self.dependency.to_string(),
            locations: urls.join(", "),
        })
    }

    fn download_error(&self, url: &str, file: &Path, source: FetchError) -> KilnError {
        KilnError::Download {
            artifact: self.dependency.to_string(),
            url: url.to_string(),
            file: file.to_path_buf(),
            source,
        }
    }
}

impl ParentSource for DependencyResolver {
    fn parent_manifest(&self, parent: &ParentRef) -> KilnResult<Arc<Manifest>> {
        let dependency = parent.to_dependency();
        let key = lineage_key(&dependency);
        let mut lineage = self.lineage.clone();
        lineage.push(lineage_key(&self.dependency));
        if lineage.contains(&key) {
            lineage.push(key);
            return Err(KilnError::ParentCycle {
                artifact: self.dependency.to_string(),
                chain: lineage.join(" -> "),
            });
        }

        tracing::debug!("{}: resolving parent {key}", self.dependency);
        let resolver = Self {
            lineage,
            ..self.nested(dependency)
        };
        resolver.manifest()
    }
}

fn lineage_key(dependency: &Dependency) -> String {
    format!(
        "{}:{}:{}",
        dependency.group_id(),
        dependency.artifact_id(),
        dependency.version()
    )
}

/// Stream `body` into `file`, removing the partial file on failure.
fn write_file(file: &Path, mut body: impl io::Read) -> Result<(), FetchError> {
    let result = File::create(file).and_then(|mut out| io::copy(&mut body, &mut out));
    if let Err(e) = result {
        let _ = fs::remove_file(file);
        return Err(FetchError::Io(e));
    }
    Ok(())
}
