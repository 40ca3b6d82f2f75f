//! Maven repository layout: where metadata, manifests and artifacts live.

use kiln_core::config::{RepositoryEntry, MAVEN_CENTRAL_URL};
use kiln_core::dependency::Dependency;
use kiln_core::version::VersionNumber;

/// File name of both the artifact-level and the version-level metadata document.
pub const MAVEN_METADATA_XML: &str = "maven-metadata.xml";

/// A Maven2-layout repository. The base URL always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    name: Option<String>,
    base_url: String,
}

impl Repository {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            name: None,
            base_url,
        }
    }

    pub fn named(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(base_url)
        }
    }

    pub fn maven_central() -> Self {
        Self::named("central", MAVEN_CENTRAL_URL)
    }

    pub fn from_entry(entry: &RepositoryEntry) -> Self {
        match &entry.name {
            Some(name) => Self::named(name.clone(), entry.url.clone()),
            None => Self::new(entry.url.clone()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Display name, falling back to the base URL.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.base_url)
    }

    /// `{base}{group/as/path}/{artifactId}/`
    ///
    /// `org.eclipse.jetty:jetty-io` becomes `{base}org/eclipse/jetty/jetty-io/`.
    pub fn artifact_url(&self, dependency: &Dependency) -> String {
        format!(
            "{}{}/{}/",
            self.base_url,
            dependency.group_id().replace('.', "/"),
            dependency.artifact_id()
        )
    }

    /// Artifact-level `maven-metadata.xml` listing the published versions.
    pub fn metadata_url(&self, dependency: &Dependency) -> String {
        format!("{}{MAVEN_METADATA_XML}", self.artifact_url(dependency))
    }

    /// Version-level `maven-metadata.xml` describing timestamped snapshot builds.
    pub fn snapshot_metadata_url(&self, dependency: &Dependency, version: &VersionNumber) -> String {
        format!("{}{version}/{MAVEN_METADATA_XML}", self.artifact_url(dependency))
    }

    /// URL of a file inside a version directory.
    pub fn version_file_url(
        &self,
        dependency: &Dependency,
        version: &VersionNumber,
        filename: &str,
    ) -> String {
        format!("{}{version}/{filename}", self.artifact_url(dependency))
    }
}
