use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use kiln_util::errors::KilnError;
use serde::{Deserialize, Serialize};

use crate::version::VersionNumber;

/// Artifact type used when none is declared.
pub const DEFAULT_TYPE: &str = "jar";

/// A requested artifact: coordinate, version and the transitive
/// dependencies it excludes.
///
/// Values are immutable once built; equality covers every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    group_id: String,
    artifact_id: String,
    version: VersionNumber,
    classifier: String,
    type_: String,
    exclusions: BTreeSet<Exclusion>,
}

impl Dependency {
    /// A dependency without a requested version.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: VersionNumber::UNKNOWN,
            classifier: String::new(),
            type_: DEFAULT_TYPE.to_string(),
            exclusions: BTreeSet::new(),
        }
    }

    pub fn with_version(mut self, version: VersionNumber) -> Self {
        self.version = version;
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    /// Set the artifact type; an empty type falls back to `jar`.
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        let type_ = type_.into();
        self.type_ = if type_.is_empty() {
            DEFAULT_TYPE.to_string()
        } else {
            type_
        };
        self
    }

    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.insert(exclusion);
        self
    }

    pub fn with_exclusions(mut self, exclusions: impl IntoIterator<Item = Exclusion>) -> Self {
        self.exclusions.extend(exclusions);
        self
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &VersionNumber {
        &self.version
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn exclusions(&self) -> &BTreeSet<Exclusion> {
        &self.exclusions
    }

    /// The version-independent identity of this dependency.
    pub fn key(&self) -> DependencyKey {
        DependencyKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            type_: self.type_.clone(),
        }
    }

    /// Whether any of this dependency's exclusions suppresses `group:artifact`.
    pub fn excludes(&self, group_id: &str, artifact_id: &str) -> bool {
        self.exclusions
            .iter()
            .any(|e| e.matches(group_id, artifact_id))
    }
}

/// Parse `group:artifact[:version[:classifier]][@type]`.
impl FromStr for Dependency {
    type Err = KilnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (coordinate, type_) = match s.trim().split_once('@') {
            Some((coordinate, type_)) => (coordinate, Some(type_)),
            None => (s.trim(), None),
        };
        let parts: Vec<&str> = coordinate.split(':').collect();
        if parts.len() < 2 || parts.len() > 4 || parts.iter().take(2).any(|p| p.is_empty()) {
            return Err(KilnError::InvalidArgument {
                message: format!(
                    "'{s}' is not a dependency coordinate (expected group:artifact[:version[:classifier]][@type])"
                ),
            });
        }

        let mut dependency = Self::new(parts[0], parts[1]);
        if let Some(version) = parts.get(2) {
            dependency = dependency.with_version(VersionNumber::parse(version));
        }
        if let Some(classifier) = parts.get(3) {
            dependency = dependency.with_classifier(*classifier);
        }
        if let Some(type_) = type_ {
            dependency = dependency.with_type(type_);
        }
        Ok(dependency)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if !self.version.is_unknown() || !self.classifier.is_empty() {
            write!(f, ":{}", self.version)?;
        }
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        if self.type_ != DEFAULT_TYPE {
            write!(f, "@{}", self.type_)?;
        }
        Ok(())
    }
}

/// The `(groupId, artifactId, classifier, type)` identity of an artifact family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyKey {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: String,
    pub type_: String,
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        if self.type_ != DEFAULT_TYPE {
            write!(f, "@{}", self.type_)?;
        }
        Ok(())
    }
}

/// A transitive dependency to suppress. `*` matches any group or artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// Version-independent match against a candidate's group and artifact.
    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        (self.group_id == "*" || self.group_id == group_id)
            && (self.artifact_id == "*" || self.artifact_id == artifact_id)
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// Named bucket partitioning a manifest's declared dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
    Standalone,
}

impl Scope {
    pub const ALL: [Scope; 7] = [
        Scope::Compile,
        Scope::Provided,
        Scope::Runtime,
        Scope::Test,
        Scope::System,
        Scope::Import,
        Scope::Standalone,
    ];

    /// Interpret a manifest's `<scope>` text; blank means `compile`.
    pub fn from_declared(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Some(Self::Compile);
        }
        text.parse().ok()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::System => "system",
            Self::Import => "import",
            Self::Standalone => "standalone",
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::Compile
    }
}

impl FromStr for Scope {
    type Err = KilnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| KilnError::InvalidArgument {
                message: format!("unknown scope '{s}'"),
            })
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
