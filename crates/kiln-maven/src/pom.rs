//! POM manifests: raw extraction, parent inheritance, `${property}`
//! substitution, dependency management and scoped dependency lists.
//!
//! A document is first read into an element tree ([`crate::xml`]) and then
//! extracted into a [`PomDocument`] holding the declared strings untouched.
//! [`Manifest::build`] merges the parent chain and resolves dependencies
//! lazily, on the first [`Manifest::dependencies`] call.

use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use kiln_core::dependency::{Dependency, Exclusion, Scope, DEFAULT_TYPE};
use kiln_core::version::VersionNumber;
use kiln_util::errors::{KilnError, KilnResult};

use crate::xml::{self, Element, ParseError};

/// Nesting limit when property values refer to other properties.
const MAX_SUBSTITUTION_DEPTH: usize = 8;

/// A POM as declared, before inheritance or substitution.
#[derive(Debug, Clone, Default)]
pub struct PomDocument {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub inception_year: Option<String>,

    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<PomDependency>,
    pub dependency_management: Vec<PomDependency>,
}

/// Reference to a parent POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ParentRef {
    pub fn to_dependency(&self) -> Dependency {
        Dependency::new(&self.group_id, &self.artifact_id)
            .with_version(VersionNumber::parse(&self.version))
            .with_type("pom")
    }
}

/// A `<dependency>` block; absent elements are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: String,
    pub type_: String,
    pub scope: String,
    pub optional: String,
    pub exclusions: Vec<Exclusion>,
}

/// Extract the raw content of a POM. The root element must be `<project>`.
pub fn parse_document(content: &str) -> Result<PomDocument, ParseError> {
    let root = xml::parse(content)?;
    if root.name != "project" {
        return Err(ParseError::new(format!(
            "expected <project> root element, found <{}>",
            root.name
        )));
    }

    let text = |name: &str| root.child_text(name).map(str::to_string);
    let mut doc = PomDocument {
        group_id: text("groupId"),
        artifact_id: text("artifactId"),
        version: text("version"),
        packaging: text("packaging"),
        name: text("name"),
        description: text("description"),
        url: text("url"),
        inception_year: text("inceptionYear"),
        ..PomDocument::default()
    };

    if let Some(parent) = root.child("parent") {
        doc.parent = Some(ParentRef {
            group_id: parent.child_text("groupId").unwrap_or_default().to_string(),
            artifact_id: parent.child_text("artifactId").unwrap_or_default().to_string(),
            version: parent.child_text("version").unwrap_or_default().to_string(),
        });
    }

    if let Some(properties) = root.child("properties") {
        for property in &properties.children {
            doc.properties
                .insert(property.name.clone(), property.text.clone());
        }
    }

    doc.dependencies = dependency_blocks(root.child("dependencies"));
    doc.dependency_management = dependency_blocks(
        root.child("dependencyManagement")
            .and_then(|dm| dm.child("dependencies")),
    );

    Ok(doc)
}

fn dependency_blocks(dependencies: Option<&Element>) -> Vec<PomDependency> {
    let Some(dependencies) = dependencies else {
        return Vec::new();
    };
    dependencies
        .children_named("dependency")
        .map(|dep| {
            let text = |name: &str| dep.child_text(name).unwrap_or_default().to_string();
            let exclusions = dep
                .child("exclusions")
                .map(|ex| {
                    ex.children_named("exclusion")
                        .map(|e| {
                            Exclusion::new(
                                e.child_text("groupId").unwrap_or_default(),
                                e.child_text("artifactId").unwrap_or("*"),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();
            PomDependency {
                group_id: text("groupId"),
                artifact_id: text("artifactId"),
                version: text("version"),
                classifier: text("classifier"),
                type_: text("type"),
                scope: text("scope"),
                optional: text("optional"),
                exclusions,
            }
        })
        .collect()
}

/// Supplies parsed parent manifests while a child is being built.
pub trait ParentSource {
    fn parent_manifest(&self, parent: &ParentRef) -> KilnResult<Arc<Manifest>>;
}

/// A dependency of a manifest after substitution and management fill-in.
///
/// Identity is the coordinate `(group, artifact, classifier, type)`; version,
/// scope and flags don't take part.
#[derive(Debug, Clone)]
pub struct ManifestDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: String,
    pub type_: String,
    pub scope: Scope,
    pub optional: String,
    pub exclusions: Vec<Exclusion>,
}

impl ManifestDependency {
    pub fn to_dependency(&self) -> Dependency {
        Dependency::new(&self.group_id, &self.artifact_id)
            .with_version(VersionNumber::parse(&self.version))
            .with_classifier(&self.classifier)
            .with_type(&self.type_)
            .with_exclusions(self.exclusions.iter().cloned())
    }

    /// Whether one of this dependency's exclusions suppresses `candidate`.
    pub fn excludes(&self, candidate: &ManifestDependency) -> bool {
        self.exclusions
            .iter()
            .any(|e| e.matches(&candidate.group_id, &candidate.artifact_id))
    }
}

impl PartialEq for ManifestDependency {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.classifier == other.classifier
            && self.type_ == other.type_
    }
}

impl Eq for ManifestDependency {}

impl Hash for ManifestDependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
        self.classifier.hash(state);
        self.type_.hash(state);
    }
}

/// A manifest with its parent chain merged in.
#[derive(Debug)]
pub struct Manifest {
    source: String,
    group_id: String,
    artifact_id: String,
    version: String,
    packaging: String,
    parent: Option<ParentRef>,
    properties: BTreeMap<String, String>,
    /// Local entries first, then inherited ones.
    declared: Vec<PomDependency>,
    management: Vec<PomDependency>,
    resolved: OnceLock<BTreeMap<Scope, Vec<ManifestDependency>>>,
}

impl Manifest {
    /// Parse `content` fetched from `source` (a URL) for `artifact` and merge
    /// its parents.
    pub fn parse(
        content: &str,
        source: &str,
        artifact: &str,
        parents: &dyn ParentSource,
    ) -> KilnResult<Self> {
        let doc = parse_document(content).map_err(|e| KilnError::ManifestParsing {
            artifact: artifact.to_string(),
            url: source.to_string(),
            errors: e.messages,
        })?;
        Self::build(doc, source, parents)
    }

    pub fn build(doc: PomDocument, source: &str, parents: &dyn ParentSource) -> KilnResult<Self> {
        let parent = match &doc.parent {
            Some(parent_ref) => Some(parents.parent_manifest(parent_ref)?),
            None => None,
        };

        let parent_ref = doc.parent.as_ref();
        let group_id = doc
            .group_id
            .clone()
            .or_else(|| parent_ref.map(|p| p.group_id.clone()))
            .unwrap_or_default();
        let version = doc
            .version
            .clone()
            .or_else(|| parent_ref.map(|p| p.version.clone()))
            .unwrap_or_default();
        let artifact_id = doc.artifact_id.clone().unwrap_or_default();
        let packaging = doc.packaging.clone().unwrap_or_else(|| DEFAULT_TYPE.to_string());

        let mut properties = doc.properties;
        let synthesized = [
            ("groupId", Some(group_id.clone())),
            ("artifactId", Some(artifact_id.clone())),
            ("version", Some(version.clone())),
            ("packaging", Some(packaging.clone())),
            ("name", doc.name),
            ("description", doc.description),
            ("url", doc.url),
            ("inceptionYear", doc.inception_year),
        ];
        for (field, value) in synthesized {
            if let Some(value) = value {
                properties.insert(format!("project.{field}"), value.clone());
                properties.insert(format!("pom.{field}"), value);
            }
        }
        if let Some(p) = parent_ref {
            properties.insert("project.parent.groupId".to_string(), p.group_id.clone());
            properties.insert("project.parent.artifactId".to_string(), p.artifact_id.clone());
            properties.insert("project.parent.version".to_string(), p.version.clone());
        }

        let mut declared = doc.dependencies;
        let mut management = doc.dependency_management;
        if let Some(parent) = &parent {
            for (name, value) in &parent.properties {
                properties
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
            declared.extend(parent.declared.iter().cloned());
            management.extend(parent.management.iter().cloned());
        }

        Ok(Self {
            source: source.to_string(),
            group_id,
            artifact_id,
            version,
            packaging,
            parent: doc.parent,
            properties,
            declared,
            management,
            resolved: OnceLock::new(),
        })
    }

    /// Where this manifest was fetched from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    /// A property after inheritance, with placeholders in its value substituted.
    pub fn property(&self, name: &str) -> Option<String> {
        self.properties
            .get(name)
            .map(|value| self.substitute_at(value, 1))
    }

    /// Replace `${name}` placeholders left to right. Unknown names stay as written.
    ///
    /// Property values are expanded in turn, so `${a}` with `a = ${b}` yields
    /// the value of `b`, up to a fixed nesting depth.
    pub fn substitute(&self, text: &str) -> String {
        self.substitute_at(text, 0)
    }

    fn substitute_at(&self, text: &str, depth: usize) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let placeholder = &rest[start..start + end + 3];
            match self.properties.get(&after[..end]) {
                Some(value) if depth < MAX_SUBSTITUTION_DEPTH => {
                    out.push_str(&self.substitute_at(value, depth + 1));
                }
                _ => out.push_str(placeholder),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }

    /// Dependencies declared for any of `scopes`, in declaration order per scope.
    pub fn dependencies(&self, scopes: &[Scope]) -> Vec<ManifestDependency> {
        let resolved = self.resolved.get_or_init(|| self.resolve_all());
        scopes
            .iter()
            .filter_map(|scope| resolved.get(scope))
            .flatten()
            .cloned()
            .collect()
    }

    fn resolve(&self, raw: &PomDependency) -> (ManifestDependency, String) {
        let type_ = self.substitute(&raw.type_);
        let dependency = ManifestDependency {
            group_id: self.substitute(&raw.group_id),
            artifact_id: self.substitute(&raw.artifact_id),
            version: self.substitute(&raw.version),
            classifier: self.substitute(&raw.classifier),
            type_: if type_.is_empty() {
                DEFAULT_TYPE.to_string()
            } else {
                type_
            },
            scope: Scope::Compile,
            optional: self.substitute(&raw.optional),
            exclusions: raw
                .exclusions
                .iter()
                .map(|e| {
                    Exclusion::new(self.substitute(&e.group_id), self.substitute(&e.artifact_id))
                })
                .collect(),
        };
        (dependency, self.substitute(&raw.scope))
    }

    fn resolve_all(&self) -> BTreeMap<Scope, Vec<ManifestDependency>> {
        let management: Vec<ManifestDependency> = self
            .management
            .iter()
            .map(|raw| self.resolve(raw).0)
            .collect();

        let mut seen = HashSet::new();
        let mut buckets: BTreeMap<Scope, Vec<ManifestDependency>> = BTreeMap::new();
        for raw in &self.declared {
            let (mut dependency, declared_scope) = self.resolve(raw);
            let Some(scope) = Scope::from_declared(&declared_scope) else {
                tracing::debug!(
                    "{}: ignoring {}:{} with unknown scope '{declared_scope}'",
                    self.source,
                    dependency.group_id,
                    dependency.artifact_id
                );
                continue;
            };
            if !seen.insert(dependency.clone()) {
                continue;
            }
            dependency.scope = scope;

            if let Some(managed) = management.iter().find(|m| **m == dependency) {
                if dependency.version.is_empty() {
                    dependency.version = managed.version.clone();
                }
                if dependency.optional.is_empty() {
                    dependency.optional = managed.optional.clone();
                }
                if dependency.exclusions.is_empty() {
                    dependency.exclusions = managed.exclusions.clone();
                }
            }

            if dependency.optional == "true" {
                continue;
            }
            buckets.entry(scope).or_default().push(dependency);
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Parents looked up by `artifactId`.
    #[derive(Default)]
    struct Parents(HashMap<String, Arc<Manifest>>);

    impl Parents {
        fn with(mut self, artifact_id: &str, pom: &str) -> Self {
            let manifest = Manifest::parse(pom, artifact_id, artifact_id, &self).unwrap();
            self.0.insert(artifact_id.to_string(), Arc::new(manifest));
            self
        }
    }

    impl ParentSource for Parents {
        fn parent_manifest(&self, parent: &ParentRef) -> KilnResult<Arc<Manifest>> {
            self.0
                .get(&parent.artifact_id)
                .cloned()
                .ok_or_else(|| KilnError::ArtifactNotFound {
                    artifact: parent.artifact_id.clone(),
                    locations: "test parents".to_string(),
                })
        }
    }

    fn manifest(pom: &str) -> Manifest {
        Manifest::parse(pom, "test.pom", "g:a", &Parents::default()).unwrap()
    }

    fn coordinates(deps: &[ManifestDependency]) -> Vec<String> {
        deps.iter()
            .map(|d| format!("{}:{}:{}", d.group_id, d.artifact_id, d.version))
            .collect()
    }

    #[test]
    fn property_substitution() {
        let m = manifest(
            r#"<project>
  <groupId>g</groupId><artifactId>a</artifactId><version>1.0</version>
  <properties><foo.version>4.5</foo.version></properties>
  <dependencies>
    <dependency><groupId>org.foo</groupId><artifactId>foo</artifactId><version>${foo.version}</version></dependency>
    <dependency><groupId>${project.groupId}</groupId><artifactId>sibling</artifactId><version>${project.version}</version></dependency>
    <dependency><groupId>org.bar</groupId><artifactId>bar</artifactId><version>${missing}</version></dependency>
  </dependencies>
</project>"#,
        );
        let deps = m.dependencies(&[Scope::Compile]);
        assert_eq!(
            coordinates(&deps),
            vec!["org.foo:foo:4.5", "g:sibling:1.0", "org.bar:bar:${missing}"]
        );
        assert_eq!(deps[0].to_dependency().version(), &VersionNumber::new_short(4, 5));
    }

    #[test]
    fn nested_and_cyclic_properties() {
        let m = manifest(
            r#"<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version>
  <properties>
    <base>2.1</base><full>${base}.3</full><loop>${loop}</loop>
  </properties>
</project>"#,
        );
        assert_eq!(m.substitute("v${full}-x"), "v2.1.3-x");
        assert_eq!(m.property("full").as_deref(), Some("2.1.3"));
        assert!(m.substitute("${loop}").contains("${loop}"));
        assert_eq!(m.substitute("${unterminated"), "${unterminated");
        assert_eq!(m.substitute("${pom.artifactId}"), "a");
    }

    #[test]
    fn dependency_management_fills_version() {
        let m = manifest(
            r#"<project><groupId>g</groupId><artifactId>root</artifactId><version>1</version>
  <dependencyManagement><dependencies>
    <dependency><groupId>g</groupId><artifactId>a</artifactId><version>3.0</version>
      <exclusions><exclusion><groupId>x</groupId><artifactId>y</artifactId></exclusion></exclusions>
    </dependency>
  </dependencies></dependencyManagement>
  <dependencies>
    <dependency><groupId>g</groupId><artifactId>a</artifactId></dependency>
  </dependencies>
</project>"#,
        );
        let deps = m.dependencies(&[Scope::Compile]);
        assert_eq!(coordinates(&deps), vec!["g:a:3.0"]);
        assert_eq!(deps[0].exclusions, vec![Exclusion::new("x", "y")]);
    }

    #[test]
    fn management_entries_are_not_dependencies() {
        let m = manifest(
            r#"<project><groupId>g</groupId><artifactId>root</artifactId><version>1</version>
  <dependencyManagement><dependencies>
    <dependency><groupId>g</groupId><artifactId>managed-only</artifactId><version>1</version></dependency>
  </dependencies></dependencyManagement>
  <build><plugins><plugin><dependencies>
    <dependency><groupId>g</groupId><artifactId>plugin-dep</artifactId><version>1</version></dependency>
  </dependencies></plugin></plugins></build>
</project>"#,
        );
        assert!(m.dependencies(&Scope::ALL).is_empty());
    }

    #[test]
    fn scopes_and_optional_filtering() {
        let m = manifest(
            r#"<project><groupId>g</groupId><artifactId>root</artifactId><version>1</version>
  <dependencies>
    <dependency><groupId>g</groupId><artifactId>c</artifactId><version>1</version></dependency>
    <dependency><groupId>g</groupId><artifactId>t</artifactId><version>1</version><scope>test</scope></dependency>
    <dependency><groupId>g</groupId><artifactId>r</artifactId><version>1</version><scope>runtime</scope></dependency>
    <dependency><groupId>g</groupId><artifactId>o</artifactId><version>1</version><optional>true</optional></dependency>
    <dependency><groupId>g</groupId><artifactId>w</artifactId><version>1</version><scope>weird</scope></dependency>
  </dependencies>
</project>"#,
        );
        assert_eq!(coordinates(&m.dependencies(&[Scope::Compile])), vec!["g:c:1"]);
        assert_eq!(coordinates(&m.dependencies(&[Scope::Test])), vec!["g:t:1"]);
        assert_eq!(
            coordinates(&m.dependencies(&[Scope::Compile, Scope::Runtime])),
            vec!["g:c:1", "g:r:1"]
        );
        let deps = m.dependencies(&[Scope::Runtime]);
        assert_eq!(deps[0].scope, Scope::Runtime);
        assert_eq!(deps[0].type_, "jar");
    }

    #[test]
    fn parent_inheritance() {
        let parents = Parents::default().with(
            "parent",
            r#"<project><groupId>org.parent</groupId><artifactId>parent</artifactId><version>7</version>
  <properties><lib.version>2.0</lib.version><shared>parent</shared></properties>
  <dependencyManagement><dependencies>
    <dependency><groupId>org.lib</groupId><artifactId>lib</artifactId><version>${lib.version}</version></dependency>
  </dependencies></dependencyManagement>
  <dependencies>
    <dependency><groupId>org.common</groupId><artifactId>common</artifactId><version>1.0</version></dependency>
    <dependency><groupId>org.dup</groupId><artifactId>dup</artifactId><version>1.0</version></dependency>
  </dependencies>
</project>"#,
        );
        let child = Manifest::parse(
            r#"<project>
  <parent><groupId>org.parent</groupId><artifactId>parent</artifactId><version>7</version></parent>
  <artifactId>child</artifactId>
  <properties><lib.version>2.5</lib.version></properties>
  <dependencies>
    <dependency><groupId>org.lib</groupId><artifactId>lib</artifactId></dependency>
    <dependency><groupId>org.dup</groupId><artifactId>dup</artifactId><version>9.0</version></dependency>
  </dependencies>
</project>"#,
            "child.pom",
            "org.parent:child",
            &parents,
        )
        .unwrap();

        assert_eq!(child.group_id(), "org.parent");
        assert_eq!(child.version(), "7");
        assert_eq!(child.property("shared").as_deref(), Some("parent"));
        assert_eq!(child.property("project.parent.version").as_deref(), Some("7"));
        assert_eq!(
            coordinates(&child.dependencies(&[Scope::Compile])),
            vec!["org.lib:lib:2.5", "org.dup:dup:9.0", "org.common:common:1.0"]
        );
    }

    #[test]
    fn missing_parent_propagates() {
        let err = Manifest::parse(
            r#"<project><parent><groupId>p</groupId><artifactId>gone</artifactId><version>1</version></parent>
<artifactId>c</artifactId></project>"#,
            "c.pom",
            "p:c",
            &Parents::default(),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn malformed_manifest_reports_source() {
        let err = Manifest::parse("<project><dependencies>", "https://repo/x.pom", "g:x", &Parents::default())
            .unwrap_err();
        match err {
            KilnError::ManifestParsing { url, errors, .. } => {
                assert_eq!(url, "https://repo/x.pom");
                assert!(!errors.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_root_is_a_parse_error() {
        assert!(parse_document("<metadata/>").is_err());
    }

    #[test]
    fn exclusion_without_artifact_is_wildcard() {
        let doc = parse_document(
            r#"<project><dependencies><dependency><groupId>g</groupId><artifactId>a</artifactId>
  <exclusions><exclusion><groupId>org.bad</groupId></exclusion></exclusions>
</dependency></dependencies></project>"#,
        )
        .unwrap();
        assert!(doc.dependencies[0].exclusions[0].matches("org.bad", "anything"));
    }
}
