//! maven-metadata.xml parsing for version discovery and SNAPSHOT resolution.

use kiln_core::version::VersionNumber;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::xml::ParseError;

/// Contents of an artifact-level or version-level `maven-metadata.xml`.
#[derive(Debug, Clone, Default)]
pub struct MavenMetadata {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    /// `<version>` directly under `<metadata>`; present in version-level documents.
    pub version: Option<String>,
    pub latest: VersionNumber,
    pub release: VersionNumber,
    pub versions: Vec<VersionNumber>,
    pub snapshot: Option<SnapshotInfo>,
    pub last_updated: Option<String>,
}

/// The `<snapshot>` block of a version-level document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub timestamp: Option<String>,
    pub build_number: Option<u32>,
}

impl MavenMetadata {
    /// Version string used in the file names of a snapshot build.
    ///
    /// For `1.0-SNAPSHOT` with timestamp `20240615.143022` and build `42`
    /// this is `1.0-20240615.143022-42`. Without a timestamped snapshot
    /// block (locally installed snapshots) the requested version is used as-is.
    pub fn snapshot_version(&self, requested: &VersionNumber) -> VersionNumber {
        let timestamped = self.snapshot.as_ref().and_then(|s| {
            let timestamp = s.timestamp.as_deref()?;
            let build = s.build_number?;
            Some(format!("{}-{timestamp}-{build}", requested.base_version()))
        });
        match timestamped {
            Some(version) => VersionNumber::parse(&version),
            None => requested.clone(),
        }
    }
}

/// Parse a `maven-metadata.xml` document.
///
/// Values are collected per element and dispatched when the element closes.
/// Entries that aren't valid versions are skipped; only a document that
/// isn't well-formed fails.
pub fn parse_metadata(xml: &str) -> Result<MavenMetadata, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut meta = MavenMetadata::default();
    let mut path: Vec<String> = Vec::new();
    let mut text_buf = String::new();
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            ParseError::new(format!(
                "Failed to parse maven-metadata.xml: {e} at byte {}",
                reader.buffer_position()
            ))
        })?;
        match event {
            Event::Start(e) => {
                saw_root = true;
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                text_buf.clear();
            }
            Event::Text(e) => {
                text_buf.push_str(&e.unescape().unwrap_or_default());
            }
            Event::End(_) => {
                let parent = path.len().checked_sub(2).map(|i| path[i].as_str());
                match (parent, path.last().map(String::as_str)) {
                    (Some("metadata"), Some("groupId")) => meta.group_id = Some(text_buf.clone()),
                    (Some("metadata"), Some("artifactId")) => {
                        meta.artifact_id = Some(text_buf.clone());
                    }
                    (Some("metadata"), Some("version")) => meta.version = Some(text_buf.clone()),
                    (Some("versioning"), Some("latest")) => {
                        meta.latest = VersionNumber::parse(&text_buf);
                    }
                    (Some("versioning"), Some("release")) => {
                        meta.release = VersionNumber::parse(&text_buf);
                    }
                    (Some("versioning"), Some("lastUpdated")) => {
                        meta.last_updated = Some(text_buf.clone());
                    }
                    (Some("versions"), Some("version")) => {
                        let version = VersionNumber::parse(&text_buf);
                        if version.is_unknown() {
                            tracing::debug!("Skipping unparseable version '{text_buf}'");
                        } else {
                            meta.versions.push(version);
                        }
                    }
                    (Some("snapshot"), Some("timestamp")) => {
                        meta.snapshot.get_or_insert_with(SnapshotInfo::default).timestamp =
                            Some(text_buf.clone());
                    }
                    (Some("snapshot"), Some("buildNumber")) => {
                        meta.snapshot.get_or_insert_with(SnapshotInfo::default).build_number =
                            text_buf.parse().ok();
                    }
                    _ => {}
                }

                path.pop();
                text_buf.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(ParseError::new("maven-metadata.xml has no root element"));
    }
    if !path.is_empty() {
        return Err(ParseError::new(format!(
            "maven-metadata.xml ends inside <{}>",
            path.join(">")
        )));
    }
    Ok(meta)
}
