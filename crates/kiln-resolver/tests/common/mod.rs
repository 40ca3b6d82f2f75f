#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use kiln_maven::repository::Repository;
use kiln_maven::transport::{Body, Deadline, Transport};
use kiln_resolver::Session;
use kiln_util::errors::FetchError;

pub const REPO1: &str = "https://repo1.test/maven/";
pub const REPO2: &str = "https://repo2.test/maven/";

enum Entry {
    Content(Vec<u8>),
    Status(u16),
}

/// In-memory repositories: URLs map to content or to a failing status, and
/// every request is recorded.
#[derive(Default)]
pub struct MemoryTransport {
    entries: Mutex<HashMap<String, Entry>>,
    requested: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, url: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.entries
            .lock()
            .unwrap()
            .insert(url.into(), Entry::Content(content.into()));
    }

    pub fn fail(&self, url: impl Into<String>, status: u16) {
        self.entries
            .lock()
            .unwrap()
            .insert(url.into(), Entry::Status(status));
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn was_requested(&self, url: &str) -> bool {
        self.requested().iter().any(|u| u == url)
    }

    pub fn clear_requests(&self) {
        self.requested.lock().unwrap().clear();
    }

    /// Publish a release: artifact-level metadata listing `versions`, plus
    /// a manifest and a jar for each version.
    pub fn publish(&self, repo: &str, group: &str, artifact: &str, versions: &[&str], pom_body: &str) {
        let base = format!("{repo}{}/{artifact}/", group.replace('.', "/"));
        let listed: String = versions
            .iter()
            .map(|v| format!("<version>{v}</version>"))
            .collect();
        let latest = versions.last().copied().unwrap_or_default();
        self.serve(
            format!("{base}maven-metadata.xml"),
            format!(
                "<metadata><groupId>{group}</groupId><artifactId>{artifact}</artifactId>\
                 <versioning><latest>{latest}</latest><release>{latest}</release>\
                 <versions>{listed}</versions></versioning></metadata>"
            ),
        );
        for version in versions {
            self.serve(
                format!("{base}{version}/{artifact}-{version}.pom"),
                pom(group, artifact, version, pom_body),
            );
            self.serve(
                format!("{base}{version}/{artifact}-{version}.jar"),
                format!("{artifact}-{version} bytes"),
            );
        }
    }

    fn lookup(&self, url: &str, deadline: &Deadline) -> Result<Option<Vec<u8>>, FetchError> {
        deadline.check()?;
        self.requested.lock().unwrap().push(url.to_string());
        match self.entries.lock().unwrap().get(url) {
            Some(Entry::Content(content)) => Ok(Some(content.clone())),
            Some(Entry::Status(status)) => Err(FetchError::Status { status: *status }),
            None => Ok(None),
        }
    }
}

impl Transport for MemoryTransport {
    fn fetch(&self, url: &str, deadline: &Deadline) -> Result<Option<Vec<u8>>, FetchError> {
        self.lookup(url, deadline)
    }

    fn open(&self, url: &str, deadline: &Deadline) -> Result<Option<Body>, FetchError> {
        Ok(self
            .lookup(url, deadline)?
            .map(|bytes| Box::new(Cursor::new(bytes)) as Body))
    }
}

pub fn pom(group: &str, artifact: &str, version: &str, body: &str) -> String {
    format!(
        "<project><modelVersion>4.0.0</modelVersion><groupId>{group}</groupId>\
         <artifactId>{artifact}</artifactId><version>{version}</version>{body}</project>"
    )
}

/// `<dependencies>` block for `(group, artifact, version)` triples.
pub fn dependencies(deps: &[(&str, &str, &str)]) -> String {
    let blocks: String = deps
        .iter()
        .map(|(g, a, v)| {
            format!("<dependency><groupId>{g}</groupId><artifactId>{a}</artifactId><version>{v}</version></dependency>")
        })
        .collect();
    format!("<dependencies>{blocks}</dependencies>")
}

pub fn session(transport: &Arc<MemoryTransport>, repos: &[&str]) -> Session {
    let transport: Arc<dyn Transport> = transport.clone();
    Session::new(repos.iter().map(|r| Repository::new(*r)).collect(), transport)
}
