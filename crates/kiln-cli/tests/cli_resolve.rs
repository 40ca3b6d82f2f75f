use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn kiln_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kiln").unwrap();
    cmd.env("HOME", home).env_remove("KILN_CONFIG");
    cmd
}

/// Publish `group:artifact` at `versions` into a file-based repository.
fn publish(repo: &Path, group: &str, artifact: &str, versions: &[&str], pom_body: &str) {
    let base = repo.join(group.replace('.', "/")).join(artifact);
    fs::create_dir_all(&base).unwrap();
    let listed: String = versions
        .iter()
        .map(|v| format!("<version>{v}</version>"))
        .collect();
    let latest = versions.last().unwrap();
    fs::write(
        base.join("maven-metadata.xml"),
        format!(
            "<metadata><groupId>{group}</groupId><artifactId>{artifact}</artifactId><versioning>\
             <latest>{latest}</latest><release>{latest}</release><versions>{listed}</versions>\
             </versioning></metadata>"
        ),
    )
    .unwrap();
    for version in versions {
        let dir = base.join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{artifact}-{version}.pom")),
            format!(
                "<project><groupId>{group}</groupId><artifactId>{artifact}</artifactId>\
                 <version>{version}</version>{pom_body}</project>"
            ),
        )
        .unwrap();
        fs::write(dir.join(format!("{artifact}-{version}.jar")), "jar bytes").unwrap();
    }
}

struct Fixture {
    home: TempDir,
    repo: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self {
            home: TempDir::new().unwrap(),
            repo: TempDir::new().unwrap(),
        };
        publish(
            fixture.repo.path(),
            "org.example",
            "app",
            &["1.0", "1.1"],
            "<dependencies>\
               <dependency><groupId>org.example</groupId><artifactId>core</artifactId><version>2.0</version></dependency>\
               <dependency><groupId>org.example</groupId><artifactId>junit</artifactId><version>4</version><scope>test</scope></dependency>\
             </dependencies>",
        );
        publish(fixture.repo.path(), "org.example", "core", &["2.0"], "");
        fixture
    }

    fn repo_url(&self) -> String {
        format!("file://{}", self.repo.path().display())
    }

    fn cmd(&self) -> Command {
        let mut cmd = kiln_cmd(self.home.path());
        cmd.arg("--repo").arg(self.repo_url());
        cmd
    }
}

#[test]
fn test_versions_lists_published_versions() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["versions", "org.example:app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0\n1.1"))
        .stderr(predicate::str::contains("Latest"));
}

#[test]
fn test_exists_reflects_publication() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["exists", "org.example:app:1.1"])
        .assert()
        .success();
    fixture
        .cmd()
        .args(["exists", "org.example:app:9.9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("was not found"));
    fixture
        .cmd()
        .args(["exists", "org.example:missing"])
        .assert()
        .failure();
}

#[test]
fn test_deps_direct_and_transitive() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["deps", "org.example:app:1.0"])
        .assert()
        .success()
        .stdout("org.example:core:2.0\n");
    fixture
        .cmd()
        .args(["deps", "org.example:app:1.0", "--scope", "test"])
        .assert()
        .success()
        .stdout("org.example:junit:4\n");
    fixture
        .cmd()
        .args(["deps", "org.example:app", "--transitive"])
        .assert()
        .success()
        .stdout("org.example:app:1.1\norg.example:core:2.0\n");
}

#[test]
fn test_urls_follow_repository_order() {
    let home = TempDir::new().unwrap();
    kiln_cmd(home.path())
        .args([
            "--repo",
            "https://first.test/maven",
            "--repo",
            "https://second.test/maven/",
            "urls",
            "g:a:1.0:sources",
        ])
        .assert()
        .success()
        .stdout(
            "https://first.test/maven/g/a/1.0/a-1.0-sources.jar\n\
             https://second.test/maven/g/a/1.0/a-1.0-sources.jar\n",
        );
}

#[test]
fn test_fetch_downloads_into_directory() {
    let fixture = Fixture::new();
    let target = TempDir::new().unwrap();
    fixture
        .cmd()
        .args(["fetch", "org.example:app:1.0", "--transitive", "--dir"])
        .arg(target.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Fetched"));

    assert!(target.path().join("app-1.0.jar").is_file());
    assert!(target.path().join("core-2.0.jar").is_file());
    assert!(!target.path().join("junit-4.jar").exists());
}

#[test]
fn test_fetch_rejects_missing_directory() {
    let fixture = Fixture::new();
    let target = TempDir::new().unwrap();
    fixture
        .cmd()
        .args(["fetch", "org.example:app:1.0", "--dir"])
        .arg(target.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("doesn't exist"));
}

#[test]
fn test_invalid_coordinate_is_rejected() {
    let home = TempDir::new().unwrap();
    kiln_cmd(home.path())
        .args(["urls", "just-an-artifact"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a dependency coordinate"));
}

#[test]
fn test_invalid_scope_is_rejected() {
    let home = TempDir::new().unwrap();
    kiln_cmd(home.path())
        .args(["deps", "g:a:1", "--scope", "everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scope"));
}

#[test]
fn test_broken_config_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("kiln.toml");
    fs::write(&config, "[[repository]\nurl = ").unwrap();
    kiln_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["urls", "g:a:1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_config_file_supplies_repositories() {
    let fixture = Fixture::new();
    let config = fixture.home.path().join("kiln.toml");
    fs::write(
        &config,
        format!("[[repository]]\nname = \"local\"\nurl = \"{}\"\n", fixture.repo_url()),
    )
    .unwrap();
    kiln_cmd(fixture.home.path())
        .arg("--config")
        .arg(&config)
        .args(["versions", "org.example:core"])
        .assert()
        .success()
        .stdout("2.0\n");
}
