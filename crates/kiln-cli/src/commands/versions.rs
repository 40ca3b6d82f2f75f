//! Handler for `kiln versions`.

use kiln_core::dependency::Dependency;
use kiln_resolver::{DependencyResolver, Session};
use kiln_util::errors::KilnResult;
use kiln_util::progress::{self, Tone};
use miette::Result;

pub fn exec(session: Session, dependency: Dependency) -> Result<()> {
    let resolver = DependencyResolver::new(session, dependency);

    let pb = progress::spinner(&format!("Fetching metadata for {}", resolver.dependency()));
    let lookup = || -> KilnResult<_> {
        Ok((
            resolver.list_versions()?,
            resolver.latest_version()?,
            resolver.release_version()?,
        ))
    };
    let result = lookup();
    pb.finish_and_clear();
    let (versions, latest, release) = result?;

    for version in &versions {
        println!("{version}");
    }
    if !latest.is_unknown() {
        progress::status(Tone::Info, "Latest", &latest.to_string());
    }
    if !release.is_unknown() {
        progress::status(Tone::Info, "Release", &release.to_string());
    }
    Ok(())
}
