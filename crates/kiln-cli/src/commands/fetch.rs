//! Handler for `kiln fetch`.

use std::path::Path;

use kiln_core::dependency::{Dependency, Scope};
use kiln_resolver::{DependencyResolver, Session};
use kiln_util::progress::{self, Tone};
use miette::Result;

pub fn exec(
    session: Session,
    dependency: Dependency,
    dir: &Path,
    scopes: &[Scope],
    transitive: bool,
) -> Result<()> {
    let resolver = DependencyResolver::new(session, dependency);

    let pb = progress::spinner(&format!("Fetching {}", resolver.dependency()));
    let result = if transitive {
        resolver.download_transitively_into_directory(dir, scopes)
    } else {
        resolver.download_into_directory(dir).map(|file| vec![file])
    };
    pb.finish_and_clear();

    for file in &result? {
        progress::status(Tone::Action, "Fetched", &file.display().to_string());
    }
    Ok(())
}
