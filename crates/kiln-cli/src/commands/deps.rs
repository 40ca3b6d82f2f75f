//! Handler for `kiln deps`.

use console::style;
use kiln_core::dependency::{Dependency, Scope};
use kiln_resolver::{DependencyResolver, Session};
use kiln_util::progress;
use miette::Result;

pub fn exec(session: Session, dependency: Dependency, scopes: &[Scope], transitive: bool) -> Result<()> {
    let resolver = DependencyResolver::new(session, dependency);

    let pb = progress::spinner(&format!("Resolving {}", resolver.dependency()));
    let result = if transitive {
        resolver.all_dependencies(scopes)
    } else {
        resolver.direct_dependencies(scopes)
    };
    pb.finish_and_clear();
    let dependencies = result?;

    if dependencies.is_empty() {
        eprintln!("{}", style("No dependencies.").dim());
    }
    for dependency in &dependencies {
        println!("{dependency}");
    }
    Ok(())
}
