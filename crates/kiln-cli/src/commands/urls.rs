//! Handler for `kiln urls`.

use kiln_core::dependency::Dependency;
use kiln_resolver::{DependencyResolver, Session};
use miette::Result;

pub fn exec(session: Session, dependency: Dependency, pom: bool) -> Result<()> {
    let resolver = DependencyResolver::new(session, dependency);
    let urls = if pom {
        resolver.pom_urls()?
    } else {
        resolver.download_urls()?
    };
    for url in urls {
        println!("{url}");
    }
    Ok(())
}
