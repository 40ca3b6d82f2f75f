//! Handler for `kiln exists`.

use kiln_core::dependency::Dependency;
use kiln_resolver::{DependencyResolver, Session};
use kiln_util::progress::{self, Tone};
use miette::Result;

pub fn exec(session: Session, dependency: Dependency) -> Result<()> {
    let resolver = DependencyResolver::new(session, dependency);
    if resolver.exists()? {
        progress::status(Tone::Info, "Found", &resolver.dependency().to_string());
        Ok(())
    } else {
        Err(miette::miette!(
            help = "Run with --verbose to see which locations were probed",
            "{} was not found in any repository",
            resolver.dependency()
        ))
    }
}
