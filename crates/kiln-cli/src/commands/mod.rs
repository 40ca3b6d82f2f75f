//! Command dispatch and handler modules.

mod deps;
mod exists;
mod fetch;
mod urls;
mod versions;

use kiln_core::config::{KilnConfig, RepositoryEntry};
use kiln_core::dependency::Scope;
use kiln_resolver::Session;
use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let session = Session::from_config(&config)?;
    tracing::debug!("Using {session:?}");

    match cli.command {
        Command::Versions { coordinate } => versions::exec(session, coordinate),
        Command::Exists { coordinate } => exists::exec(session, coordinate),
        Command::Deps {
            coordinate,
            scopes,
            transitive,
        } => deps::exec(
            session,
            coordinate,
            &scopes_or_default(scopes, &config),
            transitive,
        ),
        Command::Urls { coordinate, pom } => urls::exec(session, coordinate, pom),
        Command::Fetch {
            coordinate,
            dir,
            scopes,
            transitive,
        } => fetch::exec(
            session,
            coordinate,
            &dir,
            &scopes_or_default(scopes, &config),
            transitive,
        ),
    }
}

/// Configuration file overlaid with the global command-line options.
fn load_config(cli: &Cli) -> Result<KilnConfig> {
    let mut config = match &cli.config {
        Some(path) => KilnConfig::load_from(path)?,
        None => KilnConfig::load()?,
    };
    if !cli.repos.is_empty() {
        config.repositories = cli
            .repos
            .iter()
            .map(|url| RepositoryEntry {
                name: None,
                url: url.clone(),
            })
            .collect();
    }
    if let Some(timeout) = cli.timeout {
        config.network.timeout_secs = timeout;
    }
    Ok(config)
}

fn scopes_or_default(scopes: Vec<Scope>, config: &KilnConfig) -> Vec<Scope> {
    if scopes.is_empty() {
        config.resolve.scopes.clone()
    } else {
        scopes
    }
}
