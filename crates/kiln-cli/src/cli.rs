//! CLI argument definitions for Kiln.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kiln_core::dependency::{Dependency, Scope};

#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Resolve and download artifacts from Maven repositories",
    long_about = "Kiln queries Maven2-layout repositories for published versions, reads POM \
                  manifests with parent inheritance, computes transitive dependency sets and \
                  downloads artifacts with checksum verification."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository base URL, probed in the order given (replaces the configured list)
    #[arg(long = "repo", value_name = "URL", global = true)]
    pub repos: Vec<String>,

    /// Time budget for the whole command in seconds; 0 disables it
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Configuration file to use instead of ~/.kiln/config.toml
    #[arg(long, value_name = "PATH", env = "KILN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List published versions of an artifact
    Versions {
        /// Coordinate: group:artifact
        coordinate: Dependency,
    },

    /// Check whether an artifact (or a specific version of it) is published
    Exists {
        /// Coordinate: group:artifact[:version]
        coordinate: Dependency,
    },

    /// Print the dependencies of an artifact
    Deps {
        /// Coordinate: group:artifact[:version[:classifier]][@type]
        coordinate: Dependency,
        /// Scopes to include (repeatable); defaults to the configured scopes
        #[arg(short, long = "scope", value_name = "SCOPE")]
        scopes: Vec<Scope>,
        /// Include transitive dependencies
        #[arg(short, long)]
        transitive: bool,
    },

    /// Print the candidate download URLs of an artifact
    Urls {
        /// Coordinate: group:artifact[:version[:classifier]][@type]
        coordinate: Dependency,
        /// Print manifest URLs instead of artifact URLs
        #[arg(long)]
        pom: bool,
    },

    /// Download an artifact into a directory
    Fetch {
        /// Coordinate: group:artifact[:version[:classifier]][@type]
        coordinate: Dependency,
        /// Target directory; must already exist
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Scopes followed with --transitive (repeatable)
        #[arg(short, long = "scope", value_name = "SCOPE")]
        scopes: Vec<Scope>,
        /// Also download transitive dependencies
        #[arg(short, long)]
        transitive: bool,
    },
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
