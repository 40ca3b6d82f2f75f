//! Core data types for kiln.
//!
//! This crate defines the value vocabulary shared by the repository protocol
//! and the resolver: version numbers and their precedence, dependency
//! coordinates with exclusions, scopes, the "highest version wins"
//! dependency set, and user configuration.
//!
//! This crate is intentionally free of network I/O.

pub mod config;
pub mod dependency;
pub mod dependency_set;
pub mod version;
