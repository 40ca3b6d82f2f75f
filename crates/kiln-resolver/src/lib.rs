//! Dependency resolution engine: version discovery through repository
//! metadata, manifest retrieval with parent inheritance, the transitive
//! closure with exclusion propagation, and checksum-gated downloads.

pub mod closure;
pub mod download;
pub mod resolver;
pub mod session;

pub use resolver::DependencyResolver;
pub use session::Session;
