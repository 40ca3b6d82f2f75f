//! Shared utilities for kiln.
//!
//! Cross-cutting concerns used by the other kiln crates: the error taxonomy,
//! file digests for checksum verification, and terminal status output.

pub mod errors;
pub mod hash;
pub mod progress;
