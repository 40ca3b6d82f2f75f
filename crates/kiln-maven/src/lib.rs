//! Maven repository protocol: repository layout, blocking transport with
//! deadlines, `maven-metadata.xml` and POM parsing, and checksum sidecars.

pub mod checksum;
pub mod metadata;
pub mod pom;
pub mod repository;
pub mod transport;
pub mod xml;
