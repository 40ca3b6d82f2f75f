//! Version numbers as published in Maven repositories.
//!
//! A version is `major[.minor[.revision]]` followed by an optional
//! qualifier introduced by `.` or `-` (`1.0.0-SNAPSHOT`, `2.0.1.Final`).
//! Precedence is numeric on the three leading fields; at equal numbers a
//! version without qualifier wins over any qualified one, and qualifiers
//! otherwise compare case-insensitively.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Qualifier that marks a snapshot build.
pub const SNAPSHOT_QUALIFIER: &str = "SNAPSHOT";

/// A parsed version number.
///
/// Missing `minor`/`revision` compare as `0` but are remembered so that the
/// rendered form matches what was parsed, which matters for repository paths.
#[derive(Debug, Clone)]
pub struct VersionNumber {
    major: u32,
    minor: Option<u32>,
    revision: Option<u32>,
    qualifier: String,
    separator: char,
}

impl VersionNumber {
    /// "No version requested / not found".
    pub const UNKNOWN: VersionNumber = VersionNumber {
        major: 0,
        minor: Some(0),
        revision: Some(0),
        qualifier: String::new(),
        separator: '-',
    };

    /// A fully specified `major.minor.revision` version.
    pub fn new(major: u32, minor: u32, revision: u32) -> Self {
        Self {
            major,
            minor: Some(minor),
            revision: Some(revision),
            qualifier: String::new(),
            separator: '-',
        }
    }

    /// A `major.minor` version without revision.
    pub fn new_short(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor: Some(minor),
            revision: None,
            qualifier: String::new(),
            separator: '-',
        }
    }

    /// Attach a qualifier, rendered after a `-`.
    pub fn with_qualifier(self, qualifier: impl Into<String>) -> Self {
        self.with_separated_qualifier('-', qualifier)
    }

    /// Attach a qualifier with an explicit `.` or `-` separator.
    pub fn with_separated_qualifier(mut self, separator: char, qualifier: impl Into<String>) -> Self {
        self.separator = separator;
        self.qualifier = qualifier.into();
        self
    }

    /// Parse a version string. Empty or malformed input yields [`Self::UNKNOWN`].
    pub fn parse(version: &str) -> Self {
        parse_version(version.trim()).unwrap_or(Self::UNKNOWN)
    }

    /// Parse an optional version string; `None` yields [`Self::UNKNOWN`].
    pub fn parse_optional(version: Option<&str>) -> Self {
        version.map_or(Self::UNKNOWN, Self::parse)
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor.unwrap_or(0)
    }

    pub fn revision(&self) -> u32 {
        self.revision.unwrap_or(0)
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// The same version with the qualifier dropped.
    pub fn base_version(&self) -> Self {
        Self {
            qualifier: String::new(),
            ..self.clone()
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.qualifier == SNAPSHOT_QUALIFIER
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl Default for VersionNumber {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl From<&str> for VersionNumber {
    fn from(version: &str) -> Self {
        Self::parse(version)
    }
}

fn parse_version(input: &str) -> Option<VersionNumber> {
    let bytes = input.as_bytes();
    let mut pos = 0;

    let major = take_number(input, &mut pos)?;
    let mut minor = None;
    let mut revision = None;

    // Numeric fields only continue when a '.' is directly followed by a digit.
    if starts_number_after_dot(bytes, pos) {
        pos += 1;
        minor = Some(take_number(input, &mut pos)?);
        if starts_number_after_dot(bytes, pos) {
            pos += 1;
            revision = Some(take_number(input, &mut pos)?);
        }
    }

    let mut version = VersionNumber {
        major,
        minor,
        revision,
        qualifier: String::new(),
        separator: '-',
    };

    if pos == bytes.len() {
        return Some(version);
    }

    let separator = match bytes[pos] {
        b'.' => '.',
        b'-' => '-',
        _ => return None,
    };
    let qualifier = &input[pos + 1..];
    if qualifier.is_empty() || qualifier.ends_with(['.', '-']) {
        return None;
    }

    version.separator = separator;
    version.qualifier = qualifier.to_string();
    Some(version)
}

fn starts_number_after_dot(bytes: &[u8], pos: usize) -> bool {
    bytes.get(pos) == Some(&b'.') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit)
}

fn take_number(input: &str, pos: &mut usize) -> Option<u32> {
    let start = *pos;
    let digits = input[start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    *pos = start + digits;
    input[start..*pos].parse().ok()
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor().cmp(&other.minor()))
            .then_with(|| self.revision().cmp(&other.revision()))
            .then_with(|| compare_qualifiers(&self.qualifier, &other.qualifier))
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    match (a.is_empty(), b.is_empty()) {
        (true, _) => Ordering::Greater,
        (_, true) => Ordering::Less,
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionNumber {}

impl Hash for VersionNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor().hash(state);
        self.revision().hash(state);
        self.qualifier.to_lowercase().hash(state);
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if self.minor.is_some() || self.revision.is_some() {
            write!(f, ".{}", self.minor())?;
        }
        if let Some(revision) = self.revision {
            write!(f, ".{revision}")?;
        }
        if !self.qualifier.is_empty() {
            write!(f, "{}{}", self.separator, self.qualifier)?;
        }
        Ok(())
    }
}
