//! Coordinate-keyed dependency collection that keeps the highest version.

use std::collections::HashMap;
use std::fmt;

use crate::dependency::{Dependency, DependencyKey};

/// Insertion-ordered set of dependencies with at most one entry per
/// coordinate (`groupId`, `artifactId`, `classifier`, `type`).
///
/// When the same coordinate is added twice the higher version is kept. This
/// greedy merge is the whole conflict-resolution policy: there is no
/// nearest-wins or graph-distance heuristic.
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    entries: Vec<Dependency>,
    index: HashMap<DependencyKey, usize>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency, keeping whichever version is higher.
    ///
    /// Returns `true` when the set changed (new coordinate, or a strictly
    /// higher version replaced the stored one).
    pub fn add(&mut self, dependency: Dependency) -> bool {
        let key = dependency.key();
        match self.index.get(&key) {
            Some(&slot) => {
                if dependency.version() > self.entries[slot].version() {
                    self.entries[slot] = dependency;
                    true
                } else {
                    false
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(dependency);
                true
            }
        }
    }

    /// Whether a dependency with the same coordinate is present, whatever its version.
    pub fn contains(&self, dependency: &Dependency) -> bool {
        self.index.contains_key(&dependency.key())
    }

    /// The stored dependency for a coordinate.
    pub fn get(&self, key: &DependencyKey) -> Option<&Dependency> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for DependencySet {
    type Item = Dependency;
    type IntoIter = std::vec::IntoIter<Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<Dependency> for DependencySet {
    fn from_iter<I: IntoIterator<Item = Dependency>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Dependency> for DependencySet {
    fn extend<I: IntoIterator<Item = Dependency>>(&mut self, iter: I) {
        for dependency in iter {
            self.add(dependency);
        }
    }
}

/// One dependency per line, in insertion order.
impl fmt::Display for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dependency) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{dependency}")?;
        }
        Ok(())
    }
}
