//! Transitive closure of a dependency's manifest dependencies.
//!
//! Candidates are expanded breadth-first from a FIFO queue. Every candidate
//! remembers the node that introduced it as an index into an arena, so the
//! exclusions of all its ancestors can be checked without shared ownership.

use std::collections::VecDeque;

use kiln_core::dependency::{Dependency, Scope};
use kiln_core::dependency_set::DependencySet;
use kiln_maven::pom::ManifestDependency;
use kiln_util::errors::KilnResult;

use crate::resolver::DependencyResolver;

type NodeId = usize;

struct Node {
    dependency: ManifestDependency,
    parent: Option<NodeId>,
}

#[derive(Default)]
struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    fn push(&mut self, dependency: ManifestDependency, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node { dependency, parent });
        self.nodes.len() - 1
    }

    fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Whether `from` or any of its ancestors excludes `candidate`.
    fn excluded_by_lineage(&self, from: NodeId, candidate: &ManifestDependency) -> bool {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.get(id);
            if node.dependency.excludes(candidate) {
                return true;
            }
            current = node.parent;
        }
        false
    }
}

/// The root dependency (at its resolved version) plus every dependency
/// reachable through manifests for `scopes`.
///
/// Each coordinate is expanded once, at the first version dequeued. A
/// candidate is dropped when the root or any node on its path excludes it.
pub fn transitive_closure(
    root: &DependencyResolver,
    scopes: &[Scope],
) -> KilnResult<DependencySet> {
    let root_dependency = root
        .dependency()
        .clone()
        .with_version(root.resolve_version()?);
    let root_excludes =
        |c: &ManifestDependency| root_dependency.excludes(&c.group_id, &c.artifact_id);

    let mut result = DependencySet::new();
    result.add(root_dependency.clone());

    let mut arena = Arena::default();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    for candidate in root.manifest_dependencies(scopes)? {
        if root_excludes(&candidate) {
            tracing::debug!("{root_dependency} excludes {}", candidate.to_dependency());
            continue;
        }
        queue.push_back(arena.push(candidate, None));
    }

    while let Some((current, dependency)) = next_unresolved(&mut queue, &arena, &result) {
        result.add(dependency.clone());

        let resolver = root.nested(dependency);
        for candidate in resolver.manifest_dependencies(scopes)? {
            if root_excludes(&candidate) || arena.excluded_by_lineage(current, &candidate) {
                tracing::debug!(
                    "{} excluded below {}",
                    candidate.to_dependency(),
                    resolver.dependency()
                );
                continue;
            }
            if queue
                .iter()
                .any(|&queued| arena.get(queued).dependency == candidate)
            {
                continue;
            }
            queue.push_back(arena.push(candidate, Some(current)));
        }
    }

    Ok(result)
}

/// Pop queued nodes until one whose coordinate isn't resolved yet.
fn next_unresolved(
    queue: &mut VecDeque<NodeId>,
    arena: &Arena,
    result: &DependencySet,
) -> Option<(NodeId, Dependency)> {
    while let Some(id) = queue.pop_front() {
        let dependency = arena.get(id).dependency.to_dependency();
        if !result.contains(&dependency) {
            return Some((id, dependency));
        }
    }
    None
}
