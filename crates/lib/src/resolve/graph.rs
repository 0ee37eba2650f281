//! Explicit dependency graph over resolved projects.
//!
//! Edges point from a dependency to the project that depends on it, so a
//! topological order lists dependencies before their dependents.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::{ResolveError, ResolvedProject, Resolver};

/// A project in the graph, identified by its canonical location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectNode {
  pub name: String,
  pub location: PathBuf,
}

#[derive(Debug, Default)]
pub struct ProjectGraph {
  graph: DiGraph<ProjectNode, ()>,
  nodes: HashMap<PathBuf, NodeIndex>,
}

impl ProjectGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Walk `dependencies` from `root`, resolving every project reached.
  pub fn discover(resolver: &mut Resolver, root: &ResolvedProject) -> Result<Self, ResolveError> {
    let mut graph = Self::new();
    graph.add_project(root.name(), root.location());

    let mut queue = VecDeque::from([root.clone()]);
    while let Some(project) = queue.pop_front() {
      for path in project.dependency_paths() {
        let dependency = resolver.resolve(&path)?;
        if !graph.contains(dependency.location()) {
          graph.add_project(dependency.name(), dependency.location());
          queue.push_back(dependency.clone());
        }
        graph.add_dependency(project.location(), dependency.location());
      }
    }

    Ok(graph)
  }

  /// Add a project node. Adding a known location returns the existing node.
  pub fn add_project(&mut self, name: impl Into<String>, location: impl Into<PathBuf>) -> NodeIndex {
    let location = location.into();
    if let Some(&idx) = self.nodes.get(&location) {
      return idx;
    }
    let idx = self.graph.add_node(ProjectNode {
      name: name.into(),
      location: location.clone(),
    });
    self.nodes.insert(location, idx);
    idx
  }

  /// Record that `dependent` depends on `dependency`. Unknown locations are ignored.
  pub fn add_dependency(&mut self, dependent: &Path, dependency: &Path) {
    if let (Some(&from), Some(&to)) = (self.nodes.get(dependency), self.nodes.get(dependent)) {
      self.graph.update_edge(from, to, ());
    }
  }

  pub fn contains(&self, location: &Path) -> bool {
    self.nodes.contains_key(location)
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  /// Direct dependencies of the project at `location`.
  pub fn dependencies_of(&self, location: &Path) -> Vec<&ProjectNode> {
    let Some(&idx) = self.nodes.get(location) else {
      return Vec::new();
    };
    self
      .graph
      .neighbors_directed(idx, Direction::Incoming)
      .map(|dep| &self.graph[dep])
      .collect()
  }

  /// Projects ordered so every dependency precedes its dependents.
  pub fn build_order(&self) -> Result<Vec<&ProjectNode>, ResolveError> {
    let sorted = toposort(&self.graph, None).map_err(|cycle| ResolveError::Cycle {
      chain: self.cycle_through(cycle.node_id()),
    })?;
    Ok(sorted.into_iter().map(|idx| &self.graph[idx]).collect())
  }

  /// Fail with the offending chain if the graph has a cycle.
  pub fn verify(&self) -> Result<(), ResolveError> {
    self.build_order().map(|_| ())
  }

  /// A dependency chain starting and ending at `start`.
  fn cycle_through(&self, start: NodeIndex) -> Vec<PathBuf> {
    let mut path = vec![start];
    let mut visited = HashSet::new();
    if self.find_path_back(start, start, &mut path, &mut visited) {
      path.iter().map(|&idx| self.graph[idx].location.clone()).collect()
    } else {
      vec![self.graph[start].location.clone()]
    }
  }

  fn find_path_back(
    &self,
    current: NodeIndex,
    start: NodeIndex,
    path: &mut Vec<NodeIndex>,
    visited: &mut HashSet<NodeIndex>,
  ) -> bool {
    for next in self.graph.neighbors_directed(current, Direction::Incoming) {
      if next == start {
        path.push(start);
        return true;
      }
      if visited.insert(next) {
        path.push(next);
        if self.find_path_back(next, start, path, visited) {
          return true;
        }
        path.pop();
      }
    }
    false
  }
}
