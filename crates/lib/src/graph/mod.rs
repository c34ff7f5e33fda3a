//! The combined action graph of a generation run.
//!
//! A [`BuildGraph`] accepts the action sets of individual modules and checks
//! that they fit together: no two actions may produce the same path, and the
//! producer/consumer relation between actions must be acyclic. Modules are
//! added atomically, so a rejected module leaves the graph unchanged.
//!
//! # Submodules
//!
//! - [`ninja`] - serialization to a ninja manifest

pub mod ninja;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::action::BuildAction;
use crate::module::{Blueprint, Generator, ModuleActions, ModuleError};

#[derive(Debug, Error)]
pub enum GraphError {
  #[error(transparent)]
  Module(#[from] ModuleError),

  #[error("output {} is produced by both {first} and {second}", path.display())]
  DuplicateOutput { path: PathBuf, first: String, second: String },

  #[error("module {0} was already added to the graph")]
  DuplicateModule(String),

  #[error("dependency cycle through {}", output.display())]
  Cycle { output: PathBuf },

  #[error("failed to render graph: {0}")]
  Render(#[from] std::fmt::Error),

  #[error("path {} cannot be written to a ninja manifest: it contains a newline", .0.display())]
  UnrepresentablePath(PathBuf),

  #[error("failed to write manifest: {0}")]
  Write(#[from] std::io::Error),
}

/// Actions from every successfully generated module.
#[derive(Debug, Default, Serialize)]
pub struct BuildGraph {
  actions: Vec<BuildAction>,
  /// Directories whose listings the globs of all modules depend on.
  glob_dirs: BTreeSet<PathBuf>,
  #[serde(skip)]
  action_modules: Vec<String>,
  /// Index of the action producing each output.
  #[serde(skip)]
  producers: HashMap<PathBuf, usize>,
}

impl BuildGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add one module's actions.
  ///
  /// # Errors
  ///
  /// Returns [`GraphError::DuplicateModule`] if `module` was already added and
  /// [`GraphError::DuplicateOutput`] if any of its outputs is already claimed,
  /// including by another action of the same module. Nothing is added on error.
  pub fn add_module(&mut self, module: &str, actions: ModuleActions) -> Result<(), GraphError> {
    if self.action_modules.iter().any(|m| m == module) {
      return Err(GraphError::DuplicateModule(module.to_string()));
    }

    let mut claimed: HashSet<&Path> = HashSet::new();
    for output in actions.actions.iter().flat_map(BuildAction::outputs) {
      if let Some(&first) = self.producers.get(output) {
        return Err(GraphError::DuplicateOutput {
          path: output.clone(),
          first: self.action_modules[first].clone(),
          second: module.to_string(),
        });
      }
      if !claimed.insert(output.as_path()) {
        return Err(GraphError::DuplicateOutput {
          path: output.clone(),
          first: module.to_string(),
          second: module.to_string(),
        });
      }
    }

    for action in actions.actions {
      let index = self.actions.len();
      for output in action.outputs() {
        self.producers.insert(output.clone(), index);
      }
      self.action_modules.push(module.to_string());
      self.actions.push(action);
    }
    for dep in actions.glob_deps {
      self.glob_dirs.extend(dep.dirs);
    }
    Ok(())
  }

  /// Actions in insertion order.
  pub fn actions(&self) -> &[BuildAction] {
    &self.actions
  }

  /// Module that contributed the action at `index`.
  pub fn module_of(&self, index: usize) -> Option<&str> {
    self.action_modules.get(index).map(String::as_str)
  }

  pub fn glob_dirs(&self) -> &BTreeSet<PathBuf> {
    &self.glob_dirs
  }

  pub fn len(&self) -> usize {
    self.actions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.actions.is_empty()
  }

  /// Action that produces `path`, if any.
  pub fn producer(&self, path: &Path) -> Option<&BuildAction> {
    self.producers.get(path).map(|&i| &self.actions[i])
  }

  fn dependency_graph(&self) -> DiGraph<usize, ()> {
    let mut graph = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..self.actions.len()).map(|i| graph.add_node(i)).collect();

    for (i, action) in self.actions.iter().enumerate() {
      for input in action.inputs() {
        if let Some(&producer) = self.producers.get(input) {
          graph.update_edge(nodes[producer], nodes[i], ());
        }
      }
    }
    graph
  }

  /// Actions ordered so that every producer precedes its consumers.
  ///
  /// Among actions that are ready at the same time, insertion order is kept.
  pub fn ordered(&self) -> Result<Vec<&BuildAction>, GraphError> {
    let graph = self.dependency_graph();

    if let Err(cycle) = toposort(&graph, None) {
      let index = graph[cycle.node_id()];
      let output = self.actions[index].outputs().first().cloned().unwrap_or_default();
      return Err(GraphError::Cycle { output });
    }

    let mut in_degree: Vec<usize> = graph
      .node_indices()
      .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
      .collect();
    let mut ready: BTreeSet<usize> = (0..in_degree.len()).filter(|&i| in_degree[i] == 0).collect();

    let mut order = Vec::with_capacity(self.actions.len());
    while let Some(i) = ready.pop_first() {
      order.push(&self.actions[i]);
      for next in graph.neighbors_directed(NodeIndex::new(i), Direction::Outgoing) {
        let j = next.index();
        in_degree[j] -= 1;
        if in_degree[j] == 0 {
          ready.insert(j);
        }
      }
    }
    Ok(order)
  }
}

/// Outcome of generating every module of a blueprint.
#[derive(Debug, Default)]
pub struct GenerationReport {
  pub graph: BuildGraph,
  /// Modules that failed, with the reason, in blueprint order.
  pub failures: Vec<(String, GraphError)>,
}

impl GenerationReport {
  pub fn is_success(&self) -> bool {
    self.failures.is_empty()
  }
}

/// Generate every module of `blueprint` into one graph.
///
/// A module that fails generation, or whose actions conflict with modules
/// added before it, is recorded in `failures` and contributes nothing.
pub fn generate_graph(blueprint: &Blueprint, generator: &Generator<'_>) -> GenerationReport {
  let mut report = GenerationReport::default();

  for module in &blueprint.modules {
    let result = generator
      .generate(module)
      .map_err(GraphError::from)
      .and_then(|actions| report.graph.add_module(&module.name, actions));

    if let Err(e) = result {
      warn!(module = %module.name, error = %e, "module excluded from graph");
      report.failures.push((module.name.clone(), e));
    }
  }

  info!(
    modules = blueprint.modules.len(),
    actions = report.graph.len(),
    failed = report.failures.len(),
    "generated build graph"
  );
  report
}
