//! Shared helpers for library integration tests.

use std::fs;

use modgraph_lib::config::GeneratorConfig;
use modgraph_lib::graph::{GenerationReport, generate_graph};
use modgraph_lib::module::{Blueprint, Generator};
use modgraph_lib::pattern::FsGlobber;
use modgraph_lib::rule::RuleSet;
use tempfile::TempDir;

/// Create a temporary source tree of empty files.
pub fn source_tree(files: &[&str]) -> TempDir {
  let temp = TempDir::new().unwrap();
  for file in files {
    let path = temp.path().join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "").unwrap();
  }
  temp
}

/// Generate `blueprint` against the tree in `root`.
pub fn generate(root: &TempDir, config: &GeneratorConfig, blueprint: &str) -> GenerationReport {
  let blueprint = Blueprint::from_json(blueprint).unwrap();
  let rules = RuleSet::standard().unwrap();
  let globber = FsGlobber::new(root.path());
  let generator = Generator::new(config, &rules, &globber);
  generate_graph(&blueprint, &generator)
}
