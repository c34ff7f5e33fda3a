//! Manifest output for generated graphs.

use std::path::PathBuf;

use modgraph_lib::config::{GeneratorConfig, TestLogLayout};
use modgraph_lib::graph::ninja::{NinjaOptions, Regenerate, render};

use super::common::{generate, source_tree};

const BLUEPRINT: &str = r#"{ "modules": [
  { "name": "api", "type": "tested_binary", "dir": "api", "pkg": "./", "test_pkg": "./", "srcs": ["*.go"] },
  { "name": "worker", "type": "tested_binary", "dir": "worker", "pkg": "./", "test_pkg": "./",
    "srcs": ["*.go"], "vendor_first": true },
  { "name": "ui", "type": "js_bundle", "dir": "ui", "srcs": ["*.js"], "obfuscate": true, "path": "ui.js" }
] }"#;

fn tree() -> tempfile::TempDir {
  source_tree(&[
    "api/main.go",
    "api/main_test.go",
    "worker/main.go",
    "worker/go.mod",
    "ui/index.js",
  ])
}

#[test]
fn manifest_is_deterministic() {
  let root = tree();
  let config = GeneratorConfig::default().with_test_log(TestLogLayout::PerModule);

  let first = render(&generate(&root, &config, BLUEPRINT).graph, &NinjaOptions::default()).unwrap();
  let second = render(&generate(&root, &config, BLUEPRINT).graph, &NinjaOptions::default()).unwrap();
  assert_eq!(first, second);
}

#[test]
fn optional_vendor_is_not_a_default_target() {
  let root = tree();
  let config = GeneratorConfig::default().with_test_log(TestLogLayout::PerModule);
  let text = render(&generate(&root, &config, BLUEPRINT).graph, &NinjaOptions::default()).unwrap();

  let default = text.lines().find(|l| l.starts_with("default ")).unwrap();
  assert!(!default.contains("worker/vendor"));
  assert!(default.contains("out/bin/worker"));
  assert!(default.contains("out/ui.js"));
  assert_eq!(text.matches("rule vendor\n").count(), 1);
  assert_eq!(text.matches("rule bundle\n").count(), 1);
}

#[test]
fn regenerate_tracks_source_directories() {
  let root = tree();
  let config = GeneratorConfig::default().with_test_log(TestLogLayout::PerModule);
  let options = NinjaOptions {
    regenerate: Some(Regenerate {
      command: "modgraph generate modules.json".into(),
      manifest: PathBuf::from("build.ninja"),
      sources: vec![PathBuf::from("modules.json")],
    }),
  };
  let text = render(&generate(&root, &config, BLUEPRINT).graph, &options).unwrap();

  let regen = text.lines().find(|l| l.starts_with("build build.ninja:")).unwrap();
  assert_eq!(regen, "build build.ninja: regenerate | modules.json api ui worker");
}
