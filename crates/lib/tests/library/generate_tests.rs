//! End-to-end generation against a real directory tree.

use std::path::{Path, PathBuf};

use modgraph_lib::config::{GeneratorConfig, TestLogLayout};
use modgraph_lib::graph::GraphError;
use modgraph_lib::module::ModuleError;

use super::common::{generate, source_tree};

fn paths(names: &[&str]) -> Vec<PathBuf> {
  names.iter().map(PathBuf::from).collect()
}

mod tested_binary {
  use super::*;

  const BLUEPRINT: &str = r#"{ "modules": [{
    "name": "server",
    "type": "tested_binary",
    "dir": "cmd/server",
    "pkg": "./",
    "test_pkg": "./...",
    "srcs": ["**/*.go"],
    "srcs_exclude": ["testdata/**"],
    "vendor_first": true
  }] }"#;

  #[test]
  fn recursive_glob_with_excludes() {
    let root = source_tree(&[
      "cmd/server/main.go",
      "cmd/server/main_test.go",
      "cmd/server/api/handler.go",
      "cmd/server/api/handler_test.go",
      "cmd/server/testdata/fixture.go",
      "cmd/server/go.mod",
    ]);
    let report = generate(&root, &GeneratorConfig::default(), BLUEPRINT);
    assert!(report.is_success(), "failures: {:?}", report.failures);

    let actions = report.graph.actions();
    assert_eq!(actions.len(), 3);
    assert_eq!(actions[0].rule().name(), "vendor");

    let compile = report.graph.producer(Path::new("out/bin/server")).unwrap();
    assert_eq!(
      compile.implicit_inputs(),
      paths(&["cmd/server/api/handler.go", "cmd/server/main.go", "cmd/server/vendor"]).as_slice()
    );

    let test = report.graph.producer(Path::new("out/out.txt")).unwrap();
    assert_eq!(test.implicit_inputs().len(), 5);
    assert!(test.implicit_inputs().contains(&PathBuf::from("cmd/server/api/handler_test.go")));
  }

  #[test]
  fn glob_dirs_cover_every_walked_directory() {
    let root = source_tree(&["cmd/server/main.go", "cmd/server/api/handler.go", "cmd/server/go.mod"]);
    let report = generate(&root, &GeneratorConfig::default(), BLUEPRINT);

    let dirs = report.graph.glob_dirs();
    assert!(dirs.contains(Path::new("cmd/server")));
    assert!(dirs.contains(Path::new("cmd/server/api")));
  }

  #[test]
  fn missing_module_directory_is_an_empty_match() {
    let root = source_tree(&["other/main.go"]);
    let config = GeneratorConfig::default().with_test_log(TestLogLayout::PerModule);
    let report = generate(&root, &config, BLUEPRINT);

    assert!(report.is_success());
    let compile = report.graph.producer(Path::new("out/bin/server")).unwrap();
    assert_eq!(compile.implicit_inputs(), paths(&["cmd/server/vendor"]).as_slice());
  }

  #[test]
  fn escaping_pattern_is_reported_by_name() {
    let root = source_tree(&["main.go"]);
    let blueprint = r#"{ "modules": [{
      "name": "server", "type": "tested_binary",
      "pkg": "./", "test_pkg": "./", "srcs": ["../*.go", "main.go"]
    }] }"#;
    let report = generate(&root, &GeneratorConfig::default(), blueprint);

    assert_eq!(report.failures.len(), 1);
    let GraphError::Module(ModuleError::Invalid { errors, .. }) = &report.failures[0].1 else {
      panic!("unexpected failure: {:?}", report.failures[0].1);
    };
    let message = errors.to_string();
    assert!(message.contains("srcs: cannot resolve files that match pattern ../*.go"), "{message}");
    assert!(report.graph.is_empty());
  }
}

mod containment {
  use super::*;

  #[test]
  fn module_dir_outside_the_root_is_rejected() {
    let temp = source_tree(&["outside/leak.go", "root/main.go"]);
    let root = tempfile::TempDir::new_in(temp.path().join("root")).unwrap();
    let blueprint = r#"{ "modules": [{
      "name": "server", "type": "tested_binary", "dir": "../..",
      "pkg": "./", "test_pkg": "./", "srcs": ["outside/*.go"]
    }] }"#;
    let report = generate(&root, &GeneratorConfig::default(), blueprint);

    assert_eq!(report.failures.len(), 1);
    let GraphError::Module(ModuleError::Invalid { errors, .. }) = &report.failures[0].1 else {
      panic!("unexpected failure: {:?}", report.failures[0].1);
    };
    assert_eq!(errors.iter().next().unwrap().property, "dir");
    assert!(report.graph.is_empty());
  }

  #[test]
  fn bundle_path_outside_the_output_directory_is_rejected() {
    let root = source_tree(&["index.js"]);
    for path in ["/tmp/evil.js", "../../escaped.js", ""] {
      let blueprint = serde_json::json!({
        "modules": [{ "name": "app", "type": "js_bundle", "srcs": ["index.js"], "path": path }]
      });
      let report = generate(&root, &GeneratorConfig::default(), &blueprint.to_string());
      assert_eq!(report.failures.len(), 1, "path {path:?}");
      assert!(report.graph.is_empty());
    }
  }
}

mod js_bundle {
  use super::*;

  #[test]
  fn entries_follow_declaration_order() {
    let root = source_tree(&["web/main.js", "web/vendor/a.js", "web/vendor/b.js"]);
    let blueprint = r#"{ "modules": [{
      "name": "app", "type": "js_bundle", "dir": "web",
      "srcs": ["main.js", "vendor/*.js"], "obfuscate": false, "path": "js/app.js"
    }] }"#;
    let report = generate(&root, &GeneratorConfig::default(), blueprint);
    assert!(report.is_success());

    let bundle = report.graph.producer(Path::new("out/js/app.js")).unwrap();
    assert_eq!(bundle.arg("entry"), Some("main.js,vendor/a.js,vendor/b.js"));
    assert_eq!(bundle.arg("shouldObfuscate"), Some("false"));
    assert_eq!(bundle.arg("workDir"), Some("web"));
  }
}
