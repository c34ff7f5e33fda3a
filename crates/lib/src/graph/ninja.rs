//! Ninja manifest output.
//!
//! Rules are written once each, sorted by name, followed by one `build`
//! statement per action in dependency order. Action arguments become
//! build-level variables, so the shared rule command picks them up. A
//! per-action description overrides the rule's.

use std::fmt::Write;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::action::BuildAction;
use crate::rule::RuleTemplate;

use super::{BuildGraph, GraphError};

const HEADER: &str = "# Generated by modgraph. Do not edit.\n";

/// Rule that reruns the generator when its inputs change.
#[derive(Debug, Clone)]
pub struct Regenerate {
  /// Command line that rewrites the manifest.
  pub command: String,
  /// Path of the manifest itself.
  pub manifest: PathBuf,
  /// Blueprint files read by the generator.
  pub sources: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct NinjaOptions {
  pub regenerate: Option<Regenerate>,
}

/// Render `graph` as a ninja manifest.
pub fn render(graph: &BuildGraph, options: &NinjaOptions) -> Result<String, GraphError> {
  let ordered = graph.ordered()?;
  let mut out = String::from(HEADER);

  let mut rules: Vec<&Arc<RuleTemplate>> = Vec::new();
  for &action in &ordered {
    if !rules.iter().any(|r| r.name() == action.rule().name()) {
      rules.push(action.rule());
    }
  }
  rules.sort_by(|a, b| a.name().cmp(b.name()));

  for rule in rules {
    writeln!(out)?;
    writeln!(out, "rule {}", rule.name())?;
    writeln!(out, "  command = {}", rule.command())?;
    writeln!(out, "  description = {}", rule.description())?;
  }

  for action in &ordered {
    writeln!(out)?;
    write_build(&mut out, action)?;
  }

  let defaults: Vec<String> = ordered
    .iter()
    .copied()
    .filter(|a| !a.is_optional())
    .flat_map(|a| a.outputs())
    .map(|p| escape_path(p))
    .collect::<Result<_, _>>()?;
  if !defaults.is_empty() {
    writeln!(out)?;
    writeln!(out, "default {}", defaults.join(" "))?;
  }

  if let Some(regen) = &options.regenerate {
    writeln!(out)?;
    writeln!(out, "rule regenerate")?;
    writeln!(out, "  command = {}", escape_value(&regen.command))?;
    writeln!(out, "  description = regenerating $out")?;
    writeln!(out, "  generator = 1")?;
    writeln!(out)?;
    let deps: Vec<String> = regen
      .sources
      .iter()
      .chain(graph.glob_dirs())
      .map(|p| escape_path(p))
      .collect::<Result<_, _>>()?;
    write!(out, "build {}: regenerate", escape_path(&regen.manifest)?)?;
    if !deps.is_empty() {
      write!(out, " | {}", deps.join(" "))?;
    }
    writeln!(out)?;
  }

  Ok(out)
}

/// Render `graph` and write it to `out`.
pub fn write_manifest(graph: &BuildGraph, options: &NinjaOptions, out: &mut impl io::Write) -> Result<(), GraphError> {
  let text = render(graph, options)?;
  out.write_all(text.as_bytes())?;
  Ok(())
}

fn write_build(out: &mut String, action: &BuildAction) -> Result<(), GraphError> {
  let outputs: Vec<String> = action
    .outputs()
    .iter()
    .map(|p| escape_path(p))
    .collect::<Result<_, _>>()?;
  write!(out, "build {}: {}", outputs.join(" "), action.rule().name())?;
  for input in action.explicit_inputs() {
    write!(out, " {}", escape_path(input)?)?;
  }
  if !action.implicit_inputs().is_empty() {
    write!(out, " |")?;
    for input in action.implicit_inputs() {
      write!(out, " {}", escape_path(input)?)?;
    }
  }
  writeln!(out)?;

  if let Some(description) = action.description() {
    writeln!(out, "  description = {}", escape_value(description))?;
  }
  for (name, value) in action.args() {
    writeln!(out, "  {name} = {}", escape_value(value))?;
  }
  Ok(())
}

/// Escape a path for use in a `build` line.
///
/// # Errors
///
/// Returns [`GraphError::UnrepresentablePath`] for a path containing a
/// newline, which ninja cannot express.
pub fn escape_path(path: &Path) -> Result<String, GraphError> {
  let text = path.to_string_lossy();
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '$' | ' ' | ':' => {
        escaped.push('$');
        escaped.push(c);
      }
      '\n' | '\r' => return Err(GraphError::UnrepresentablePath(path.to_path_buf())),
      _ => escaped.push(c),
    }
  }
  Ok(escaped)
}

/// Escape a variable value. Newlines cannot be represented and become spaces.
pub fn escape_value(value: &str) -> String {
  value.replace('$', "$$").replace('\n', " ")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{GeneratorConfig, TestLogLayout};
  use crate::module::{Generator, JsBundleProps, ModuleDescriptor, TestedBinaryProps};
  use crate::rule::RuleSet;
  use crate::util::testutil::StaticGlobber;

  fn graph(modules: Vec<ModuleDescriptor>, files: &[&str]) -> BuildGraph {
    let config = GeneratorConfig::default().with_test_log(TestLogLayout::PerModule);
    let rules = RuleSet::standard().unwrap();
    let globber = StaticGlobber::new(files);
    let generator = Generator::new(&config, &rules, &globber);

    let mut graph = BuildGraph::new();
    for module in &modules {
      let actions = generator.generate(module).unwrap();
      graph.add_module(&module.name, actions).unwrap();
    }
    graph
  }

  fn server(vendor_first: bool) -> ModuleDescriptor {
    ModuleDescriptor::tested_binary(
      "server",
      TestedBinaryProps {
        pkg: "./".into(),
        test_pkg: "./...".into(),
        srcs: vec!["*.go".into()],
        vendor_first,
        ..Default::default()
      },
    )
    .in_dir("server")
  }

  #[test]
  fn writes_each_used_rule_once() {
    let g = graph(vec![server(false)], &["server/main.go"]);
    let text = render(&g, &NinjaOptions::default()).unwrap();

    assert!(text.starts_with(HEADER));
    assert_eq!(text.matches("rule compile\n").count(), 1);
    assert_eq!(text.matches("rule test\n").count(), 1);
    assert!(!text.contains("rule vendor"));
    assert!(!text.contains("rule bundle"));
    assert!(text.contains("  command = cd $workDir && go build -o $outputPath $pkg\n"));
  }

  #[test]
  fn build_statement_lists_inputs_and_variables() {
    let g = graph(vec![server(false)], &["server/main.go", "server/main_test.go"]);
    let text = render(&g, &NinjaOptions::default()).unwrap();

    let expected = "build out/bin/server: compile | server/main.go\n  \
                    description = Build server as Go binary\n  \
                    outputPath = out/bin/server\n  \
                    pkg = ./\n  \
                    workDir = server\n";
    assert!(text.contains(expected), "manifest was:\n{text}");
    assert!(text.contains("build out/server/out.txt: test | server/main.go server/main_test.go\n"));
  }

  #[test]
  fn vendor_is_written_first_and_left_out_of_defaults() {
    let g = graph(vec![server(true)], &["server/main.go"]);
    let text = render(&g, &NinjaOptions::default()).unwrap();

    let vendor = text.find("build server/vendor: vendor server/go.mod").unwrap();
    let compile = text.find("build out/bin/server:").unwrap();
    assert!(vendor < compile);
    assert!(text.contains("\ndefault out/server/out.txt out/bin/server\n"));
  }

  #[test]
  fn bundle_arguments_become_variables() {
    let bundle = ModuleDescriptor::js_bundle(
      "app",
      JsBundleProps {
        srcs: vec!["a.js".into(), "b.js".into()],
        obfuscate: true,
        path: "app.js".into(),
      },
    );
    let g = graph(vec![bundle], &["a.js", "b.js"]);
    let text = render(&g, &NinjaOptions::default()).unwrap();

    assert!(text.contains("build out/app.js: bundle | a.js b.js\n"));
    assert!(text.contains("  entry = a.js,b.js\n"));
    assert!(text.contains("  shouldObfuscate = true\n"));
  }

  #[test]
  fn regenerate_rule_depends_on_sources_and_glob_dirs() {
    let g = graph(vec![server(false)], &["server/main.go"]);
    let options = NinjaOptions {
      regenerate: Some(Regenerate {
        command: "modgraph generate modules.json".into(),
        manifest: PathBuf::from("build.ninja"),
        sources: vec![PathBuf::from("modules.json")],
      }),
    };
    let text = render(&g, &options).unwrap();

    assert!(text.contains("rule regenerate\n  command = modgraph generate modules.json\n"));
    assert!(text.contains("  generator = 1\n"));
    assert!(text.ends_with("build build.ninja: regenerate | modules.json server\n"));
  }

  #[test]
  fn empty_graph_has_only_the_header() {
    let text = render(&BuildGraph::new(), &NinjaOptions::default()).unwrap();
    assert_eq!(text, HEADER);
  }

  #[test]
  fn write_manifest_matches_render() {
    let g = graph(vec![server(false)], &["server/main.go"]);
    let mut buf = Vec::new();
    write_manifest(&g, &NinjaOptions::default(), &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), render(&g, &NinjaOptions::default()).unwrap());
  }

  #[test]
  fn newline_in_a_path_is_an_error() {
    assert!(matches!(
      escape_path(Path::new("a\nb.go")),
      Err(GraphError::UnrepresentablePath(ref p)) if p == Path::new("a\nb.go")
    ));

    let rules = RuleSet::standard().unwrap();
    let action = crate::action::ActionBuilder::for_rule(
      &rules,
      crate::action::VendorArgs {
        work_dir: ".".into(),
        name: "x".into(),
      },
    )
    .unwrap()
    .output("vendor")
    .implicit("odd\nname.go")
    .build()
    .unwrap();
    let mut g = BuildGraph::new();
    g.add_module("x", crate::module::ModuleActions { actions: vec![action], glob_deps: vec![] })
      .unwrap();

    assert!(matches!(
      render(&g, &NinjaOptions::default()),
      Err(GraphError::UnrepresentablePath(_))
    ));
  }

  #[test]
  fn escapes_special_characters() {
    assert_eq!(escape_path(Path::new("a b/c:d$e")).unwrap(), "a$ b/c$:d$$e");
    assert_eq!(escape_value("cost $5\nnow"), "cost $$5 now");
  }
}
