//! Implementation of the `modgraph generate` command.
//!
//! Loads a blueprint, generates every module against the source root and
//! writes the resulting ninja manifest. Nothing is written if any module
//! fails.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use modgraph_lib::config::{GeneratorConfig, TestLogLayout};
use modgraph_lib::graph::ninja::{self, NinjaOptions, Regenerate};
use modgraph_lib::graph::{GenerationReport, GraphError, generate_graph};
use modgraph_lib::module::{Blueprint, Generator, ModuleError};
use modgraph_lib::pattern::FsGlobber;
use modgraph_lib::rule::RuleSet;

use crate::output::{OutputFormat, print_error, print_info, print_json, print_stat, print_success, print_warning};

pub struct GenerateArgs {
  pub blueprint: PathBuf,
  pub root: Option<PathBuf>,
  pub output_dir: PathBuf,
  pub ninja: PathBuf,
  pub per_module_test_logs: bool,
  pub test_suffix: String,
  pub regenerate: bool,
  pub format: OutputFormat,
}

impl GenerateArgs {
  fn config(&self) -> GeneratorConfig {
    let layout = if self.per_module_test_logs {
      TestLogLayout::PerModule
    } else {
      TestLogLayout::Shared
    };
    GeneratorConfig::default()
      .with_output_dir(&self.output_dir)
      .with_test_log(layout)
      .with_test_suffix(&self.test_suffix)
  }

  fn source_root(&self) -> PathBuf {
    match &self.root {
      Some(root) => root.clone(),
      None => match self.blueprint.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
      },
    }
  }
}

pub fn cmd_generate(args: &GenerateArgs) -> Result<()> {
  let blueprint = Blueprint::load(&args.blueprint)
    .with_context(|| format!("Failed to load blueprint: {}", args.blueprint.display()))?;
  if blueprint.modules.is_empty() {
    print_warning(&format!("{} declares no modules", args.blueprint.display()));
  }

  let root = args.source_root();
  debug!(root = %root.display(), modules = blueprint.modules.len(), "generating");

  let config = args.config();
  let rules = RuleSet::standard().context("Failed to register rules")?;
  let globber = FsGlobber::new(&root);
  let generator = Generator::new(&config, &rules, &globber);

  let report = generate_graph(&blueprint, &generator);
  if !report.is_success() {
    report_failures(&report);
    bail!("{} of {} module(s) failed", report.failures.len(), blueprint.modules.len());
  }

  if args.format.is_json() {
    return print_json(&report.graph);
  }

  let options = NinjaOptions {
    regenerate: args.regenerate.then(|| regenerate_rule(args, &root)).transpose()?,
  };
  let text = ninja::render(&report.graph, &options).context("Failed to render ninja manifest")?;

  let manifest = root.join(&args.ninja);
  let unchanged = fs::read_to_string(&manifest).is_ok_and(|existing| existing == text);
  if unchanged {
    print_info(&format!("{} is up to date", manifest.display()));
  } else {
    if let Some(parent) = manifest.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(&manifest, &text).with_context(|| format!("Failed to write manifest: {}", manifest.display()))?;
    print_success(&format!("Wrote {}", manifest.display()));
  }
  print_stat("Modules", &blueprint.modules.len().to_string());
  print_stat("Actions", &report.graph.len().to_string());

  Ok(())
}

fn report_failures(report: &GenerationReport) {
  for (module, error) in &report.failures {
    match error {
      GraphError::Module(ModuleError::Invalid { errors, .. }) => {
        print_error(&format!("{module}: invalid properties"));
        for e in errors {
          eprintln!("    {e}");
        }
      }
      other => print_error(&format!("{module}: {other}")),
    }
  }
}

/// Rule that reruns this command from the source root.
fn regenerate_rule(args: &GenerateArgs, root: &Path) -> Result<Regenerate> {
  let exe = std::env::current_exe().context("Failed to locate the modgraph executable")?;
  let root_abs = fs::canonicalize(root).with_context(|| format!("Failed to resolve root: {}", root.display()))?;
  let blueprint_abs = fs::canonicalize(&args.blueprint)
    .with_context(|| format!("Failed to resolve blueprint: {}", args.blueprint.display()))?;
  let blueprint = blueprint_abs
    .strip_prefix(&root_abs)
    .map(Path::to_path_buf)
    .unwrap_or_else(|_| blueprint_abs.clone());

  let mut argv = vec![
    utf8(&exe)?,
    "generate",
    utf8(&blueprint)?,
    "--root",
    ".",
    "--output-dir",
    utf8(&args.output_dir)?,
    "--ninja",
    utf8(&args.ninja)?,
    "--test-suffix",
    args.test_suffix.as_str(),
  ];
  if args.per_module_test_logs {
    argv.push("--per-module-test-logs");
  }
  let command = argv.into_iter().map(quote).collect::<Result<Vec<_>>>()?.join(" ");

  Ok(Regenerate {
    command,
    manifest: args.ninja.clone(),
    sources: vec![blueprint],
  })
}

fn utf8(path: &Path) -> Result<&str> {
  path
    .to_str()
    .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}

/// Quote one argument for the `/bin/sh` line ninja runs.
fn quote(arg: &str) -> Result<String> {
  if arg.contains(['\n', '\r']) {
    bail!("Cannot put {arg:?} on the regenerate command line: it contains a newline");
  }
  shlex::try_quote(arg)
    .map(|quoted| quoted.into_owned())
    .with_context(|| format!("Cannot quote {arg:?} for the regenerate command"))
}
