//! Rule templates and the registry that owns them.
//!
//! A rule is a named command template. Rules are registered once into a
//! [`RuleSet`] at startup, and the set is passed by reference into every
//! generator call. Actions hold an [`Arc`] to the template they use, so the
//! template itself is never copied or mutated after registration.
//!
//! # Submodules
//!
//! - [`template`] - `$param` parsing and substitution

pub mod template;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use template::{Segment, TemplateError};

/// The kinds of step a module can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
  /// Fetch a module's dependencies into its vendor directory.
  Vendor,
  /// Compile a package into a binary.
  Compile,
  /// Run a package's tests and capture the log.
  Test,
  /// Bundle scripts into a single file.
  Bundle,
}

impl RuleKind {
  pub const ALL: [RuleKind; 4] = [RuleKind::Vendor, RuleKind::Compile, RuleKind::Test, RuleKind::Bundle];

  pub fn as_str(self) -> &'static str {
    match self {
      RuleKind::Vendor => "vendor",
      RuleKind::Compile => "compile",
      RuleKind::Test => "test",
      RuleKind::Bundle => "bundle",
    }
  }

  /// Parameters a template for this kind must reference.
  pub fn params(self) -> &'static [&'static str] {
    match self {
      RuleKind::Vendor => &["workDir", "name"],
      RuleKind::Compile => &["workDir", "outputPath", "pkg"],
      RuleKind::Test => &["workDir", "outPath", "testPkg"],
      RuleKind::Bundle => &["workDir", "entry", "shouldObfuscate", "name"],
    }
  }
}

impl fmt::Display for RuleKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Errors raised while building a [`RuleSet`] or looking rules up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
  #[error("rule {rule}: {source}")]
  Template { rule: String, source: TemplateError },

  #[error("rule {rule} references {found:?}, expected {expected:?}")]
  ParamMismatch {
    rule: RuleKind,
    expected: Vec<String>,
    found: Vec<String>,
  },

  #[error("rule {0} is already registered")]
  Duplicate(RuleKind),

  #[error("rule {0} is not registered")]
  NotRegistered(RuleKind),
}

/// A named command template with `$param` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplate {
  name: String,
  command: String,
  description: String,
  command_segments: Vec<Segment>,
  description_segments: Vec<Segment>,
  params: BTreeSet<String>,
}

impl RuleTemplate {
  /// Parse a template. Parameters are collected from both strings.
  pub fn new(name: &str, command: &str, description: &str) -> Result<Self, RuleError> {
    let wrap = |source| RuleError::Template {
      rule: name.to_string(),
      source,
    };
    let command_segments = template::parse(command).map_err(wrap)?;
    let description_segments = template::parse(description).map_err(wrap)?;

    let mut params = template::params(&command_segments);
    params.extend(template::params(&description_segments));

    Ok(Self {
      name: name.to_string(),
      command: command.to_string(),
      description: description.to_string(),
      command_segments,
      description_segments,
      params,
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// The raw command, in ninja syntax.
  pub fn command(&self) -> &str {
    &self.command
  }

  /// The raw description, in ninja syntax.
  pub fn description(&self) -> &str {
    &self.description
  }

  pub fn params(&self) -> &BTreeSet<String> {
    &self.params
  }

  /// The command line the executor would run for `args`.
  pub fn command_line(&self, args: &BTreeMap<String, String>) -> Result<String, TemplateError> {
    template::expand(&self.command_segments, args)
  }

  pub fn describe(&self, args: &BTreeMap<String, String>) -> Result<String, TemplateError> {
    template::expand(&self.description_segments, args)
  }
}

/// The process-wide, read-only table of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
  rules: BTreeMap<RuleKind, Arc<RuleTemplate>>,
}

impl RuleSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Rules for Go binaries and webpack bundles.
  pub fn standard() -> Result<Self, RuleError> {
    let mut rules = Self::new();
    rules.register(
      RuleKind::Vendor,
      RuleTemplate::new("vendor", "cd $workDir && go mod vendor", "vendor dependencies of $name")?,
    )?;
    rules.register(
      RuleKind::Compile,
      RuleTemplate::new(
        "compile",
        "cd $workDir && go build -o $outputPath $pkg",
        "build go command $pkg",
      )?,
    )?;
    rules.register(
      RuleKind::Test,
      RuleTemplate::new(
        "test",
        "cd ${workDir} && go test -v ${testPkg} > ${outPath}",
        "test ${testPkg}",
      )?,
    )?;
    rules.register(
      RuleKind::Bundle,
      RuleTemplate::new(
        "bundle",
        "cd $workDir && npx webpack --env ENTRY=${entry} --env SHOULD_OBFUSCATE=${shouldObfuscate} \
         --env FILENAME=${name} --config=webpack.config.js",
        "build js bundle $name",
      )?,
    )?;
    Ok(rules)
  }

  /// Register a template for `kind`.
  ///
  /// # Errors
  ///
  /// Fails if `kind` already has a template, or if the template's parameters
  /// differ from [`RuleKind::params`].
  pub fn register(&mut self, kind: RuleKind, template: RuleTemplate) -> Result<(), RuleError> {
    if self.rules.contains_key(&kind) {
      return Err(RuleError::Duplicate(kind));
    }

    let expected: BTreeSet<String> = kind.params().iter().map(|p| p.to_string()).collect();
    if template.params != expected {
      return Err(RuleError::ParamMismatch {
        rule: kind,
        expected: expected.into_iter().collect(),
        found: template.params.iter().cloned().collect(),
      });
    }

    self.rules.insert(kind, Arc::new(template));
    Ok(())
  }

  pub fn get(&self, kind: RuleKind) -> Result<&Arc<RuleTemplate>, RuleError> {
    self.rules.get(&kind).ok_or(RuleError::NotRegistered(kind))
  }

  pub fn iter(&self) -> impl Iterator<Item = (RuleKind, &Arc<RuleTemplate>)> {
    self.rules.iter().map(|(k, v)| (*k, v))
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }
}
