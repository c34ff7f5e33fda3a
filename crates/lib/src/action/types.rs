use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::rule::template::TemplateError;
use crate::rule::{RuleError, RuleSet, RuleTemplate};

use super::args::RuleArgs;

/// Contract violations while constructing an action.
///
/// Rules and their argument sets are defined together by the generators, so
/// these indicate a bug in a generator rather than bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
  #[error("action for rule {rule} declares no outputs")]
  NoOutputs { rule: String },

  #[error("action for rule {rule} is missing argument {param}")]
  MissingArgument { rule: String, param: String },

  #[error(transparent)]
  Rule(#[from] RuleError),

  #[error("action for rule {rule}: {source}")]
  Template { rule: String, source: TemplateError },
}

fn serialize_rule<S: Serializer>(rule: &Arc<RuleTemplate>, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(rule.name())
}

/// A single node of the emitted build graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildAction {
  #[serde(serialize_with = "serialize_rule")]
  rule: Arc<RuleTemplate>,
  outputs: Vec<PathBuf>,
  explicit_inputs: Vec<PathBuf>,
  implicit_inputs: Vec<PathBuf>,
  args: BTreeMap<String, String>,
  optional: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  description: Option<String>,
}

impl BuildAction {
  pub fn rule(&self) -> &Arc<RuleTemplate> {
    &self.rule
  }

  pub fn outputs(&self) -> &[PathBuf] {
    &self.outputs
  }

  pub fn explicit_inputs(&self) -> &[PathBuf] {
    &self.explicit_inputs
  }

  pub fn implicit_inputs(&self) -> &[PathBuf] {
    &self.implicit_inputs
  }

  /// Explicit inputs followed by implicit inputs.
  pub fn inputs(&self) -> impl Iterator<Item = &PathBuf> {
    self.explicit_inputs.iter().chain(&self.implicit_inputs)
  }

  pub fn args(&self) -> &BTreeMap<String, String> {
    &self.args
  }

  pub fn arg(&self, name: &str) -> Option<&str> {
    self.args.get(name).map(String::as_str)
  }

  /// Whether a failure to produce this action's outputs may be tolerated.
  pub fn is_optional(&self) -> bool {
    self.optional
  }

  pub fn description(&self) -> Option<&str> {
    self.description.as_deref()
  }

  /// The fully substituted command line.
  pub fn command_line(&self) -> Result<String, ActionError> {
    self.rule.command_line(&self.args).map_err(|source| ActionError::Template {
      rule: self.rule.name().to_string(),
      source,
    })
  }
}

/// Builder for [`BuildAction`].
///
/// # Example
///
/// ```
/// use modgraph_lib::action::{ActionBuilder, CompileArgs};
/// use modgraph_lib::rule::RuleSet;
///
/// let rules = RuleSet::standard().unwrap();
/// let action = ActionBuilder::for_rule(
///     &rules,
///     CompileArgs {
///         work_dir: "cmd/server".into(),
///         output_path: "out/bin/server".into(),
///         pkg: "./".into(),
///     },
/// )
/// .unwrap()
/// .output("out/bin/server")
/// .implicit("cmd/server/main.go")
/// .build()
/// .unwrap();
///
/// assert_eq!(action.rule().name(), "compile");
/// ```
#[derive(Debug, Clone)]
pub struct ActionBuilder {
  rule: Arc<RuleTemplate>,
  args: BTreeMap<String, String>,
  outputs: Vec<PathBuf>,
  explicit_inputs: Vec<PathBuf>,
  implicit_inputs: Vec<PathBuf>,
  optional: bool,
  description: Option<String>,
}

impl ActionBuilder {
  /// Start an action from an untyped argument map.
  pub fn new(rule: Arc<RuleTemplate>, args: BTreeMap<String, String>) -> Self {
    Self {
      rule,
      args,
      outputs: Vec::new(),
      explicit_inputs: Vec::new(),
      implicit_inputs: Vec::new(),
      optional: false,
      description: None,
    }
  }

  /// Start an action for the rule matching a typed argument set.
  pub fn for_rule<A: RuleArgs>(rules: &RuleSet, args: A) -> Result<Self, ActionError> {
    let rule = rules.get(A::RULE)?.clone();
    Ok(Self::new(rule, args.into_args()))
  }

  pub fn output(mut self, path: impl AsRef<Path>) -> Self {
    self.outputs.push(path.as_ref().to_path_buf());
    self
  }

  pub fn explicit(mut self, path: impl AsRef<Path>) -> Self {
    self.explicit_inputs.push(path.as_ref().to_path_buf());
    self
  }

  pub fn implicit(mut self, path: impl AsRef<Path>) -> Self {
    self.implicit_inputs.push(path.as_ref().to_path_buf());
    self
  }

  pub fn implicits<I, P>(mut self, paths: I) -> Self
  where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
  {
    self
      .implicit_inputs
      .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
    self
  }

  pub fn optional(mut self, optional: bool) -> Self {
    self.optional = optional;
    self
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  /// Validate and produce the action.
  ///
  /// # Errors
  ///
  /// Fails when no output was declared or when any parameter referenced by
  /// the rule has no argument.
  pub fn build(self) -> Result<BuildAction, ActionError> {
    if self.outputs.is_empty() {
      return Err(ActionError::NoOutputs {
        rule: self.rule.name().to_string(),
      });
    }

    if let Some(param) = self.rule.params().iter().find(|p| !self.args.contains_key(*p)) {
      return Err(ActionError::MissingArgument {
        rule: self.rule.name().to_string(),
        param: param.clone(),
      });
    }

    Ok(BuildAction {
      rule: self.rule,
      outputs: self.outputs,
      explicit_inputs: self.explicit_inputs,
      implicit_inputs: self.implicit_inputs,
      args: self.args,
      optional: self.optional,
      description: self.description,
    })
  }
}
