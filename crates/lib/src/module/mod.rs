//! Module generators.
//!
//! A module generator turns one [`ModuleDescriptor`] into the set of build
//! actions for that module. Generation is all-or-nothing: if any property of
//! the module is invalid, every error is reported and no action is emitted.
//!
//! # Module kinds
//!
//! - [`TestedBinaryProps`] - Go binary with a test run and optional vendoring
//! - [`JsBundleProps`] - webpack bundle of script entry points
//!
//! # Example
//!
//! ```
//! use modgraph_lib::config::GeneratorConfig;
//! use modgraph_lib::module::{Generator, ModuleDescriptor};
//! use modgraph_lib::pattern::FsGlobber;
//! use modgraph_lib::rule::RuleSet;
//!
//! let config = GeneratorConfig::default();
//! let rules = RuleSet::standard().unwrap();
//! let globber = FsGlobber::new(".");
//! let generator = Generator::new(&config, &rules, &globber);
//!
//! let module: ModuleDescriptor = serde_json::from_str(
//!     r#"{ "name": "app", "type": "js_bundle", "srcs": [], "path": "app.js" }"#,
//! ).unwrap();
//! let actions = generator.generate(&module).unwrap();
//! assert_eq!(actions.actions.len(), 1);
//! ```

mod binary;
mod bundle;
mod descriptor;

pub use descriptor::*;

use std::path::{Component, Path};

use thiserror::Error;
use tracing::debug;

use crate::action::{ActionError, BuildAction};
use crate::config::GeneratorConfig;
use crate::consts::PROP_DIR;
use crate::error::{ErrorSet, GenerateError, Validated};
use crate::pattern::{self, Excludes, GlobDependency, Globber, ResolvedFileSet};
use crate::rule::RuleSet;

/// Failure to generate one module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
  /// One or more properties are invalid; nothing was emitted.
  #[error("module {module} has invalid properties:\n{errors}")]
  Invalid { module: String, errors: ErrorSet },

  /// The generator built an inconsistent action.
  #[error("module {module}: {source}")]
  Action { module: String, source: ActionError },
}

impl ModuleError {
  /// Property errors, if this is a validation failure.
  pub fn property_errors(&self) -> Option<&ErrorSet> {
    match self {
      ModuleError::Invalid { errors, .. } => Some(errors),
      ModuleError::Action { .. } => None,
    }
  }
}

/// Everything one module contributes to the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleActions {
  pub actions: Vec<BuildAction>,
  /// Globs whose results the actions were built from.
  pub glob_deps: Vec<GlobDependency>,
}

/// Per-module view handed to a generator.
pub struct ModuleContext<'a> {
  pub name: &'a str,
  /// Module directory, relative to the source root.
  pub dir: &'a Path,
  pub config: &'a GeneratorConfig,
  pub rules: &'a RuleSet,
  pub globber: &'a dyn Globber,
}

impl ModuleContext<'_> {
  /// Working directory argument for commands run in this module.
  pub fn work_dir(&self) -> String {
    if self.dir.as_os_str().is_empty() {
      ".".to_string()
    } else {
      self.dir.to_string_lossy().into_owned()
    }
  }

  /// Resolve one property's patterns under this module's directory.
  pub fn resolve_all(&self, patterns: &[String], excludes: &Excludes, property: &str) -> Validated<Vec<ResolvedFileSet>> {
    pattern::resolve_all(self.globber, self.dir, patterns, excludes, property)
  }

  pub fn invalid(&self, errors: ErrorSet) -> ModuleError {
    ModuleError::Invalid {
      module: self.name.to_string(),
      errors,
    }
  }

  pub fn action_error(&self, source: ActionError) -> ModuleError {
    ModuleError::Action {
      module: self.name.to_string(),
      source,
    }
  }
}

/// Implemented by each module kind's property set.
pub trait GenerateActions {
  fn generate_actions(&self, ctx: &ModuleContext<'_>) -> Result<ModuleActions, ModuleError>;
}

/// Shared, read-only state for generating any number of modules.
///
/// A `Generator` holds only shared references, so one instance may be used
/// from several threads at once.
#[derive(Clone, Copy)]
pub struct Generator<'a> {
  config: &'a GeneratorConfig,
  rules: &'a RuleSet,
  globber: &'a dyn Globber,
}

impl<'a> Generator<'a> {
  pub fn new(config: &'a GeneratorConfig, rules: &'a RuleSet, globber: &'a dyn Globber) -> Self {
    Self { config, rules, globber }
  }

  pub fn config(&self) -> &GeneratorConfig {
    self.config
  }

  pub fn rules(&self) -> &RuleSet {
    self.rules
  }

  /// Generate the actions of one module.
  ///
  /// A module directory that leaves the source root is reported against
  /// `dir` before any pattern is resolved.
  pub fn generate(&self, module: &ModuleDescriptor) -> Result<ModuleActions, ModuleError> {
    let ctx = ModuleContext {
      name: &module.name,
      dir: &module.dir,
      config: self.config,
      rules: self.rules,
      globber: self.globber,
    };

    let result = match check_module_dir(&module.dir) {
      Err(error) => {
        let mut errors = ErrorSet::new();
        errors.push(PROP_DIR, error);
        Err(ctx.invalid(errors))
      }
      Ok(()) => match &module.kind {
        ModuleKind::TestedBinary(props) => props.generate_actions(&ctx),
        ModuleKind::JsBundle(props) => props.generate_actions(&ctx),
      },
    };

    match &result {
      Ok(actions) => debug!(module = %module.name, actions = actions.actions.len(), "generated module"),
      Err(e) => debug!(module = %module.name, error = %e, "module generation failed"),
    }
    result
  }
}

/// An empty or `.` directory is the source root.
fn check_module_dir(dir: &Path) -> Result<(), GenerateError> {
  if dir.components().all(|c| matches!(c, Component::CurDir)) {
    return Ok(());
  }
  match pattern::containment_problem(dir) {
    Some(problem) => Err(GenerateError::invalid_path(dir.display(), problem)),
    None => Ok(()),
  }
}
