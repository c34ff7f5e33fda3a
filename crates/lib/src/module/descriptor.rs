//! Module descriptors and the JSON blueprint file that lists them.
//!
//! # Format
//!
//! ```json
//! {
//!   "modules": [
//!     {
//!       "name": "server",
//!       "type": "tested_binary",
//!       "dir": "cmd/server",
//!       "pkg": "./",
//!       "test_pkg": "./...",
//!       "srcs": ["**/*.go"],
//!       "srcs_exclude": ["testdata/**"],
//!       "vendor_first": true
//!     },
//!     {
//!       "name": "app",
//!       "type": "js_bundle",
//!       "dir": "js",
//!       "srcs": ["index.js", "util.js"],
//!       "obfuscate": true,
//!       "path": "dist/app.js"
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Properties of a Go binary built together with its tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestedBinaryProps {
  /// Package passed to `go build`.
  pub pkg: String,
  /// Package passed to `go test`.
  pub test_pkg: String,
  #[serde(default)]
  pub srcs: Vec<String>,
  #[serde(default)]
  pub srcs_exclude: Vec<String>,
  /// Run `go mod vendor` before compiling.
  #[serde(default)]
  pub vendor_first: bool,
}

/// Properties of a webpack script bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsBundleProps {
  #[serde(default)]
  pub srcs: Vec<String>,
  #[serde(default)]
  pub obfuscate: bool,
  /// Bundle location, relative to the output directory.
  pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleKind {
  TestedBinary(TestedBinaryProps),
  JsBundle(JsBundleProps),
}

impl ModuleKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ModuleKind::TestedBinary(_) => "tested_binary",
      ModuleKind::JsBundle(_) => "js_bundle",
    }
  }
}

/// One module: a name, the directory it lives in, and its properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
  pub name: String,
  /// Directory relative to the source root. Empty means the root itself.
  #[serde(default)]
  pub dir: PathBuf,
  #[serde(flatten)]
  pub kind: ModuleKind,
}

impl ModuleDescriptor {
  pub fn tested_binary(name: impl Into<String>, props: TestedBinaryProps) -> Self {
    Self {
      name: name.into(),
      dir: PathBuf::new(),
      kind: ModuleKind::TestedBinary(props),
    }
  }

  pub fn js_bundle(name: impl Into<String>, props: JsBundleProps) -> Self {
    Self {
      name: name.into(),
      dir: PathBuf::new(),
      kind: ModuleKind::JsBundle(props),
    }
  }

  pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.dir = dir.into();
    self
  }
}

/// Errors while loading a blueprint file.
#[derive(Debug, Error)]
pub enum DescriptorError {
  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse blueprint: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("module name {0:?} is invalid: names must be non-empty and contain no path separators")]
  InvalidName(String),

  #[error("module {0} is declared more than once")]
  DuplicateModule(String),
}

/// The full list of modules for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
  pub modules: Vec<ModuleDescriptor>,
}

impl Blueprint {
  /// Parse and validate a blueprint from JSON text.
  pub fn from_json(text: &str) -> Result<Self, DescriptorError> {
    let blueprint: Blueprint = serde_json::from_str(text)?;
    blueprint.validate()?;
    Ok(blueprint)
  }

  pub fn load(path: &Path) -> Result<Self, DescriptorError> {
    let text = fs::read_to_string(path).map_err(|source| DescriptorError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&text)
  }

  /// Module names end up in output paths, so they must be unique path segments.
  pub fn validate(&self) -> Result<(), DescriptorError> {
    let mut seen = HashSet::new();
    for module in &self.modules {
      let name = module.name.as_str();
      if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(DescriptorError::InvalidName(module.name.clone()));
      }
      if !seen.insert(name) {
        return Err(DescriptorError::DuplicateModule(module.name.clone()));
      }
    }
    Ok(())
  }
}
