//! Generator configuration.
//!
//! Settings that apply to every module in one generation run: where outputs
//! go and how test sources and test logs are named.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{BIN_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_TEST_SUFFIX, TEST_LOG_FILE};

/// Where test actions write their logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestLogLayout {
  /// One `<output_dir>/out.txt` for the whole run.
  ///
  /// Two tested binaries in one run claim the same path; the build graph
  /// rejects that as a duplicate output.
  #[default]
  Shared,
  /// `<output_dir>/<module>/out.txt` per module.
  PerModule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
  /// Base directory for generated outputs.
  pub output_dir: PathBuf,
  /// File name suffix that marks test sources.
  pub test_suffix: String,
  pub test_log: TestLogLayout,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self {
      output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
      test_suffix: DEFAULT_TEST_SUFFIX.to_string(),
      test_log: TestLogLayout::default(),
    }
  }
}

impl GeneratorConfig {
  pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.output_dir = dir.into();
    self
  }

  pub fn with_test_log(mut self, layout: TestLogLayout) -> Self {
    self.test_log = layout;
    self
  }

  pub fn with_test_suffix(mut self, suffix: impl Into<String>) -> Self {
    self.test_suffix = suffix.into();
    self
  }

  /// `<output_dir>/bin/<module>`
  pub fn binary_path(&self, module: &str) -> PathBuf {
    self.output_dir.join(BIN_DIR).join(module)
  }

  pub fn test_log_path(&self, module: &str) -> PathBuf {
    match self.test_log {
      TestLogLayout::Shared => self.output_dir.join(TEST_LOG_FILE),
      TestLogLayout::PerModule => self.output_dir.join(module).join(TEST_LOG_FILE),
    }
  }

  /// `<output_dir>/<declared>`. Generators reject a `declared` path that is
  /// absolute, empty or contains `..`.
  pub fn bundle_path(&self, declared: &Path) -> PathBuf {
    self.output_dir.join(declared)
  }
}
