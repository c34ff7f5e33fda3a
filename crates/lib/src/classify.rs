//! Split resolved sources into build and test inputs.

use std::path::{Path, PathBuf};

use crate::consts::DEFAULT_TEST_SUFFIX;
use crate::error::GenerateError;

/// Result of classifying a module's sources.
///
/// Every input path lands in exactly one of the two lists, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedSources {
  pub build: Vec<PathBuf>,
  pub test: Vec<PathBuf>,
}

/// Classifies files by the `<name><suffix>` test naming convention.
#[derive(Debug, Clone)]
pub struct SourceClassifier {
  suffix: String,
}

impl Default for SourceClassifier {
  fn default() -> Self {
    Self::new(DEFAULT_TEST_SUFFIX)
  }
}

impl SourceClassifier {
  pub fn new(suffix: impl Into<String>) -> Self {
    Self { suffix: suffix.into() }
  }

  pub fn suffix(&self) -> &str {
    &self.suffix
  }

  /// Whether `path` is a test source.
  ///
  /// # Errors
  ///
  /// Returns [`GenerateError::Classification`] when the path has no file name
  /// or the file name is not valid UTF-8.
  pub fn is_test(&self, path: &Path) -> Result<bool, GenerateError> {
    let name = path.file_name().ok_or_else(|| GenerateError::Classification {
      path: path.to_path_buf(),
      reason: "path has no file name".to_string(),
    })?;
    let name = name.to_str().ok_or_else(|| GenerateError::Classification {
      path: path.to_path_buf(),
      reason: "file name is not valid UTF-8".to_string(),
    })?;

    Ok(name.len() > self.suffix.len() && name.ends_with(&self.suffix))
  }

  /// Partition `files` into build and test sources.
  ///
  /// Stops at the first path that cannot be classified.
  pub fn classify(&self, files: &[PathBuf]) -> Result<ClassifiedSources, GenerateError> {
    let mut sources = ClassifiedSources::default();
    for file in files {
      if self.is_test(file)? {
        sources.test.push(file.clone());
      } else {
        sources.build.push(file.clone());
      }
    }
    Ok(sources)
  }
}
