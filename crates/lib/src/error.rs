//! Per-module validation errors and the accumulator that gates emission.
//!
//! Generators never stop at the first bad property. Every failure is pushed
//! into an [`ErrorSet`] attached to the property it came from, and the module
//! only emits actions when the set is empty. [`Validated`] pairs a partially
//! collected value with the errors seen while collecting it, so the
//! "collect everything, then gate" step is visible in the types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A static configuration problem found while generating one module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
  /// A declared glob could not be evaluated.
  #[error("cannot resolve files that match pattern {pattern}: {reason}")]
  UnresolvablePattern { pattern: String, reason: String },

  /// A resolved path could not be categorized as test or non-test.
  #[error("cannot classify source {}: {reason}", path.display())]
  Classification { path: PathBuf, reason: String },

  /// A declared directory or output path does not stay below its base.
  #[error("path {path:?} {reason}")]
  InvalidPath { path: String, reason: String },
}

impl GenerateError {
  pub fn unresolvable(pattern: impl Into<String>, reason: impl fmt::Display) -> Self {
    GenerateError::UnresolvablePattern {
      pattern: pattern.into(),
      reason: reason.to_string(),
    }
  }

  pub fn invalid_path(path: impl fmt::Display, reason: impl fmt::Display) -> Self {
    GenerateError::InvalidPath {
      path: path.to_string(),
      reason: reason.to_string(),
    }
  }
}

/// A [`GenerateError`] attached to the module property that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{property}: {error}")]
pub struct PropertyError {
  pub property: String,
  pub error: GenerateError,
}

/// Ordered collection of property errors for a single module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSet {
  errors: Vec<PropertyError>,
}

impl ErrorSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, property: &str, error: GenerateError) {
    self.errors.push(PropertyError {
      property: property.to_string(),
      error,
    });
  }

  pub fn extend(&mut self, other: ErrorSet) {
    self.errors.extend(other.errors);
  }

  pub fn is_empty(&self) -> bool {
    self.errors.is_empty()
  }

  pub fn len(&self) -> usize {
    self.errors.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &PropertyError> {
    self.errors.iter()
  }
}

impl fmt::Display for ErrorSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, err) in self.errors.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "{err}")?;
    }
    Ok(())
  }
}

impl<'a> IntoIterator for &'a ErrorSet {
  type Item = &'a PropertyError;
  type IntoIter = std::slice::Iter<'a, PropertyError>;

  fn into_iter(self) -> Self::IntoIter {
    self.errors.iter()
  }
}

/// A value collected under a continue-on-error policy.
///
/// `value` holds whatever succeeded; `errors` holds every failure in the order
/// it was found. The value is only usable through [`Validated::into_result`],
/// which refuses to hand it out when any error was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T> {
  pub value: T,
  pub errors: ErrorSet,
}

impl<T> Validated<T> {
  pub fn new(value: T) -> Self {
    Self {
      value,
      errors: ErrorSet::new(),
    }
  }

  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }

  /// Gate the collected value on the absence of errors.
  pub fn into_result(self) -> Result<T, ErrorSet> {
    if self.errors.is_empty() {
      Ok(self.value)
    } else {
      Err(self.errors)
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
    Validated {
      value: f(self.value),
      errors: self.errors,
    }
  }
}
