//! Test utilities for modgraph-lib.
//!
//! [`StaticGlobber`] matches patterns against a fixed list of paths, so
//! generator tests can describe a source tree inline.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::pattern::{GlobMatches, Globber, MATCH_OPTIONS};

/// In-memory [`Globber`] over a fixed set of root-relative files.
#[derive(Debug, Clone, Default)]
pub struct StaticGlobber {
  files: Vec<PathBuf>,
  failing: BTreeSet<String>,
  raw: Vec<PathBuf>,
}

impl StaticGlobber {
  pub fn new(files: &[&str]) -> Self {
    Self {
      files: files.iter().map(PathBuf::from).collect(),
      ..Default::default()
    }
  }

  /// Make the globber fail for this root-relative pattern.
  pub fn failing(mut self, pattern: &str) -> Self {
    self.failing.insert(pattern.to_string());
    self
  }

  /// Return `path` from every glob, whether it matches or not.
  pub fn with_raw_match(mut self, path: &str) -> Self {
    self.raw.push(PathBuf::from(path));
    self
  }
}

impl Globber for StaticGlobber {
  fn glob(&self, pattern: &str) -> Result<GlobMatches, String> {
    if self.failing.contains(pattern) {
      return Err(format!("no such directory for {pattern}"));
    }
    let compiled = Pattern::new(pattern).map_err(|e| e.to_string())?;

    let mut files: Vec<PathBuf> = self
      .files
      .iter()
      .filter(|f| compiled.matches_path_with(f, MATCH_OPTIONS))
      .cloned()
      .collect();
    files.extend(self.raw.iter().cloned());

    let mut dirs: Vec<PathBuf> = files
      .iter()
      .map(|f| match f.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
      })
      .collect();
    if dirs.is_empty() {
      dirs.push(PathBuf::from("."));
    }

    Ok(GlobMatches { files, dirs })
  }
}

/// Create empty files at the given root-relative paths.
pub fn write_tree(root: &Path, files: &[&str]) {
  for file in files {
    let path = root.join(file);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"").unwrap();
  }
}
