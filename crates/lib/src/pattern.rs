//! Source pattern resolution.
//!
//! Expands the glob patterns declared by a module into concrete, sorted file
//! lists. Patterns are written relative to the module directory; the paths
//! that come back are relative to the source root so they can be used
//! directly as action inputs.
//!
//! Every resolution also reports which directories the glob had to list. A
//! graph that depends on those directories is re-generated when matching
//! files are added or removed, which is how a cached glob result gets
//! invalidated.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{GenerateError, Validated};

/// Matching rules shared by source and exclusion patterns.
///
/// `*` never crosses a path separator and hidden files need an explicit dot.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: true,
};

/// Raw output of a [`Globber`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobMatches {
  /// Matched files, relative to the source root.
  pub files: Vec<PathBuf>,
  /// Directories whose listing determined the match, relative to the source root.
  pub dirs: Vec<PathBuf>,
}

/// Filesystem access used by the resolver.
///
/// Implementations must be safe to share between threads: modules may be
/// generated concurrently against a single globber.
pub trait Globber: Send + Sync {
  /// Expand a root-relative pattern.
  ///
  /// # Errors
  ///
  /// Returns a human-readable reason when the pattern cannot be evaluated.
  fn glob(&self, pattern: &str) -> Result<GlobMatches, String>;
}

/// [`Globber`] backed by the real filesystem below `root`.
#[derive(Debug, Clone)]
pub struct FsGlobber {
  root: PathBuf,
}

impl FsGlobber {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn relative(&self, path: &Path) -> PathBuf {
    match path.strip_prefix(&self.root) {
      Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
      Ok(rel) => rel.to_path_buf(),
      Err(_) => path.to_path_buf(),
    }
  }

  /// Directories a pattern has to list.
  ///
  /// Walks from the pattern's literal prefix down as many levels as the
  /// pattern has wildcard components, or without limit under `**`.
  fn listing_dirs(&self, pattern: &str) -> Result<Vec<PathBuf>, String> {
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();
    let magic_at = components.iter().position(|c| is_magic(c));

    let Some(magic_at) = magic_at else {
      // A literal path only depends on its parent's listing.
      let parent = components[..components.len().saturating_sub(1)].join("/");
      return Ok(vec![self.relative(&self.nearest_existing(&parent))]);
    };

    let base = self.root.join(components[..magic_at].join("/"));
    if !base.is_dir() {
      let literal = components[..magic_at].join("/");
      return Ok(vec![self.relative(&self.nearest_existing(&literal))]);
    }

    let rest = &components[magic_at..];
    let mut walker = WalkDir::new(&base).min_depth(0).sort_by_file_name();
    if !rest.contains(&"**") {
      walker = walker.max_depth(rest.len().saturating_sub(1));
    }

    let mut dirs = Vec::new();
    for entry in walker {
      let entry = entry.map_err(|e| e.to_string())?;
      if entry.file_type().is_dir() {
        dirs.push(self.relative(entry.path()));
      }
    }
    Ok(dirs)
  }

  fn nearest_existing(&self, relative: &str) -> PathBuf {
    let mut candidate = self.root.join(relative);
    while !candidate.is_dir() && candidate != self.root {
      match candidate.parent() {
        Some(parent) => candidate = parent.to_path_buf(),
        None => return self.root.clone(),
      }
    }
    candidate
  }
}

impl Globber for FsGlobber {
  fn glob(&self, pattern: &str) -> Result<GlobMatches, String> {
    let root = Pattern::escape(&self.root.to_string_lossy());
    let full = format!("{}/{}", root.trim_end_matches('/'), pattern);

    let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| e.to_string())?;

    let mut files = Vec::new();
    for entry in paths {
      let path = entry.map_err(|e| e.to_string())?;
      if path.is_file() {
        files.push(self.relative(&path));
      }
    }

    Ok(GlobMatches {
      files,
      dirs: self.listing_dirs(pattern)?,
    })
  }
}

fn is_magic(component: &str) -> bool {
  component.contains(['*', '?', '['])
}

/// Marker that a glob result must be recomputed when these directories change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobDependency {
  pub pattern: String,
  pub dirs: Vec<PathBuf>,
}

/// Files produced by one source pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFileSet {
  /// The pattern as declared by the module.
  pub pattern: String,
  /// Sorted, deduplicated paths relative to the source root.
  pub files: Vec<PathBuf>,
  pub dependency: GlobDependency,
}

impl ResolvedFileSet {
  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }
}

/// Compiled exclusion patterns, matched against module-relative paths.
#[derive(Debug, Clone, Default)]
pub struct Excludes {
  patterns: Vec<Pattern>,
}

impl Excludes {
  pub fn none() -> Self {
    Self::default()
  }

  /// Compile every exclusion pattern, collecting one error per invalid pattern.
  pub fn compile(patterns: &[String]) -> Validated<Excludes> {
    let mut result = Validated::new(Excludes::none());
    for raw in patterns {
      match Pattern::new(raw) {
        Ok(pattern) => result.value.patterns.push(pattern),
        Err(e) => result
          .errors
          .push(crate::consts::PROP_SRCS_EXCLUDE, GenerateError::unresolvable(raw, e)),
      }
    }
    result
  }

  pub fn is_excluded(&self, module_relative: &Path) -> bool {
    self
      .patterns
      .iter()
      .any(|p| p.matches_path_with(module_relative, MATCH_OPTIONS))
  }
}

/// Resolve one source pattern declared by the module in `module_dir`.
///
/// An empty match is a valid, empty result.
///
/// # Errors
///
/// Returns [`GenerateError::UnresolvablePattern`] naming `pattern` when it is
/// empty, absolute, escapes the module directory, is not valid glob syntax,
/// or the filesystem layer fails to evaluate it.
pub fn resolve(
  globber: &dyn Globber,
  module_dir: &Path,
  pattern: &str,
  excludes: &Excludes,
) -> Result<ResolvedFileSet, GenerateError> {
  validate_pattern(pattern)?;

  let full = root_relative_pattern(module_dir, pattern);
  let matches = globber
    .glob(&full)
    .map_err(|reason| GenerateError::unresolvable(pattern, reason))?;

  let mut files = BTreeSet::new();
  for file in matches.files {
    let module_relative = file.strip_prefix(module_dir).unwrap_or(&file);
    if !excludes.is_excluded(module_relative) {
      files.insert(file);
    }
  }
  let files: Vec<PathBuf> = files.into_iter().collect();

  let mut dirs = matches.dirs;
  dirs.sort();
  dirs.dedup();

  if files.is_empty() {
    warn!(pattern = %pattern, module_dir = ?module_dir, "pattern matched no files");
  } else {
    debug!(pattern = %pattern, count = files.len(), "resolved pattern");
  }

  Ok(ResolvedFileSet {
    pattern: pattern.to_string(),
    files,
    dependency: GlobDependency {
      pattern: full,
      dirs,
    },
  })
}

/// Resolve every pattern of one property without stopping at the first failure.
///
/// Each unresolvable pattern adds one error against `property`; the file sets
/// that did resolve are kept in declaration order.
pub fn resolve_all(
  globber: &dyn Globber,
  module_dir: &Path,
  patterns: &[String],
  excludes: &Excludes,
  property: &str,
) -> Validated<Vec<ResolvedFileSet>> {
  let mut result = Validated::new(Vec::with_capacity(patterns.len()));
  for pattern in patterns {
    match resolve(globber, module_dir, pattern, excludes) {
      Ok(set) => result.value.push(set),
      Err(e) => result.errors.push(property, e),
    }
  }
  result
}

/// Concatenate resolved sets, keeping the first occurrence of every path.
pub fn merge_files(sets: &[ResolvedFileSet]) -> Vec<PathBuf> {
  let mut seen = BTreeSet::new();
  let mut merged = Vec::new();
  for file in sets.iter().flat_map(|s| &s.files) {
    if seen.insert(file) {
      merged.push(file.clone());
    }
  }
  merged
}

/// Why `path` cannot name a location below the directory it is relative to.
///
/// Returns `None` for a relative path with at least one normal component and
/// no `..` component.
pub fn containment_problem(path: &Path) -> Option<&'static str> {
  let mut named = false;
  for component in path.components() {
    match component {
      Component::Prefix(_) | Component::RootDir => return Some("must be relative"),
      Component::ParentDir => return Some("must not contain `..`"),
      Component::Normal(_) => named = true,
      Component::CurDir => {}
    }
  }
  if named { None } else { Some("is empty") }
}

fn validate_pattern(pattern: &str) -> Result<(), GenerateError> {
  if pattern.trim().is_empty() {
    return Err(GenerateError::unresolvable(pattern, "pattern is empty"));
  }
  if let Some(problem) = containment_problem(Path::new(pattern)) {
    return Err(GenerateError::unresolvable(pattern, format!("pattern {problem}")));
  }

  Pattern::new(pattern).map_err(|e| GenerateError::unresolvable(pattern, e))?;
  Ok(())
}

fn root_relative_pattern(module_dir: &Path, pattern: &str) -> String {
  let dir = module_dir.to_string_lossy();
  let dir = dir.trim_end_matches('/');
  if dir.is_empty() || dir == "." {
    pattern.to_string()
  } else {
    format!("{}/{}", Pattern::escape(dir), pattern)
  }
}
