//! Parsing and expansion of rule command templates.
//!
//! Templates use ninja's variable syntax so they can be written into the
//! manifest verbatim:
//!
//! - `$name` - parameter whose name runs while characters are `[A-Za-z0-9_-]`
//! - `${name}` - parameter with an explicit end
//! - `$$` - a literal `$`
//! - `$ ` and `$:` - a literal space or colon
//!
//! Any other character after `$` is an error, as it is for ninja.
//!
//! # Example
//!
//! ```
//! use modgraph_lib::rule::template::{parse, Segment};
//!
//! let segments = parse("cd $workDir && go test ${testPkg}").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("cd ".to_string()),
//!     Segment::Param("workDir".to_string()),
//!     Segment::Literal(" && go test ".to_string()),
//!     Segment::Param("testPkg".to_string()),
//! ]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text with escapes already applied.
  Literal(String),

  /// A parameter to be substituted.
  Param(String),
}

/// Errors that can occur while parsing or expanding a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("unclosed parameter at position {0}")]
  Unclosed(usize),

  #[error("empty parameter name at position {0}")]
  EmptyName(usize),

  #[error("bad '$'-escape at position {0}")]
  BadEscape(usize),

  #[error("missing argument: {0}")]
  MissingArgument(String),
}

fn is_simple_name_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Parse a template string into segments.
///
/// # Errors
///
/// Returns an error for unclosed `${`, empty names, and unknown escapes.
pub fn parse(input: &str) -> Result<Vec<Segment>, TemplateError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek().copied() {
      Some((_, '$')) | Some((_, ' ')) | Some((_, ':')) => {
        if let Some((_, escaped)) = chars.next() {
          literal.push(escaped);
        }
      }
      Some((_, '{')) => {
        chars.next(); // consume the {

        let mut name = String::new();
        let mut found_close = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            found_close = true;
            break;
          }
          name.push(c);
        }

        if !found_close {
          return Err(TemplateError::Unclosed(pos));
        }
        if name.is_empty() {
          return Err(TemplateError::EmptyName(pos));
        }

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Param(name));
      }
      Some((_, c)) if is_simple_name_char(c) => {
        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
          if !is_simple_name_char(c) {
            break;
          }
          name.push(c);
          chars.next();
        }

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Param(name));
      }
      _ => return Err(TemplateError::BadEscape(pos)),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Names of every parameter referenced by `segments`.
pub fn params(segments: &[Segment]) -> BTreeSet<String> {
  segments
    .iter()
    .filter_map(|s| match s {
      Segment::Param(name) => Some(name.clone()),
      Segment::Literal(_) => None,
    })
    .collect()
}

/// Substitute `args` into pre-parsed segments.
///
/// # Errors
///
/// Returns [`TemplateError::MissingArgument`] for the first parameter with no
/// value in `args`.
pub fn expand(segments: &[Segment], args: &BTreeMap<String, String>) -> Result<String, TemplateError> {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Param(name) => {
        let value = args
          .get(name)
          .ok_or_else(|| TemplateError::MissingArgument(name.clone()))?;
        result.push_str(value);
      }
    }
  }

  Ok(result)
}
