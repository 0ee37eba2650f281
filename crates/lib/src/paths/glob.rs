use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use super::GlobError;

/// Include/exclude pattern matcher for paths relative to a glob root.
///
/// Patterns starting with `!` exclude. With no include pattern every path is
/// included. `*` and `?` never cross a `/`; `**` does.
#[derive(Debug, Clone)]
pub struct Matcher {
  include: Option<GlobSet>,
  exclude: Option<GlobSet>,
}

impl Matcher {
  pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, GlobError> {
    let mut include = GlobSetBuilder::new();
    let mut exclude = GlobSetBuilder::new();
    let mut include_count = 0;
    let mut exclude_count = 0;

    for pattern in patterns {
      let pattern = pattern.as_ref().trim();
      if pattern.is_empty() {
        continue;
      }
      match pattern.strip_prefix('!') {
        Some(excluded) => {
          exclude.add(compile(excluded)?);
          exclude_count += 1;
        }
        None => {
          include.add(compile(pattern)?);
          include_count += 1;
        }
      }
    }

    Ok(Self {
      include: build_set(include, include_count)?,
      exclude: build_set(exclude, exclude_count)?,
    })
  }

  /// Match everything.
  pub fn all() -> Self {
    Self {
      include: None,
      exclude: None,
    }
  }

  /// Check a `/`-separated path relative to the glob root.
  pub fn is_match(&self, relative: &str) -> bool {
    let included = self.include.as_ref().is_none_or(|set| set.is_match(relative));
    included && !self.exclude.as_ref().is_some_and(|set| set.is_match(relative))
  }
}

fn compile(pattern: &str) -> Result<Glob, GlobError> {
  GlobBuilder::new(pattern)
    .literal_separator(true)
    .build()
    .map_err(|source| GlobError::Pattern {
      pattern: pattern.to_string(),
      source,
    })
}

fn build_set(builder: GlobSetBuilder, count: usize) -> Result<Option<GlobSet>, GlobError> {
  if count == 0 {
    return Ok(None);
  }
  builder.build().map(Some).map_err(|source| GlobError::Pattern {
    pattern: "<set>".to_string(),
    source,
  })
}
