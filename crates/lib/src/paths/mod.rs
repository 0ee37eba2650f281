//! Glob-based file sets and the filesystem operations the build stages use.
//!
//! A [`PathSet`] is an ordered, duplicate-free collection of files. Each file
//! remembers the root it was found under, so copying the set into another
//! directory reproduces the layout below each root.
//!
//! # Glob specs
//!
//! Configuration names file sets with a spec of the form `dir|pattern|...`:
//!
//! - `src|**/*.java` - every Java file below `src`
//! - `lib|*.jar|!*-sources.jar` - jars directly in `lib`, minus source jars
//! - `resources` - everything below `resources`

mod glob;

pub use glob::Matcher;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::trace;
use walkdir::WalkDir;

use crate::consts::GLOB_SEPARATOR;

/// Errors from building or materializing a [`PathSet`].
#[derive(Debug, Error)]
pub enum GlobError {
  #[error("invalid glob pattern '{pattern}': {source}")]
  Pattern {
    pattern: String,
    #[source]
    source: globset::Error,
  },

  #[error("cannot walk '{}': {source}", dir.display())]
  Walk {
    dir: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("cannot copy '{}' to '{}': {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// An ordered set of files, keyed by full path, each with the root it was found under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
  entries: IndexMap<PathBuf, PathBuf>,
}

impl PathSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a set from a single glob spec.
  pub fn from_spec(spec: &str) -> Result<Self, GlobError> {
    let mut set = Self::new();
    set.glob_spec(spec)?;
    Ok(set)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains(&self, path: &Path) -> bool {
    self.entries.contains_key(path)
  }

  /// Full paths in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &Path> {
    self.entries.keys().map(PathBuf::as_path)
  }

  pub fn paths(&self) -> Vec<PathBuf> {
    self.entries.keys().cloned().collect()
  }

  /// Paths relative to the root each file was found under.
  pub fn relative_paths(&self) -> Vec<PathBuf> {
    self
      .entries
      .iter()
      .map(|(path, root)| relative_to(path, root))
      .collect()
  }

  /// Add one file found under `root`. Re-adding a known file keeps its first root.
  pub fn add(&mut self, root: impl Into<PathBuf>, path: impl Into<PathBuf>) {
    let path = path.into();
    if !self.entries.contains_key(&path) {
      let root = root.into();
      self.entries.insert(path, root);
    }
  }

  /// Add a file as its own entry, rooted at its parent directory.
  pub fn add_file(&mut self, path: impl Into<PathBuf>) {
    let path = path.into();
    let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
    self.add(root, path);
  }

  /// Append every entry of `other` not already present.
  pub fn extend(&mut self, other: PathSet) {
    for (path, root) in other.entries {
      self.add(root, path);
    }
  }

  /// Add every file below `dir` matching `patterns`.
  ///
  /// A missing `dir` adds nothing. When `dir` is a file it is added if its
  /// name matches.
  pub fn glob<S: AsRef<str>>(&mut self, dir: impl AsRef<Path>, patterns: &[S]) -> Result<(), GlobError> {
    let dir = dir.as_ref();
    let matcher = if patterns.is_empty() {
      Matcher::all()
    } else {
      Matcher::new(patterns)?
    };

    if dir.is_file() {
      let name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
      if matcher.is_match(&name) {
        self.add_file(dir);
      }
      return Ok(());
    }

    if !dir.is_dir() {
      trace!(dir = %dir.display(), "glob root does not exist");
      return Ok(());
    }

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
      let entry = entry.map_err(|source| GlobError::Walk {
        dir: dir.to_path_buf(),
        source,
      })?;
      if !entry.file_type().is_file() {
        continue;
      }
      let relative = slash_path(&relative_to(entry.path(), dir));
      if matcher.is_match(&relative) {
        self.add(dir, entry.path());
      }
    }

    Ok(())
  }

  /// Add the files named by a `dir|pattern|...` spec.
  pub fn glob_spec(&mut self, spec: &str) -> Result<(), GlobError> {
    let mut parts = spec.split(GLOB_SEPARATOR);
    let dir = parts.next().unwrap_or_default().trim();
    let patterns: Vec<&str> = parts.map(str::trim).filter(|p| !p.is_empty()).collect();
    self.glob(dir, &patterns)
  }

  /// Entries whose file still exists.
  pub fn files_only(&self) -> PathSet {
    PathSet {
      entries: self
        .entries
        .iter()
        .filter(|(path, _)| path.is_file())
        .map(|(path, root)| (path.clone(), root.clone()))
        .collect(),
    }
  }

  /// Copy every file to `dir`, keeping its path relative to its root.
  ///
  /// Returns the destination paths.
  pub fn copy_to(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, GlobError> {
    let dir = dir.as_ref();
    let mut copied = Vec::with_capacity(self.entries.len());

    for (path, root) in &self.entries {
      let dest = dir.join(relative_to(path, root));
      copy_file(path, &dest).map_err(|source| GlobError::Copy {
        from: path.clone(),
        to: dest.clone(),
        source,
      })?;
      copied.push(dest);
    }

    Ok(copied)
  }

  /// Join full paths with `separator`, as used for classpath strings.
  pub fn join(&self, separator: &str) -> String {
    self
      .entries
      .keys()
      .map(|p| p.to_string_lossy())
      .collect::<Vec<_>>()
      .join(separator)
  }
}

impl<'a> IntoIterator for &'a PathSet {
  type Item = &'a Path;
  type IntoIter = Box<dyn Iterator<Item = &'a Path> + 'a>;

  fn into_iter(self) -> Self::IntoIter {
    Box::new(self.iter())
  }
}

impl std::fmt::Display for PathSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.join(", "))
  }
}

/// The platform's classpath separator.
pub fn classpath_separator() -> &'static str {
  if cfg!(windows) { ";" } else { ":" }
}

/// Copy a file, creating the destination's parent directories.
pub fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent)?;
  }
  trace!(from = %from.display(), to = %to.display(), "copying file");
  fs::copy(from, to)?;
  Ok(())
}

/// Create `path` and all missing parents.
pub fn mkdirs(path: impl AsRef<Path>) -> io::Result<PathBuf> {
  let path = path.as_ref();
  fs::create_dir_all(path)?;
  Ok(path.to_path_buf())
}

/// Delete a file or a directory tree. Returns whether anything was removed.
pub fn delete_tree(path: impl AsRef<Path>) -> io::Result<bool> {
  let path = path.as_ref();
  match fs::symlink_metadata(path) {
    Ok(meta) if meta.is_dir() => {
      trace!(path = %path.display(), "deleting directory");
      fs::remove_dir_all(path)?;
      Ok(true)
    }
    Ok(_) => {
      trace!(path = %path.display(), "deleting file");
      fs::remove_file(path)?;
      Ok(true)
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(e),
  }
}

/// Whether `dir` contains at least one file anywhere below it.
pub fn has_files(dir: impl AsRef<Path>) -> bool {
  WalkDir::new(dir)
    .into_iter()
    .filter_map(Result::ok)
    .any(|entry| entry.file_type().is_file())
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
  path
    .strip_prefix(root)
    .map(Path::to_path_buf)
    .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default())
}

fn slash_path(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}
