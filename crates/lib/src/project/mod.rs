//! Loading a single project file into a [`ConfigStore`].
//!
//! A project file is YAML followed by an optional `---` line. Everything after
//! that line is kept verbatim as the project's document and never parsed.
//! Includes and dependencies are left untouched; see [`crate::resolve`].

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::config::{ConfigError, ConfigStore, Value, value};
use crate::consts::{DIR_PLACEHOLDER, DOCUMENT_SENTINEL, PROJECT_FILE_EXTENSION, PROJECT_FILE_NAME};

/// Load the project at `path`.
///
/// `path` may name a project file, a directory holding a `project.yaml`, or a
/// plain directory (which yields a store with no data whose base directory is
/// that directory). A path that does not exist is retried with `.yaml`
/// appended.
pub fn load(path: impl AsRef<Path>) -> Result<ConfigStore, ConfigError> {
  let path = locate(path.as_ref())?;

  if path.is_dir() {
    let file = path.join(PROJECT_FILE_NAME);
    if file.is_file() {
      return load_file(&file);
    }
    let dir = canonical(&path)?;
    debug!(dir = %dir.display(), "directory has no project file");
    return Ok(ConfigStore::from_parts(IndexMap::new(), None, Some(dir)));
  }

  load_file(&path)
}

/// Resolve `path` to an existing file or directory.
pub fn locate(path: &Path) -> Result<PathBuf, ConfigError> {
  if path.exists() {
    return Ok(path.to_path_buf());
  }

  let has_extension = path
    .extension()
    .is_some_and(|ext| ext.eq_ignore_ascii_case(PROJECT_FILE_EXTENSION));
  if !has_extension {
    let mut with_extension = path.as_os_str().to_owned();
    with_extension.push(".");
    with_extension.push(PROJECT_FILE_EXTENSION);
    let with_extension = PathBuf::from(with_extension);
    if with_extension.exists() {
      return Ok(with_extension);
    }
  }

  Err(ConfigError::NotFound(absolute(path)))
}

/// The canonical file (or bare directory) that [`load`] would read for `path`.
pub fn canonical_location(path: &Path) -> Result<PathBuf, ConfigError> {
  let path = canonical(&locate(path)?)?;
  if path.is_dir() {
    let file = path.join(PROJECT_FILE_NAME);
    if file.is_file() {
      return Ok(file);
    }
  }
  Ok(path)
}

fn load_file(file: &Path) -> Result<ConfigStore, ConfigError> {
  let file = canonical(file)?;
  let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
  trace!(file = %file.display(), "loading project file");

  let content = fs::read_to_string(&file).map_err(|source| ConfigError::Read {
    path: file.clone(),
    source,
  })?;

  let (declarative, document) = split_document(&content);
  let mut data = parse(&file, &declarative)?;

  let dir_text = dir.to_string_lossy().replace('\\', "/");
  for value in data.values_mut() {
    value.map_strings(&|s| s.replace(DIR_PLACEHOLDER, &dir_text));
  }

  Ok(ConfigStore::from_parts(data, document, Some(dir)))
}

/// Split file content at the first line that is exactly the sentinel.
///
/// The document is `None` when nothing but whitespace follows the sentinel.
pub fn split_document(content: &str) -> (String, Option<String>) {
  let mut declarative = String::with_capacity(content.len());
  let mut lines = content.lines();

  for line in lines.by_ref() {
    if line.trim() == DOCUMENT_SENTINEL {
      let mut document = String::new();
      for line in lines {
        document.push_str(line);
        document.push('\n');
      }
      let document = (!document.trim().is_empty()).then_some(document);
      return (declarative, document);
    }
    declarative.push_str(line);
    declarative.push('\n');
  }

  (declarative, None)
}

fn parse(file: &Path, text: &str) -> Result<IndexMap<String, Value>, ConfigError> {
  if text.trim().is_empty() {
    return Ok(IndexMap::new());
  }

  let parsed = value::parse_yaml(text).map_err(|e| ConfigError::Malformed {
    path: file.to_path_buf(),
    message: e.to_string(),
  })?;

  match parsed {
    Value::Map(map) => Ok(map),
    Value::Null => Ok(IndexMap::new()),
    other => Err(ConfigError::Malformed {
      path: file.to_path_buf(),
      message: format!("expected a mapping at the top level, found '{}'", other),
    }),
  }
}

fn canonical(path: &Path) -> Result<PathBuf, ConfigError> {
  dunce::canonicalize(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })
}

fn absolute(path: &Path) -> PathBuf {
  std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
