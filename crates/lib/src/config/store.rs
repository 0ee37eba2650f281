use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::value::Value;
use super::{ConfigError, format};
use crate::consts::GLOB_SEPARATOR;
use crate::paths::{GlobError, PathSet};

/// An ordered configuration document with an optional trailing script and base directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
  data: IndexMap<String, Value>,
  document: Option<String>,
  dir: Option<PathBuf>,
}

impl ConfigStore {
  /// Create an empty store with no base directory.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a store from already-parsed data.
  pub fn from_parts(data: IndexMap<String, Value>, document: Option<String>, dir: Option<PathBuf>) -> Self {
    Self { data, document, dir }
  }

  /// Clear this store and load the project file (or directory) at `path`.
  pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    *self = crate::project::load(path)?;
    Ok(())
  }

  /// Layer `other` on top of this store, overwriting every incoming key,
  /// the document and the base directory.
  pub fn replace(&mut self, other: &ConfigStore) {
    merge_maps(&mut self.data, &other.data, true);
    self.document = other.document.clone();
    self.dir = other.dir.clone();
  }

  /// Layer `other` on top of this store.
  ///
  /// Incoming scalars and values of a different type overwrite. Lists of both
  /// sides are concatenated (existing first) and maps merge recursively. The
  /// document and base directory are taken from `other` only when it has one.
  pub fn merge(&mut self, other: &ConfigStore) {
    merge_maps(&mut self.data, &other.data, false);
    if other.document.is_some() {
      self.document = other.document.clone();
    }
    if other.dir.is_some() {
      self.dir = other.dir.clone();
    }
  }

  /// Whether `key` is present, including when its value is null.
  pub fn has(&self, key: &str) -> bool {
    self.data.contains_key(key)
  }

  /// Whether `key` is present with a non-null value.
  pub fn is_set(&self, key: &str) -> bool {
    self.data.get(key).is_some_and(|v| !v.is_null())
  }

  /// The raw value under `key`; `Some(Value::Null)` for a present null.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.data.get(key)
  }

  /// The scalar under `key` as a string, if there is one.
  pub fn get_string(&self, key: &str) -> Option<String> {
    self.data.get(key).and_then(Value::to_scalar_string)
  }

  pub fn get_str(&self, key: &str, default: &str) -> String {
    self.get_string(key).unwrap_or_else(|| default.to_string())
  }

  pub fn get_int(&self, key: &str, default: i64) -> i64 {
    self.data.get(key).and_then(Value::to_int).unwrap_or(default)
  }

  pub fn get_float(&self, key: &str, default: f64) -> f64 {
    self.data.get(key).and_then(Value::to_float).unwrap_or(default)
  }

  pub fn get_bool(&self, key: &str, default: bool) -> bool {
    self.data.get(key).and_then(Value::to_bool).unwrap_or(default)
  }

  /// The strings under `key`. A bare scalar is a one-element list; an absent
  /// or null key yields `defaults`.
  pub fn get_list(&self, key: &str, defaults: &[&str]) -> Vec<String> {
    match self.data.get(key) {
      Some(Value::List(items)) => items.iter().filter_map(Value::to_scalar_string).collect(),
      Some(Value::Map(_)) | Some(Value::Null) | None => defaults.iter().map(|s| s.to_string()).collect(),
      Some(scalar) => scalar.to_scalar_string().into_iter().collect(),
    }
  }

  /// The map under `key` with scalar values rendered as strings. An absent or
  /// non-map value yields `defaults`.
  pub fn get_map(&self, key: &str, defaults: &[(&str, &str)]) -> IndexMap<String, String> {
    match self.data.get(key) {
      Some(Value::Map(map)) => map
        .iter()
        .filter_map(|(k, v)| v.to_scalar_string().map(|s| (k.clone(), s)))
        .collect(),
      _ => defaults.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    }
  }

  /// Glob every spec under `key`, each resolved against the base directory.
  pub fn get_paths(&self, key: &str) -> Result<PathSet, GlobError> {
    let mut paths = PathSet::new();
    for spec in self.get_list(key, &[]) {
      paths.glob_spec(&self.path(&spec))?;
    }
    Ok(paths)
  }

  pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
    self.data.insert(key.into(), value.into());
  }

  pub fn remove(&mut self, key: &str) -> Option<Value> {
    self.data.shift_remove(key)
  }

  /// Remove one element equal to `item` from the list under `key`, or the
  /// entry named `item` from the map under `key`. A scalar equal to `item`
  /// removes the key. Returns whether anything was removed.
  pub fn remove_item(&mut self, key: &str, item: &str) -> bool {
    match self.data.get_mut(key) {
      Some(Value::List(items)) => match items.iter().position(|v| v.to_scalar_string().as_deref() == Some(item)) {
        Some(index) => {
          items.remove(index);
          true
        }
        None => false,
      },
      Some(Value::Map(map)) => map.shift_remove(item).is_some(),
      Some(scalar) if scalar.to_scalar_string().as_deref() == Some(item) => {
        self.data.shift_remove(key);
        true
      }
      _ => false,
    }
  }

  pub fn clear(&mut self) {
    self.data.clear();
  }

  /// Substitute `$key$` placeholders with values from this store.
  pub fn format(&self, text: &str) -> String {
    format::format(text, &self.data)
  }

  /// Resolve `path` against the base directory after formatting it.
  ///
  /// Absolute paths are kept. For a glob spec (`dir|pattern`) only the
  /// directory part is resolved and the patterns are kept verbatim.
  pub fn path(&self, path: &str) -> String {
    let formatted = self.format(path);
    normalize_separators(&self.resolve(&formatted))
  }

  fn resolve(&self, path: &str) -> String {
    let Some(dir) = &self.dir else {
      return path.to_string();
    };
    if let Some(index) = path.find(GLOB_SEPARATOR) {
      return format!("{}{}", self.resolve(&path[..index]), &path[index..]);
    }
    if Path::new(path).is_absolute() || path.starts_with('/') {
      return path.to_string();
    }
    format!("{}/{}", dir.to_string_lossy(), path)
  }

  pub fn dir(&self) -> Option<&Path> {
    self.dir.as_deref()
  }

  pub fn set_dir(&mut self, dir: impl Into<PathBuf>) {
    self.dir = Some(dir.into());
  }

  pub fn document(&self) -> Option<&str> {
    self.document.as_deref()
  }

  pub fn set_document(&mut self, document: Option<String>) {
    self.document = document;
  }

  pub fn data(&self) -> &IndexMap<String, Value> {
    &self.data
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.data.keys().map(String::as_str)
  }
}

impl fmt::Display for ConfigStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.get_string("name") {
      Some(name) => write!(f, "{}", name),
      None => write!(f, "{}", Value::Map(self.data.clone())),
    }
  }
}

/// Lists append and maps recurse; every other incoming value, including a
/// scalar of the same type (int, bool, float or string), overwrites.
fn merge_maps(old: &mut IndexMap<String, Value>, new: &IndexMap<String, Value>, replace: bool) {
  for (key, incoming) in new {
    if !replace && let Some(existing) = old.get_mut(key) {
      match (existing, incoming) {
        (Value::List(items), Value::List(more)) => {
          items.extend(more.iter().cloned());
          continue;
        }
        (Value::Map(map), Value::Map(more)) => {
          merge_maps(map, more, false);
          continue;
        }
        _ => {}
      }
    }
    old.insert(key.clone(), incoming.clone());
  }
}

fn normalize_separators(path: &str) -> String {
  let mut out = String::with_capacity(path.len());
  for ch in path.chars() {
    let ch = if ch == '\\' { '/' } else { ch };
    if ch == '/' && out.ends_with('/') {
      continue;
    }
    out.push(ch);
  }
  out
}
