use std::path::{Path, PathBuf};

use crate::config::{ConfigError, ConfigStore};

/// A project with every include and default layered in.
///
/// The name and target are guaranteed to be set. The classpath is computed on
/// demand by [`super::Resolver::classpath`] since it depends on build state.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProject {
  store: ConfigStore,
  location: PathBuf,
}

impl ResolvedProject {
  pub(crate) fn new(store: ConfigStore, location: PathBuf) -> Result<Self, ConfigError> {
    for key in ["name", "target"] {
      if store.get_string(key).is_none_or(|value| value.trim().is_empty()) {
        return Err(ConfigError::MissingKey {
          project: location.display().to_string(),
          key: key.to_string(),
        });
      }
    }
    Ok(Self { store, location })
  }

  pub fn name(&self) -> String {
    self.store.get_str("name", "")
  }

  /// Canonical project file, or the directory for a project without one.
  pub fn location(&self) -> &Path {
    &self.location
  }

  pub fn dir(&self) -> Option<&Path> {
    self.store.dir()
  }

  pub fn document(&self) -> Option<&str> {
    self.store.document()
  }

  /// The output root all stages write under.
  pub fn target(&self) -> PathBuf {
    PathBuf::from(self.store.path("$target$"))
  }

  pub fn classes_dir(&self) -> PathBuf {
    self.target().join("classes")
  }

  /// Staging directory the archive is assembled from.
  pub fn jar_dir(&self) -> PathBuf {
    self.target().join("jar")
  }

  pub fn dist_dir(&self) -> PathBuf {
    self.target().join("dist")
  }

  /// `<target>/<name>-<version>.jar`, or `<target>/<name>.jar` without a version.
  pub fn jar_path(&self) -> PathBuf {
    let pattern = if self.store.is_set("version") {
      "$target$/$name$-$version$.jar"
    } else {
      "$target$/$name$.jar"
    };
    PathBuf::from(self.store.path(pattern))
  }

  /// Declared dependency references, as written.
  pub fn dependencies(&self) -> Vec<String> {
    self.store.get_list("dependencies", &[])
  }

  /// Dependency references resolved against the project directory.
  pub fn dependency_paths(&self) -> Vec<PathBuf> {
    self
      .dependencies()
      .iter()
      .map(|dependency| PathBuf::from(self.store.path(dependency)))
      .collect()
  }

  pub fn store(&self) -> &ConfigStore {
    &self.store
  }

  pub fn store_mut(&mut self) -> &mut ConfigStore {
    &mut self.store
  }

  pub fn into_store(self) -> ConfigStore {
    self.store
  }
}

impl std::fmt::Display for ResolvedProject {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}
