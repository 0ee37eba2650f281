//! Dependency resolution: layering defaults, includes and project data into a
//! [`ResolvedProject`], and computing classpaths across dependency projects.
//!
//! Layers are merged lowest priority first:
//!
//! 1. structural defaults derived from the project directory
//! 2. user defaults, when configured
//! 3. `include.yaml` files found in ancestor directories, farthest first
//! 4. each entry of the project's `include` list, in order
//! 5. the project's own file
//!
//! Includes are resolved recursively with the defaults of the project that
//! includes them.

mod graph;
mod project;

pub use graph::{ProjectGraph, ProjectNode};
pub use project::ResolvedProject;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{ConfigError, ConfigStore};
use crate::consts::INCLUDE_FILE_NAME;
use crate::paths::{GlobError, PathSet};
use crate::project as loader;

/// Errors raised while resolving projects.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Glob(#[from] GlobError),

  #[error("error loading included project '{}': {source}", path.display())]
  Include {
    path: PathBuf,
    #[source]
    source: Box<ResolveError>,
  },

  #[error(
    "dependency has not been built: {dependency}\n  dependency path: {}\n  missing target: {}",
    path.display(),
    target.display()
  )]
  DependencyNotBuilt {
    dependency: String,
    path: PathBuf,
    target: PathBuf,
  },

  #[error("dependency cycle detected: {}", format_chain(chain))]
  Cycle { chain: Vec<PathBuf> },
}

fn format_chain(chain: &[PathBuf]) -> String {
  chain
    .iter()
    .map(|p| p.display().to_string())
    .collect::<Vec<_>>()
    .join(" -> ")
}

/// How [`Resolver::classpath`] treats dependency build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClasspathMode {
  /// Only the globs projects declare. Build state is ignored.
  Declared,
  /// Declared globs plus each dependency's built jars. A dependency whose
  /// target directory is missing is an error.
  Built,
}

/// Resolves projects, caching results per canonical project file.
#[derive(Debug, Default)]
pub struct Resolver {
  user_defaults: Option<ConfigStore>,
  cache: HashMap<PathBuf, ResolvedProject>,
  stack: Vec<PathBuf>,
}

impl Resolver {
  pub fn new() -> Self {
    Self::default()
  }

  /// A resolver that layers `defaults` over the structural defaults of every project.
  pub fn with_user_defaults(defaults: ConfigStore) -> Self {
    Self {
      user_defaults: Some(defaults),
      ..Self::default()
    }
  }

  /// Defaults every project starts from, derived from its location.
  ///
  /// The name is the project directory's name and the target is
  /// `<parent of project dir>/target/<name>/`.
  pub fn structural_defaults(location: &Path) -> ConfigStore {
    let project_dir = if location.is_dir() {
      location
    } else {
      location.parent().unwrap_or(location)
    };
    let name = project_dir
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let parent = project_dir.parent().unwrap_or(project_dir);

    let mut defaults = ConfigStore::new();
    defaults.set("name", name.as_str());
    defaults.set(
      "target",
      format!("{}/target/{}/", parent.to_string_lossy().replace('\\', "/"), name),
    );
    defaults.set("classpath", vec!["lib|**/*.jar", "libs|**/*.jar"]);
    defaults.set("dist", "dist");
    defaults.set("source", vec!["src|**/*.java", "src/main/java|**/*.java"]);
    defaults.set("resources", vec!["assets", "resources", "src/main/resources"]);
    defaults
  }

  /// Resolve the project at `path`.
  ///
  /// Dependencies already present on the declared classpath as a jar of the
  /// same name are dropped from the result's `dependencies`.
  pub fn resolve(&mut self, path: impl AsRef<Path>) -> Result<ResolvedProject, ResolveError> {
    let location = loader::canonical_location(path.as_ref())?;
    if let Some(resolved) = self.cache.get(&location) {
      return Ok(resolved.clone());
    }

    let resolved = self.enter(&location, |this| {
      let defaults = this.defaults_for(&location);
      let store = this.layers(&location, &defaults)?;
      let mut resolved = ResolvedProject::new(store, location.clone())?;
      this.shadow_dependencies(&mut resolved)?;
      Ok(resolved)
    })?;

    debug!(project = %resolved, location = %location.display(), "resolved project");
    self.cache.insert(location, resolved.clone());
    Ok(resolved)
  }

  /// Resolve `path` and layer it over `defaults` without the classpath step.
  pub fn resolve_layers(&mut self, path: impl AsRef<Path>, defaults: &ConfigStore) -> Result<ConfigStore, ResolveError> {
    let location = loader::canonical_location(path.as_ref())?;
    self.enter(&location, |this| this.layers(&location, defaults))
  }

  /// The project's classpath including every transitive dependency's classpath.
  pub fn classpath(&mut self, project: &ResolvedProject, mode: ClasspathMode) -> Result<PathSet, ResolveError> {
    let mut classpath = project.store().get_paths("classpath")?;

    for dependency in project.dependencies() {
      let path = PathBuf::from(project.store().path(&dependency));
      let resolved = self.resolve(&path)?;

      if mode == ClasspathMode::Built {
        let target = resolved.target();
        if !target.is_dir() {
          return Err(ResolveError::DependencyNotBuilt {
            dependency,
            path: dunce::canonicalize(&path).unwrap_or(path),
            target,
          });
        }
        classpath.glob(&target, &["*.jar"])?;
      }

      classpath.extend(self.classpath(&resolved, mode)?);
    }

    Ok(classpath)
  }

  /// The project's `dist` files plus the non-jar contents of every
  /// dependency's distribution directory, recursively.
  pub fn dist_paths(&mut self, project: &ResolvedProject) -> Result<PathSet, ResolveError> {
    let mut paths = project.store().get_paths("dist")?;
    self.dependency_dist_paths(project, &mut paths)?;
    Ok(paths)
  }

  fn dependency_dist_paths(&mut self, project: &ResolvedProject, paths: &mut PathSet) -> Result<(), ResolveError> {
    for dependency in project.dependencies() {
      let path = PathBuf::from(project.store().path(&dependency));
      let resolved = self.resolve(&path)?;
      let target = resolved.target();
      if !target.is_dir() {
        return Err(ResolveError::DependencyNotBuilt {
          dependency,
          path: dunce::canonicalize(&path).unwrap_or(path),
          target,
        });
      }
      paths.glob(resolved.dist_dir(), &["!**/*.jar"])?;
      self.dependency_dist_paths(&resolved, paths)?;
    }
    Ok(())
  }

  /// Forget cached results, e.g. after project files changed on disk.
  pub fn clear_cache(&mut self) {
    self.cache.clear();
  }

  fn defaults_for(&self, location: &Path) -> ConfigStore {
    let mut defaults = Self::structural_defaults(location);
    if let Some(user) = &self.user_defaults {
      defaults.merge(user);
    }
    defaults
  }

  fn layers(&mut self, location: &Path, defaults: &ConfigStore) -> Result<ConfigStore, ResolveError> {
    let own = loader::load(location)?;
    let mut store = defaults.clone();

    if let Some(dir) = own.dir() {
      for include in ancestor_includes(dir) {
        trace!(include = %include.display(), "applying ancestor include");
        let layer = self.include_layer(&include, defaults)?;
        store.merge(&layer);
      }
    }

    for include in own.get_list("include", &[]) {
      let include = PathBuf::from(own.path(&include));
      trace!(include = %include.display(), "applying include");
      let layer = self.include_layer(&include, defaults)?;
      store.merge(&layer);
    }

    store.merge(&own);
    store.set_document(own.document().map(String::from));
    if let Some(dir) = own.dir() {
      store.set_dir(dir);
    }
    Ok(store)
  }

  fn include_layer(&mut self, path: &Path, defaults: &ConfigStore) -> Result<ConfigStore, ResolveError> {
    self.resolve_layers(path, defaults).map_err(|e| match e {
      ResolveError::Cycle { .. } => e,
      other => ResolveError::Include {
        path: path.to_path_buf(),
        source: Box::new(other),
      },
    })
  }

  fn shadow_dependencies(&mut self, project: &mut ResolvedProject) -> Result<(), ResolveError> {
    let dependencies = project.dependencies();
    if dependencies.is_empty() {
      return Ok(());
    }

    let classpath = self.classpath(project, ClasspathMode::Declared)?;
    for dependency in dependencies {
      let resolved = self.resolve(project.store().path(&dependency))?;
      let name = resolved.name();
      if let Some(file) = classpath.iter().find(|file| artifact_base_name(file) == name) {
        debug!(
          project = %project,
          dependency = %name,
          classpath = %file.display(),
          "ignoring dependency already on classpath"
        );
        project.store_mut().remove_item("dependencies", &dependency);
      }
    }

    Ok(())
  }

  fn enter<T>(
    &mut self,
    location: &Path,
    f: impl FnOnce(&mut Self) -> Result<T, ResolveError>,
  ) -> Result<T, ResolveError> {
    if let Some(start) = self.stack.iter().position(|p| p == location) {
      let mut chain = self.stack[start..].to_vec();
      chain.push(location.to_path_buf());
      return Err(ResolveError::Cycle { chain });
    }

    self.stack.push(location.to_path_buf());
    let result = f(self);
    self.stack.pop();
    result
  }
}

/// `include.yaml` files in the ancestors of `dir`, farthest first.
fn ancestor_includes(dir: &Path) -> Vec<PathBuf> {
  let mut includes: Vec<PathBuf> = dir
    .ancestors()
    .skip(1)
    .map(|ancestor| ancestor.join(INCLUDE_FILE_NAME))
    .filter(|file| file.is_file())
    .collect();
  includes.reverse();
  includes
}

/// The artifact name of a jar: the file name up to its first `.`, without a
/// trailing `-version` part.
///
/// This is a loose match. `foo-bar.jar` yields `foo`, and names such as
/// `lib-core-1.0.jar` yield `lib-core`.
pub fn artifact_base_name(path: &Path) -> String {
  let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
  let stem = file_name.split('.').next().unwrap_or_default();
  match stem.rfind('-') {
    Some(index) => stem[..index].to_string(),
    None => stem.to_string(),
  }
}
