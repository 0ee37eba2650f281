//! Build orchestration.
//!
//! [`Builder::build`] resolves a project, checks its dependency graph for
//! cycles, and then runs each project through
//! `build-dependencies -> clean -> compile -> package -> dist`. A project with
//! a non-empty document runs that document instead (see [`crate::script`]).
//!
//! Every invocation of [`Builder::build`] gets its own [`BuildRun`], so a
//! project reached through several dependents is built once per invocation.

mod manifest;
mod types;

pub use manifest::JarManifest;
pub use types::{BuildError, BuildReport, BuildRun, BuiltProjectSet, Stage, StageRecord};

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::consts::MANIFEST_ENTRY;
use crate::paths::{self, GlobError, PathSet};
use crate::resolve::{ClasspathMode, ProjectGraph, ResolvedProject, Resolver};
use crate::settings;
use crate::toolchain::{ArchiveRequest, CompileRequest, Toolchain};

/// Runs build stages for resolved projects.
#[derive(Debug)]
pub struct Builder {
  resolver: Resolver,
  toolchain: Toolchain,
  default_target: String,
}

impl Builder {
  /// A builder whose default language level comes from the environment.
  pub fn new(resolver: Resolver, toolchain: Toolchain) -> Self {
    Self {
      resolver,
      toolchain,
      default_target: settings::compile_target(),
    }
  }

  /// Language level for projects without `compileTarget`.
  pub fn with_default_target(mut self, target: impl Into<String>) -> Self {
    self.default_target = target.into();
    self
  }

  pub fn resolver(&self) -> &Resolver {
    &self.resolver
  }

  pub fn resolver_mut(&mut self) -> &mut Resolver {
    &mut self.resolver
  }

  /// Build the project at `path` and everything it depends on.
  pub fn build(&mut self, path: impl AsRef<Path>) -> Result<BuildReport, BuildError> {
    let project = self.resolver.resolve(path)?;
    ProjectGraph::discover(&mut self.resolver, &project)?.verify()?;

    let mut run = BuildRun::new();
    self.run_project(&project, &mut run)?;

    info!(project = %project, built = run.built.len(), "build complete");
    Ok(run.into_report())
  }

  /// Run the project's document if it has one, otherwise the default pipeline.
  pub fn run_project(&mut self, project: &ResolvedProject, run: &mut BuildRun) -> Result<(), BuildError> {
    let has_document = project.document().is_some_and(|d| !d.trim().is_empty());
    if !has_document {
      return self.build_project(project, run);
    }

    info!(project = %project, "executing document");
    run.record(project.name(), Stage::ExecuteDocument);
    crate::script::execute_document(self, run, project)?;
    run.built.insert(project.name());
    Ok(())
  }

  /// The default pipeline, ignoring any document.
  pub fn build_project(&mut self, project: &ResolvedProject, run: &mut BuildRun) -> Result<(), BuildError> {
    self.build_dependencies(project, run)?;

    let target = project.target();
    info!(project = %project, target = %target.display(), "target");

    self.clean(project, run)?;
    self.compile(project, run)?;
    self.package(project, run)?;
    self.dist(project, run)?;

    if !paths::has_files(&target) {
      warn!(project = %project, target = %target.display(), "empty target folder");
      delete(&target)?;
    }

    run.built.insert(project.name());
    Ok(())
  }

  /// Build every dependency not yet built in this run.
  pub fn build_dependencies(&mut self, project: &ResolvedProject, run: &mut BuildRun) -> Result<(), BuildError> {
    run.record(project.name(), Stage::BuildDependencies);

    for (dependency, path) in project.dependencies().into_iter().zip(project.dependency_paths()) {
      let resolved = self.resolver.resolve(&path)?;
      if run.built.contains(&resolved.name()) {
        debug!(project = %project, dependency = %resolved, "dependency already built");
        continue;
      }

      debug!(project = %project, dependency = %resolved, "building dependency");
      self
        .run_project(&resolved, run)
        .map_err(|source| BuildError::Dependency {
          project: project.name(),
          dependency,
          source: Box::new(source),
        })?;
    }
    Ok(())
  }

  /// Delete the target directory.
  pub fn clean(&mut self, project: &ResolvedProject, run: &mut BuildRun) -> Result<(), BuildError> {
    run.record(project.name(), Stage::Clean);
    info!(project = %project, "clean");
    delete(&project.target())?;
    Ok(())
  }

  /// Compile `source` files into `<target>/classes`. Returns that directory.
  pub fn compile(&mut self, project: &ResolvedProject, run: &mut BuildRun) -> Result<PathBuf, BuildError> {
    run.record(project.name(), Stage::Compile);

    let classpath = self.resolver.classpath(project, ClasspathMode::Built)?;
    let sources = project.store().get_paths("source")?;

    info!(project = %project, "compile");
    debug!(project = %project, sources = sources.len(), "source files");
    debug!(project = %project, classpath = %classpath, "classpath");

    let classes = project.classes_dir();
    mkdirs(&classes)?;

    if sources.is_empty() {
      warn!(project = %project, "no source files found");
      return Ok(classes);
    }

    let request = CompileRequest {
      sources: sources.paths(),
      classpath: classpath.paths(),
      output_dir: classes.clone(),
      target: project.store().get_str("compileTarget", &self.default_target),
    };
    let output = self.toolchain.compiler.compile(&request)?;

    for diagnostic in output.diagnostics.iter().filter(|d| d.severity != crate::toolchain::Severity::Error) {
      debug!(project = %project, "{}", diagnostic);
    }

    if !output.success {
      return Err(BuildError::Compile {
        project: project.name(),
        diagnostics: output.errors().cloned().collect(),
        log: output.log,
      });
    }
    Ok(classes)
  }

  /// Archive compiled classes and `resources` into the project jar.
  ///
  /// A manifest with `Main-Class` and `Class-Path` is generated when `main` is
  /// set and the resources carry no manifest of their own. Returns the jar
  /// path, or `None` when there was nothing to archive.
  pub fn package(&mut self, project: &ResolvedProject, run: &mut BuildRun) -> Result<Option<PathBuf>, BuildError> {
    run.record(project.name(), Stage::Package);
    info!(project = %project, "jar");

    let jar_dir = project.jar_dir();
    mkdirs(&jar_dir)?;

    let mut classes = PathSet::new();
    classes.glob(project.classes_dir(), &["**/*.class"])?;
    copy(project, &classes, &jar_dir)?;
    copy(project, &project.store().get_paths("resources")?, &jar_dir)?;

    let jar = project.jar_path();
    let manifest = match project.store().get_string("main") {
      Some(main) if !jar_dir.join(MANIFEST_ENTRY).is_file() => {
        debug!(project = %project, main = %main, "generating manifest");
        let classpath = self.resolver.classpath(project, ClasspathMode::Built)?;
        let entries: Vec<String> = classpath
          .relative_paths()
          .iter()
          .map(|p| p.to_string_lossy().replace('\\', "/"))
          .collect();
        let jar_name = jar.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        Some(JarManifest::executable(&main, &jar_name, &entries).render())
      }
      _ => None,
    };

    let request = ArchiveRequest::from_dir(&jar, &jar_dir, manifest)?;
    if request.entries.is_empty() && request.manifest.is_none() {
      warn!(project = %project, "nothing to archive");
      return Ok(None);
    }

    debug!(project = %project, jar = %jar.display(), entries = request.entries.len(), "creating jar");
    self.toolchain.archiver.archive(&request)?;
    Ok(Some(jar))
  }

  /// Collect the classpath, `dist` files and the project jar into `<target>/dist`.
  ///
  /// An empty distribution directory is removed. Returns the directory, or
  /// `None` when it was removed.
  pub fn dist(&mut self, project: &ResolvedProject, run: &mut BuildRun) -> Result<Option<PathBuf>, BuildError> {
    run.record(project.name(), Stage::Dist);
    info!(project = %project, "dist");

    let dist_dir = project.dist_dir();
    mkdirs(&dist_dir)?;

    let classpath = self.resolver.classpath(project, ClasspathMode::Built)?;
    copy(project, &classpath, &dist_dir)?;
    copy(project, &self.resolver.dist_paths(project)?, &dist_dir)?;

    let mut jars = PathSet::new();
    jars.glob(project.target(), &["*.jar"])?;
    copy(project, &jars, &dist_dir)?;

    if !paths::has_files(&dist_dir) {
      warn!(project = %project, dir = %dist_dir.display(), "empty distribution directory");
      delete(&dist_dir)?;
      return Ok(None);
    }
    Ok(Some(dist_dir))
  }
}

fn copy(project: &ResolvedProject, set: &PathSet, dir: &Path) -> Result<(), BuildError> {
  set.copy_to(dir).map(|_| ()).map_err(|e| match e {
    GlobError::Copy { from, to, source } => BuildError::Package {
      project: project.name(),
      input: from,
      destination: to,
      message: source.to_string(),
    },
    other => BuildError::Glob(other),
  })
}

fn mkdirs(dir: &Path) -> Result<(), BuildError> {
  paths::mkdirs(dir).map(|_| ()).map_err(|source| BuildError::Io {
    path: dir.to_path_buf(),
    source,
  })
}

fn delete(path: &Path) -> Result<(), BuildError> {
  paths::delete_tree(path).map(|_| ()).map_err(|source| BuildError::Io {
    path: path.to_path_buf(),
    source,
  })
}
