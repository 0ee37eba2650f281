//! Types for build orchestration.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexSet;
use thiserror::Error;

use crate::paths::GlobError;
use crate::resolve::ResolveError;
use crate::toolchain::{Diagnostic, ToolError};

/// A step of the per-project pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  BuildDependencies,
  Clean,
  Compile,
  Package,
  Dist,
  /// The project's document ran in place of the default pipeline.
  ExecuteDocument,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::BuildDependencies => "build-dependencies",
      Stage::Clean => "clean",
      Stage::Compile => "compile",
      Stage::Package => "package",
      Stage::Dist => "dist",
      Stage::ExecuteDocument => "document",
    };
    write!(f, "{}", name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
  pub project: String,
  pub stage: Stage,
}

/// Names of projects finished in one build invocation, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltProjectSet {
  names: IndexSet<String>,
}

impl BuiltProjectSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.names.contains(name)
  }

  /// Returns false if the name was already present.
  pub fn insert(&mut self, name: impl Into<String>) -> bool {
    self.names.insert(name.into())
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.names.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

/// State threaded through one top-level build.
#[derive(Debug, Default)]
pub struct BuildRun {
  pub built: BuiltProjectSet,
  pub stages: Vec<StageRecord>,
}

impl BuildRun {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&mut self, project: impl Into<String>, stage: Stage) {
    self.stages.push(StageRecord {
      project: project.into(),
      stage,
    });
  }

  pub fn into_report(self) -> BuildReport {
    BuildReport {
      built: self.built.iter().map(String::from).collect(),
      stages: self.stages,
    }
  }
}

/// What a build did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
  /// Projects in the order they finished.
  pub built: Vec<String>,
  pub stages: Vec<StageRecord>,
}

impl BuildReport {
  /// Stages executed for `project`, in order.
  pub fn stages_for(&self, project: &str) -> Vec<Stage> {
    self
      .stages
      .iter()
      .filter(|r| r.project == project)
      .map(|r| r.stage)
      .collect()
  }
}

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Glob(#[from] GlobError),

  #[error("compilation failed for '{project}':\n{}", compile_summary(diagnostics, log))]
  Compile {
    project: String,
    diagnostics: Vec<Diagnostic>,
    log: String,
  },

  #[error("packaging failed for '{project}' ({} -> {}): {message}", input.display(), destination.display())]
  Package {
    project: String,
    input: PathBuf,
    destination: PathBuf,
    message: String,
  },

  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error("io error at '{}': {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("error executing document for project '{project}': {message}")]
  Script { project: String, message: String },

  #[error("dependency '{dependency}' of project '{project}' failed: {source}")]
  Dependency {
    project: String,
    dependency: String,
    #[source]
    source: Box<BuildError>,
  },
}

fn compile_summary(diagnostics: &[Diagnostic], log: &str) -> String {
  if diagnostics.is_empty() {
    return log.trim_end().to_string();
  }
  diagnostics
    .iter()
    .map(|d| format!("  {}", d))
    .collect::<Vec<_>>()
    .join("\n")
}
