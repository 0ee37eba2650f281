//! The compiler collaborator.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use super::ToolError;
use super::process::run_command;
use crate::paths::classpath_separator;

/// Inputs for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
  pub sources: Vec<PathBuf>,
  pub classpath: Vec<PathBuf>,
  pub output_dir: PathBuf,
  /// Language level passed as both source and target, e.g. `1.8` or `17`.
  pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Error,
  Warning,
  Note,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Error => write!(f, "error"),
      Severity::Warning => write!(f, "warning"),
      Severity::Note => write!(f, "note"),
    }
  }
}

/// One compiler message attributed to a source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub file: PathBuf,
  pub line: u32,
  pub severity: Severity,
  pub message: String,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}: {}: {}",
      self.file.display(),
      self.line,
      self.severity,
      self.message
    )
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
  pub success: bool,
  pub diagnostics: Vec<Diagnostic>,
  /// Everything the compiler printed, for failures without attributed lines.
  pub log: String,
}

impl CompileOutput {
  pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
    self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
  }
}

pub trait Compiler {
  fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, ToolError>;
}

/// Compiles by running a `javac` binary.
#[derive(Debug, Clone)]
pub struct Javac {
  program: PathBuf,
}

impl Javac {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }

  /// The binary chosen by the environment.
  pub fn from_env() -> Self {
    Self::new(crate::settings::javac_path())
  }

  pub fn program(&self) -> &std::path::Path {
    &self.program
  }

  pub fn args(request: &CompileRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
      "-d".into(),
      request.output_dir.clone().into_os_string(),
      "-g:source,lines".into(),
      "-source".into(),
      request.target.clone().into(),
      "-target".into(),
      request.target.clone().into(),
    ];
    args.extend(request.sources.iter().map(|s| s.clone().into_os_string()));

    if !request.classpath.is_empty() {
      let classpath = request
        .classpath
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join(classpath_separator());
      args.push("-classpath".into());
      args.push(classpath.into());
    }
    args
  }
}

impl Compiler for Javac {
  fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, ToolError> {
    if request.sources.is_empty() {
      return Ok(CompileOutput {
        success: true,
        ..CompileOutput::default()
      });
    }

    debug!(program = %self.program.display(), sources = request.sources.len(), "running javac");
    let output = run_command(&self.program, &Self::args(request), None)?;

    let log = format!("{}{}", output.stdout, output.stderr);
    Ok(CompileOutput {
      success: output.success(),
      diagnostics: parse_diagnostics(&log),
      log,
    })
  }
}

/// Parse `File.java:12: error: message` lines.
pub fn parse_diagnostics(output: &str) -> Vec<Diagnostic> {
  output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Diagnostic> {
  const MARKER: &str = ".java:";

  let end = line.find(MARKER)? + MARKER.len() - 1;
  let file = &line[..end];
  let (number, rest) = line[end + 1..].split_once(':')?;
  let number = number.trim().parse().ok()?;

  let rest = rest.trim();
  let (severity, message) = match rest.split_once(':') {
    Some(("error", message)) => (Severity::Error, message),
    Some(("warning", message)) => (Severity::Warning, message),
    Some(("Note" | "note", message)) => (Severity::Note, message),
    _ => (Severity::Error, rest),
  };

  Some(Diagnostic {
    file: PathBuf::from(file),
    line: number,
    severity,
    message: message.trim().to_string(),
  })
}
