//! External collaborators the build stages drive: the compiler, the archiver,
//! the process runner they share, and the publishers scripts can call.

pub mod archive;
pub mod compiler;
pub mod process;
pub mod publish;

pub use archive::{ArchiveEntry, ArchiveRequest, Archiver, ZipArchiver};
pub use compiler::{CompileOutput, CompileRequest, Compiler, Diagnostic, Javac, Severity};
pub use process::{CommandOutput, run_command};
pub use publish::{Publisher, Remote, RetryPolicy, ScpPublisher, SshRunner, with_retry};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("'{program}' failed with exit code {code:?}: {stderr}")]
  Failed {
    program: String,
    code: Option<i32>,
    stderr: String,
  },

  #[error("'{program}' could not connect: {message}")]
  Transient { program: String, message: String },

  #[error("cannot write archive '{}': {source}", path.display())]
  Archive {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("io error at '{}': {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// The compiler and archiver a build uses.
pub struct Toolchain {
  pub compiler: Box<dyn Compiler>,
  pub archiver: Box<dyn Archiver>,
}

impl Toolchain {
  pub fn new(compiler: Box<dyn Compiler>, archiver: Box<dyn Archiver>) -> Self {
    Self { compiler, archiver }
  }

  /// `javac` from the environment and the built-in zip writer.
  pub fn system() -> Self {
    Self::new(Box::new(Javac::from_env()), Box::new(ZipArchiver))
  }
}

impl std::fmt::Debug for Toolchain {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Toolchain").finish_non_exhaustive()
  }
}
