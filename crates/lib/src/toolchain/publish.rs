//! Publishing build output to remote hosts through the system `scp` and `ssh`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use super::ToolError;
use super::process::{CommandOutput, run_command};

/// Exit status `ssh` and `scp` use for connection failures.
const CONNECTION_FAILURE: i32 = 255;

/// A remote login, optionally reached through a jump host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
  pub host: String,
  pub user: Option<String>,
  pub port: Option<u16>,
  /// Intermediate host for a double hop, passed to `-J`.
  pub jump: Option<String>,
}

impl Remote {
  pub fn new(host: impl Into<String>) -> Self {
    Self {
      host: host.into(),
      user: None,
      port: None,
      jump: None,
    }
  }

  /// `user@host`, or `host` alone.
  pub fn destination(&self) -> String {
    match &self.user {
      Some(user) => format!("{}@{}", user, self.host),
      None => self.host.clone(),
    }
  }

  fn common_args(&self, port_flag: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-o".into(), "BatchMode=yes".into()];
    if let Some(port) = self.port {
      args.push(port_flag.into());
      args.push(port.to_string().into());
    }
    if let Some(jump) = &self.jump {
      args.push("-J".into());
      args.push(jump.into());
    }
    args
  }
}

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub attempts: u32,
  pub backoff: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      attempts: 3,
      backoff: Duration::from_secs(2),
    }
  }
}

/// Run `op` until it succeeds, fails with a non-transient error, or runs out
/// of attempts.
pub fn with_retry<T>(policy: RetryPolicy, mut op: impl FnMut() -> Result<T, ToolError>) -> Result<T, ToolError> {
  let attempts = policy.attempts.max(1);
  let mut attempt = 1;
  loop {
    match op() {
      Err(ToolError::Transient { program, message }) if attempt < attempts => {
        warn!(
          program = %program,
          attempt,
          attempts,
          error = %message,
          "transient failure, retrying"
        );
        thread::sleep(policy.backoff);
        attempt += 1;
      }
      result => return result,
    }
  }
}

pub trait Publisher {
  /// Upload `files` into `remote_dir`.
  fn upload(&self, files: &[PathBuf], remote_dir: &str) -> Result<(), ToolError>;
}

/// Uploads with `scp`.
#[derive(Debug, Clone)]
pub struct ScpPublisher {
  pub remote: Remote,
  pub retry: RetryPolicy,
  program: PathBuf,
}

impl ScpPublisher {
  pub fn new(remote: Remote) -> Self {
    Self {
      remote,
      retry: RetryPolicy::default(),
      program: PathBuf::from("scp"),
    }
  }

  pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
    self.program = program.into();
    self
  }

  pub fn args(&self, files: &[PathBuf], remote_dir: &str) -> Vec<OsString> {
    let mut args = self.remote.common_args("-P");
    args.push("-r".into());
    args.extend(files.iter().map(|f| f.clone().into_os_string()));
    args.push(format!("{}:{}", self.remote.destination(), remote_dir).into());
    args
  }
}

impl Publisher for ScpPublisher {
  fn upload(&self, files: &[PathBuf], remote_dir: &str) -> Result<(), ToolError> {
    if files.is_empty() {
      return Ok(());
    }
    info!(host = %self.remote.host, files = files.len(), remote_dir, "uploading");
    let args = self.args(files, remote_dir);
    with_retry(self.retry, || check(&self.program, run_command(&self.program, &args, None)?))?;
    Ok(())
  }
}

/// Runs commands on a remote host with `ssh`.
#[derive(Debug, Clone)]
pub struct SshRunner {
  pub remote: Remote,
  pub retry: RetryPolicy,
  program: PathBuf,
}

impl SshRunner {
  pub fn new(remote: Remote) -> Self {
    Self {
      remote,
      retry: RetryPolicy::default(),
      program: PathBuf::from("ssh"),
    }
  }

  pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
    self.program = program.into();
    self
  }

  pub fn args(&self, command: &str) -> Vec<OsString> {
    let mut args = self.remote.common_args("-p");
    args.push(self.remote.destination().into());
    args.push(command.into());
    args
  }

  /// Run `command` remotely and return its stdout.
  pub fn run(&self, command: &str) -> Result<String, ToolError> {
    info!(host = %self.remote.host, command, "running remote command");
    let args = self.args(command);
    let output = with_retry(self.retry, || check(&self.program, run_command(&self.program, &args, None)?))?;
    Ok(output.stdout)
  }
}

/// Map a finished process to success, a transient connection failure, or a hard failure.
fn check(program: &std::path::Path, output: CommandOutput) -> Result<CommandOutput, ToolError> {
  let program = program.display().to_string();
  match output.code() {
    Some(0) => Ok(output),
    Some(CONNECTION_FAILURE) => Err(ToolError::Transient {
      program,
      message: output.stderr.trim().to_string(),
    }),
    code => Err(ToolError::Failed {
      program,
      code,
      stderr: output.stderr.trim().to_string(),
    }),
  }
}
