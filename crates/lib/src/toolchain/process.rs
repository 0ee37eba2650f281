use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use tracing::{debug, info};

use super::ToolError;

/// Captured result of a finished child process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
  pub status: ExitStatus,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.status.success()
  }

  pub fn code(&self) -> Option<i32> {
    self.status.code()
  }
}

/// Run `program` to completion, logging its stdout as it arrives.
///
/// Stderr is drained on its own thread so a chatty child cannot block on a
/// full pipe while stdout is being read.
pub fn run_command<S: AsRef<OsStr>>(
  program: impl AsRef<OsStr>,
  args: &[S],
  cwd: Option<&Path>,
) -> Result<CommandOutput, ToolError> {
  let program = program.as_ref();
  let program_name = program.to_string_lossy().into_owned();

  let mut command = Command::new(program);
  command
    .args(args)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());
  if let Some(cwd) = cwd {
    command.current_dir(cwd);
  }

  debug!(program = %program_name, args = args.len(), "spawning process");
  let mut child = command.spawn().map_err(|source| ToolError::Spawn {
    program: program_name.clone(),
    source,
  })?;

  let stderr_reader = child.stderr.take().map(|mut stderr| {
    thread::spawn(move || {
      let mut text = String::new();
      let _ = stderr.read_to_string(&mut text);
      text
    })
  });

  let mut stdout = String::new();
  if let Some(out) = child.stdout.take() {
    for line in BufReader::new(out).lines() {
      let line = line.map_err(|source| ToolError::Io {
        path: program_name.clone().into(),
        source,
      })?;
      info!(program = %program_name, "{}", line);
      stdout.push_str(&line);
      stdout.push('\n');
    }
  }

  let status = child.wait().map_err(|source| ToolError::Io {
    path: program_name.clone().into(),
    source,
  })?;
  let stderr = stderr_reader
    .map(|handle| handle.join().unwrap_or_default())
    .unwrap_or_default();

  if !stderr.is_empty() {
    debug!(program = %program_name, stderr = %stderr.trim_end(), "process stderr");
  }

  Ok(CommandOutput { status, stdout, stderr })
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;

  #[test]
  fn captures_both_streams() {
    let output = run_command("/bin/sh", &["-c", "echo out; echo err 1>&2"], None).unwrap();
    assert!(output.success());
    assert_eq!(output.stdout, "out\n");
    assert_eq!(output.stderr, "err\n");
  }

  #[test]
  fn large_stderr_does_not_deadlock() {
    let script = "i=0; while [ $i -lt 20000 ]; do echo 'stderr line padding padding' 1>&2; i=$((i+1)); done; echo done";
    let output = run_command("/bin/sh", &["-c", script], None).unwrap();
    assert_eq!(output.stdout, "done\n");
    assert!(output.stderr.lines().count() >= 20000);
  }

  #[test]
  fn exit_code_is_reported() {
    let output = run_command("/bin/sh", &["-c", "exit 3"], None).unwrap();
    assert!(!output.success());
    assert_eq!(output.code(), Some(3));
  }

  #[test]
  fn missing_program_is_spawn_error() {
    let err = run_command("/definitely/not/a/program", &[] as &[&str], None).unwrap_err();
    assert!(matches!(err, ToolError::Spawn { .. }));
  }

  #[test]
  fn runs_in_working_directory() {
    let temp = tempfile::TempDir::new().unwrap();
    let output = run_command("/bin/sh", &["-c", "pwd"], Some(temp.path())).unwrap();
    let expected = dunce::canonicalize(temp.path()).unwrap();
    assert_eq!(
      dunce::canonicalize(output.stdout.trim()).unwrap(),
      expected
    );
  }
}
