//! CLI smoke tests for scar.
//!
//! These run the binary against throwaway project trees. None of them compile
//! Java sources, so no JDK is needed.

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scar command that ignores the user's own defaults.
fn scar_cmd(temp: &Path) -> Command {
  let mut cmd = cargo_bin_cmd!("scar");
  cmd.env("SCAR_CONFIG_DIR", temp.join("config")).env_remove("RUST_LOG");
  cmd
}

fn write(root: &Path, relative: &str, content: &str) {
  let path = root.join(relative);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, content).unwrap();
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  let temp = TempDir::new().unwrap();
  scar_cmd(temp.path())
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  let temp = TempDir::new().unwrap();
  scar_cmd(temp.path())
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("scar"));
}

#[test]
fn subcommand_help_works() {
  let temp = TempDir::new().unwrap();
  for cmd in &["build", "resolve", "classpath", "graph"] {
    scar_cmd(temp.path())
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn resolve_prints_configuration() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "demo/project.yaml", "version: 1.0\n");

  scar_cmd(temp.path())
    .arg("resolve")
    .arg(temp.path().join("demo"))
    .assert()
    .success()
    .stdout(predicate::str::contains("demo"))
    .stdout(predicate::str::contains("version"));
}

#[test]
fn resolve_json_output() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "demo/project.yaml", "name: renamed\n");

  scar_cmd(temp.path())
    .arg("resolve")
    .arg("--json")
    .arg(temp.path().join("demo"))
    .assert()
    .success()
    .stdout(predicate::str::contains("\"name\": \"renamed\""));
}

#[test]
fn resolve_accepts_file_argument() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "demo/project.yaml", "name: demo\n");

  scar_cmd(temp.path())
    .arg("resolve")
    .arg(format!("file={}", temp.path().join("demo/project.yaml").display()))
    .assert()
    .success();
}

#[test]
fn resolve_applies_user_defaults() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "config/defaults.yaml", "vendor: acme\n");
  write(temp.path(), "demo/project.yaml", "name: demo\n");

  scar_cmd(temp.path())
    .arg("resolve")
    .arg(temp.path().join("demo"))
    .assert()
    .success()
    .stdout(predicate::str::contains("acme"));
}

#[test]
fn resolve_missing_project_fails() {
  let temp = TempDir::new().unwrap();

  scar_cmd(temp.path())
    .arg("resolve")
    .arg(temp.path().join("nowhere"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("project not found"));
}

// =============================================================================
// classpath & graph
// =============================================================================

#[test]
fn classpath_lists_declared_jars() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "demo/project.yaml", "name: demo\n");
  write(temp.path(), "demo/lib/dep.jar", "jar");

  scar_cmd(temp.path())
    .arg("classpath")
    .arg(temp.path().join("demo"))
    .assert()
    .success()
    .stdout(predicate::str::contains("dep.jar"));
}

#[test]
fn graph_lists_dependencies_first() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "core/project.yaml", "name: core\n");
  write(temp.path(), "app/project.yaml", "name: app\ndependencies: [../core]\n");

  let output = scar_cmd(temp.path())
    .arg("graph")
    .arg(temp.path().join("app"))
    .output()
    .unwrap();
  assert!(output.status.success());

  let stdout = String::from_utf8_lossy(&output.stdout);
  let core = stdout.find("1. core").unwrap();
  let app = stdout.find("2. app").unwrap();
  assert!(core < app);
}

#[test]
fn graph_reports_cycles() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "a/project.yaml", "dependencies: [../b]\n");
  write(temp.path(), "b/project.yaml", "dependencies: [../a]\n");

  scar_cmd(temp.path())
    .arg("graph")
    .arg(temp.path().join("a"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("cycle"));
}

// =============================================================================
// build
// =============================================================================

#[test]
fn build_project_without_sources() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "empty/project.yaml", "name: empty\n");

  scar_cmd(temp.path())
    .arg("build")
    .arg(temp.path().join("empty"))
    .assert()
    .success()
    .stdout(predicate::str::contains("Built 1 project(s)"));
}

#[test]
fn build_runs_document() {
  let temp = TempDir::new().unwrap();
  write(
    temp.path(),
    "demo/project.yaml",
    "name: demo\n---\nscar.log.warn('hello from ' .. project.name)\n",
  );

  scar_cmd(temp.path())
    .arg("build")
    .arg(temp.path().join("demo"))
    .assert()
    .success()
    .stderr(predicate::str::contains("hello from demo"));
}

#[test]
fn build_document_error_fails() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "demo/project.yaml", "name: demo\n---\nerror('boom')\n");

  scar_cmd(temp.path())
    .arg("build")
    .arg(temp.path().join("demo"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("boom"));
}
