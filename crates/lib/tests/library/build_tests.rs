use scar_lib::build::{BuildError, Stage};
use scar_lib::resolve::ResolveError;

use super::common::{FakeCompiler, builder, jar_entries, workspace, write};

#[test]
fn application_with_library_dependency() {
  let (_temp, root) = workspace();
  write(&root, "lib/project.yaml", "name: lib\n");
  write(&root, "lib/src/Util.java", "class Util {}");
  write(&root, "app/project.yaml", "name: app\ndependencies: [../lib]\nmain: app.Main\n");
  write(&root, "app/src/Main.java", "class Main {}");

  let compiler = FakeCompiler::default();
  let report = builder(&compiler).build(root.join("app")).unwrap();

  assert_eq!(report.built, vec!["lib", "app"]);
  assert!(root.join("target/lib/lib.jar").is_file());
  assert!(root.join("target/app/app.jar").is_file());
  assert!(root.join("target/app/dist/app.jar").is_file());
  assert!(root.join("target/app/dist/lib.jar").is_file());

  let requests = compiler.requests.borrow();
  assert_eq!(requests.len(), 2);
  assert!(requests[1].classpath.contains(&root.join("target/lib/lib.jar")));

  let entries = jar_entries(&root.join("target/app/app.jar"));
  assert!(entries.contains(&"META-INF/MANIFEST.MF".to_string()));
  assert!(entries.contains(&"Main.class".to_string()));
}

#[test]
fn jar_name_uses_version_as_written() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "name: app\nversion: 1.0\n");
  write(&root, "app/src/Main.java", "class Main {}");
  write(&root, "lib/project.yaml", "name: lib\nversion: 1.10\n");
  write(&root, "lib/src/Util.java", "class Util {}");

  let compiler = FakeCompiler::default();
  builder(&compiler).build(root.join("app")).unwrap();
  builder(&compiler).build(root.join("lib")).unwrap();

  assert!(root.join("target/app/app-1.0.jar").is_file());
  assert!(root.join("target/lib/lib-1.10.jar").is_file());
}

#[test]
fn shared_dependency_is_built_once() {
  let (_temp, root) = workspace();
  write(&root, "a/project.yaml", "dependencies: [../b, ../c]\n");
  write(&root, "b/project.yaml", "dependencies: [../d]\n");
  write(&root, "c/project.yaml", "dependencies: [../d]\n");
  write(&root, "d/project.yaml", "name: d\n");
  for name in ["a", "b", "c", "d"] {
    write(&root, &format!("{}/src/{}.java", name, name.to_uppercase()), "class X {}");
  }

  let compiler = FakeCompiler::default();
  let report = builder(&compiler).build(root.join("a")).unwrap();

  assert_eq!(report.built, vec!["d", "b", "c", "a"]);
  assert_eq!(report.stages_for("d").iter().filter(|s| **s == Stage::Compile).count(), 1);
  assert_eq!(compiler.compiled_into(&root.join("target/d")), 1);
  assert_eq!(compiler.requests.borrow().len(), 4);
}

#[test]
fn each_build_call_starts_fresh() {
  let (_temp, root) = workspace();
  write(&root, "lib/project.yaml", "name: lib\n");
  write(&root, "lib/src/Util.java", "class Util {}");

  let compiler = FakeCompiler::default();
  let mut builder = builder(&compiler);
  builder.build(root.join("lib")).unwrap();
  builder.build(root.join("lib")).unwrap();

  assert_eq!(compiler.requests.borrow().len(), 2);
}

#[test]
fn dependency_failure_aborts_the_run() {
  let (_temp, root) = workspace();
  write(&root, "lib/project.yaml", "name: lib\n---\nerror('lib is broken')\n");
  write(&root, "app/project.yaml", "dependencies: [../lib]\n");
  write(&root, "app/src/Main.java", "class Main {}");

  let compiler = FakeCompiler::default();
  let err = builder(&compiler).build(root.join("app")).unwrap_err();

  let BuildError::Dependency { project, dependency, source } = &err else {
    panic!("expected dependency error, got {:?}", err);
  };
  assert_eq!(project, "app");
  assert_eq!(dependency, "../lib");
  assert!(matches!(**source, BuildError::Script { .. }));
  assert!(compiler.requests.borrow().is_empty());
  assert!(!root.join("target/app").exists());
}

#[test]
fn cycle_fails_before_any_stage() {
  let (_temp, root) = workspace();
  write(&root, "a/project.yaml", "dependencies: [../b]\n");
  write(&root, "b/project.yaml", "dependencies: [../a]\n");

  let compiler = FakeCompiler::default();
  let err = builder(&compiler).build(root.join("a")).unwrap_err();

  assert!(matches!(err, BuildError::Resolve(ResolveError::Cycle { .. })), "got {:?}", err);
  assert!(!root.join("target").exists());
}

#[test]
fn resources_and_dist_files_are_collected() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "name: app\n");
  write(&root, "app/src/Main.java", "class Main {}");
  write(&root, "app/resources/config/app.properties", "a=b");
  write(&root, "app/dist/run.sh", "#!/bin/sh");

  builder(&FakeCompiler::default()).build(root.join("app")).unwrap();

  let entries = jar_entries(&root.join("target/app/app.jar"));
  assert!(entries.contains(&"config/app.properties".to_string()));
  assert!(!entries.contains(&"META-INF/MANIFEST.MF".to_string()));
  assert!(root.join("target/app/dist/run.sh").is_file());
}

#[test]
fn dependency_dist_files_flow_to_dependents_without_jars() {
  let (_temp, root) = workspace();
  write(&root, "lib/project.yaml", "name: lib\n");
  write(&root, "lib/src/Util.java", "class Util {}");
  write(&root, "lib/dist/lib.conf", "x");
  write(&root, "app/project.yaml", "dependencies: [../lib]\n");
  write(&root, "app/src/Main.java", "class Main {}");

  builder(&FakeCompiler::default()).build(root.join("app")).unwrap();

  assert!(root.join("target/app/dist/lib.conf").is_file());
  assert!(root.join("target/app/dist/lib.jar").is_file());
  assert!(!root.join("target/app/dist/dist").exists());
}
