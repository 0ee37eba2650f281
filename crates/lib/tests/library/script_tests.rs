use scar_lib::build::{BuildError, Stage};

use super::common::{FakeCompiler, builder, jar_entries, workspace, write};

#[test]
fn document_replaces_default_pipeline() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "name: app\n---\nscar.log.info('nothing to build')\n");
  write(&root, "app/src/Main.java", "class Main {}");

  let compiler = FakeCompiler::default();
  let report = builder(&compiler).build(root.join("app")).unwrap();

  assert_eq!(report.stages_for("app"), vec![Stage::ExecuteDocument]);
  assert_eq!(report.built, vec!["app"]);
  assert!(compiler.requests.borrow().is_empty());
  assert!(!root.join("target/app").exists());
}

#[test]
fn document_reads_configuration() {
  let (_temp, root) = workspace();
  write(
    &root,
    "app/project.yaml",
    r#"name: app
version: "3.1"
---
assert(project.name == "app", "project table")
assert(project.dir ~= nil, "project dir")
assert(scar.get("version") == "3.1", "get")
assert(scar.get("missing", "fallback") == "fallback", "default")
assert(scar.format("$name$-$version$") == "app-3.1", "format")
assert(#scar.paths("source") == 1, "paths")
"#,
  );
  write(&root, "app/src/Main.java", "class Main {}");

  builder(&FakeCompiler::default()).build(root.join("app")).unwrap();
}

#[test]
fn document_can_run_stages_with_changed_configuration() {
  let (_temp, root) = workspace();
  write(
    &root,
    "app/project.yaml",
    r#"name: app
---
scar.set("main", "app.Main")
scar.build_dependencies()
scar.clean()
scar.compile()
local jar = scar.jar()
assert(jar ~= nil and jar:find("app.jar", 1, true), "jar path")
scar.dist()
"#,
  );
  write(&root, "app/src/Main.java", "class Main {}");

  let report = builder(&FakeCompiler::default()).build(root.join("app")).unwrap();

  assert_eq!(
    report.stages_for("app"),
    vec![
      Stage::ExecuteDocument,
      Stage::BuildDependencies,
      Stage::Clean,
      Stage::Compile,
      Stage::Package,
      Stage::Dist
    ]
  );
  let entries = jar_entries(&root.join("target/app/app.jar"));
  assert!(entries.contains(&"META-INF/MANIFEST.MF".to_string()));
  assert!(root.join("target/app/dist/app.jar").is_file());
}

#[test]
fn document_can_delegate_to_the_default_pipeline() {
  let (_temp, root) = workspace();
  write(&root, "lib/project.yaml", "name: lib\n---\nscar.build()\n");
  write(&root, "lib/src/Util.java", "class Util {}");
  write(&root, "app/project.yaml", "dependencies: [../lib]\n");
  write(&root, "app/src/Main.java", "class Main {}");

  let report = builder(&FakeCompiler::default()).build(root.join("app")).unwrap();

  assert_eq!(report.built, vec!["lib", "app"]);
  assert!(root.join("target/lib/lib.jar").is_file());
  assert!(root.join("target/app/dist/lib.jar").is_file());
}

#[test]
fn document_classpath_lists_built_dependencies() {
  let (_temp, root) = workspace();
  write(&root, "lib/project.yaml", "name: lib\n");
  write(&root, "lib/src/Util.java", "class Util {}");
  write(
    &root,
    "app/project.yaml",
    r#"dependencies: [../lib]
---
scar.build_dependencies()
local classpath = scar.classpath()
assert(#classpath == 1, "one entry")
assert(classpath[1]:find("lib.jar", 1, true), "lib jar")
"#,
  );

  builder(&FakeCompiler::default()).build(root.join("app")).unwrap();
}

#[test]
fn lua_errors_become_script_errors() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "name: app\n---\nerror('boom')\n");

  let err = builder(&FakeCompiler::default()).build(root.join("app")).unwrap_err();

  let BuildError::Script { project, message } = &err else {
    panic!("expected script error, got {:?}", err);
  };
  assert_eq!(project, "app");
  assert!(message.contains("boom"));
}

#[test]
fn stage_errors_surface_through_the_document() {
  let (_temp, root) = workspace();
  write(&root, "lib/project.yaml", "name: lib\n");
  write(&root, "app/project.yaml", "dependencies: [../lib]\n---\nscar.compile()\n");

  let err = builder(&FakeCompiler::default()).build(root.join("app")).unwrap_err();

  let BuildError::Script { message, .. } = &err else {
    panic!("expected script error, got {:?}", err);
  };
  assert!(message.contains("has not been built"), "{}", message);
}

#[test]
fn blank_document_runs_the_default_pipeline() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "name: app\n---\n\n   \n");
  write(&root, "app/src/Main.java", "class Main {}");

  let report = builder(&FakeCompiler::default()).build(root.join("app")).unwrap();

  assert_eq!(report.stages_for("app")[0], Stage::BuildDependencies);
  assert!(root.join("target/app/app.jar").is_file());
}
