use scar_lib::config::{ConfigStore, Value};
use scar_lib::resolve::{ClasspathMode, ProjectGraph, ResolveError, Resolver};

use super::common::{workspace, write};

#[test]
fn structural_defaults_name_and_target() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "version: 2\n");

  let project = Resolver::new().resolve(root.join("app")).unwrap();
  assert_eq!(project.name(), "app");
  assert_eq!(project.target(), root.join("target/app"));
  assert_eq!(project.jar_path(), root.join("target/app/app-2.jar"));
}

#[test]
fn ancestor_includes_apply_farthest_first() {
  let (_temp, root) = workspace();
  write(&root, "include.yaml", "compileTarget: \"11\"\nvendor: outer\nclasspath: [\"vendor|*.jar\"]\n");
  write(&root, "group/include.yaml", "vendor: inner\n");
  write(&root, "group/app/project.yaml", "name: app\n");

  let project = Resolver::new().resolve(root.join("group/app")).unwrap();
  let store = project.store();
  assert_eq!(store.get_string("vendor").as_deref(), Some("inner"));
  assert_eq!(store.get_string("compileTarget").as_deref(), Some("11"));
  let classpath = store.get_list("classpath", &[]);
  assert_eq!(classpath[..2], ["lib|**/*.jar", "libs|**/*.jar"]);
  assert!(classpath.contains(&"vendor|*.jar".to_string()));
}

#[test]
fn explicit_include_without_extension_and_without_its_document() {
  let (_temp, root) = workspace();
  write(&root, "shared.yaml", "dist: shared-dist\n---\nerror('never run')\n");
  write(&root, "app/project.yaml", "include: ../shared\n");

  let project = Resolver::new().resolve(root.join("app")).unwrap();
  assert_eq!(project.store().get_string("dist").as_deref(), Some("shared-dist"));
  assert!(project.document().is_none());
}

#[test]
fn project_file_overrides_user_defaults() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "compileTarget: \"21\"\n");
  write(&root, "other/project.yaml", "name: other\n");

  let mut defaults = ConfigStore::new();
  defaults.set("compileTarget", "17");
  defaults.set("author", "team");
  let mut resolver = Resolver::with_user_defaults(defaults);

  let app = resolver.resolve(root.join("app")).unwrap();
  assert_eq!(app.store().get_string("compileTarget").as_deref(), Some("21"));
  assert_eq!(app.store().get_string("author").as_deref(), Some("team"));

  let other = resolver.resolve(root.join("other")).unwrap();
  assert_eq!(other.store().get_string("compileTarget").as_deref(), Some("17"));
}

#[test]
fn dir_placeholder_is_the_project_directory() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "generated: $dir$/gen\n");

  let project = Resolver::new().resolve(root.join("app")).unwrap();
  let expected = format!("{}/gen", root.join("app").to_string_lossy());
  assert_eq!(project.store().get_string("generated"), Some(expected));
}

#[test]
fn templates_expand_against_resolved_values() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "version: \"1.0\"\nbanner: $name$ $version$\n");

  let project = Resolver::new().resolve(root.join("app")).unwrap();
  let banner = project.store().get_str("banner", "");
  assert_eq!(project.store().format(&banner), "app 1.0");
}

#[test]
fn jar_on_classpath_shadows_dependency() {
  let (_temp, root) = workspace();
  write(&root, "util/project.yaml", "name: util\n");
  write(&root, "app/project.yaml", "dependencies: [../util]\n");
  write(&root, "app/lib/util-1.0.jar", "jar");

  let mut resolver = Resolver::new();
  let app = resolver.resolve(root.join("app")).unwrap();
  assert!(app.dependencies().is_empty());

  let classpath = resolver.classpath(&app, ClasspathMode::Built).unwrap();
  assert!(classpath.contains(&root.join("app/lib/util-1.0.jar")));
}

#[test]
fn built_classpath_requires_built_dependencies() {
  let (_temp, root) = workspace();
  write(&root, "lib/project.yaml", "name: lib\n");
  write(&root, "app/project.yaml", "dependencies: [../lib]\n");

  let mut resolver = Resolver::new();
  let app = resolver.resolve(root.join("app")).unwrap();

  assert!(resolver.classpath(&app, ClasspathMode::Declared).unwrap().is_empty());

  let err = resolver.classpath(&app, ClasspathMode::Built).unwrap_err();
  let ResolveError::DependencyNotBuilt { dependency, target, .. } = err else {
    panic!("expected DependencyNotBuilt, got {:?}", err);
  };
  assert_eq!(dependency, "../lib");
  assert_eq!(target, root.join("target/lib"));
}

#[test]
fn dependency_cycle_is_reported() {
  let (_temp, root) = workspace();
  write(&root, "a/project.yaml", "dependencies: [../b]\n");
  write(&root, "b/project.yaml", "dependencies: [../a]\n");

  let err = Resolver::new().resolve(root.join("a")).unwrap_err();
  let ResolveError::Cycle { chain } = &err else {
    panic!("expected cycle, got {:?}", err);
  };
  assert_eq!(chain.first(), chain.last());
  assert!(err.to_string().contains(" -> "));
}

#[test]
fn include_cycle_is_reported() {
  let (_temp, root) = workspace();
  write(&root, "one.yaml", "include: two\n");
  write(&root, "two.yaml", "include: one\n");
  write(&root, "app/project.yaml", "include: ../one\n");

  let err = Resolver::new().resolve(root.join("app")).unwrap_err();
  assert!(matches!(err, ResolveError::Cycle { .. }), "got {:?}", err);
}

#[test]
fn missing_include_names_the_include() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "include: ../nowhere\n");

  let err = Resolver::new().resolve(root.join("app")).unwrap_err();
  assert!(matches!(err, ResolveError::Include { .. }), "got {:?}", err);
  assert!(err.to_string().contains("nowhere"));
}

#[test]
fn graph_orders_shared_dependency_first() {
  let (_temp, root) = workspace();
  write(&root, "a/project.yaml", "dependencies: [../b, ../c]\n");
  write(&root, "b/project.yaml", "dependencies: [../d]\n");
  write(&root, "c/project.yaml", "dependencies: [../d]\n");
  write(&root, "d/project.yaml", "name: d\n");

  let mut resolver = Resolver::new();
  let a = resolver.resolve(root.join("a")).unwrap();
  let graph = ProjectGraph::discover(&mut resolver, &a).unwrap();
  assert_eq!(graph.len(), 4);

  let order: Vec<&str> = graph.build_order().unwrap().into_iter().map(|n| n.name.as_str()).collect();
  assert_eq!(order.first(), Some(&"d"));
  assert_eq!(order.last(), Some(&"a"));
}

#[test]
fn null_values_are_present_but_unset() {
  let (_temp, root) = workspace();
  write(&root, "app/project.yaml", "main: ~\n");

  let project = Resolver::new().resolve(root.join("app")).unwrap();
  assert!(project.store().has("main"));
  assert!(!project.store().is_set("main"));
  assert_eq!(project.store().get("main"), Some(&Value::Null));
}
