//! Implementation of the `scar classpath` command.

use anyhow::{Context, Result};

use scar_lib::paths::classpath_separator;
use scar_lib::resolve::ClasspathMode;

use super::{project_path, resolver};

/// Print the declared classpath of the project at `path`, joined with the
/// platform separator.
pub fn cmd_classpath(path: &str) -> Result<()> {
  let path = project_path(path);
  let mut resolver = resolver()?;
  let project = resolver
    .resolve(&path)
    .with_context(|| format!("Failed to resolve {}", path.display()))?;
  let classpath = resolver
    .classpath(&project, ClasspathMode::Declared)
    .context("Failed to compute classpath")?;

  println!("{}", classpath.join(classpath_separator()));
  Ok(())
}
