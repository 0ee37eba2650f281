//! Implementation of the `scar resolve` command.

use anyhow::{Context, Result};

use super::{project_path, resolver};
use crate::output::{print_info, print_json, print_stat};

/// Print the fully layered configuration of the project at `path`.
pub fn cmd_resolve(path: &str, json: bool) -> Result<()> {
  let path = project_path(path);
  let project = resolver()?
    .resolve(&path)
    .with_context(|| format!("Failed to resolve {}", path.display()))?;

  if json {
    let json_output = serde_json::json!({
      "name": project.name(),
      "location": project.location(),
      "dir": project.dir(),
      "config": project.store().data(),
      "document": project.document(),
    });
    return print_json(&json_output);
  }

  print_info(&format!("{} ({})", project.name(), project.location().display()));
  for (key, value) in project.store().data() {
    print_stat(key, &value.to_string());
  }
  if project.document().is_some() {
    print_stat("document", "yes");
  }
  Ok(())
}
