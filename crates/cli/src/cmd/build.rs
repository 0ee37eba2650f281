//! Implementation of the `scar build` command.

use std::time::Instant;

use anyhow::{Context, Result};

use scar_lib::build::Builder;
use scar_lib::toolchain::Toolchain;

use super::{project_path, resolver};
use crate::output::{format_duration, print_stat, print_success};

/// Build the project at `path` and everything it depends on.
///
/// Prints each built project in completion order.
pub fn cmd_build(path: &str) -> Result<()> {
  let path = project_path(path);
  let start = Instant::now();

  let mut builder = Builder::new(resolver()?, Toolchain::system());
  let report = builder
    .build(&path)
    .with_context(|| format!("Build failed for {}", path.display()))?;

  for name in &report.built {
    let stages: Vec<String> = report.stages_for(name).iter().map(ToString::to_string).collect();
    print_stat(name, &stages.join(", "));
  }
  print_success(&format!(
    "Built {} project(s) in {}",
    report.built.len(),
    format_duration(start.elapsed())
  ));
  Ok(())
}
