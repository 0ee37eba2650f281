//! Implementation of the `scar graph` command.

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use scar_lib::resolve::ProjectGraph;

use super::{project_path, resolver};

/// Print the projects reachable from `path`, dependencies first.
pub fn cmd_graph(path: &str) -> Result<()> {
  let path = project_path(path);
  let mut resolver = resolver()?;
  let project = resolver
    .resolve(&path)
    .with_context(|| format!("Failed to resolve {}", path.display()))?;

  let graph = ProjectGraph::discover(&mut resolver, &project).context("Failed to read dependencies")?;
  for (index, node) in graph.build_order()?.into_iter().enumerate() {
    println!(
      "{:>3}. {} {}",
      index + 1,
      node.name,
      node.location.display().if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }
  Ok(())
}
