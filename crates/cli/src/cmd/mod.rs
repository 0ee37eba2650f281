mod build;
mod classpath;
mod graph;
mod resolve;

pub use build::cmd_build;
pub use classpath::cmd_classpath;
pub use graph::cmd_graph;
pub use resolve::cmd_resolve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use scar_lib::resolve::Resolver;
use scar_lib::settings;

/// The project path named on the command line, accepting the `file=<path>` form.
fn project_path(arg: &str) -> PathBuf {
  PathBuf::from(arg.strip_prefix("file=").unwrap_or(arg))
}

/// A resolver carrying the user's `defaults.yaml`, when there is one.
fn resolver() -> Result<Resolver> {
  let defaults = settings::load_user_defaults().context("Failed to load user defaults")?;
  Ok(match defaults {
    Some(defaults) => {
      debug!(path = ?settings::user_defaults_path(), "using user defaults");
      Resolver::with_user_defaults(defaults)
    }
    None => Resolver::new(),
  })
}
