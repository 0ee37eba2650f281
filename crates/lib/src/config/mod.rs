//! Layered project configuration.
//!
//! A [`ConfigStore`] is an ordered key/value document with typed accessors,
//! `$key$` templating, path resolution against a base directory, and two ways
//! of layering one store on top of another:
//!
//! - [`ConfigStore::replace`] overwrites every incoming key
//! - [`ConfigStore::merge`] overwrites scalars but appends lists and merges maps
//!
//! Stores are produced by [`crate::project::load`] and layered by
//! [`crate::resolve::Resolver`].

pub mod format;
mod store;
pub mod value;

pub use store::ConfigStore;
pub use value::Value;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("project not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error("cannot read project file '{}': {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed project file '{}': {message}", path.display())]
  Malformed { path: PathBuf, message: String },

  #[error("project '{project}' is missing required key '{key}'")]
  MissingKey { project: String, key: String },
}
