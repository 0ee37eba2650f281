//! scar-lib: project configuration, dependency resolution and build
//! orchestration for Scar.
//!
//! - `config`: layered key/value project configuration with `$key$` templating
//! - `project`: reading one project file and its trailing document
//! - `resolve`: includes, defaults, dependency classpaths and the project graph
//! - `build`: the clean/compile/package/dist pipeline
//! - `script`: the Lua host that runs project documents
//! - `toolchain`: compiler, archiver, process and publishing collaborators

pub mod build;
pub mod config;
pub mod consts;
pub mod paths;
pub mod project;
pub mod resolve;
pub mod script;
pub mod settings;
pub mod toolchain;
