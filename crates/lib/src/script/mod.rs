//! Lua host for project documents.
//!
//! A project's document replaces the default pipeline. It runs with two globals:
//!
//! - `project`: a snapshot table of the resolved configuration, plus
//!   `project.dir` and `project.location`
//! - `scar`: the operations a document may perform
//!
//! ```lua
//! scar.build_dependencies()
//! scar.clean()
//! scar.set("main", "com.example.Main")
//! scar.compile()
//! local jar = scar.jar()
//! scar.dist()
//! scar.upload { host = "deploy.example.org", dir = "/srv/app", files = { jar } }
//! ```
//!
//! | Function | Effect |
//! |----------|--------|
//! | `scar.get(key[, default])` | configuration value, or `default` when absent or null |
//! | `scar.set(key, value)` | change the configuration later stages see |
//! | `scar.path(p)` / `scar.format(text)` | path resolution and `$key$` templating |
//! | `scar.paths(key)` | files matched by the globs under `key` |
//! | `scar.classpath()` | the built classpath |
//! | `scar.build_dependencies()`, `scar.clean()`, `scar.compile()`, `scar.jar()`, `scar.dist()` | single stages |
//! | `scar.build()` | the whole default pipeline |
//! | `scar.upload{...}` / `scar.ssh{...}` | publish with `scp` / run with `ssh` |
//! | `scar.log.<level>(msg)` | log through the host |

mod convert;

pub use convert::{from_lua, to_lua};

use std::cell::RefCell;
use std::path::PathBuf;

use mlua::prelude::*;
use tracing::{debug, error, info, trace, warn};

use crate::build::{BuildError, BuildRun, Builder};
use crate::config::Value;
use crate::resolve::{ClasspathMode, ResolvedProject};
use crate::toolchain::{Publisher, Remote, ScpPublisher, SshRunner};

/// Everything a running document can reach.
struct ScriptCtx<'a> {
  builder: &'a mut Builder,
  run: &'a mut BuildRun,
  project: ResolvedProject,
}

/// Run `project`'s document. A project without one is a no-op.
pub fn execute_document(builder: &mut Builder, run: &mut BuildRun, project: &ResolvedProject) -> Result<(), BuildError> {
  let Some(document) = project.document() else {
    return Ok(());
  };

  let name = project.name();
  let chunk_name = format!("@{}", project.location().display());
  debug!(project = %name, chunk = %chunk_name, "loading document");

  let ctx = RefCell::new(ScriptCtx {
    builder,
    run,
    project: project.clone(),
  });

  let lua = Lua::new();
  let result = lua.scope(|scope| {
    let scar = lua.create_table()?;

    scar.set(
      "get",
      scope.create_function(|lua, (key, default): (String, LuaValue)| {
        let ctx = ctx.try_borrow().map_err(LuaError::external)?;
        match ctx.project.store().get(&key) {
          Some(value) if !value.is_null() => to_lua(lua, value),
          _ => Ok(default),
        }
      })?,
    )?;

    scar.set(
      "set",
      scope.create_function(|_, (key, value): (String, LuaValue)| {
        let value = from_lua(value)?;
        let mut ctx = ctx.try_borrow_mut().map_err(LuaError::external)?;
        ctx.project.store_mut().set(key, value);
        Ok(())
      })?,
    )?;

    scar.set(
      "path",
      scope.create_function(|_, path: String| {
        let ctx = ctx.try_borrow().map_err(LuaError::external)?;
        Ok(ctx.project.store().path(&path))
      })?,
    )?;

    scar.set(
      "format",
      scope.create_function(|_, text: String| {
        let ctx = ctx.try_borrow().map_err(LuaError::external)?;
        Ok(ctx.project.store().format(&text))
      })?,
    )?;

    scar.set(
      "paths",
      scope.create_function(|_, key: String| {
        with_ctx(&ctx, |c| {
          let paths = c.project.store().get_paths(&key)?;
          Ok(display_paths(paths.paths()))
        })
      })?,
    )?;

    scar.set(
      "classpath",
      scope.create_function(|_, ()| {
        with_ctx(&ctx, |c| {
          let classpath = c.builder.resolver_mut().classpath(&c.project, ClasspathMode::Built)?;
          Ok(display_paths(classpath.paths()))
        })
      })?,
    )?;

    scar.set(
      "build_dependencies",
      scope.create_function(|_, ()| with_ctx(&ctx, |c| c.builder.build_dependencies(&c.project, c.run)))?,
    )?;

    scar.set(
      "clean",
      scope.create_function(|_, ()| with_ctx(&ctx, |c| c.builder.clean(&c.project, c.run)))?,
    )?;

    scar.set(
      "compile",
      scope.create_function(|_, ()| {
        with_ctx(&ctx, |c| {
          let classes = c.builder.compile(&c.project, c.run)?;
          Ok(classes.display().to_string())
        })
      })?,
    )?;

    scar.set(
      "jar",
      scope.create_function(|_, ()| {
        with_ctx(&ctx, |c| {
          let jar = c.builder.package(&c.project, c.run)?;
          Ok(jar.map(|p| p.display().to_string()))
        })
      })?,
    )?;

    scar.set(
      "dist",
      scope.create_function(|_, ()| {
        with_ctx(&ctx, |c| {
          let dist = c.builder.dist(&c.project, c.run)?;
          Ok(dist.map(|p| p.display().to_string()))
        })
      })?,
    )?;

    scar.set(
      "build",
      scope.create_function(|_, ()| with_ctx(&ctx, |c| c.builder.build_project(&c.project, c.run)))?,
    )?;

    scar.set(
      "upload",
      scope.create_function(|lua, options: LuaTable| {
        let remote = remote_from(&options)?;
        let dir: String = required(&options, "dir")?;
        let files: Vec<String> = match options.get::<LuaValue>("files")? {
          LuaValue::Nil => Vec::new(),
          LuaValue::String(s) => vec![s.to_str()?.to_string()],
          other => Vec::<String>::from_lua(other, lua)?,
        };

        let ctx = ctx.try_borrow().map_err(LuaError::external)?;
        let files: Vec<PathBuf> = files.iter().map(|f| PathBuf::from(ctx.project.store().path(f))).collect();
        ScpPublisher::new(remote)
          .upload(&files, &dir)
          .map_err(|e| LuaError::external(e.to_string()))
      })?,
    )?;

    scar.set(
      "ssh",
      scope.create_function(|_, options: LuaTable| {
        let remote = remote_from(&options)?;
        let command: String = required(&options, "command")?;
        SshRunner::new(remote)
          .run(&command)
          .map_err(|e| LuaError::external(e.to_string()))
      })?,
    )?;

    scar.set("log", log_table(&lua, &name)?)?;

    let globals = lua.globals();
    globals.set("scar", scar)?;
    globals.set("project", project_table(&lua, project)?)?;

    lua.load(document).set_name(chunk_name.as_str()).exec()
  });

  result.map_err(|e| BuildError::Script {
    project: name,
    message: e.to_string(),
  })
}

/// Run `f` with exclusive access to the context, surfacing build errors to Lua.
fn with_ctx<T>(
  ctx: &RefCell<ScriptCtx<'_>>,
  f: impl FnOnce(&mut ScriptCtx<'_>) -> Result<T, BuildError>,
) -> LuaResult<T> {
  let mut ctx = ctx.try_borrow_mut().map_err(LuaError::external)?;
  f(&mut ctx).map_err(|e| LuaError::external(e.to_string()))
}

fn display_paths(paths: Vec<PathBuf>) -> Vec<String> {
  paths.into_iter().map(|p| p.display().to_string()).collect()
}

fn required<T: FromLua>(table: &LuaTable, key: &str) -> LuaResult<T> {
  table
    .get::<Option<T>>(key)?
    .ok_or_else(|| LuaError::external(format!("'{}' is required", key)))
}

fn remote_from(options: &LuaTable) -> LuaResult<Remote> {
  Ok(Remote {
    host: required(options, "host")?,
    user: options.get("user")?,
    port: options.get("port")?,
    jump: options.get("jump")?,
  })
}

fn project_table(lua: &Lua, project: &ResolvedProject) -> LuaResult<LuaTable> {
  let table = match to_lua(lua, &Value::Map(project.store().data().clone()))? {
    LuaValue::Table(table) => table,
    _ => lua.create_table()?,
  };
  if let Some(dir) = project.dir() {
    table.set("dir", dir.display().to_string())?;
  }
  table.set("location", project.location().display().to_string())?;
  Ok(table)
}

fn log_table(lua: &Lua, project: &str) -> LuaResult<LuaTable> {
  let log = lua.create_table()?;

  macro_rules! level {
    ($name:literal, $macro:ident) => {{
      let project = project.to_string();
      log.set(
        $name,
        lua.create_function(move |_, message: String| {
          $macro!(project = %project, "{}", message);
          Ok(())
        })?,
      )?;
    }};
  }

  level!("trace", trace);
  level!("debug", debug);
  level!("info", info);
  level!("warn", warn);
  level!("error", error);
  Ok(log)
}
