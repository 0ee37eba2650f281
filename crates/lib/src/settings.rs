//! Tool settings read from the environment.

use std::path::PathBuf;

use crate::config::{ConfigError, ConfigStore};
use crate::consts::{APP_NAME, DEFAULT_COMPILE_TARGET};

pub const CONFIG_DIR_ENV: &str = "SCAR_CONFIG_DIR";
pub const JAVAC_ENV: &str = "SCAR_JAVAC";
pub const COMPILE_TARGET_ENV: &str = "SCAR_COMPILE_TARGET";

/// File in the config directory holding user-wide project defaults.
pub const USER_DEFAULTS_FILE: &str = "defaults.yaml";

fn env_path(name: &str) -> Option<PathBuf> {
  std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  env_path("USERPROFILE")
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  env_path("HOME")
}

/// Returns the directory for configuration files for the application
#[cfg(windows)]
pub fn config_dir() -> Option<PathBuf> {
  env_path(CONFIG_DIR_ENV).or_else(|| env_path("APPDATA").map(|p| p.join(APP_NAME)))
}

/// Returns the directory for configuration files for the application
#[cfg(not(windows))]
pub fn config_dir() -> Option<PathBuf> {
  env_path(CONFIG_DIR_ENV).or_else(|| {
    env_path("XDG_CONFIG_HOME")
      .or_else(|| home_dir().map(|home| home.join(".config")))
      .map(|config_home| config_home.join(APP_NAME))
  })
}

pub fn user_defaults_path() -> Option<PathBuf> {
  config_dir().map(|dir| dir.join(USER_DEFAULTS_FILE))
}

/// Load the user defaults file, if there is one.
pub fn load_user_defaults() -> Result<Option<ConfigStore>, ConfigError> {
  match user_defaults_path() {
    Some(path) if path.is_file() => crate::project::load(&path).map(Some),
    _ => Ok(None),
  }
}

/// The `javac` to run: `SCAR_JAVAC`, then `$JAVA_HOME/bin/javac`, then `javac` on `PATH`.
pub fn javac_path() -> PathBuf {
  let binary = if cfg!(windows) { "javac.exe" } else { "javac" };
  env_path(JAVAC_ENV)
    .or_else(|| env_path("JAVA_HOME").map(|home| home.join("bin").join(binary)))
    .unwrap_or_else(|| PathBuf::from(binary))
}

/// Language level used when a project has no `compileTarget`.
pub fn compile_target() -> String {
  std::env::var(COMPILE_TARGET_ENV)
    .ok()
    .filter(|v| !v.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_COMPILE_TARGET.to_string())
}
