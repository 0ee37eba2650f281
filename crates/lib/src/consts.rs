pub const APP_NAME: &str = "scar";

/// File name looked up when a project path names a directory.
pub const PROJECT_FILE_NAME: &str = "project.yaml";

/// File name picked up from ancestor directories as an implicit include.
pub const INCLUDE_FILE_NAME: &str = "include.yaml";

pub const PROJECT_FILE_EXTENSION: &str = "yaml";

/// Line separating declarative configuration from the trailing document.
pub const DOCUMENT_SENTINEL: &str = "---";

/// Placeholder substituted with the directory of the file being loaded.
pub const DIR_PLACEHOLDER: &str = "$dir$";

/// Delimiter around template placeholders, as in `$name$`.
pub const TEMPLATE_DELIMITER: char = '$';

/// Separator between a directory and its glob patterns, as in `src|**/*.java`.
pub const GLOB_SEPARATOR: char = '|';

pub const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

pub const DEFAULT_COMPILE_TARGET: &str = "1.8";
