use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use scar_lib::build::Builder;
use scar_lib::resolve::Resolver;
use scar_lib::toolchain::{CompileOutput, CompileRequest, Compiler, ToolError, Toolchain, ZipArchiver};

/// Writes a `.class` file per source into the output directory and records
/// every request it receives.
#[derive(Clone, Default)]
pub struct FakeCompiler {
  pub requests: Rc<RefCell<Vec<CompileRequest>>>,
}

impl FakeCompiler {
  /// Number of compilations whose output went below `dir`.
  pub fn compiled_into(&self, dir: &Path) -> usize {
    self
      .requests
      .borrow()
      .iter()
      .filter(|r| r.output_dir.starts_with(dir))
      .count()
  }
}

impl Compiler for FakeCompiler {
  fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, ToolError> {
    self.requests.borrow_mut().push(request.clone());
    for source in &request.sources {
      let stem = source.file_stem().unwrap().to_string_lossy();
      fs::write(request.output_dir.join(format!("{}.class", stem)), b"class").unwrap();
    }
    Ok(CompileOutput {
      success: true,
      ..CompileOutput::default()
    })
  }
}

pub fn builder(compiler: &FakeCompiler) -> Builder {
  Builder::new(
    Resolver::new(),
    Toolchain::new(Box::new(compiler.clone()), Box::new(ZipArchiver)),
  )
  .with_default_target("1.8")
}

pub fn write(root: &Path, relative: &str, content: &str) {
  let path = root.join(relative);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

/// A temporary workspace with a canonical root path.
pub fn workspace() -> (tempfile::TempDir, std::path::PathBuf) {
  let temp = tempfile::TempDir::new().unwrap();
  let root = dunce::canonicalize(temp.path()).unwrap();
  (temp, root)
}

pub fn jar_entries(jar: &Path) -> Vec<String> {
  let archive = zip::ZipArchive::new(fs::File::open(jar).unwrap()).unwrap();
  archive.file_names().map(String::from).collect()
}
