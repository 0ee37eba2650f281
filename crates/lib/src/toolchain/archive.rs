//! The archiver collaborator.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::ToolError;
use crate::consts::MANIFEST_ENTRY;

/// A file to store in an archive under a `/`-separated entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
  pub source: PathBuf,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
  pub output: PathBuf,
  pub entries: Vec<ArchiveEntry>,
  /// Generated manifest text. Takes precedence over a manifest among the entries.
  pub manifest: Option<String>,
}

impl ArchiveRequest {
  /// A request holding every file below `dir`, named relative to it.
  pub fn from_dir(output: impl Into<PathBuf>, dir: &Path, manifest: Option<String>) -> Result<Self, ToolError> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
      let entry = entry.map_err(|e| ToolError::Io {
        path: dir.to_path_buf(),
        source: e.into(),
      })?;
      if !entry.file_type().is_file() {
        continue;
      }
      let name = entry
        .path()
        .strip_prefix(dir)
        .unwrap_or(entry.path())
        .to_string_lossy()
        .replace('\\', "/");
      entries.push(ArchiveEntry {
        source: entry.path().to_path_buf(),
        name,
      });
    }

    Ok(Self {
      output: output.into(),
      entries,
      manifest,
    })
  }

  /// Whether the entries already carry a manifest.
  pub fn has_manifest_entry(&self) -> bool {
    self.entries.iter().any(|e| e.name == MANIFEST_ENTRY)
  }
}

pub trait Archiver {
  fn archive(&self, request: &ArchiveRequest) -> Result<(), ToolError>;
}

/// Writes deflated zip (jar) archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
  fn archive(&self, request: &ArchiveRequest) -> Result<(), ToolError> {
    let output = &request.output;
    let parent = output.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(|source| ToolError::Io {
      path: parent.to_path_buf(),
      source,
    })?;

    debug!(output = %output.display(), entries = request.entries.len(), "writing archive");

    let temp = tempfile::NamedTempFile::new_in(parent).map_err(|source| ToolError::Io {
      path: parent.to_path_buf(),
      source,
    })?;
    let archive_err = |source| ToolError::Archive {
      path: output.clone(),
      source,
    };

    let mut writer = ZipWriter::new(temp.reopen().map_err(|source| ToolError::Io {
      path: temp.path().to_path_buf(),
      source,
    })?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest_entry = request.entries.iter().find(|e| e.name == MANIFEST_ENTRY);
    if request.manifest.is_some() || manifest_entry.is_some() {
      writer.add_directory("META-INF/", options).map_err(archive_err)?;
      writer.start_file(MANIFEST_ENTRY, options).map_err(archive_err)?;
      match (&request.manifest, manifest_entry) {
        (Some(text), _) => io::Write::write_all(&mut writer, text.as_bytes()).map_err(|source| ToolError::Io {
          path: output.clone(),
          source,
        })?,
        (None, Some(entry)) => copy_into(&mut writer, &entry.source)?,
        (None, None) => {}
      }
    }

    for entry in &request.entries {
      if entry.name == MANIFEST_ENTRY || entry.name == "META-INF/" {
        continue;
      }
      trace!(entry = %entry.name, "adding archive entry");
      writer.start_file(entry.name.as_str(), options).map_err(archive_err)?;
      copy_into(&mut writer, &entry.source)?;
    }

    writer.finish().map_err(archive_err)?;
    temp.persist(output).map_err(|e| ToolError::Io {
      path: output.clone(),
      source: e.error,
    })?;
    Ok(())
  }
}

fn copy_into(writer: &mut ZipWriter<File>, source: &Path) -> Result<(), ToolError> {
  let mut file = File::open(source).map_err(|e| ToolError::Io {
    path: source.to_path_buf(),
    source: e,
  })?;
  io::copy(&mut file, writer).map_err(|e| ToolError::Io {
    path: source.to_path_buf(),
    source: e,
  })?;
  Ok(())
}
