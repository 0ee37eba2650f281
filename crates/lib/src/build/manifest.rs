//! Generated `META-INF/MANIFEST.MF` content.

/// Longest manifest line in bytes, excluding the line break.
const MAX_LINE_BYTES: usize = 72;

/// Main attributes of a jar manifest, written in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarManifest {
  attributes: Vec<(String, String)>,
}

impl Default for JarManifest {
  fn default() -> Self {
    Self {
      attributes: vec![("Manifest-Version".to_string(), "1.0".to_string())],
    }
  }
}

impl JarManifest {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set an attribute, replacing an existing one of the same name.
  pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
    let name = name.into();
    let value = value.into();
    match self.attributes.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
      Some(existing) => existing.1 = value,
      None => self.attributes.push((name, value)),
    }
    self
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .attributes
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  /// Manifest for an executable jar: the jar itself, its directory and every
  /// classpath entry, relative to the directory the jar runs from.
  pub fn executable<S: AsRef<str>>(main_class: &str, jar_name: &str, classpath: &[S]) -> Self {
    let mut class_path = format!("{} .", jar_name);
    for entry in classpath {
      class_path.push(' ');
      class_path.push_str(entry.as_ref());
    }

    let mut manifest = Self::new();
    manifest.set("Main-Class", main_class).set("Class-Path", class_path);
    manifest
  }

  /// Render with CRLF line breaks, continuing long lines with a leading space.
  pub fn render(&self) -> String {
    let mut out = String::new();
    for (name, value) in &self.attributes {
      write_wrapped(&mut out, &format!("{}: {}", name, value));
    }
    out.push_str("\r\n");
    out
  }
}

fn write_wrapped(out: &mut String, line: &str) {
  let mut limit = MAX_LINE_BYTES;
  let mut width = 0;
  for ch in line.chars() {
    let len = ch.len_utf8();
    if width + len > limit {
      out.push_str("\r\n ");
      // continuation lines spend one byte on the leading space
      limit = MAX_LINE_BYTES - 1;
      width = 0;
    }
    out.push(ch);
    width += len;
  }
  out.push_str("\r\n");
}
