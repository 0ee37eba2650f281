//! Template parsing and substitution for `$key$` placeholders.
//!
//! A placeholder is a non-empty run of characters between two `$` delimiters.
//! Its value comes from the surrounding configuration:
//!
//! - a string value is itself formatted before it is inserted
//! - any other non-null value is inserted with its `Display` rendering
//! - an absent or null key is replaced by the bare key name
//!
//! A delimiter with no partner (`cost: $5`) or an empty pair (`$$`) is kept as
//! literal text.
//!
//! # Example
//!
//! ```
//! use scar_lib::config::format::{parse, Segment};
//!
//! let segments = parse("$target$/classes");
//! assert_eq!(segments, vec![Segment::Placeholder("target"), Segment::Literal("/classes")]);
//! ```

use indexmap::IndexMap;

use super::value::Value;
use crate::consts::TEMPLATE_DELIMITER;

/// A segment of parsed template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
  /// Literal text (no placeholders)
  Literal(&'a str),

  /// The key named between two delimiters
  Placeholder(&'a str),
}

/// Split `input` into literal and placeholder segments.
pub fn parse(input: &str) -> Vec<Segment<'_>> {
  let mut segments = Vec::new();
  let mut literal_start = 0;
  let mut pos = 0;

  while let Some(offset) = input[pos..].find(TEMPLATE_DELIMITER) {
    let open = pos + offset;
    let name_start = open + TEMPLATE_DELIMITER.len_utf8();

    let Some(close_offset) = input[name_start..].find(TEMPLATE_DELIMITER) else {
      break;
    };
    let close = name_start + close_offset;

    if close == name_start {
      // "$$": the first delimiter is literal, the second may open a placeholder
      pos = close;
      continue;
    }

    if literal_start < open {
      segments.push(Segment::Literal(&input[literal_start..open]));
    }
    segments.push(Segment::Placeholder(&input[name_start..close]));

    pos = close + TEMPLATE_DELIMITER.len_utf8();
    literal_start = pos;
  }

  if literal_start < input.len() {
    segments.push(Segment::Literal(&input[literal_start..]));
  }

  segments
}

/// Substitute every placeholder in `text` with values from `data`.
///
/// Text without placeholders, and text whose substitution comes out empty, is
/// returned unchanged.
pub fn format(text: &str, data: &IndexMap<String, Value>) -> String {
  let mut visiting = Vec::new();
  format_inner(text, data, &mut visiting)
}

fn format_inner<'a>(text: &'a str, data: &'a IndexMap<String, Value>, visiting: &mut Vec<&'a str>) -> String {
  let segments = parse(text);
  if !segments.iter().any(|s| matches!(s, Segment::Placeholder(_))) {
    return text.to_string();
  }

  let mut out = String::with_capacity(text.len());
  for segment in segments {
    match segment {
      Segment::Literal(literal) => out.push_str(literal),
      Segment::Placeholder(name) if visiting.contains(&name) => out.push_str(name),
      Segment::Placeholder(name) => match data.get(name) {
        Some(Value::String(value)) => {
          visiting.push(name);
          out.push_str(&format_inner(value, data, visiting));
          visiting.pop();
        }
        Some(Value::Null) | None => out.push_str(name),
        Some(value) => out.push_str(&value.to_string()),
      },
    }
  }

  if out.is_empty() { text.to_string() } else { out }
}
