//! Dynamically-typed configuration values.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::{Deserialize, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

/// A configuration value as read from a project file or set by a script.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
  #[default]
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  String(String),
  List(Vec<Value>),
  Map(IndexMap<String, Value>),
}

impl Value {
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  /// True for every variant that is neither a list nor a map.
  pub fn is_scalar(&self) -> bool {
    !matches!(self, Value::List(_) | Value::Map(_))
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  /// Render a scalar as a string. Lists, maps and null yield `None`.
  pub fn to_scalar_string(&self) -> Option<String> {
    match self {
      Value::String(s) => Some(s.clone()),
      Value::Bool(b) => Some(b.to_string()),
      Value::Int(i) => Some(i.to_string()),
      Value::Float(f) => Some(f.to_string()),
      Value::Null | Value::List(_) | Value::Map(_) => None,
    }
  }

  pub fn to_int(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      Value::String(s) => s.trim().parse().ok(),
      _ => None,
    }
  }

  pub fn to_float(&self) -> Option<f64> {
    match self {
      Value::Float(f) => Some(*f),
      Value::Int(i) => Some(*i as f64),
      Value::String(s) => s.trim().parse().ok(),
      _ => None,
    }
  }

  pub fn to_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
      Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
      _ => None,
    }
  }

  /// Whether two values share a runtime type. Used by the merge rule.
  pub fn same_type(&self, other: &Value) -> bool {
    std::mem::discriminant(self) == std::mem::discriminant(other)
  }

  /// Apply `f` to every string nested in this value.
  pub fn map_strings(&mut self, f: &impl Fn(&str) -> String) {
    match self {
      Value::String(s) => *s = f(s),
      Value::List(items) => items.iter_mut().for_each(|item| item.map_strings(f)),
      Value::Map(map) => map.values_mut().for_each(|item| item.map_strings(f)),
      _ => {}
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => write!(f, "null"),
      Value::Bool(b) => write!(f, "{}", b),
      Value::Int(i) => write!(f, "{}", i),
      Value::Float(x) => write!(f, "{}", x),
      Value::String(s) => write!(f, "{}", s),
      Value::List(items) => {
        write!(f, "[")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}", item)?;
        }
        write!(f, "]")
      }
      Value::Map(map) => {
        write!(f, "{{")?;
        for (i, (key, item)) in map.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}: {}", key, item)?;
        }
        write!(f, "}}")
      }
    }
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::String(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::String(s)
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<f64> for Value {
  fn from(x: f64) -> Self {
    Value::Float(x)
  }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
  fn from(items: Vec<T>) -> Self {
    Value::List(items.into_iter().map(Into::into).collect())
  }
}

impl From<IndexMap<String, Value>> for Value {
  fn from(map: IndexMap<String, Value>) -> Self {
    Value::Map(map)
  }
}

/// Convert a parsed YAML document into a [`Value`].
///
/// Non-string mapping keys are rendered with their scalar text; tagged values
/// keep their inner value.
pub fn from_yaml(yaml: serde_yaml::Value) -> Value {
  match yaml {
    serde_yaml::Value::Null => Value::Null,
    serde_yaml::Value::Bool(b) => Value::Bool(b),
    serde_yaml::Value::Number(n) => match n.as_i64() {
      Some(i) => Value::Int(i),
      None => Value::Float(n.as_f64().unwrap_or_default()),
    },
    serde_yaml::Value::String(s) => Value::String(s),
    serde_yaml::Value::Sequence(items) => Value::List(items.into_iter().map(from_yaml).collect()),
    serde_yaml::Value::Mapping(mapping) => Value::Map(
      mapping
        .into_iter()
        .map(|(key, value)| (yaml_key(key), from_yaml(value)))
        .collect(),
    ),
    serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
  }
}

fn yaml_key(key: serde_yaml::Value) -> String {
  match from_yaml(key) {
    Value::String(s) => s,
    other => other.to_string(),
  }
}

/// Parse a YAML document into a [`Value`].
///
/// Numbers whose written text would not survive a round trip through `i64` or
/// `f64` (`1.0`, `1.10`, `010`) are kept as the string the author wrote.
pub fn parse_yaml(text: &str) -> Result<Value, serde_yaml::Error> {
  let shape: serde_yaml::Value = serde_yaml::from_str(text)?;
  WrittenText(&shape).deserialize(serde_yaml::Deserializer::from_str(text))
}

/// Walks the document a second time alongside its parsed shape so that number
/// nodes can be read back as their source text.
struct WrittenText<'a>(&'a serde_yaml::Value);

impl<'de> DeserializeSeed<'de> for WrittenText<'_> {
  type Value = Value;

  fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
    match self.0 {
      serde_yaml::Value::Number(number) => {
        let text = String::deserialize(deserializer)?;
        Ok(number_value(number, text))
      }
      serde_yaml::Value::Sequence(items) => deserializer.deserialize_seq(SequenceText(items)),
      serde_yaml::Value::Mapping(mapping) => deserializer.deserialize_map(MappingText(mapping)),
      other => {
        IgnoredAny::deserialize(deserializer)?;
        Ok(from_yaml(other.clone()))
      }
    }
  }
}

struct SequenceText<'a>(&'a [serde_yaml::Value]);

impl<'de> Visitor<'de> for SequenceText<'_> {
  type Value = Value;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a YAML sequence")
  }

  fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
    let mut items = Vec::with_capacity(self.0.len());
    for shape in self.0 {
      match seq.next_element_seed(WrittenText(shape))? {
        Some(item) => items.push(item),
        None => break,
      }
    }
    while seq.next_element::<IgnoredAny>()?.is_some() {}
    Ok(Value::List(items))
  }
}

struct MappingText<'a>(&'a serde_yaml::Mapping);

impl<'de> Visitor<'de> for MappingText<'_> {
  type Value = Value;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a YAML mapping")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
    let mut entries = IndexMap::with_capacity(self.0.len());
    for (key, shape) in self.0 {
      if map.next_key::<IgnoredAny>()?.is_none() {
        break;
      }
      entries.insert(yaml_key(key.clone()), map.next_value_seed(WrittenText(shape))?);
    }
    while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
    Ok(Value::Map(entries))
  }
}

fn number_value(number: &serde_yaml::Number, text: String) -> Value {
  let value = match number.as_i64() {
    Some(i) => Value::Int(i),
    None => Value::Float(number.as_f64().unwrap_or_default()),
  };
  if value.to_string() == text { value } else { Value::String(text) }
}
