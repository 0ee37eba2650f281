//! Conversion between configuration values and Lua values.

use indexmap::IndexMap;
use mlua::prelude::*;

use crate::config::Value;

/// Convert a configuration value to Lua. Lists become sequences and maps
/// become tables keyed by string.
pub fn to_lua(lua: &Lua, value: &Value) -> LuaResult<LuaValue> {
  Ok(match value {
    Value::Null => LuaValue::Nil,
    Value::Bool(b) => LuaValue::Boolean(*b),
    Value::Int(i) => LuaValue::Integer(*i),
    Value::Float(f) => LuaValue::Number(*f),
    Value::String(s) => LuaValue::String(lua.create_string(s)?),
    Value::List(items) => {
      let table = lua.create_table_with_capacity(items.len(), 0)?;
      for item in items {
        table.raw_push(to_lua(lua, item)?)?;
      }
      LuaValue::Table(table)
    }
    Value::Map(map) => {
      let table = lua.create_table_with_capacity(0, map.len())?;
      for (key, item) in map {
        table.raw_set(key.as_str(), to_lua(lua, item)?)?;
      }
      LuaValue::Table(table)
    }
  })
}

/// Convert a Lua value to a configuration value.
///
/// A table whose keys are exactly `1..=n` is a list, any other table is a map
/// with stringified keys, and an empty table is an empty list.
pub fn from_lua(value: LuaValue) -> LuaResult<Value> {
  match value {
    LuaValue::Nil => Ok(Value::Null),
    LuaValue::Boolean(b) => Ok(Value::Bool(b)),
    LuaValue::Integer(i) => Ok(Value::Int(i)),
    LuaValue::Number(n) => Ok(Value::Float(n)),
    LuaValue::String(s) => Ok(Value::String(s.to_str()?.to_string())),
    LuaValue::Table(table) => table_to_value(&table),
    other => Err(LuaError::external(format!(
      "cannot store a {} in project configuration",
      other.type_name()
    ))),
  }
}

fn table_to_value(table: &LuaTable) -> LuaResult<Value> {
  let len = table.raw_len();
  let count = table.pairs::<LuaValue, LuaValue>().count();

  if count == len {
    let mut items = Vec::with_capacity(len);
    for item in table.sequence_values::<LuaValue>() {
      items.push(from_lua(item?)?);
    }
    return Ok(Value::List(items));
  }

  let mut map = IndexMap::new();
  for pair in table.pairs::<LuaValue, LuaValue>() {
    let (key, item) = pair?;
    let key = match key {
      LuaValue::String(s) => s.to_str()?.to_string(),
      LuaValue::Integer(i) => i.to_string(),
      LuaValue::Number(n) => n.to_string(),
      LuaValue::Boolean(b) => b.to_string(),
      other => {
        return Err(LuaError::external(format!(
          "unsupported table key type: {}",
          other.type_name()
        )));
      }
    };
    map.insert(key, from_lua(item)?);
  }
  Ok(Value::Map(map))
}
