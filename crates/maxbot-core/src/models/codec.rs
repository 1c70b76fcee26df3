//! Field-access helpers shared by the entity decoders.
//!
//! Every accessor reports failures as `MalformedEntity` naming the entity
//! and the offending field. A field that is missing or JSON `null` counts as
//! absent; a present field with the wrong JSON type is always an error, for
//! optional fields too.

use serde_json::{Map, Value};

use crate::{errors::Error, Result};

/// View over a JSON object for one entity decode.
pub(crate) struct Obj<'a> {
    entity: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Obj<'a> {
    pub fn new(entity: &'static str, value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { entity, map }),
            other => Err(Error::malformed(
                entity,
                "$",
                format!("expected object, got {}", kind_of(other)),
            )),
        }
    }

    pub fn map(&self) -> &'a Map<String, Value> {
        self.map
    }

    /// Present, non-null value of `key`, if any.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn req(&self, key: &str) -> Result<&'a Value> {
        self.get(key)
            .ok_or_else(|| Error::malformed(self.entity, key, "required field is missing"))
    }

    fn bad(&self, key: &str, expected: &str, got: &Value) -> Error {
        Error::malformed(
            self.entity,
            key,
            format!("expected {expected}, got {}", kind_of(got)),
        )
    }

    pub fn req_i64(&self, key: &str) -> Result<i64> {
        let value = self.req(key)?;
        value.as_i64().ok_or_else(|| self.bad(key, "integer", value))
    }

    pub fn req_str(&self, key: &str) -> Result<String> {
        let value = self.req(key)?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.bad(key, "string", value))
    }

    pub fn req_bool(&self, key: &str) -> Result<bool> {
        let value = self.req(key)?;
        value.as_bool().ok_or_else(|| self.bad(key, "boolean", value))
    }

    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.bad(key, "integer", value)),
        }
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_owned()))
                .ok_or_else(|| self.bad(key, "string", value)),
        }
    }

    pub fn opt_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.bad(key, "boolean", value)),
        }
    }

    /// Optional ordered list of strings (e.g. chat permissions).
    pub fn opt_str_array(&self, key: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let Value::Array(raw) = value else {
            return Err(self.bad(key, "array", value));
        };
        let mut out = Vec::with_capacity(raw.len());
        for item in raw {
            let Some(s) = item.as_str() else {
                return Err(self.bad(key, "array of strings", item));
            };
            out.push(s.to_owned());
        }
        Ok(Some(out))
    }

    /// Optional opaque array kept verbatim (markup, keyboard rows).
    pub fn opt_raw_array(&self, key: &str) -> Result<Option<Vec<Value>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(raw)) => Ok(Some(raw.clone())),
            Some(value) => Err(self.bad(key, "array", value)),
        }
    }

    /// Decode an optional nested entity with its own decoder.
    pub fn opt_entity<T>(&self, key: &str, decode: fn(&Value) -> Result<T>) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => decode(value).map(Some),
        }
    }

    /// Decode a required nested entity with its own decoder.
    pub fn req_entity<T>(&self, key: &str, decode: fn(&Value) -> Result<T>) -> Result<T> {
        decode(self.req(key)?)
    }

    /// Decode an ordered sequence of sub-entities element-wise. An absent
    /// source sequence decodes to an empty one, never to absent.
    pub fn entity_seq<T>(&self, key: &str, decode: fn(&Value) -> Result<T>) -> Result<Vec<T>> {
        let Some(value) = self.get(key) else {
            return Ok(Vec::new());
        };
        let Value::Array(raw) = value else {
            return Err(self.bad(key, "array", value));
        };
        raw.iter().map(decode).collect()
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Encode an optional scalar as the value or an explicit JSON null, the
/// wire convention used by the platform's own payloads.
pub(crate) fn opt<T>(value: &Option<T>) -> Value
where
    T: Clone + Into<Value>,
{
    value
        .as_ref()
        .map(|v| v.clone().into())
        .unwrap_or(Value::Null)
}

/// Unwrap an encoded entity back into its object map. Entity encoders only
/// ever produce objects.
pub(crate) fn object_of(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
