//! Long-poll / webhook events.

use serde_json::{Map, Value};

use crate::models::codec::Obj;
use crate::Result;

/// One event from `/updates` (schema `Update` and its subtypes).
///
/// Only the discriminator and the timestamp are typed; everything else is
/// kept verbatim in `payload` so unseen event shapes survive a decode/encode
/// round trip unchanged. Callers that need strong typing for one
/// `update_type` layer their own decoder over `payload`.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    /// Event kind (`message_created`, `message_callback`, `bot_added`, ...).
    pub update_type: String,
    /// Event time, Unix time in milliseconds.
    pub timestamp: i64,
    pub payload: Map<String, Value>,
}

impl Update {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("Update", value)?;
        let update_type = obj.req_str("update_type")?;
        let timestamp = obj.req_i64("timestamp")?;
        let mut payload = obj.map().clone();
        payload.remove("update_type");
        payload.remove("timestamp");
        Ok(Self {
            update_type,
            timestamp,
            payload,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = self.payload.clone();
        map.insert("update_type".into(), self.update_type.clone().into());
        map.insert("timestamp".into(), self.timestamp.into());
        Value::Object(map)
    }
}
