//! Messages, attachments and the send-side body.

use serde_json::{Map, Value};

use crate::errors::Error;
use crate::models::codec::{kind_of, opt, Obj};
use crate::models::user::User;
use crate::Result;

/// Where a message is addressed (schema `Recipient`).
///
/// Which of `chat_id`/`user_id` is meaningful depends on `chat_type`; the
/// record itself does not enforce the exclusivity, that is a caller concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    pub chat_id: Option<i64>,
    pub chat_type: String,
    pub user_id: Option<i64>,
}

impl Recipient {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("Recipient", value)?;
        Ok(Self {
            chat_id: obj.opt_i64("chat_id")?,
            chat_type: obj.req_str("chat_type")?,
            user_id: obj.opt_i64("user_id")?,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("chat_id".into(), opt(&self.chat_id));
        map.insert("chat_type".into(), self.chat_type.clone().into());
        map.insert("user_id".into(), opt(&self.user_id));
        Value::Object(map)
    }
}

/// Message attachment, dispatched on the wire `type` discriminator.
///
/// Only kinds the client gives a typed view for get their own variant;
/// everything else (and any kind the platform adds later) falls back to
/// [`RawAttachment`] with the payload kept verbatim, so decoding never fails
/// on an unknown discriminator.
#[derive(Clone, Debug, PartialEq)]
pub enum Attachment {
    Location(LocationAttachment),
    Other(RawAttachment),
}

/// Pass-through attachment: discriminator plus the untouched payload.
#[derive(Clone, Debug, PartialEq)]
pub struct RawAttachment {
    pub kind: String,
    pub payload: Option<Value>,
}

/// Attachment with geo coordinates (`type == "location"`).
///
/// `latitude`/`longitude` are the source of truth; decode normalizes them
/// back into the stored payload and encode writes them there again, so the
/// two views never drift apart.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationAttachment {
    pub kind: String,
    pub payload: Map<String, Value>,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationAttachment {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        let mut payload = Map::new();
        payload.insert("latitude".into(), latitude.into());
        payload.insert("longitude".into(), longitude.into());
        Self {
            kind: "location".into(),
            payload,
            latitude,
            longitude,
        }
    }

    fn decode(obj: &Obj<'_>, kind: String) -> Result<Self> {
        let mut payload = match obj.get("payload") {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(Error::malformed(
                    "LocationAttachment",
                    "payload",
                    format!("expected object, got {}", kind_of(other)),
                ))
            }
        };
        let latitude = payload.get("latitude").and_then(Value::as_f64).unwrap_or(0.0);
        let longitude = payload.get("longitude").and_then(Value::as_f64).unwrap_or(0.0);
        payload.insert("latitude".into(), latitude.into());
        payload.insert("longitude".into(), longitude.into());
        Ok(Self {
            kind,
            payload,
            latitude,
            longitude,
        })
    }

    fn encode(&self) -> Value {
        let mut payload = self.payload.clone();
        payload.insert("latitude".into(), self.latitude.into());
        payload.insert("longitude".into(), self.longitude.into());
        let mut map = Map::new();
        map.insert("type".into(), self.kind.clone().into());
        map.insert("payload".into(), Value::Object(payload));
        Value::Object(map)
    }
}

impl Attachment {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("Attachment", value)?;
        let kind = obj.req_str("type")?;
        match kind.as_str() {
            "location" => Ok(Attachment::Location(LocationAttachment::decode(&obj, kind)?)),
            _ => Ok(Attachment::Other(RawAttachment {
                kind,
                payload: obj.get("payload").cloned(),
            })),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Attachment::Location(location) => location.encode(),
            Attachment::Other(raw) => {
                let mut map = Map::new();
                map.insert("type".into(), raw.kind.clone().into());
                if let Some(payload) = &raw.payload {
                    map.insert("payload".into(), payload.clone());
                }
                Value::Object(map)
            }
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Attachment::Location(location) => &location.kind,
            Attachment::Other(raw) => &raw.kind,
        }
    }

    /// Build an `inline_keyboard` attachment request from button rows.
    /// Buttons come from [`inline_button`].
    pub fn inline_keyboard(rows: Vec<Vec<Value>>) -> Attachment {
        let mut payload = Map::new();
        payload.insert(
            "buttons".into(),
            Value::Array(rows.into_iter().map(Value::Array).collect()),
        );
        Attachment::Other(RawAttachment {
            kind: "inline_keyboard".into(),
            payload: Some(Value::Object(payload)),
        })
    }
}

/// Build one inline-keyboard button. `kind` is the button type ("callback",
/// "link", "request_contact", ...); `extra` carries the kind-specific fields
/// such as `payload` or `url`.
pub fn inline_button(kind: &str, text: &str, extra: Map<String, Value>) -> Value {
    let mut button = Map::new();
    button.insert("type".into(), kind.into());
    button.insert("text".into(), text.into());
    button.extend(extra);
    Value::Object(button)
}

/// View counters for a message (schema `MessageStat`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageStat {
    pub views: i64,
}

impl MessageStat {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("MessageStat", value)?;
        Ok(Self {
            views: obj.req_i64("views")?,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("views".into(), self.views.into());
        Value::Object(map)
    }
}

/// Body of a received message (schema `MessageBody`).
#[derive(Clone, Debug, PartialEq)]
pub struct MessageBody {
    /// Message id, the handle for edit/delete/pin.
    pub mid: String,
    /// Ordering of the message within its chat.
    pub seq: i64,
    pub text: Option<String>,
    pub attachments: Vec<Attachment>,
    /// Text markup spans, kept opaque.
    pub markup: Option<Vec<Value>>,
}

impl MessageBody {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("MessageBody", value)?;
        Ok(Self {
            mid: obj.req_str("mid")?,
            seq: obj.req_i64("seq")?,
            text: obj.opt_str("text")?,
            attachments: obj.entity_seq("attachments", Attachment::from_value)?,
            markup: obj.opt_raw_array("markup")?,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("mid".into(), self.mid.clone().into());
        map.insert("seq".into(), self.seq.into());
        map.insert("text".into(), opt(&self.text));
        map.insert(
            "attachments".into(),
            self.attachments.iter().map(Attachment::to_value).collect(),
        );
        map.insert(
            "markup".into(),
            match &self.markup {
                Some(markup) => Value::Array(markup.clone()),
                None => Value::Null,
            },
        );
        Value::Object(map)
    }
}

/// Body of an outgoing message (schema `NewMessageBody`), used by send.
///
/// `notify` is the one field with a documented default: `true`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMessageBody {
    pub text: Option<String>,
    pub attachments: Vec<Attachment>,
    /// Reply/forward link (schema `NewMessageLink`), kept opaque.
    pub link: Option<Value>,
    pub notify: bool,
    /// Text format descriptor, kept opaque.
    pub format: Option<Value>,
}

impl Default for NewMessageBody {
    fn default() -> Self {
        Self {
            text: None,
            attachments: Vec::new(),
            link: None,
            notify: true,
            format: None,
        }
    }
}

impl NewMessageBody {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("NewMessageBody", value)?;
        Ok(Self {
            text: obj.opt_str("text")?,
            attachments: obj.entity_seq("attachments", Attachment::from_value)?,
            link: obj.get("link").cloned(),
            notify: obj.opt_bool("notify")?.unwrap_or(true),
            format: obj.get("format").cloned(),
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("text".into(), opt(&self.text));
        map.insert(
            "attachments".into(),
            self.attachments.iter().map(Attachment::to_value).collect(),
        );
        map.insert("link".into(), self.link.clone().unwrap_or(Value::Null));
        map.insert("notify".into(), self.notify.into());
        map.insert("format".into(), self.format.clone().unwrap_or(Value::Null));
        Value::Object(map)
    }

    /// Request body for POST/PUT `/messages`: only the fields the caller set,
    /// so an untouched field is left for the server to default rather than
    /// sent as an explicit null.
    pub(crate) fn to_request_body(&self) -> Value {
        let mut map = Map::new();
        if let Some(text) = &self.text {
            map.insert("text".into(), text.clone().into());
        }
        if !self.attachments.is_empty() {
            map.insert(
                "attachments".into(),
                self.attachments.iter().map(Attachment::to_value).collect(),
            );
        }
        if let Some(link) = &self.link {
            map.insert("link".into(), link.clone());
        }
        if !self.notify {
            map.insert("notify".into(), false.into());
        }
        if let Some(format) = &self.format {
            map.insert("format".into(), format.clone());
        }
        Value::Object(map)
    }
}

/// A replied-to or forwarded message (schema `LinkedMessage`).
#[derive(Clone, Debug, PartialEq)]
pub struct LinkedMessage {
    /// Link kind (`reply`, `forward`).
    pub kind: String,
    pub sender: Option<User>,
    pub chat_id: i64,
    pub message: MessageBody,
}

impl LinkedMessage {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("LinkedMessage", value)?;
        Ok(Self {
            kind: obj.req_str("type")?,
            sender: obj.opt_entity("sender", User::from_value)?,
            chat_id: obj.req_i64("chat_id")?,
            message: obj.req_entity("message", MessageBody::from_value)?,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), self.kind.clone().into());
        map.insert(
            "sender".into(),
            self.sender.as_ref().map(User::to_value).unwrap_or(Value::Null),
        );
        map.insert("chat_id".into(), self.chat_id.into());
        map.insert("message".into(), self.message.to_value());
        Value::Object(map)
    }
}

/// A message in a chat (schema `Message`).
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub recipient: Recipient,
    pub body: MessageBody,
    /// Sent time, Unix time in milliseconds.
    pub timestamp: i64,
    pub sender: Option<User>,
    pub link: Option<LinkedMessage>,
    pub stat: Option<MessageStat>,
    pub url: Option<String>,
}

impl Message {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("Message", value)?;
        Ok(Self {
            recipient: obj.req_entity("recipient", Recipient::from_value)?,
            body: obj.req_entity("body", MessageBody::from_value)?,
            timestamp: obj.req_i64("timestamp")?,
            sender: obj.opt_entity("sender", User::from_value)?,
            link: obj.opt_entity("link", LinkedMessage::from_value)?,
            stat: obj.opt_entity("stat", MessageStat::from_value)?,
            url: obj.opt_str("url")?,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "sender".into(),
            self.sender.as_ref().map(User::to_value).unwrap_or(Value::Null),
        );
        map.insert("recipient".into(), self.recipient.to_value());
        map.insert("timestamp".into(), self.timestamp.into());
        map.insert(
            "link".into(),
            self.link
                .as_ref()
                .map(LinkedMessage::to_value)
                .unwrap_or(Value::Null),
        );
        map.insert("body".into(), self.body.to_value());
        map.insert(
            "stat".into(),
            self.stat
                .as_ref()
                .map(MessageStat::to_value)
                .unwrap_or(Value::Null),
        );
        map.insert("url".into(), opt(&self.url));
        Value::Object(map)
    }
}
