//! Chats: dialogs, group chats and channels.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::Error;
use crate::models::codec::{kind_of, opt, Obj};
use crate::models::message::Message;
use crate::models::user::UserWithPhoto;
use crate::Result;

/// A chat the bot participates in (schema `Chat`).
#[derive(Clone, Debug, PartialEq)]
pub struct Chat {
    pub chat_id: i64,
    /// Chat kind (`dialog`, `chat`, `channel`).
    pub kind: String,
    /// Chat status (`active`, `removed`, `left`, `closed`).
    pub status: String,
    pub title: Option<String>,
    /// Last event in the chat, Unix time in milliseconds.
    pub last_event_time: i64,
    pub participants_count: i64,
    /// Chat icon descriptor, kept opaque.
    pub icon: Option<Value>,
    pub is_public: bool,
    pub description: Option<String>,
    pub owner_id: Option<i64>,
    /// Partial participant listing, when the server inlines one. Absent on
    /// the wire stays absent here, it is not an empty map.
    pub participants: Option<BTreeMap<String, i64>>,
    pub link: Option<String>,
    /// Peer of a dialog, for `dialog` chats.
    pub dialog_with_user: Option<UserWithPhoto>,
    pub chat_message_id: Option<String>,
    pub pinned_message: Option<Box<Message>>,
}

impl Chat {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("Chat", value)?;
        Ok(Self {
            chat_id: obj.req_i64("chat_id")?,
            kind: obj.req_str("type")?,
            status: obj.req_str("status")?,
            title: obj.opt_str("title")?,
            last_event_time: obj.req_i64("last_event_time")?,
            participants_count: obj.req_i64("participants_count")?,
            icon: obj.get("icon").cloned(),
            is_public: obj.req_bool("is_public")?,
            description: obj.opt_str("description")?,
            owner_id: obj.opt_i64("owner_id")?,
            participants: decode_participants(&obj)?,
            link: obj.opt_str("link")?,
            dialog_with_user: obj.opt_entity("dialog_with_user", UserWithPhoto::from_value)?,
            chat_message_id: obj.opt_str("chat_message_id")?,
            pinned_message: obj
                .opt_entity("pinned_message", Message::from_value)?
                .map(Box::new),
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("chat_id".into(), self.chat_id.into());
        map.insert("type".into(), self.kind.clone().into());
        map.insert("status".into(), self.status.clone().into());
        map.insert("title".into(), opt(&self.title));
        map.insert("last_event_time".into(), self.last_event_time.into());
        map.insert("participants_count".into(), self.participants_count.into());
        map.insert("icon".into(), self.icon.clone().unwrap_or(Value::Null));
        map.insert("is_public".into(), self.is_public.into());
        map.insert("description".into(), opt(&self.description));
        map.insert("owner_id".into(), opt(&self.owner_id));
        map.insert(
            "participants".into(),
            match &self.participants {
                Some(participants) => Value::Object(
                    participants
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::from(*v)))
                        .collect(),
                ),
                None => Value::Null,
            },
        );
        map.insert("link".into(), opt(&self.link));
        map.insert(
            "dialog_with_user".into(),
            self.dialog_with_user
                .as_ref()
                .map(UserWithPhoto::to_value)
                .unwrap_or(Value::Null),
        );
        map.insert("chat_message_id".into(), opt(&self.chat_message_id));
        map.insert(
            "pinned_message".into(),
            self.pinned_message
                .as_ref()
                .map(|m| m.to_value())
                .unwrap_or(Value::Null),
        );
        Value::Object(map)
    }
}

fn decode_participants(obj: &Obj<'_>) -> Result<Option<BTreeMap<String, i64>>> {
    let Some(value) = obj.get("participants") else {
        return Ok(None);
    };
    let Value::Object(raw) = value else {
        return Err(Error::malformed(
            "Chat",
            "participants",
            format!("expected object, got {}", kind_of(value)),
        ));
    };
    let mut out = BTreeMap::new();
    for (key, user_id) in raw {
        let Some(user_id) = user_id.as_i64() else {
            return Err(Error::malformed(
                "Chat",
                "participants",
                format!("expected integer user id for key `{key}`"),
            ));
        };
        out.insert(key.clone(), user_id);
    }
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_chat() -> Value {
        json!({
            "chat_id": 100,
            "type": "chat",
            "status": "active",
            "title": "Rustaceans",
            "last_event_time": 1_700_000_000_000_i64,
            "participants_count": 3,
            "icon": {"url": "https://img.example/icon.png"},
            "is_public": true,
            "description": "a chat"
        })
    }

    #[test]
    fn chat_missing_participants_decodes_to_absent() {
        let chat = Chat::from_value(&sample_chat()).unwrap();
        assert_eq!(chat.participants, None);
        assert_eq!(Chat::from_value(&chat.to_value()).unwrap(), chat);
    }

    #[test]
    fn chat_participants_map_decodes_user_ids() {
        let mut raw = sample_chat();
        raw["participants"] = json!({"42": 42, "43": 43});
        let chat = Chat::from_value(&raw).unwrap();
        let participants = chat.participants.as_ref().unwrap();
        assert_eq!(participants.get("42"), Some(&42));
        assert_eq!(Chat::from_value(&chat.to_value()).unwrap(), chat);
    }

    #[test]
    fn chat_participants_wrong_value_type_is_malformed() {
        let mut raw = sample_chat();
        raw["participants"] = json!({"42": "nope"});
        let err = Chat::from_value(&raw).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::MalformedEntity { entity: "Chat", .. }
        ));
    }

    #[test]
    fn dialog_round_trips_with_peer_and_pinned_message() {
        let raw = json!({
            "chat_id": 7,
            "type": "dialog",
            "status": "active",
            "last_event_time": 0,
            "participants_count": 2,
            "is_public": false,
            "dialog_with_user": {
                "user_id": 42,
                "first_name": "Lena",
                "is_bot": false,
                "last_activity_time": 0,
                "avatar_url": "https://img.example/a.png"
            },
            "pinned_message": {
                "recipient": {"chat_id": 7, "chat_type": "dialog"},
                "timestamp": 1,
                "body": {"mid": "mid.1", "seq": 1, "text": "pinned"}
            }
        });
        let chat = Chat::from_value(&raw).unwrap();
        assert_eq!(
            chat.dialog_with_user.as_ref().unwrap().user.first_name,
            "Lena"
        );
        assert_eq!(
            chat.pinned_message.as_ref().unwrap().body.text.as_deref(),
            Some("pinned")
        );
        assert_eq!(chat.title, None);
        assert_eq!(Chat::from_value(&chat.to_value()).unwrap(), chat);
    }
}
