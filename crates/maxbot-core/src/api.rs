//! Typed wrappers over the Max Bot API endpoints.
//!
//! Each method builds query/body parameters, runs one round trip through
//! [`MaxClient::request`] and decodes the result. Endpoints whose responses
//! the client gives no typed view for (bot info, success acknowledgements,
//! webhook subscriptions) return the raw [`Value`].

use std::time::Duration;

use serde_json::{Map, Value};

use crate::client::{MaxClient, Payload};
use crate::errors::Error;
use crate::models::codec::Obj;
use crate::models::{
    Attachment, Chat, ChatAdmin, ChatMember, Message, NewMessageBody, Update,
};
use crate::paging::Page;
use crate::transport::Method;
use crate::Result;

/// Filters for `GET /messages`.
///
/// When `message_ids` is set the server ignores paging and time bounds; how
/// it resolves `message_ids` combined with `from`/`to` is unspecified
/// upstream, so all supplied filters are forwarded as-is.
#[derive(Clone, Debug)]
pub struct MessageFilter {
    pub chat_id: Option<i64>,
    pub message_ids: Vec<String>,
    /// Lower time bound, Unix time in milliseconds.
    pub from: Option<i64>,
    /// Upper time bound, Unix time in milliseconds.
    pub to: Option<i64>,
    /// Page size, 1..=100.
    pub count: u32,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self {
            chat_id: None,
            message_ids: Vec::new(),
            from: None,
            to: None,
            count: 50,
        }
    }
}

impl MessageFilter {
    pub fn for_chat(chat_id: i64) -> Self {
        Self {
            chat_id: Some(chat_id),
            ..Self::default()
        }
    }
}

/// Parameters for one `GET /updates` long-poll round.
#[derive(Clone, Debug)]
pub struct UpdatePoll {
    /// Maximum updates per response, 1..=1000.
    pub limit: u32,
    /// Seconds the server may hold the request awaiting new events.
    pub timeout_secs: u32,
    /// Cursor from the previous page; `None` starts from now.
    pub marker: Option<i64>,
    /// Event kinds to receive; empty means all.
    pub types: Vec<String>,
}

impl Default for UpdatePoll {
    fn default() -> Self {
        Self {
            limit: 100,
            timeout_secs: 30,
            marker: None,
            types: Vec::new(),
        }
    }
}

/// Parameters for `GET /chats/{chatId}/members`. With `user_ids` set the
/// server ignores marker/count.
#[derive(Clone, Debug)]
pub struct MemberQuery {
    pub user_ids: Vec<i64>,
    pub marker: Option<i64>,
    /// Page size, 1..=100.
    pub count: u32,
}

impl Default for MemberQuery {
    fn default() -> Self {
        Self {
            user_ids: Vec::new(),
            marker: None,
            count: 20,
        }
    }
}

/// An outgoing message and its destination. Exactly one of
/// `chat_id`/`user_id` must be set.
#[derive(Clone, Debug, Default)]
pub struct OutgoingMessage {
    pub chat_id: Option<i64>,
    pub user_id: Option<i64>,
    pub disable_link_preview: Option<bool>,
    pub body: NewMessageBody,
}

impl OutgoingMessage {
    pub fn to_chat(chat_id: i64, body: NewMessageBody) -> Self {
        Self {
            chat_id: Some(chat_id),
            body,
            ..Self::default()
        }
    }

    pub fn to_user(user_id: i64, body: NewMessageBody) -> Self {
        Self {
            user_id: Some(user_id),
            body,
            ..Self::default()
        }
    }
}

impl MaxClient {
    // ---------- bot ----------

    /// `GET /me` — info about the bot itself (raw `BotInfo`).
    pub async fn get_me(&self) -> Result<Value> {
        let payload = self.request(Method::Get, "/me", &[], None, None).await?;
        into_json(payload, "BotInfo")
    }

    // ---------- messages ----------

    /// `GET /messages` — list messages in a chat.
    pub async fn get_messages(&self, filter: MessageFilter) -> Result<Vec<Message>> {
        let mut query = vec![("count", filter.count.to_string())];
        if let Some(chat_id) = filter.chat_id {
            query.push(("chat_id", chat_id.to_string()));
        }
        if !filter.message_ids.is_empty() {
            query.push(("message_ids", filter.message_ids.join(",")));
        }
        if let Some(from) = filter.from {
            query.push(("from", from.to_string()));
        }
        if let Some(to) = filter.to {
            query.push(("to", to.to_string()));
        }

        let payload = self
            .request(Method::Get, "/messages", &query, None, None)
            .await?;
        let value = into_json(payload, "MessageList")?;
        let obj = Obj::new("MessageList", &value)?;
        obj.entity_seq("messages", Message::from_value)
    }

    /// `GET /messages/{messageId}` — one message by its `mid`.
    pub async fn get_message(&self, message_id: &str) -> Result<Message> {
        let payload = self
            .request(Method::Get, &format!("/messages/{message_id}"), &[], None, None)
            .await?;
        Message::from_value(&into_json(payload, "Message")?)
    }

    /// `POST /messages` — send a message to a chat or a user.
    pub async fn send_message(&self, outgoing: OutgoingMessage) -> Result<Message> {
        if outgoing.chat_id.is_none() && outgoing.user_id.is_none() {
            return Err(Error::InvalidRequest(
                "send_message needs a chat_id or a user_id".to_string(),
            ));
        }

        let mut query = Vec::new();
        if let Some(user_id) = outgoing.user_id {
            query.push(("user_id", user_id.to_string()));
        }
        if let Some(chat_id) = outgoing.chat_id {
            query.push(("chat_id", chat_id.to_string()));
        }
        if let Some(disable) = outgoing.disable_link_preview {
            query.push(("disable_link_preview", disable.to_string()));
        }

        let payload = self
            .request(
                Method::Post,
                "/messages",
                &query,
                Some(outgoing.body.to_request_body()),
                None,
            )
            .await?;
        let value = into_json(payload, "SendMessageResult")?;
        let obj = Obj::new("SendMessageResult", &value)?;
        obj.req_entity("message", Message::from_value)
    }

    /// `PUT /messages` — edit a message. `None` leaves the field unchanged.
    pub async fn edit_message(
        &self,
        message_id: &str,
        text: Option<&str>,
        attachments: Option<&[Attachment]>,
    ) -> Result<Value> {
        let mut body = Map::new();
        if let Some(text) = text {
            body.insert("text".into(), text.into());
        }
        if let Some(attachments) = attachments {
            body.insert(
                "attachments".into(),
                attachments.iter().map(Attachment::to_value).collect(),
            );
        }

        let payload = self
            .request(
                Method::Put,
                "/messages",
                &[("message_id", message_id.to_string())],
                Some(Value::Object(body)),
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    /// `DELETE /messages` — delete a message by its `mid`.
    pub async fn delete_message(&self, message_id: &str) -> Result<Value> {
        let payload = self
            .request(
                Method::Delete,
                "/messages",
                &[("message_id", message_id.to_string())],
                None,
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    // ---------- updates (long polling) ----------

    /// `GET /updates` — long-poll for new events.
    ///
    /// The HTTP timeout for this call is derived from the server-side hold
    /// (`timeout_secs` plus a margin) so the default client timeout cannot
    /// cut a healthy long poll short.
    pub async fn get_updates(&self, poll: UpdatePoll) -> Result<Page<Update>> {
        let mut query = vec![
            ("limit", poll.limit.to_string()),
            ("timeout", poll.timeout_secs.to_string()),
        ];
        if let Some(marker) = poll.marker {
            query.push(("marker", marker.to_string()));
        }
        if !poll.types.is_empty() {
            query.push(("types", poll.types.join(",")));
        }

        let http_timeout = Duration::from_secs(u64::from(poll.timeout_secs) + 5);
        let payload = self
            .request(Method::Get, "/updates", &query, None, Some(http_timeout))
            .await?;
        decode_page(&into_json(payload, "UpdateList")?, "UpdateList", "updates", Update::from_value)
    }

    // ---------- chats ----------

    /// `GET /chats` — chats the bot participates in.
    pub async fn get_chats(&self, count: u32, marker: Option<i64>) -> Result<Page<Chat>> {
        let mut query = vec![("count", count.to_string())];
        if let Some(marker) = marker {
            query.push(("marker", marker.to_string()));
        }
        let payload = self.request(Method::Get, "/chats", &query, None, None).await?;
        decode_page(&into_json(payload, "ChatList")?, "ChatList", "chats", Chat::from_value)
    }

    /// `GET /chats/{chatId}` — one chat by id.
    pub async fn get_chat(&self, chat_id: i64) -> Result<Chat> {
        let payload = self
            .request(Method::Get, &format!("/chats/{chat_id}"), &[], None, None)
            .await?;
        Chat::from_value(&into_json(payload, "Chat")?)
    }

    /// `GET /chats/{chatLink}` — one chat by public link or username.
    pub async fn get_chat_by_link(&self, chat_link: &str) -> Result<Chat> {
        let payload = self
            .request(Method::Get, &format!("/chats/{chat_link}"), &[], None, None)
            .await?;
        Chat::from_value(&into_json(payload, "Chat")?)
    }

    /// `GET /chats/{chatId}/pin` — the pinned message, if any.
    pub async fn get_pinned_message(&self, chat_id: i64) -> Result<Option<Message>> {
        let payload = self
            .request(Method::Get, &format!("/chats/{chat_id}/pin"), &[], None, None)
            .await?;
        let value = into_json(payload, "GetPinnedMessageResult")?;
        let obj = Obj::new("GetPinnedMessageResult", &value)?;
        obj.opt_entity("message", Message::from_value)
    }

    /// `PUT /chats/{chatId}/pin` — pin a message.
    pub async fn pin_message(
        &self,
        chat_id: i64,
        message_id: &str,
        notify: Option<bool>,
    ) -> Result<Value> {
        let mut body = Map::new();
        body.insert("message_id".into(), message_id.into());
        if let Some(notify) = notify {
            body.insert("notify".into(), notify.into());
        }
        let payload = self
            .request(
                Method::Put,
                &format!("/chats/{chat_id}/pin"),
                &[],
                Some(Value::Object(body)),
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    /// `DELETE /chats/{chatId}/pin` — unpin the pinned message.
    pub async fn unpin_message(&self, chat_id: i64) -> Result<Value> {
        let payload = self
            .request(Method::Delete, &format!("/chats/{chat_id}/pin"), &[], None, None)
            .await?;
        into_json(payload, "SuccessResponse")
    }

    /// `POST /chats/{chatId}/actions` — send a sender action ("typing" etc).
    pub async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<Value> {
        let mut body = Map::new();
        body.insert("action".into(), action.into());
        let payload = self
            .request(
                Method::Post,
                &format!("/chats/{chat_id}/actions"),
                &[],
                Some(Value::Object(body)),
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    // ---------- chat members ----------

    /// `GET /chats/{chatId}/members` — page through chat members.
    pub async fn get_chat_members(
        &self,
        chat_id: i64,
        query: MemberQuery,
    ) -> Result<Page<ChatMember>> {
        let mut params = vec![("count", query.count.to_string())];
        if let Some(marker) = query.marker {
            params.push(("marker", marker.to_string()));
        }
        if !query.user_ids.is_empty() {
            let joined = query
                .user_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("user_ids", joined));
        }

        let payload = self
            .request(
                Method::Get,
                &format!("/chats/{chat_id}/members"),
                &params,
                None,
                None,
            )
            .await?;
        decode_page(
            &into_json(payload, "ChatMembersList")?,
            "ChatMembersList",
            "members",
            ChatMember::from_value,
        )
    }

    /// `POST /chats/{chatId}/members` — add users to a chat.
    pub async fn add_chat_members(&self, chat_id: i64, user_ids: &[i64]) -> Result<Value> {
        let mut body = Map::new();
        body.insert(
            "user_ids".into(),
            user_ids.iter().copied().map(Value::from).collect(),
        );
        let payload = self
            .request(
                Method::Post,
                &format!("/chats/{chat_id}/members"),
                &[],
                Some(Value::Object(body)),
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    /// `DELETE /chats/{chatId}/members` — remove one member.
    pub async fn remove_chat_member(&self, chat_id: i64, user_id: i64) -> Result<Value> {
        let payload = self
            .request(
                Method::Delete,
                &format!("/chats/{chat_id}/members"),
                &[("user_id", user_id.to_string())],
                None,
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    /// `GET /chats/{chatId}/members/me` — the bot's own membership.
    pub async fn get_my_membership(&self, chat_id: i64) -> Result<ChatMember> {
        let payload = self
            .request(
                Method::Get,
                &format!("/chats/{chat_id}/members/me"),
                &[],
                None,
                None,
            )
            .await?;
        ChatMember::from_value(&into_json(payload, "ChatMember")?)
    }

    /// `DELETE /chats/{chatId}/members/me` — leave the chat.
    pub async fn leave_chat(&self, chat_id: i64) -> Result<Value> {
        let payload = self
            .request(
                Method::Delete,
                &format!("/chats/{chat_id}/members/me"),
                &[],
                None,
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    // ---------- chat admins ----------

    /// `GET /chats/{chatId}/members/admins` — current admins.
    pub async fn get_chat_admins(&self, chat_id: i64) -> Result<Page<ChatAdmin>> {
        let payload = self
            .request(
                Method::Get,
                &format!("/chats/{chat_id}/members/admins"),
                &[],
                None,
                None,
            )
            .await?;
        decode_page(
            &into_json(payload, "ChatAdminsList")?,
            "ChatAdminsList",
            "admins",
            ChatAdmin::from_value,
        )
    }

    /// `PUT /chats/{chatId}/members/admins` — replace the admin list.
    pub async fn set_chat_admins(&self, chat_id: i64, admins: &[ChatAdmin]) -> Result<Value> {
        let mut body = Map::new();
        body.insert(
            "admins".into(),
            admins.iter().map(ChatAdmin::to_value).collect(),
        );
        let payload = self
            .request(
                Method::Put,
                &format!("/chats/{chat_id}/members/admins"),
                &[],
                Some(Value::Object(body)),
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    /// `DELETE /chats/{chatId}/members/admins/{userId}` — revoke admin rights.
    pub async fn delete_chat_admin(&self, chat_id: i64, user_id: i64) -> Result<Value> {
        let payload = self
            .request(
                Method::Delete,
                &format!("/chats/{chat_id}/members/admins/{user_id}"),
                &[],
                None,
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    // ---------- webhook subscriptions ----------

    /// `GET /subscriptions` — active webhook subscriptions (raw).
    pub async fn get_subscriptions(&self) -> Result<Value> {
        let payload = self
            .request(Method::Get, "/subscriptions", &[], None, None)
            .await?;
        into_json(payload, "GetSubscriptionsResult")
    }

    /// `POST /subscriptions` — register a webhook URL.
    pub async fn subscribe(&self, url: &str, types: &[String]) -> Result<Value> {
        let mut body = Map::new();
        body.insert("url".into(), url.into());
        if !types.is_empty() {
            body.insert(
                "types".into(),
                types.iter().cloned().map(Value::from).collect(),
            );
        }
        let payload = self
            .request(
                Method::Post,
                "/subscriptions",
                &[],
                Some(Value::Object(body)),
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }

    /// `DELETE /subscriptions` — drop a webhook subscription.
    pub async fn unsubscribe(&self, url: &str) -> Result<Value> {
        let payload = self
            .request(
                Method::Delete,
                "/subscriptions",
                &[("url", url.to_string())],
                None,
                None,
            )
            .await?;
        into_json(payload, "SuccessResponse")
    }
}

fn into_json(payload: Payload, entity: &'static str) -> Result<Value> {
    payload
        .into_json()
        .ok_or_else(|| Error::malformed(entity, "$", "expected a JSON response"))
}

fn decode_page<T>(
    value: &Value,
    entity: &'static str,
    items_key: &str,
    decode: fn(&Value) -> Result<T>,
) -> Result<Page<T>> {
    let obj = Obj::new(entity, value)?;
    Ok(Page {
        items: obj.entity_seq(items_key, decode)?,
        marker: obj.opt_i64("marker")?,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::client::testing::FakeTransport;

    fn client(transport: FakeTransport) -> (MaxClient, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let client = MaxClient::new("t", transport.clone());
        (client, transport)
    }

    #[tokio::test]
    async fn get_updates_echoes_marker_and_joins_types() {
        let (client, transport) = client(FakeTransport::new().respond_json(
            r#"{"updates": [{"update_type": "message_created", "timestamp": 1}], "marker": 18}"#,
        ));

        let page = client
            .get_updates(UpdatePoll {
                marker: Some(17),
                types: vec!["message_created".into(), "message_callback".into()],
                ..UpdatePoll::default()
            })
            .await
            .unwrap();

        assert_eq!(transport.query_value("marker").as_deref(), Some("17"));
        assert_eq!(
            transport.query_value("types").as_deref(),
            Some("message_created,message_callback")
        );
        assert_eq!(transport.query_value("limit").as_deref(), Some("100"));
        assert_eq!(transport.query_value("timeout").as_deref(), Some("30"));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.marker, Some(18));
    }

    #[tokio::test]
    async fn get_updates_http_timeout_outlives_server_hold() {
        let (client, transport) = client(FakeTransport::new().respond_json(r#"{"updates": []}"#));
        client
            .get_updates(UpdatePoll {
                timeout_secs: 30,
                ..UpdatePoll::default()
            })
            .await
            .unwrap();
        assert_eq!(
            transport.last_request().timeout,
            Some(Duration::from_secs(35))
        );
    }

    #[tokio::test]
    async fn get_updates_without_marker_has_no_marker_param() {
        let (client, transport) = client(FakeTransport::new().respond_json(r#"{"updates": []}"#));
        let page = client.get_updates(UpdatePoll::default()).await.unwrap();
        assert_eq!(transport.query_value("marker"), None);
        assert!(page.is_last());
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn get_chats_decodes_page() {
        let (client, transport) = client(FakeTransport::new().respond_json(
            r#"{
                "chats": [{
                    "chat_id": 1, "type": "chat", "status": "active",
                    "last_event_time": 0, "participants_count": 2, "is_public": false
                }],
                "marker": 99
            }"#,
        ));
        let page = client.get_chats(50, None).await.unwrap();
        assert_eq!(transport.query_value("count").as_deref(), Some("50"));
        assert_eq!(page.items[0].chat_id, 1);
        assert_eq!(page.marker, Some(99));
    }

    #[tokio::test]
    async fn get_messages_joins_ids_and_forwards_time_bounds() {
        let (client, transport) =
            client(FakeTransport::new().respond_json(r#"{"messages": []}"#));
        let messages = client
            .get_messages(MessageFilter {
                chat_id: Some(5),
                message_ids: vec!["mid.1".into(), "mid.2".into()],
                from: Some(100),
                to: Some(200),
                count: 10,
            })
            .await
            .unwrap();

        assert!(messages.is_empty());
        assert_eq!(
            transport.query_value("message_ids").as_deref(),
            Some("mid.1,mid.2")
        );
        assert_eq!(transport.query_value("from").as_deref(), Some("100"));
        assert_eq!(transport.query_value("to").as_deref(), Some("200"));
        assert_eq!(transport.query_value("chat_id").as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn send_message_requires_a_target() {
        let (client, transport) = client(FakeTransport::new());
        let err = client
            .send_message(OutgoingMessage::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        // Caller misuse is caught before any I/O.
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_message_unwraps_result_message() {
        let (client, transport) = client(FakeTransport::new().respond_json(
            r#"{
                "message": {
                    "recipient": {"chat_id": 9, "chat_type": "chat"},
                    "timestamp": 1,
                    "body": {"mid": "mid.1", "seq": 1, "text": "hi"}
                }
            }"#,
        ));
        let message = client
            .send_message(OutgoingMessage::to_chat(9, NewMessageBody::from_text("hi")))
            .await
            .unwrap();

        assert_eq!(message.body.text.as_deref(), Some("hi"));
        assert_eq!(transport.query_value("chat_id").as_deref(), Some("9"));
        assert_eq!(transport.last_request().body, Some(json!({"text": "hi"})));
    }

    #[tokio::test]
    async fn edit_message_sends_only_supplied_fields() {
        let (client, transport) = client(FakeTransport::new().respond_json(r#"{"success": true}"#));
        client
            .edit_message("mid.1", Some("new text"), None)
            .await
            .unwrap();

        assert_eq!(
            transport.query_value("message_id").as_deref(),
            Some("mid.1")
        );
        assert_eq!(
            transport.last_request().body,
            Some(json!({"text": "new text"}))
        );
    }

    #[tokio::test]
    async fn get_pinned_message_null_decodes_to_none() {
        let (client, _) = client(FakeTransport::new().respond_json(r#"{"message": null}"#));
        assert_eq!(client.get_pinned_message(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_chat_admins_builds_admin_list_body() {
        let (client, transport) = client(FakeTransport::new().respond_json(r#"{"success": true}"#));
        client
            .set_chat_admins(
                1,
                &[ChatAdmin {
                    user_id: 42,
                    permissions: vec!["pin_message".into()],
                }],
            )
            .await
            .unwrap();

        assert_eq!(
            transport.last_request().body,
            Some(json!({"admins": [{"user_id": 42, "permissions": ["pin_message"]}]}))
        );
    }

    #[tokio::test]
    async fn get_chat_members_joins_user_ids() {
        let (client, transport) =
            client(FakeTransport::new().respond_json(r#"{"members": []}"#));
        let page = client
            .get_chat_members(
                1,
                MemberQuery {
                    user_ids: vec![1, 2, 3],
                    ..MemberQuery::default()
                },
            )
            .await
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(transport.query_value("user_ids").as_deref(), Some("1,2,3"));
        assert_eq!(transport.query_value("count").as_deref(), Some("20"));
    }

    #[tokio::test]
    async fn text_response_where_json_expected_is_malformed() {
        let (client, _) =
            client(FakeTransport::new().respond_with(200, Some("text/plain"), "ok"));
        let err = client.get_me().await.unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedEntity {
                entity: "BotInfo",
                ..
            }
        ));
    }
}
