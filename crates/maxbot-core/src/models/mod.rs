//! Typed domain records for the Max Bot API wire format.
//!
//! Every entity converts with `from_value` / `to_value`, both pure. Decoding
//! is strict about required fields (`Error::MalformedEntity` names the
//! entity and field) and lossless for forward-compatible parts: unknown
//! attachment kinds and free-form update payloads are carried verbatim.

pub(crate) mod codec;

pub mod chat;
pub mod message;
pub mod update;
pub mod user;

pub use chat::Chat;
pub use message::{
    inline_button, Attachment, LinkedMessage, LocationAttachment, Message, MessageBody,
    MessageStat, NewMessageBody, RawAttachment, Recipient,
};
pub use update::Update;
pub use user::{ChatAdmin, ChatMember, User, UserWithPhoto};
