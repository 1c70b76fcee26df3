//! Users and chat membership.
//!
//! The wire schemas compose by field extension (User → UserWithPhoto →
//! ChatMember). Instead of inheritance each level is its own record holding
//! the previous level, and decode/encode merge base and extension fields
//! explicitly, so the chain composes transitively.

use serde_json::{Map, Value};

use crate::models::codec::{object_of, opt, Obj};
use crate::Result;

/// A Max user, bot or human (schema `User`).
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub is_bot: bool,
    /// Last activity in Unix time, milliseconds.
    pub last_activity_time: i64,
    /// Assembled display name, when the platform provides one.
    pub name: Option<String>,
}

impl User {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("User", value)?;
        Ok(Self {
            user_id: obj.req_i64("user_id")?,
            first_name: obj.req_str("first_name")?,
            last_name: obj.opt_str("last_name")?,
            username: obj.opt_str("username")?,
            is_bot: obj.req_bool("is_bot")?,
            last_activity_time: obj.req_i64("last_activity_time")?,
            name: obj.opt_str("name")?,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("user_id".into(), self.user_id.into());
        map.insert("first_name".into(), self.first_name.clone().into());
        map.insert("last_name".into(), opt(&self.last_name));
        map.insert("username".into(), opt(&self.username));
        map.insert("is_bot".into(), self.is_bot.into());
        map.insert("last_activity_time".into(), self.last_activity_time.into());
        map.insert("name".into(), opt(&self.name));
        Value::Object(map)
    }
}

/// `User` extended with public-profile fields (schema `UserWithPhoto`).
#[derive(Clone, Debug, PartialEq)]
pub struct UserWithPhoto {
    pub user: User,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub full_avatar_url: Option<String>,
}

impl UserWithPhoto {
    pub fn from_value(value: &Value) -> Result<Self> {
        // Base fields first; extension fields are merged on top.
        let user = User::from_value(value)?;
        let obj = Obj::new("UserWithPhoto", value)?;
        Ok(Self {
            user,
            description: obj.opt_str("description")?,
            avatar_url: obj.opt_str("avatar_url")?,
            full_avatar_url: obj.opt_str("full_avatar_url")?,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = object_of(self.user.to_value());
        map.insert("description".into(), opt(&self.description));
        map.insert("avatar_url".into(), opt(&self.avatar_url));
        map.insert("full_avatar_url".into(), opt(&self.full_avatar_url));
        Value::Object(map)
    }
}

/// A user as seen inside one specific chat (schema `ChatMember`).
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMember {
    pub user: UserWithPhoto,
    /// When this member last viewed the chat (Unix time, ms).
    pub last_access_time: i64,
    pub is_owner: bool,
    pub is_admin: bool,
    pub join_time: i64,
    /// Admin permissions, present for admins only.
    pub permissions: Option<Vec<String>>,
}

impl ChatMember {
    pub fn from_value(value: &Value) -> Result<Self> {
        let user = UserWithPhoto::from_value(value)?;
        let obj = Obj::new("ChatMember", value)?;
        Ok(Self {
            user,
            last_access_time: obj.req_i64("last_access_time")?,
            is_owner: obj.req_bool("is_owner")?,
            is_admin: obj.req_bool("is_admin")?,
            join_time: obj.req_i64("join_time")?,
            permissions: obj.opt_str_array("permissions")?,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = object_of(self.user.to_value());
        map.insert("last_access_time".into(), self.last_access_time.into());
        map.insert("is_owner".into(), self.is_owner.into());
        map.insert("is_admin".into(), self.is_admin.into());
        map.insert("join_time".into(), self.join_time.into());
        map.insert(
            "permissions".into(),
            match &self.permissions {
                Some(perms) => perms.iter().cloned().map(Value::from).collect(),
                None => Value::Null,
            },
        );
        Value::Object(map)
    }
}

/// Write-side admin projection (schema `ChatAdmin`): just the id and the
/// permissions to grant. Distinct from the read-side [`ChatMember`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatAdmin {
    pub user_id: i64,
    pub permissions: Vec<String>,
}

impl ChatAdmin {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = Obj::new("ChatAdmin", value)?;
        Ok(Self {
            user_id: obj.req_i64("user_id")?,
            permissions: obj.opt_str_array("permissions")?.unwrap_or_default(),
        })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("user_id".into(), self.user_id.into());
        map.insert(
            "permissions".into(),
            self.permissions.iter().cloned().map(Value::from).collect(),
        );
        Value::Object(map)
    }
}
