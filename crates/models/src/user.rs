use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const STATUS_ACTIVE: i16 = 1;
pub const STATUS_DISABLED: i16 = 0;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string; never leaves the service.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub status: i16,
    pub create_time: DateTimeWithTimeZone,
    pub update_time: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Row to insert; `password_hash` is already hashed by the caller.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(ModelError::Validation("username must be 3-32 characters".into()));
    }
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.') {
        return Err(ModelError::Validation("username may only contain letters, digits, '_', '-' and '.'".into()));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ModelError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if (5..=20).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit() || c == '-') {
        Ok(())
    } else {
        Err(ModelError::Validation("invalid phone".into()))
    }
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewUser) -> Result<Model, ModelError> {
    validate_username(&new.username)?;
    if let Some(phone) = new.phone.as_deref() { validate_phone(phone)?; }
    if new.password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        username: Set(new.username),
        password: Set(new.password_hash),
        email: Set(new.email),
        phone: Set(new.phone),
        nickname: Set(new.nickname),
        avatar: Set(None),
        status: Set(STATUS_ACTIVE),
        create_time: Set(now),
        update_time: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

/// Removes the row; returns whether anything was deleted.
pub async fn hard_delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
