use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn model_rule(code: &'static str, res: Result<(), models::errors::ModelError>) -> Result<(), ValidationError> {
    res.map_err(|e| {
        let mut err = ValidationError::new(code);
        err.message = Some(Cow::Owned(e.to_string()));
        err
    })
}

fn username_rule(value: &str) -> Result<(), ValidationError> {
    model_rule("username", models::user::validate_username(value))
}

fn phone_rule(value: &str) -> Result<(), ValidationError> {
    model_rule("phone", models::user::validate_phone(value))
}

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(custom(function = "username_rule"))]
    pub username: String,
    #[validate(length(min = 6, max = 64, message = "password must be 6-64 characters"))]
    pub password: String,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    #[validate(custom(function = "phone_rule"))]
    pub phone: Option<String>,
    #[validate(length(max = 64))]
    pub nickname: Option<String>,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Partial profile update; absent fields are left untouched.
///
/// Passwords are not accepted here; they change through the dedicated
/// password operation which checks the old value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(custom(function = "username_rule"))]
    pub username: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    #[validate(custom(function = "phone_rule"))]
    pub phone: Option<String>,
    #[validate(length(max = 64))]
    pub nickname: Option<String>,
    #[validate(length(max = 512))]
    pub avatar: Option<String>,
    #[validate(range(min = 0, max = 1))]
    pub status: Option<i16>,
}

/// Password change input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[validate(length(min = 1, message = "old password is required"))]
    pub old_password: String,
    #[validate(length(min = 6, max = 64, message = "password must be 6-64 characters"))]
    pub new_password: String,
}
