use thiserror::Error;

use models::errors::ModelError;
use tracing::debug;

pub const USERNAME_TAKEN: &str = "username already exists";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// HTTP-aligned code carried in the response envelope.
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::Unauthorized(_) => 401,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Hash(_) | ServiceError::Db(_) => 500,
        }
    }

    /// Server-side failures whose detail should be logged, not returned.
    pub fn is_internal(&self) -> bool { self.code() >= 500 }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::Validation(msg),
            // `username` is the only unique column; the driver text stays in the log
            ModelError::Conflict(detail) => {
                debug!(%detail, "unique constraint violated");
                ServiceError::Conflict(USERNAME_TAKEN.into())
            }
            ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { ModelError::from(e).into() }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(e: validator::ValidationErrors) -> Self { ServiceError::Validation(e.to_string()) }
}
