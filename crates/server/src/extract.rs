//! JSON extractor that runs `validator` rules before the handler sees the body.

use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::ApiError;

/// Like `Json<T>`, but rejects with a 400 envelope when parsing or
/// validation fails.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;
        Ok(ValidatedJson(data))
    }
}
