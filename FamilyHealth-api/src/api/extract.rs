use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::entities::ErrorResponse;

/// Header naming the user every request acts for
pub const USER_ID_HEADER: &str = "x-user-id";

/// The calling user, taken from the `X-User-Id` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| UserId(value.to_string()))
            .ok_or_else(|| ErrorResponse::bad_request("Missing X-User-Id header"))
    }
}
