use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::SharedState;

/// The account behind a valid `Authorization: Bearer <session token>` header.
#[derive(Debug, Clone)]
pub struct AuthAccount {
    pub account_id: Uuid,
}

impl FromRequestParts<SharedState> for AuthAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let account_id = state
            .accounts
            .authenticate(bearer.token())
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthAccount { account_id })
    }
}
