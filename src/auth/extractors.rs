use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::auth::repo::{self, User};
use crate::auth::token::bearer_token;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the bearer token to its user; rejects the request with 401
/// when the header is missing, malformed or the session no longer exists.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(ApiError::unauthenticated)?;

        let user = repo::find_user_by_token(&state.db, token, state.config.token_ttl_minutes)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(ApiError::unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

/// Like [`CurrentUser`] but never rejects; routes with optional auth get
/// `None` for anonymous callers.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        let lookup =
            repo::find_user_by_token(&state.db, token, state.config.token_ttl_minutes).await;
        let user = match lookup {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "token lookup failed; treating caller as anonymous");
                None
            }
        };
        Ok(MaybeUser(user))
    }
}
