use std::marker::PhantomData;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::{error::ApiError, platform::VerifiedToken, state::AppState};

/// Role a route requires from the bearer token's claims.
pub trait RequiredRole {
    /// Value the token's `role` claim must equal.
    const NAME: &'static str;
}

/// Field owners: may create venue listings.
pub struct Owner;

impl RequiredRole for Owner {
    const NAME: &'static str = "owner";
}

/// Verifies the `Authorization: Bearer` token with the identity provider
/// and requires the given role claim, rejecting before the handler body
/// runs: 401 for a missing or unverifiable token, 403 for a wrong role.
pub struct RequireRole<R>(pub VerifiedToken, pub PhantomData<R>);

#[async_trait]
impl<R> FromRequestParts<AppState> for RequireRole<R>
where
    R: RequiredRole + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                ApiError::MissingBearer
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("authorization scheme is not Bearer");
            ApiError::MissingBearer
        })?;

        let verified = state.identity.verify_id_token(token).await.map_err(|e| {
            warn!(error = %e, "token verification failed");
            ApiError::InvalidToken(e)
        })?;

        if !verified.has_role(R::NAME) {
            warn!(uid = %verified.uid, required = R::NAME, "role claim mismatch");
            return Err(ApiError::RoleRequired(R::NAME));
        }

        Ok(RequireRole(verified, PhantomData))
    }
}
