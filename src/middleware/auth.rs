use axum::{extract::FromRequestParts, http::header};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::sessions::{Column as SessionCol, Entity as Sessions},
    error::AppError,
    state::AppState,
};

/// Resolved identity of the caller, extracted from the opaque bearer
/// session token. Routes and services never see the token itself.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized);
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        // A session is usable iff it is still marked valid and unexpired.
        let session = Sessions::find()
            .filter(SessionCol::Token.eq(token))
            .find_also_related(crate::entity::Users)
            .one(&state.orm)
            .await?;

        let (session, user) = match session {
            Some((s, u)) => (s, u),
            None => return Err(AppError::Unauthorized),
        };

        if !session.valid || session.expires_at <= Utc::now() {
            return Err(AppError::Unauthorized);
        }

        let role = user.map(|u| u.role).unwrap_or_else(|| "client".to_string());

        Ok(AuthUser {
            user_id: session.user_id,
            role,
        })
    }
}
