use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{LoginRequest, RegisterRequest, SessionResponse},
    entity::{
        sessions::{ActiveModel as SessionActive, Column as SessionCol, Entity as Sessions},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

const ROLES: [&str; 3] = ["client", "admin", "consumer"];

/// Pre-write validation of a registration payload. Runs before any store
/// access so a rejected registration has no side effects.
pub fn validate_registration(payload: &RegisterRequest) -> AppResult<()> {
    let required = [
        ("name", &payload.name),
        ("email", &payload.email),
        ("password", &payload.password),
        ("company", &payload.company),
        ("contact", &payload.contact),
        ("address", &payload.address),
        ("postal_code", &payload.postal_code),
        ("state", &payload.state),
        ("fat_number", &payload.fat_number),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("missing required field '{field}'")));
        }
    }

    if !is_valid_email(&payload.email) {
        return Err(AppError::BadRequest("invalid email".into()));
    }

    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "password must be at least 8 characters".into(),
        ));
    }
    if payload.password != payload.password2 {
        return Err(AppError::BadRequest("passwords do not match".into()));
    }

    if let Some(role) = payload.role.as_deref() {
        if !ROLES.contains(&role) {
            return Err(AppError::BadRequest(format!("unknown role '{role}'")));
        }
    }

    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<SessionResponse>> {
    validate_registration(&payload)?;

    let exists = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("email is already taken".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        company: Set(payload.company),
        contact: Set(payload.contact),
        address: Set(payload.address),
        postal_code: Set(payload.postal_code),
        state: Set(payload.state),
        fat_number: Set(payload.fat_number),
        company_logo: Set(payload.company_logo.unwrap_or_default()),
        role: Set(payload.role.unwrap_or_else(|| "client".to_string())),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let session = create_session(state, user.id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("User created", session, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<SessionResponse>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;

    // Uniform rejection: never reveal whether the email exists.
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("invalid email or password".into()));
    }

    let session = create_session(state, user.id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Logged in", session, Some(Meta::empty())))
}

/// Soft-invalidate every valid session carrying this token. The rows stay
/// in place; only the `valid` flag flips.
pub async fn logout_user(state: &AppState, token: &str) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Sessions::update_many()
        .col_expr(SessionCol::Valid, sea_orm::sea_query::Expr::value(false))
        .filter(SessionCol::Token.eq(token))
        .filter(SessionCol::Valid.eq(true))
        .exec(&state.orm)
        .await?;

    if result.rows_affected > 0 {
        let session = Sessions::find()
            .filter(SessionCol::Token.eq(token))
            .one(&state.orm)
            .await?;
        if let Some(session) = session {
            if let Err(err) = log_audit(
                &state.pool,
                Some(session.user_id),
                "logout",
                Some("sessions"),
                None,
            )
            .await
            {
                tracing::warn!(error = %err, "audit log failed");
            }
        }
    }

    Ok(ApiResponse::success(
        "Logged out",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn create_session(state: &AppState, user_id: Uuid) -> AppResult<SessionResponse> {
    // Opaque token: the session row is the source of truth, nothing is
    // encoded in the token itself.
    let token = format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    );
    let expires_at = Utc::now() + Duration::hours(state.session_ttl_hours);

    SessionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token: Set(token.clone()),
        valid: Set(true),
        expires_at: Set(expires_at.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(SessionResponse { token, expires_at })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> RegisterRequest {
        RegisterRequest {
            name: "Maria".into(),
            email: "maria@example.com".into(),
            password: "long-enough".into(),
            password2: "long-enough".into(),
            company: "Eco Salgados".into(),
            contact: "+351 900 000 000".into(),
            address: "Rua das Dunas 1".into(),
            postal_code: "8600".into(),
            state: "Faro".into(),
            fat_number: "PT123456789".into(),
            company_logo: None,
            role: None,
        }
    }

    #[test]
    fn accepts_a_complete_payload() {
        assert!(validate_registration(&valid_payload()).is_ok());
    }

    #[test]
    fn rejects_short_password_before_any_store_access() {
        let mut p = valid_payload();
        p.password = "short12".into();
        p.password2 = "short12".into();
        assert!(matches!(
            validate_registration(&p),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn rejects_password_mismatch() {
        let mut p = valid_payload();
        p.password2 = "different-pass".into();
        assert!(validate_registration(&p).is_err());
    }

    #[test]
    fn rejects_bad_email() {
        for email in ["no-at-sign", "a@b", "a@.com", " a@b.com", ""] {
            let mut p = valid_payload();
            p.email = email.into();
            assert!(validate_registration(&p).is_err(), "email {email:?}");
        }
    }

    #[test]
    fn rejects_missing_required_field() {
        let mut p = valid_payload();
        p.company = "  ".into();
        assert!(validate_registration(&p).is_err());
    }

    #[test]
    fn rejects_unknown_role() {
        let mut p = valid_payload();
        p.role = Some("superuser".into());
        assert!(validate_registration(&p).is_err());
        p.role = Some("admin".into());
        assert!(validate_registration(&p).is_ok());
    }
}
