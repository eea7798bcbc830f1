use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};

use crate::{
    dto::account::UpdateAccountRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::UserProfile,
    response::ApiResponse,
    services::account_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_account))
        .route("/", put(update_account))
}

#[utoipa::path(
    get,
    path = "/api/account",
    responses(
        (status = 200, description = "Current account profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = account_service::get_account(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/account",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn update_account(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateAccountRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = account_service::update_account(&state, &user, payload).await?;
    Ok(Json(resp))
}
