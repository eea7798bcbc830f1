use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::vouchers::{CreateVoucherRequest, ValidateRequest, VoucherList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Voucher, VoucherSnapshot},
    response::ApiResponse,
    routes::params::VoucherListQuery,
    services::{redemption_service, voucher_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vouchers))
        .route("/", post(create_voucher))
        .route("/validate", post(validate_code))
        .route("/{id}", get(get_voucher))
        .route("/{id}", delete(delete_voucher))
        .route("/{id}/publish", post(publish_voucher))
        .route("/{id}/pdf", get(voucher_pdf))
        .route("/{id}/redeem", post(redeem_voucher))
}

#[utoipa::path(
    get,
    path = "/api/vouchers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by creation time"),
    ),
    responses(
        (status = 200, description = "Vouchers owned by the caller", body = ApiResponse<VoucherList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn list_vouchers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<VoucherListQuery>,
) -> AppResult<Json<ApiResponse<VoucherList>>> {
    let resp = voucher_service::list_vouchers(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vouchers",
    request_body = CreateVoucherRequest,
    responses(
        (status = 201, description = "Voucher created", body = ApiResponse<Voucher>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Consumer accounts cannot issue vouchers"),
        (status = 409, description = "Code already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn create_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateVoucherRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Voucher>>)> {
    let resp = voucher_service::create_voucher(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/vouchers/{id}",
    params(("id" = Uuid, Path, description = "Voucher ID")),
    responses(
        (status = 200, description = "Voucher", body = ApiResponse<Voucher>),
        (status = 404, description = "Voucher not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn get_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Voucher>>> {
    let resp = voucher_service::get_voucher(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/vouchers/{id}",
    params(("id" = Uuid, Path, description = "Voucher ID")),
    responses(
        (status = 200, description = "Voucher deleted"),
        (status = 404, description = "Voucher not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn delete_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = voucher_service::delete_voucher(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vouchers/{id}/publish",
    params(("id" = Uuid, Path, description = "Voucher ID")),
    responses(
        (status = 200, description = "Draft published", body = ApiResponse<Voucher>),
        (status = 404, description = "Voucher not found"),
        (status = 409, description = "Voucher is not a draft"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn publish_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Voucher>>> {
    let resp = voucher_service::publish_voucher(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vouchers/{id}/pdf",
    params(("id" = Uuid, Path, description = "Voucher ID")),
    responses(
        (status = 200, description = "Print-ready voucher document", content_type = "application/pdf"),
        (status = 404, description = "Voucher not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn voucher_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let bytes = voucher_service::render_voucher_pdf(&state, &user, id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"voucher-{id}.pdf\""),
            ),
        ],
        bytes,
    ))
}

#[utoipa::path(
    post,
    path = "/api/vouchers/validate",
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "Voucher snapshot", body = ApiResponse<VoucherSnapshot>),
        (status = 404, description = "No such code"),
    ),
    tag = "Redemption"
)]
pub async fn validate_code(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> AppResult<Json<ApiResponse<VoucherSnapshot>>> {
    let resp = redemption_service::validate_code(&state, &payload.code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vouchers/{id}/redeem",
    params(("id" = Uuid, Path, description = "Voucher ID")),
    responses(
        (status = 200, description = "Redeemed snapshot", body = ApiResponse<VoucherSnapshot>),
        (status = 404, description = "Voucher not found"),
        (status = 409, description = "Inactive, expired or over capacity"),
    ),
    security(("bearer_auth" = [])),
    tag = "Redemption"
)]
pub async fn redeem_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VoucherSnapshot>>> {
    let resp = redemption_service::redeem_voucher(&state, &user, id).await?;
    Ok(Json(resp))
}
