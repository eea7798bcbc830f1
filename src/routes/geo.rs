use axum::{Json, Router, extract::Path, extract::State, routing::get};

use crate::{
    error::AppResult,
    response::ApiResponse,
    services::geo_service::{self, DistrictLookup},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/postal-code/{code}", get(postal_code_lookup))
}

#[utoipa::path(
    get,
    path = "/api/geo/postal-code/{code}",
    params(("code" = String, Path, description = "4-digit postal code")),
    responses(
        (status = 200, description = "Administrative district", body = ApiResponse<DistrictLookup>),
        (status = 400, description = "Malformed postal code"),
        (status = 404, description = "Unknown postal code or lookup unavailable"),
    ),
    tag = "Geo"
)]
pub async fn postal_code_lookup(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<ApiResponse<DistrictLookup>>> {
    let resp = geo_service::district_for_postal_code(&state, &code).await?;
    Ok(Json(resp))
}
