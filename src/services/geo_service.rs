use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

const GEO_API_BASE: &str = "https://json.geoapi.pt";

#[derive(Debug, Serialize, ToSchema)]
pub struct DistrictLookup {
    pub postal_code: String,
    pub district: String,
}

#[derive(Debug, Deserialize)]
struct GeoApiResponse {
    distrito: Option<String>,
}

/// Resolve a 4-digit postal code to its administrative district via the
/// external geography service. Lookup failures surface as 400/404 and the
/// client falls back to manual district selection.
pub async fn district_for_postal_code(
    state: &AppState,
    postal_code: &str,
) -> AppResult<ApiResponse<DistrictLookup>> {
    let postal_code = postal_code.trim();
    if !is_valid_postal_code(postal_code) {
        return Err(AppError::BadRequest(
            "postal code must be exactly 4 digits".into(),
        ));
    }

    let url = format!("{GEO_API_BASE}/cp/{postal_code}");
    let resp = state
        .assets
        .client()
        .get(&url)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "geo lookup request failed");
            AppError::NotFound
        })?;

    if !resp.status().is_success() {
        return Err(AppError::NotFound);
    }

    let body: GeoApiResponse = resp.json().await.map_err(|e| {
        tracing::warn!(error = %e, "geo lookup returned malformed body");
        AppError::NotFound
    })?;

    let district = body.distrito.ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "District",
        DistrictLookup {
            postal_code: postal_code.to_string(),
            district,
        },
        Some(Meta::empty()),
    ))
}

fn is_valid_postal_code(postal_code: &str) -> bool {
    postal_code.len() == 4 && postal_code.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_code_shape_is_checked_before_any_request() {
        assert!(is_valid_postal_code("8600"));
        for bad in ["", "123", "12345", "12a4", "12 4"] {
            assert!(!is_valid_postal_code(bad), "{bad:?} should be rejected");
        }
    }
}
