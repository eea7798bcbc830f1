use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    entity::vouchers::{Column as VoucherCol, Entity as Vouchers, Model as VoucherModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::VoucherSnapshot,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Look up a voucher by exact code match. Returns the redeemable snapshot
/// or NotFound; nothing in the response distinguishes "no such code" from
/// "someone else's code".
pub async fn validate_code(
    state: &AppState,
    code: &str,
) -> AppResult<ApiResponse<VoucherSnapshot>> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::BadRequest("missing voucher code".into()));
    }

    let voucher = Vouchers::find()
        .filter(VoucherCol::Code.eq(code))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    // Drafts are not discoverable through the scanner.
    if voucher.status == "draft" {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Voucher found",
        snapshot_from_entity(voucher),
        Some(Meta::empty()),
    ))
}

/// Redeem a voucher: one conditional UPDATE carries the full guard
/// (active, unexpired, below cap), the increment, and the active -> used
/// flip when the cap is reached. Concurrent redemptions race on this single
/// statement, so at most `total_redemptions` of them can ever succeed.
pub async fn redeem_voucher(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<VoucherSnapshot>> {
    let now = Utc::now();

    let result = Vouchers::update_many()
        .col_expr(
            VoucherCol::Redemptions,
            Expr::col(VoucherCol::Redemptions).add(1),
        )
        .col_expr(
            VoucherCol::Status,
            Expr::cust(
                "CASE WHEN total_redemptions IS NOT NULL AND redemptions + 1 >= total_redemptions \
                 THEN 'used' ELSE status END",
            ),
        )
        .filter(VoucherCol::Id.eq(id))
        .filter(VoucherCol::Status.eq("active"))
        .filter(
            Condition::any()
                .add(VoucherCol::ExpiryDate.is_null())
                .add(VoucherCol::ExpiryDate.gt(now)),
        )
        .filter(
            Condition::any()
                .add(VoucherCol::TotalRedemptions.is_null())
                .add(
                    Expr::col(VoucherCol::Redemptions)
                        .lt(Expr::col(VoucherCol::TotalRedemptions)),
                ),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        // Distinguish missing from conflicting only after the atomic step.
        let voucher = Vouchers::find_by_id(id)
            .one(&state.orm)
            .await?
            .ok_or(AppError::NotFound)?;
        // Unpublished vouchers are as invisible here as they are to the
        // scanner; a Conflict would leak their existence.
        if voucher.status == "draft" {
            return Err(AppError::NotFound);
        }
        return Err(AppError::Conflict(conflict_reason(&voucher, now)));
    }

    let voucher = Vouchers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "voucher_redeem",
        Some("vouchers"),
        Some(serde_json::json!({ "voucher_id": id, "redemptions": voucher.redemptions })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Voucher redeemed",
        snapshot_from_entity(voucher),
        Some(Meta::empty()),
    ))
}

fn conflict_reason(voucher: &VoucherModel, now: chrono::DateTime<Utc>) -> String {
    if voucher.status != "active" {
        return format!("voucher is '{}'", voucher.status);
    }
    if voucher
        .expiry_date
        .is_some_and(|expiry| expiry <= now)
    {
        return "voucher has expired".into();
    }
    "redemption limit reached".into()
}

/// Expiry is a read-time derivation: an active voucher past its expiry
/// date reports `expired` without a stored transition.
pub fn snapshot_from_entity(model: VoucherModel) -> VoucherSnapshot {
    let expired = model.status == "active"
        && model
            .expiry_date
            .is_some_and(|expiry| expiry <= Utc::now());
    VoucherSnapshot {
        id: model.id,
        code: model.code,
        name: model.name,
        description: model.description,
        amount: model.amount,
        currency: model.currency,
        status: if expired {
            "expired".to_string()
        } else {
            model.status
        },
        redemptions: model.redemptions,
        total_redemptions: model.total_redemptions,
        expiry_date: model.expiry_date.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
