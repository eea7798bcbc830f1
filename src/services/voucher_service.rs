use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::vouchers::{CreateVoucherRequest, VoucherList},
    entity::vouchers::{
        ActiveModel as VoucherActive, Column as VoucherCol, Entity as Vouchers,
        Model as VoucherModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Voucher,
    render::{BrandHeader, RenderError, Template, hex_to_rgb, render_voucher_document},
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, VoucherListQuery},
    state::AppState,
};

pub async fn list_vouchers(
    state: &AppState,
    user: &AuthUser,
    query: VoucherListQuery,
) -> AppResult<ApiResponse<VoucherList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(VoucherCol::OwnerId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(VoucherCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Vouchers::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(VoucherCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(VoucherCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let vouchers = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(voucher_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        VoucherList { items: vouchers },
        Some(meta),
    ))
}

pub async fn create_voucher(
    state: &AppState,
    user: &AuthUser,
    payload: CreateVoucherRequest,
) -> AppResult<ApiResponse<Voucher>> {
    // Consumer accounts redeem vouchers, they do not issue them.
    if user.role == "consumer" {
        return Err(AppError::Forbidden);
    }

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("missing required field 'name'".into()));
    }

    let template = payload.template.unwrap_or_else(|| "classic".to_string());
    if Template::parse(&template).is_none() {
        return Err(AppError::BadRequest(format!("unknown template '{template}'")));
    }

    // The status space is closed here even though the column is plain text.
    let status = payload.status.unwrap_or_else(|| "active".to_string());
    if !matches!(status.as_str(), "draft" | "active") {
        return Err(AppError::BadRequest(format!(
            "a new voucher must be 'draft' or 'active', got '{status}'"
        )));
    }

    let primary_color = payload.primary_color.unwrap_or_else(|| "#3B82F6".to_string());
    let secondary_color = payload
        .secondary_color
        .unwrap_or_else(|| "#1E40AF".to_string());
    let text_color = payload.text_color.unwrap_or_else(|| "#FFFFFF".to_string());
    for color in [&primary_color, &secondary_color, &text_color] {
        hex_to_rgb(color).map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    if let Some(amount) = payload.amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::BadRequest("amount must be non-negative".into()));
        }
    }
    if let Some(cap) = payload.total_redemptions {
        if cap < 1 {
            return Err(AppError::BadRequest(
                "total_redemptions must be at least 1".into(),
            ));
        }
    }
    if let Some(qr) = payload.qr_code.as_deref().filter(|q| !q.is_empty()) {
        if !qr.starts_with("data:") {
            return Err(AppError::BadRequest(
                "qr_code must be a base64 data URI".into(),
            ));
        }
    }

    let code = match payload.code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) {
        Some(code) => code,
        None => generate_code(),
    };

    let duplicate = Vouchers::find()
        .filter(VoucherCol::Code.eq(code.as_str()))
        .one(&state.orm)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!("code '{code}' already exists")));
    }

    let insert = VoucherActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.user_id),
        code: Set(code),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description.filter(|d| !d.is_empty())),
        amount: Set(payload.amount),
        currency: Set(payload.currency.filter(|c| !c.is_empty())),
        qr_code: Set(payload.qr_code.filter(|q| !q.is_empty())),
        template: Set(template),
        primary_color: Set(primary_color),
        secondary_color: Set(secondary_color),
        text_color: Set(text_color),
        logo_url: Set(payload.logo_url.filter(|u| !u.is_empty())),
        show_logo: Set(payload.show_logo.unwrap_or(true)),
        show_qr_code: Set(payload.show_qr_code.unwrap_or(true)),
        show_expiry_date: Set(payload.show_expiry_date.unwrap_or(true)),
        status: Set(status),
        redemptions: Set(0),
        total_redemptions: Set(payload.total_redemptions),
        expiry_date: Set(payload.expiry_date.map(Into::into)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await;

    // Concurrent creates can race past the pre-check; the unique index on
    // `code` is the arbiter, and losing it is still a conflict, not a 500.
    let voucher = match insert {
        Ok(voucher) => voucher,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("voucher code already exists".into()));
        }
        Err(err) => return Err(err.into()),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "voucher_create",
        Some("vouchers"),
        Some(serde_json::json!({ "voucher_id": voucher.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Voucher created",
        voucher_from_entity(voucher),
        Some(Meta::empty()),
    ))
}

pub async fn get_voucher(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Voucher>> {
    let voucher = find_owned(state, user, id).await?;
    Ok(ApiResponse::success("Voucher", voucher_from_entity(voucher), None))
}

pub async fn delete_voucher(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let mut condition = Condition::all().add(VoucherCol::Id.eq(id));
    if user.role != "admin" {
        condition = condition.add(VoucherCol::OwnerId.eq(user.user_id));
    }

    let result = Vouchers::delete_many()
        .filter(condition)
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "voucher_delete",
        Some("vouchers"),
        Some(serde_json::json!({ "voucher_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Voucher deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Explicit draft -> active transition; conditional so a concurrent publish
/// or redemption cannot resurrect a non-draft voucher.
pub async fn publish_voucher(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Voucher>> {
    let result = Vouchers::update_many()
        .col_expr(VoucherCol::Status, Expr::value("active"))
        .filter(VoucherCol::Id.eq(id))
        .filter(VoucherCol::OwnerId.eq(user.user_id))
        .filter(VoucherCol::Status.eq("draft"))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        let existing = find_owned(state, user, id).await?;
        return Err(AppError::Conflict(format!(
            "voucher is '{}', only drafts can be published",
            existing.status
        )));
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "voucher_publish",
        Some("vouchers"),
        Some(serde_json::json!({ "voucher_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let voucher = find_owned(state, user, id).await?;
    Ok(ApiResponse::success(
        "Voucher published",
        voucher_from_entity(voucher),
        Some(Meta::empty()),
    ))
}

/// Compose the print-ready PDF for an owned voucher. Asset failures degrade
/// inside the composer; only malformed stored colors surface as an error.
pub async fn render_voucher_pdf(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<Vec<u8>> {
    let voucher = find_owned(state, user, id).await?;
    let owner = crate::entity::Users::find_by_id(voucher.owner_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let brand = BrandHeader {
        company: if owner.company.is_empty() {
            owner.name.clone()
        } else {
            owner.company.clone()
        },
        tagline: None,
        logo_url: Some(owner.company_logo).filter(|u| !u.is_empty()),
    };

    let voucher = voucher_from_entity(voucher);
    render_voucher_document(&voucher, &brand, &state.assets)
        .await
        .map_err(|e| match e {
            RenderError::Color(err) => AppError::BadRequest(err.to_string()),
        })
}

async fn find_owned(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<VoucherModel> {
    let mut condition = Condition::all().add(VoucherCol::Id.eq(id));
    if user.role != "admin" {
        condition = condition.add(VoucherCol::OwnerId.eq(user.user_id));
    }
    Vouchers::find()
        .filter(condition)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn generate_code() -> String {
    let suffix = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("GIFT-{}", &suffix[..12])
}

pub fn voucher_from_entity(model: VoucherModel) -> Voucher {
    Voucher {
        id: model.id,
        owner_id: model.owner_id,
        code: model.code,
        name: model.name,
        description: model.description,
        amount: model.amount,
        currency: model.currency,
        qr_code: model.qr_code,
        template: model.template,
        primary_color: model.primary_color,
        secondary_color: model.secondary_color,
        text_color: model.text_color,
        logo_url: model.logo_url,
        show_logo: model.show_logo,
        show_qr_code: model.show_qr_code,
        show_expiry_date: model.show_expiry_date,
        status: model.status,
        redemptions: model.redemptions,
        total_redemptions: model.total_redemptions,
        expiry_date: model.expiry_date.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
