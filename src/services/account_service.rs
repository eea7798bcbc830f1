use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};

use crate::{
    dto::account::UpdateAccountRequest,
    entity::users::{Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::UserProfile,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_account(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserProfile>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Account", profile_from_entity(model), None))
}

/// Partial update; the email is immutable and the password untouched.
/// Last write wins, there is no multi-writer contention on profiles.
pub async fn update_account(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateAccountRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active = model.into_active_model();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(company) = payload.company {
        active.company = Set(company);
    }
    if let Some(contact) = payload.contact {
        active.contact = Set(contact);
    }
    if let Some(address) = payload.address {
        active.address = Set(address);
    }
    if let Some(postal_code) = payload.postal_code {
        active.postal_code = Set(postal_code);
    }
    if let Some(state_name) = payload.state {
        active.state = Set(state_name);
    }
    if let Some(fat_number) = payload.fat_number {
        active.fat_number = Set(fat_number);
    }
    if let Some(company_logo) = payload.company_logo {
        active.company_logo = Set(company_logo);
    }

    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Account updated",
        profile_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub fn profile_from_entity(model: UserModel) -> UserProfile {
    UserProfile {
        id: model.id,
        name: model.name,
        email: model.email,
        company: model.company,
        contact: model.contact,
        address: model.address,
        postal_code: model.postal_code,
        state: model.state,
        fat_number: model.fat_number,
        company_logo: model.company_logo,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
