use std::time::Duration;

use axum_voucher_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::vouchers::CreateVoucherRequest,
    entity::users::ActiveModel as UserActive,
    error::AppError,
    middleware::auth::AuthUser,
    render::HttpAssetFetcher,
    services::{redemption_service, voucher_service},
    state::AppState,
};
use chrono::{Duration as ChronoDuration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

fn default_create_request(name: &str) -> CreateVoucherRequest {
    CreateVoucherRequest {
        name: name.into(),
        code: None,
        description: None,
        amount: Some(50.0),
        currency: Some("EUR".into()),
        qr_code: None,
        template: None,
        primary_color: None,
        secondary_color: None,
        text_color: None,
        logo_url: None,
        show_logo: None,
        show_qr_code: None,
        show_expiry_date: None,
        status: None,
        total_redemptions: None,
        expiry_date: None,
    }
}

// Integration flow: owner issues a capped voucher, it survives exactly
// `total_redemptions` redemptions and then conflicts.
#[tokio::test]
async fn capped_voucher_redeems_once_then_conflicts() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, "client", "owner").await?;
    let auth = AuthUser {
        user_id,
        role: "client".into(),
    };

    let mut payload = default_create_request("Beach Ride");
    payload.total_redemptions = Some(1);
    let created = voucher_service::create_voucher(&state, &auth, payload).await?;
    let voucher = created.data.unwrap();
    assert_eq!(voucher.status, "active");
    assert!(voucher.code.starts_with("GIFT-"));

    // Scanner lookup by code works before redemption.
    let found = redemption_service::validate_code(&state, &voucher.code).await?;
    assert_eq!(found.data.unwrap().redemptions, 0);

    let redeemed = redemption_service::redeem_voucher(&state, &auth, voucher.id).await?;
    let snapshot = redeemed.data.unwrap();
    assert_eq!(snapshot.redemptions, 1);
    assert_eq!(snapshot.status, "used");

    // The cap is hard: a second redemption conflicts instead of incrementing.
    let err = redemption_service::redeem_voucher(&state, &auth, voucher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    Ok(())
}

// N + k concurrent redemptions of a voucher capped at N must produce
// exactly N successes regardless of interleaving.
#[tokio::test]
async fn concurrent_redemptions_never_exceed_cap() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, "client", "racer").await?;
    let auth = AuthUser {
        user_id,
        role: "client".into(),
    };

    let mut payload = default_create_request("Trail Tour");
    payload.total_redemptions = Some(5);
    let voucher = voucher_service::create_voucher(&state, &auth, payload)
        .await?
        .data
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        let auth = auth.clone();
        let id = voucher.id;
        handles.push(tokio::spawn(async move {
            redemption_service::redeem_voucher(&state, &auth, id).await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => successes += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(err) => panic!("unexpected error: {err:?}"),
        }
    }
    assert_eq!(successes, 5);
    assert_eq!(conflicts, 3);

    let final_state = voucher_service::get_voucher(&state, &auth, voucher.id)
        .await?
        .data
        .unwrap();
    assert_eq!(final_state.redemptions, 5);
    assert_eq!(final_state.status, "used");

    Ok(())
}

#[tokio::test]
async fn expired_and_draft_vouchers_are_not_redeemable() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, "client", "edge").await?;
    let auth = AuthUser {
        user_id,
        role: "client".into(),
    };

    // Expired voucher: stored as active, reported and rejected as expired.
    let mut payload = default_create_request("Yesterday Pass");
    payload.expiry_date = Some(Utc::now() - ChronoDuration::days(1));
    let expired = voucher_service::create_voucher(&state, &auth, payload)
        .await?
        .data
        .unwrap();

    let snapshot = redemption_service::validate_code(&state, &expired.code)
        .await?
        .data
        .unwrap();
    assert_eq!(snapshot.status, "expired");

    let err = redemption_service::redeem_voucher(&state, &auth, expired.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    // Drafts are invisible to the scanner entirely.
    let mut payload = default_create_request("Unpublished");
    payload.status = Some("draft".into());
    let draft = voucher_service::create_voucher(&state, &auth, payload)
        .await?
        .data
        .unwrap();

    let err = redemption_service::validate_code(&state, &draft.code)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound), "got {err:?}");

    // Redeeming by id must not leak the draft's existence either.
    let err = redemption_service::redeem_voucher(&state, &auth, draft.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound), "got {err:?}");

    // Publishing moves draft -> active and makes it visible.
    voucher_service::publish_voucher(&state, &auth, draft.id).await?;
    let visible = redemption_service::validate_code(&state, &draft.code)
        .await?
        .data
        .unwrap();
    assert_eq!(visible.status, "active");

    // Publish is not idempotent: the voucher is no longer a draft.
    let err = voucher_service::publish_voucher(&state, &auth, draft.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    Ok(())
}

#[tokio::test]
async fn duplicate_code_is_a_conflict() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, "client", "dup").await?;
    let auth = AuthUser {
        user_id,
        role: "client".into(),
    };

    let code = format!("GIFT-{}", Uuid::new_v4().simple());
    let mut payload = default_create_request("First Issue");
    payload.code = Some(code.clone());
    voucher_service::create_voucher(&state, &auth, payload).await?;

    let mut payload = default_create_request("Second Issue");
    payload.code = Some(code);
    let err = voucher_service::create_voucher(&state, &auth, payload)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    Ok(())
}

#[tokio::test]
async fn validate_unknown_code_is_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let err = redemption_service::validate_code(&state, "GIFT-NOSUCHCODE")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound), "got {err:?}");

    let err = redemption_service::validate_code(&state, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");

    Ok(())
}

/// Returns `None` (skipping the test) when no database is configured.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    Ok(Some(AppState {
        pool,
        orm,
        assets: HttpAssetFetcher::new(Duration::from_secs(2))?,
        session_ttl_hours: 24,
    }))
}

/// Tests run concurrently against a shared database and re-run against a
/// dirty one, so every user gets a unique email instead of truncating.
async fn create_user(state: &AppState, role: &str, email_prefix: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set("Test User".into()),
        email: Set(format!("{email_prefix}-{}@example.com", Uuid::new_v4().simple())),
        password_hash: Set("dummy".into()),
        company: Set("Eco Salgados".into()),
        contact: Set(String::new()),
        address: Set(String::new()),
        postal_code: Set(String::new()),
        state: Set(String::new()),
        fat_number: Set(String::new()),
        company_logo: Set(String::new()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
