use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_voucher_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin-pass-123", "admin").await?;
    let client_id = ensure_user(&pool, "client@example.com", "client-pass-123", "client").await?;
    seed_vouchers(&pool, client_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Client ID: {client_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, company, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email.split('@').next().unwrap_or("user"))
    .bind(email)
    .bind(password_hash)
    .bind("Eco Salgados")
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(row.0)
}

async fn seed_vouchers(pool: &sqlx::PgPool, owner_id: Uuid) -> anyhow::Result<()> {
    let vouchers = [
        ("GIFT-BEACHRIDE01", "Beach Ride", "classic", Some(50.0), 1),
        ("GIFT-TRAILTOUR02", "Trail Tour", "elegant", Some(35.0), 5),
        ("GIFT-OPENSTABLE3", "Open Stable Day", "modern", None, 10),
    ];

    for (code, name, template, amount, cap) in vouchers {
        sqlx::query(
            r#"
            INSERT INTO vouchers (id, owner_id, code, name, template, amount, currency, total_redemptions)
            VALUES ($1, $2, $3, $4, $5, $6, 'EUR', $7)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(code)
        .bind(name)
        .bind(template)
        .bind(amount)
        .bind(cap)
        .execute(pool)
        .await?;
    }

    println!("Seeded vouchers");
    Ok(())
}
