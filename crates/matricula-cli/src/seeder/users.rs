//! Demo account seeding.

use bcrypt::hash;
use matricula_models::UserId;
use matricula_models::users::UserRole;
use sqlx::PgPool;
use std::time::Instant;

/// Password shared by the demo accounts.
pub const DEMO_PASSWORD: &str = "@123456";

/// `(name, email, role)` of the demo accounts.
pub const DEMO_USERS: [(&str, &str, UserRole); 2] = [
    ("Administrador", "admin@example.com", UserRole::Admin),
    ("Estudante", "student@example.com", UserRole::Student),
];

/// Inserts the demo admin and student accounts, skipping existing emails.
pub async fn seed_demo_users(db: &PgPool) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    println!("👤 Seeding demo accounts...");

    let password_hash = hash(DEMO_PASSWORD, matricula_core::password::BCRYPT_COST)?;

    let mut inserted = 0;
    for (name, email, role) in DEMO_USERS {
        inserted += sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(UserId::new())
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(role)
        .execute(db)
        .await?
        .rows_affected();
    }

    println!(
        "   ✓ Inserted {} demo accounts in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

/// Removes the demo accounts.
pub async fn clear_demo_users(db: &PgPool) -> anyhow::Result<u64> {
    let emails: Vec<&str> = DEMO_USERS.iter().map(|(_, email, _)| *email).collect();

    let result = sqlx::query("DELETE FROM users WHERE email = ANY($1)")
        .bind(&emails)
        .execute(db)
        .await?
        .rows_affected();

    println!("   ✓ Deleted {} demo accounts", result);

    Ok(result)
}
