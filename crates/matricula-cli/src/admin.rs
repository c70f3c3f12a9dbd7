//! Admin account creation from the command line.

use anyhow::{Context, bail};
use matricula_core::{FieldError, hash_password};
use matricula_models::UserId;
use matricula_models::users::{UserFields, UserRole, validate_user};
use sqlx::PgPool;

/// Joins field errors into one printable line per error.
pub fn describe_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Creates an admin account after running the same checks as the API.
pub async fn create_admin(
    db: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<UserId> {
    let errors = validate_user(
        &UserFields {
            name: Some(name),
            email: Some(email),
            password: Some(password),
            confirm_password: Some(password),
            role: Some(UserRole::Admin.as_str()),
        },
        false,
    );
    if !errors.is_empty() {
        bail!("Invalid admin data:\n{}", describe_errors(&errors));
    }

    let password_hash =
        hash_password(password).map_err(|e| e.error.context("Failed to hash password"))?;

    let id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (id, name, email, password_hash, role)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(UserId::new())
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .bind(UserRole::Admin)
    .fetch_optional(db)
    .await
    .context("Failed to insert admin")?;

    match id {
        Some(id) => Ok(id),
        None => bail!("A user with email {email} already exists"),
    }
}
