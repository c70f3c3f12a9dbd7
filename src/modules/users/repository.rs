//! User account persistence.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::modules::users::model::{NewUser, User, UserChanges, UserFilterParams, UserId};
use matricula_core::AppError;
use matricula_db::{LIKE_ESCAPE, contains_pattern};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// One page of users, newest first, with the total matching the filters.
    async fn find_all(&self, filters: &UserFilterParams) -> Result<(Vec<User>, i64), AppError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<Option<User>, AppError>;
    async fn delete(&self, id: UserId) -> Result<bool, AppError>;
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &UserFilterParams) {
    builder.push(" WHERE 1=1");
    if let Some(name) = filters.name.as_deref().filter(|n| !n.is_empty()) {
        builder
            .push(" AND name ILIKE ")
            .push_bind(contains_pattern(name))
            .push(LIKE_ESCAPE);
    }
    if let Some(email) = filters.email.as_deref().filter(|e| !e.is_empty()) {
        builder.push(" AND email = ").push_bind(email.to_string());
    }
    if let Some(role) = filters.role {
        builder.push(" AND role = ").push_bind(role);
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self), fields(db.operation = "select"))]
    async fn find_all(&self, filters: &UserFilterParams) -> Result<(Vec<User>, i64), AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count_query, filters);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.db)
            .await
            .context("Failed to count users")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filters(&mut query, filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());

        let users = query
            .build_query_as::<User>()
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch users")
            .map_err(AppError::database)?;

        Ok((users, total))
    }

    #[instrument(skip(self), fields(user.id = %id))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch user by ID")
            .map_err(AppError::database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch user by email")
            .map_err(AppError::database)
    }

    #[instrument(skip(self, user), fields(db.operation = "insert", user.role = %user.role))]
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(UserId::new())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.db)
        .await
        .context("Failed to create user")
        .map_err(AppError::database)
    }

    #[instrument(skip(self, changes), fields(user.id = %id, db.operation = "update"))]
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = ");
        query.push_bind(Utc::now());
        if let Some(name) = changes.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(email) = changes.email {
            query.push(", email = ").push_bind(email);
        }
        if let Some(password_hash) = changes.password_hash {
            query.push(", password_hash = ").push_bind(password_hash);
        }
        if let Some(role) = changes.role {
            query.push(", role = ").push_bind(role);
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {USER_COLUMNS}"));

        query
            .build_query_as::<User>()
            .fetch_optional(&self.db)
            .await
            .context("Failed to update user")
            .map_err(AppError::database)
    }

    #[instrument(skip(self), fields(user.id = %id, db.operation = "delete"))]
    async fn delete(&self, id: UserId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("Failed to delete user")
            .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }
}
