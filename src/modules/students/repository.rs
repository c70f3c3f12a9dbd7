//! Student persistence.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::modules::students::model::{
    NewStudent, Student, StudentChanges, StudentFilterParams, StudentId,
};
use matricula_core::AppError;
use matricula_db::{LIKE_ESCAPE, contains_pattern};

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// One page of students, newest first, with the total matching the filters.
    async fn find_all(&self, filters: &StudentFilterParams) -> Result<(Vec<Student>, i64), AppError>;
    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;
    async fn find_by_ra(&self, ra: &str) -> Result<Option<Student>, AppError>;
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Student>, AppError>;
    async fn create(&self, student: NewStudent) -> Result<Student, AppError>;
    /// `None` when no student has this id.
    async fn update(&self, id: StudentId, changes: StudentChanges) -> Result<Option<Student>, AppError>;
    /// Whether a row was removed.
    async fn delete(&self, id: StudentId) -> Result<bool, AppError>;
}

const STUDENT_COLUMNS: &str = "id, name, email, ra, cpf, created_at, updated_at";

pub struct PgStudentRepository {
    db: PgPool,
}

impl PgStudentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one_by(&self, column: &str, value: &str) -> Result<Option<Student>, AppError> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("Failed to fetch student by {column}"))
        .map_err(AppError::database)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &StudentFilterParams) {
    builder.push(" WHERE 1=1");
    for (column, value) in [
        ("name", &filters.name),
        ("email", &filters.email),
        ("ra", &filters.ra),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            builder
                .push(format!(" AND {column} ILIKE "))
                .push_bind(contains_pattern(value))
                .push(LIKE_ESCAPE);
        }
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    #[instrument(skip(self), fields(db.operation = "select"))]
    async fn find_all(&self, filters: &StudentFilterParams) -> Result<(Vec<Student>, i64), AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students");
        push_filters(&mut count_query, filters);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.db)
            .await
            .context("Failed to count students")
            .map_err(AppError::database)?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {STUDENT_COLUMNS} FROM students"));
        push_filters(&mut query, filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());

        let students = query
            .build_query_as::<Student>()
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch students")
            .map_err(AppError::database)?;

        Ok((students, total))
    }

    #[instrument(skip(self), fields(student.id = %id))]
    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, AppError> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("Failed to fetch student by ID")
        .map_err(AppError::database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        self.find_one_by("email", email).await
    }

    async fn find_by_ra(&self, ra: &str) -> Result<Option<Student>, AppError> {
        self.find_one_by("ra", ra).await
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Student>, AppError> {
        self.find_one_by("cpf", cpf).await
    }

    #[instrument(skip(self, student), fields(db.operation = "insert"))]
    async fn create(&self, student: NewStudent) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO students (id, name, email, ra, cpf) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(StudentId::new())
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.ra)
        .bind(&student.cpf)
        .fetch_one(&self.db)
        .await
        .context("Failed to create student")
        .map_err(AppError::database)
    }

    #[instrument(skip(self, changes), fields(student.id = %id, db.operation = "update"))]
    async fn update(&self, id: StudentId, changes: StudentChanges) -> Result<Option<Student>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE students SET updated_at = ");
        query.push_bind(Utc::now());
        if let Some(name) = changes.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(email) = changes.email {
            query.push(", email = ").push_bind(email);
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {STUDENT_COLUMNS}"));

        query
            .build_query_as::<Student>()
            .fetch_optional(&self.db)
            .await
            .context("Failed to update student")
            .map_err(AppError::database)
    }

    #[instrument(skip(self), fields(student.id = %id, db.operation = "delete"))]
    async fn delete(&self, id: StudentId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("Failed to delete student")
            .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }
}
