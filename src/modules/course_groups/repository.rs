//! Course group persistence.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::modules::course_groups::model::{
    CourseGroup, CourseGroupChanges, CourseGroupFilters, CourseGroupId, NewCourseGroup,
};
use matricula_core::AppError;
use matricula_db::{LIKE_ESCAPE, contains_pattern};

#[async_trait]
pub trait CourseGroupRepository: Send + Sync {
    /// One page of course groups, newest first, with the total matching the filters.
    async fn find_all(
        &self,
        filters: &CourseGroupFilters,
    ) -> Result<(Vec<CourseGroup>, i64), AppError>;
    async fn find_by_id(&self, id: CourseGroupId) -> Result<Option<CourseGroup>, AppError>;
    /// Exact, case-sensitive match.
    async fn find_by_name(&self, name: &str) -> Result<Option<CourseGroup>, AppError>;
    async fn create(&self, group: NewCourseGroup) -> Result<CourseGroup, AppError>;
    async fn update(
        &self,
        id: CourseGroupId,
        changes: CourseGroupChanges,
    ) -> Result<Option<CourseGroup>, AppError>;
    async fn delete(&self, id: CourseGroupId) -> Result<bool, AppError>;
}

const COURSE_GROUP_COLUMNS: &str =
    "id, name, description, start_date, end_date, max_students, created_at, updated_at";

pub struct PgCourseGroupRepository {
    db: PgPool,
}

impl PgCourseGroupRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &CourseGroupFilters) {
    builder.push(" WHERE 1=1");
    if let Some(name) = filters.name.as_deref().filter(|n| !n.is_empty()) {
        builder
            .push(" AND name ILIKE ")
            .push_bind(contains_pattern(name))
            .push(LIKE_ESCAPE);
    }
    if let Some(start_date) = filters.start_date {
        builder.push(" AND start_date >= ").push_bind(start_date);
    }
    if let Some(end_date) = filters.end_date {
        builder.push(" AND end_date <= ").push_bind(end_date);
    }
}

#[async_trait]
impl CourseGroupRepository for PgCourseGroupRepository {
    #[instrument(skip(self), fields(db.operation = "select"))]
    async fn find_all(
        &self,
        filters: &CourseGroupFilters,
    ) -> Result<(Vec<CourseGroup>, i64), AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM course_groups");
        push_filters(&mut count_query, filters);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.db)
            .await
            .context("Failed to count course groups")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COURSE_GROUP_COLUMNS} FROM course_groups"
        ));
        push_filters(&mut query, filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());

        let groups = query
            .build_query_as::<CourseGroup>()
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch course groups")
            .map_err(AppError::database)?;

        Ok((groups, total))
    }

    #[instrument(skip(self), fields(course_group.id = %id))]
    async fn find_by_id(&self, id: CourseGroupId) -> Result<Option<CourseGroup>, AppError> {
        sqlx::query_as::<_, CourseGroup>(&format!(
            "SELECT {COURSE_GROUP_COLUMNS} FROM course_groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("Failed to fetch course group by ID")
        .map_err(AppError::database)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CourseGroup>, AppError> {
        sqlx::query_as::<_, CourseGroup>(&format!(
            "SELECT {COURSE_GROUP_COLUMNS} FROM course_groups WHERE name = $1 LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.db)
        .await
        .context("Failed to fetch course group by name")
        .map_err(AppError::database)
    }

    #[instrument(skip(self, group), fields(db.operation = "insert"))]
    async fn create(&self, group: NewCourseGroup) -> Result<CourseGroup, AppError> {
        sqlx::query_as::<_, CourseGroup>(&format!(
            "INSERT INTO course_groups (id, name, description, start_date, end_date, max_students) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COURSE_GROUP_COLUMNS}"
        ))
        .bind(CourseGroupId::new())
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.start_date)
        .bind(group.end_date)
        .bind(group.max_students)
        .fetch_one(&self.db)
        .await
        .context("Failed to create course group")
        .map_err(AppError::database)
    }

    #[instrument(skip(self, changes), fields(course_group.id = %id, db.operation = "update"))]
    async fn update(
        &self,
        id: CourseGroupId,
        changes: CourseGroupChanges,
    ) -> Result<Option<CourseGroup>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE course_groups SET updated_at = ");
        query.push_bind(Utc::now());
        if let Some(name) = changes.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = changes.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(start_date) = changes.start_date {
            query.push(", start_date = ").push_bind(start_date);
        }
        if let Some(end_date) = changes.end_date {
            query.push(", end_date = ").push_bind(end_date);
        }
        if let Some(max_students) = changes.max_students {
            query.push(", max_students = ").push_bind(max_students);
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {COURSE_GROUP_COLUMNS}"));

        query
            .build_query_as::<CourseGroup>()
            .fetch_optional(&self.db)
            .await
            .context("Failed to update course group")
            .map_err(AppError::database)
    }

    #[instrument(skip(self), fields(course_group.id = %id, db.operation = "delete"))]
    async fn delete(&self, id: CourseGroupId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM course_groups WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("Failed to delete course group")
            .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }
}
