//! Enrollment persistence.
//!
//! Listings join both sides of the relation so callers get the student and
//! course group summaries in a single query.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::course_groups::model::{CourseGroupId, CourseGroupSummary};
use crate::modules::enrollments::model::{
    Enrollment, EnrollmentDetail, EnrollmentFilterParams, EnrollmentId, EnrollmentStatus,
    NewEnrollment,
};
use crate::modules::students::model::{StudentId, StudentSummary};
use matricula_core::AppError;

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// One page of enrollments by enrollment date, newest first.
    async fn find_all(
        &self,
        filters: &EnrollmentFilterParams,
    ) -> Result<(Vec<EnrollmentDetail>, i64), AppError>;
    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<EnrollmentDetail>, AppError>;
    /// The row for a (student, course group) pair, whatever its status.
    async fn find_by_pair(
        &self,
        student_id: StudentId,
        course_group_id: CourseGroupId,
    ) -> Result<Option<Enrollment>, AppError>;
    async fn find_by_students(
        &self,
        student_ids: &[StudentId],
    ) -> Result<Vec<EnrollmentDetail>, AppError>;
    async fn find_by_course_group(
        &self,
        course_group_id: CourseGroupId,
    ) -> Result<Vec<EnrollmentDetail>, AppError>;
    async fn count_by_course_group(&self, course_group_id: CourseGroupId) -> Result<i64, AppError>;
    /// Inserts an `active` row dated now.
    async fn create(&self, enrollment: NewEnrollment) -> Result<Enrollment, AppError>;
    async fn update_status(
        &self,
        id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>, AppError>;
    async fn delete(&self, id: EnrollmentId) -> Result<bool, AppError>;
}

const ENROLLMENT_COLUMNS: &str =
    "id, student_id, course_group_id, enrollment_date, status, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT e.id, e.student_id, e.course_group_id, e.enrollment_date, e.status,
           e.created_at, e.updated_at,
           s.name AS student_name, s.email AS student_email,
           cg.name AS course_group_name, cg.start_date AS course_group_start_date,
           cg.end_date AS course_group_end_date
    FROM enrollments e
    JOIN students s ON s.id = e.student_id
    JOIN course_groups cg ON cg.id = e.course_group_id
"#;

#[derive(FromRow)]
struct EnrollmentDetailRow {
    id: EnrollmentId,
    student_id: StudentId,
    course_group_id: CourseGroupId,
    enrollment_date: DateTime<Utc>,
    status: EnrollmentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    student_name: String,
    student_email: String,
    course_group_name: String,
    course_group_start_date: DateTime<Utc>,
    course_group_end_date: DateTime<Utc>,
}

impl From<EnrollmentDetailRow> for EnrollmentDetail {
    fn from(row: EnrollmentDetailRow) -> Self {
        Self {
            enrollment: Enrollment {
                id: row.id,
                student_id: row.student_id,
                course_group_id: row.course_group_id,
                enrollment_date: row.enrollment_date,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            student: StudentSummary {
                id: row.student_id,
                name: row.student_name,
                email: row.student_email,
            },
            course_group: CourseGroupSummary {
                id: row.course_group_id,
                name: row.course_group_name,
                start_date: row.course_group_start_date,
                end_date: row.course_group_end_date,
            },
        }
    }
}

pub struct PgEnrollmentRepository {
    db: PgPool,
}

impl PgEnrollmentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &EnrollmentFilterParams) {
    builder.push(" WHERE 1=1");
    if let Some(status) = filters.status {
        builder.push(" AND e.status = ").push_bind(status);
    }
    if let Some(student_id) = filters.student_id {
        builder.push(" AND e.student_id = ").push_bind(student_id);
    }
    if let Some(course_group_id) = filters.course_group_id {
        builder
            .push(" AND e.course_group_id = ")
            .push_bind(course_group_id);
    }
}

#[async_trait]
impl EnrollmentRepository for PgEnrollmentRepository {
    #[instrument(skip(self), fields(db.operation = "select"))]
    async fn find_all(
        &self,
        filters: &EnrollmentFilterParams,
    ) -> Result<(Vec<EnrollmentDetail>, i64), AppError> {
        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM enrollments e");
        push_filters(&mut count_query, filters);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.db)
            .await
            .context("Failed to count enrollments")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        push_filters(&mut query, filters);
        query
            .push(" ORDER BY e.enrollment_date DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());

        let rows = query
            .build_query_as::<EnrollmentDetailRow>()
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch enrollments")
            .map_err(AppError::database)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self), fields(enrollment.id = %id))]
    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<EnrollmentDetail>, AppError> {
        let row = sqlx::query_as::<_, EnrollmentDetailRow>(&format!("{DETAIL_SELECT} WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch enrollment by ID")
            .map_err(AppError::database)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_pair(
        &self,
        student_id: StudentId,
        course_group_id: CourseGroupId,
    ) -> Result<Option<Enrollment>, AppError> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE student_id = $1 AND course_group_id = $2"
        ))
        .bind(student_id)
        .bind(course_group_id)
        .fetch_optional(&self.db)
        .await
        .context("Failed to fetch enrollment by student and course group")
        .map_err(AppError::database)
    }

    async fn find_by_students(
        &self,
        student_ids: &[StudentId],
    ) -> Result<Vec<EnrollmentDetail>, AppError> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = student_ids.iter().map(|id| id.into_inner()).collect();
        let rows = sqlx::query_as::<_, EnrollmentDetailRow>(&format!(
            "{DETAIL_SELECT} WHERE e.student_id = ANY($1) ORDER BY e.enrollment_date DESC"
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("Failed to fetch enrollments of students")
        .map_err(AppError::database)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(course_group.id = %course_group_id))]
    async fn find_by_course_group(
        &self,
        course_group_id: CourseGroupId,
    ) -> Result<Vec<EnrollmentDetail>, AppError> {
        let rows = sqlx::query_as::<_, EnrollmentDetailRow>(&format!(
            "{DETAIL_SELECT} WHERE e.course_group_id = $1 ORDER BY e.enrollment_date DESC"
        ))
        .bind(course_group_id)
        .fetch_all(&self.db)
        .await
        .context("Failed to fetch enrollments of course group")
        .map_err(AppError::database)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_course_group(&self, course_group_id: CourseGroupId) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE course_group_id = $1")
            .bind(course_group_id)
            .fetch_one(&self.db)
            .await
            .context("Failed to count enrollments of course group")
            .map_err(AppError::database)
    }

    #[instrument(skip(self), fields(db.operation = "insert"))]
    async fn create(&self, enrollment: NewEnrollment) -> Result<Enrollment, AppError> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "INSERT INTO enrollments (id, student_id, course_group_id, enrollment_date, status) \
             VALUES ($1, $2, $3, NOW(), $4) RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(EnrollmentId::new())
        .bind(enrollment.student_id)
        .bind(enrollment.course_group_id)
        .bind(EnrollmentStatus::Active)
        .fetch_one(&self.db)
        .await
        .context("Failed to create enrollment")
        .map_err(AppError::database)
    }

    #[instrument(skip(self), fields(enrollment.id = %id, db.operation = "update"))]
    async fn update_status(
        &self,
        id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>, AppError> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "UPDATE enrollments SET status = $1, updated_at = NOW() WHERE id = $2 \
             RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("Failed to update enrollment status")
        .map_err(AppError::database)
    }

    #[instrument(skip(self), fields(enrollment.id = %id, db.operation = "delete"))]
    async fn delete(&self, id: EnrollmentId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("Failed to delete enrollment")
            .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use matricula_core::PaginationParams;

    use crate::modules::course_groups::model::NewCourseGroup;
    use crate::modules::course_groups::repository::{
        CourseGroupRepository, PgCourseGroupRepository,
    };
    use crate::modules::students::model::NewStudent;
    use crate::modules::students::repository::{PgStudentRepository, StudentRepository};

    async fn create_student(pool: &PgPool, n: u32) -> StudentId {
        PgStudentRepository::new(pool.clone())
            .create(NewStudent {
                name: format!("Aluno {n}"),
                email: format!("aluno{n}@example.com"),
                ra: format!("RA{n:04}"),
                cpf: format!("{n:011}"),
            })
            .await
            .unwrap()
            .id
    }

    async fn create_course_group(pool: &PgPool, name: &str) -> CourseGroupId {
        PgCourseGroupRepository::new(pool.clone())
            .create(NewCourseGroup {
                name: name.to_string(),
                description: None,
                start_date: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
                end_date: Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap(),
                max_students: None,
            })
            .await
            .unwrap()
            .id
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_enroll_and_duplicate_pair_rejected(pool: PgPool) {
        let student_id = create_student(&pool, 1).await;
        let course_group_id = create_course_group(&pool, "Turma A").await;
        let repo = PgEnrollmentRepository::new(pool);
        let pair = NewEnrollment {
            student_id,
            course_group_id,
        };

        let enrollment = repo.create(pair).await.unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Active);
        assert_eq!(enrollment.student_id, student_id);

        let found = repo
            .find_by_pair(student_id, course_group_id)
            .await
            .unwrap();
        assert_eq!(found, Some(enrollment));

        assert!(repo.create(pair).await.is_err());
        assert_eq!(repo.count_by_course_group(course_group_id).await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_cancel_round_trips_status(pool: PgPool) {
        let student_id = create_student(&pool, 1).await;
        let course_group_id = create_course_group(&pool, "Turma A").await;
        let repo = PgEnrollmentRepository::new(pool);
        let enrollment = repo
            .create(NewEnrollment {
                student_id,
                course_group_id,
            })
            .await
            .unwrap();

        let cancelled = repo
            .update_status(enrollment.id, EnrollmentStatus::Cancelled)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.status, EnrollmentStatus::Cancelled);
        assert_eq!(cancelled.enrollment_date, enrollment.enrollment_date);

        let detail = repo.find_by_id(enrollment.id).await.unwrap().unwrap();
        assert_eq!(detail.enrollment.status, EnrollmentStatus::Cancelled);
        assert_eq!(detail.student.name, "Aluno 1");
        assert_eq!(detail.course_group.name, "Turma A");

        let missing = repo
            .update_status(EnrollmentId::new(), EnrollmentStatus::Cancelled)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_all_filters_and_pages(pool: PgPool) {
        let first = create_student(&pool, 1).await;
        let second = create_student(&pool, 2).await;
        let turma_a = create_course_group(&pool, "Turma A").await;
        let turma_b = create_course_group(&pool, "Turma B").await;
        let repo = PgEnrollmentRepository::new(pool);

        for (student_id, course_group_id) in [(first, turma_a), (first, turma_b), (second, turma_a)] {
            repo.create(NewEnrollment {
                student_id,
                course_group_id,
            })
            .await
            .unwrap();
        }
        let to_cancel = repo.find_by_pair(second, turma_a).await.unwrap().unwrap();
        repo.update_status(to_cancel.id, EnrollmentStatus::Cancelled)
            .await
            .unwrap();

        let cancelled = EnrollmentFilterParams {
            status: Some(EnrollmentStatus::Cancelled),
            ..Default::default()
        };
        let (rows, total) = repo.find_all(&cancelled).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].student.id, second);

        let in_turma_a = EnrollmentFilterParams {
            course_group_id: Some(turma_a),
            pagination: PaginationParams::new(2, 1),
            ..Default::default()
        };
        let (rows, total) = repo.find_all(&in_turma_a).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 1);

        let active_of_first = EnrollmentFilterParams {
            status: Some(EnrollmentStatus::Active),
            student_id: Some(first),
            ..Default::default()
        };
        let (_, total) = repo.find_all(&active_of_first).await.unwrap();
        assert_eq!(total, 2);

        let of_students = repo.find_by_students(&[first, second]).await.unwrap();
        assert_eq!(of_students.len(), 3);
        assert!(repo.find_by_students(&[]).await.unwrap().is_empty());
        assert_eq!(repo.find_by_course_group(turma_b).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_deleting_either_side_cascades(pool: PgPool) {
        let student_id = create_student(&pool, 1).await;
        let other_student = create_student(&pool, 2).await;
        let course_group_id = create_course_group(&pool, "Turma A").await;
        let repo = PgEnrollmentRepository::new(pool.clone());

        let by_student = repo
            .create(NewEnrollment {
                student_id,
                course_group_id,
            })
            .await
            .unwrap();
        let by_group = repo
            .create(NewEnrollment {
                student_id: other_student,
                course_group_id,
            })
            .await
            .unwrap();

        PgStudentRepository::new(pool.clone())
            .delete(student_id)
            .await
            .unwrap();
        assert!(repo.find_by_id(by_student.id).await.unwrap().is_none());
        assert!(repo.find_by_id(by_group.id).await.unwrap().is_some());

        PgCourseGroupRepository::new(pool)
            .delete(course_group_id)
            .await
            .unwrap();
        assert!(repo.find_by_id(by_group.id).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_enrollment_frees_the_pair(pool: PgPool) {
        let student_id = create_student(&pool, 1).await;
        let course_group_id = create_course_group(&pool, "Turma A").await;
        let repo = PgEnrollmentRepository::new(pool);
        let pair = NewEnrollment {
            student_id,
            course_group_id,
        };
        let enrollment = repo.create(pair).await.unwrap();

        assert!(repo.delete(enrollment.id).await.unwrap());
        assert!(!repo.delete(enrollment.id).await.unwrap());
        assert!(repo.create(pair).await.is_ok());
    }
}
