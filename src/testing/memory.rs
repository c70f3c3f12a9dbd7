//! In-memory implementation of every repository trait.
//!
//! Mirrors the PostgreSQL schema closely enough for the services and the
//! HTTP layer to be exercised without a database: unique columns reject
//! duplicates with a storage error, deletes cascade to enrollments, and
//! listings are ordered and paginated like the SQL queries.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;

use crate::modules::course_groups::model::{
    CourseGroup, CourseGroupChanges, CourseGroupFilters, CourseGroupId, CourseGroupSummary,
    NewCourseGroup,
};
use crate::modules::course_groups::repository::CourseGroupRepository;
use crate::modules::enrollments::model::{
    Enrollment, EnrollmentDetail, EnrollmentFilterParams, EnrollmentId, EnrollmentStatus,
    NewEnrollment,
};
use crate::modules::enrollments::repository::EnrollmentRepository;
use crate::modules::students::model::{
    NewStudent, Student, StudentChanges, StudentFilterParams, StudentId, StudentSummary,
};
use crate::modules::students::repository::StudentRepository;
use crate::modules::users::model::{NewUser, User, UserChanges, UserFilterParams, UserId};
use crate::modules::users::repository::UserRepository;
use matricula_core::{AppError, PaginationParams};

#[derive(Debug, Default)]
struct Tables {
    students: Vec<Student>,
    course_groups: Vec<CourseGroup>,
    enrollments: Vec<Enrollment>,
    users: Vec<User>,
}

impl Tables {
    fn detail(&self, enrollment: &Enrollment) -> Option<EnrollmentDetail> {
        let student = self
            .students
            .iter()
            .find(|s| s.id == enrollment.student_id)?;
        let group = self
            .course_groups
            .iter()
            .find(|g| g.id == enrollment.course_group_id)?;

        Some(EnrollmentDetail {
            enrollment: enrollment.clone(),
            student: StudentSummary::from(student),
            course_group: CourseGroupSummary::from(group),
        })
    }
}

/// Shared tables behind a lock. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::internal(anyhow!("memory store lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::internal(anyhow!("memory store lock poisoned")))
    }
}

fn unique_violation(constraint: &str) -> AppError {
    AppError::database(anyhow!(
        "duplicate key value violates unique constraint \"{constraint}\""
    ))
}

fn matches_substring(value: &str, filter: Option<&str>) -> bool {
    match filter.filter(|f| !f.is_empty()) {
        Some(filter) => value.to_lowercase().contains(&filter.to_lowercase()),
        None => true,
    }
}

/// Newest first, ties keep the most recently inserted row first.
fn newest_first<T: Clone>(rows: &[&T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut rows: Vec<T> = rows.iter().rev().map(|row| (*row).clone()).collect();
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

fn page<T>(rows: Vec<T>, pagination: &PaginationParams) -> Vec<T> {
    rows.into_iter()
        .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(pagination.limit()).unwrap_or(usize::MAX))
        .collect()
}

#[async_trait]
impl StudentRepository for MemoryStore {
    async fn find_all(&self, filters: &StudentFilterParams) -> Result<(Vec<Student>, i64), AppError> {
        let tables = self.read()?;
        let matching: Vec<&Student> = tables
            .students
            .iter()
            .filter(|s| matches_substring(&s.name, filters.name.as_deref()))
            .filter(|s| matches_substring(&s.email, filters.email.as_deref()))
            .filter(|s| matches_substring(&s.ra, filters.ra.as_deref()))
            .collect();
        let total = matching.len() as i64;
        let rows = newest_first(&matching, |s| s.created_at);

        Ok((page(rows, &filters.pagination), total))
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, AppError> {
        Ok(self.read()?.students.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        Ok(self.read()?.students.iter().find(|s| s.email == email).cloned())
    }

    async fn find_by_ra(&self, ra: &str) -> Result<Option<Student>, AppError> {
        Ok(self.read()?.students.iter().find(|s| s.ra == ra).cloned())
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Student>, AppError> {
        Ok(self.read()?.students.iter().find(|s| s.cpf == cpf).cloned())
    }

    async fn create(&self, student: NewStudent) -> Result<Student, AppError> {
        let mut tables = self.write()?;
        for existing in &tables.students {
            if existing.email == student.email {
                return Err(unique_violation("students_email_key"));
            }
            if existing.ra == student.ra {
                return Err(unique_violation("students_ra_key"));
            }
            if existing.cpf == student.cpf {
                return Err(unique_violation("students_cpf_key"));
            }
        }

        let now = Utc::now();
        let student = Student {
            id: StudentId::new(),
            name: student.name,
            email: student.email,
            ra: student.ra,
            cpf: student.cpf,
            created_at: now,
            updated_at: now,
        };
        tables.students.push(student.clone());
        Ok(student)
    }

    async fn update(&self, id: StudentId, changes: StudentChanges) -> Result<Option<Student>, AppError> {
        let mut tables = self.write()?;
        if let Some(email) = &changes.email {
            if tables.students.iter().any(|s| s.id != id && &s.email == email) {
                return Err(unique_violation("students_email_key"));
            }
        }

        let Some(student) = tables.students.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            student.name = name;
        }
        if let Some(email) = changes.email {
            student.email = email;
        }
        student.updated_at = Utc::now();
        Ok(Some(student.clone()))
    }

    async fn delete(&self, id: StudentId) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        let before = tables.students.len();
        tables.students.retain(|s| s.id != id);
        tables.enrollments.retain(|e| e.student_id != id);
        Ok(tables.students.len() < before)
    }
}

#[async_trait]
impl CourseGroupRepository for MemoryStore {
    async fn find_all(
        &self,
        filters: &CourseGroupFilters,
    ) -> Result<(Vec<CourseGroup>, i64), AppError> {
        let tables = self.read()?;
        let matching: Vec<&CourseGroup> = tables
            .course_groups
            .iter()
            .filter(|g| matches_substring(&g.name, filters.name.as_deref()))
            .filter(|g| filters.start_date.is_none_or(|start| g.start_date >= start))
            .filter(|g| filters.end_date.is_none_or(|end| g.end_date <= end))
            .collect();
        let total = matching.len() as i64;
        let rows = newest_first(&matching, |g| g.created_at);

        Ok((page(rows, &filters.pagination), total))
    }

    async fn find_by_id(&self, id: CourseGroupId) -> Result<Option<CourseGroup>, AppError> {
        Ok(self.read()?.course_groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CourseGroup>, AppError> {
        Ok(self
            .read()?
            .course_groups
            .iter()
            .find(|g| g.name == name)
            .cloned())
    }

    async fn create(&self, group: NewCourseGroup) -> Result<CourseGroup, AppError> {
        let now = Utc::now();
        let group = CourseGroup {
            id: CourseGroupId::new(),
            name: group.name,
            description: group.description,
            start_date: group.start_date,
            end_date: group.end_date,
            max_students: group.max_students,
            created_at: now,
            updated_at: now,
        };
        self.write()?.course_groups.push(group.clone());
        Ok(group)
    }

    async fn update(
        &self,
        id: CourseGroupId,
        changes: CourseGroupChanges,
    ) -> Result<Option<CourseGroup>, AppError> {
        let mut tables = self.write()?;
        let Some(group) = tables.course_groups.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            group.name = name;
        }
        if let Some(description) = changes.description {
            group.description = description;
        }
        if let Some(start_date) = changes.start_date {
            group.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            group.end_date = end_date;
        }
        if let Some(max_students) = changes.max_students {
            group.max_students = max_students;
        }
        group.updated_at = Utc::now();
        Ok(Some(group.clone()))
    }

    async fn delete(&self, id: CourseGroupId) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        let before = tables.course_groups.len();
        tables.course_groups.retain(|g| g.id != id);
        tables.enrollments.retain(|e| e.course_group_id != id);
        Ok(tables.course_groups.len() < before)
    }
}

#[async_trait]
impl EnrollmentRepository for MemoryStore {
    async fn find_all(
        &self,
        filters: &EnrollmentFilterParams,
    ) -> Result<(Vec<EnrollmentDetail>, i64), AppError> {
        let tables = self.read()?;
        let matching: Vec<&Enrollment> = tables
            .enrollments
            .iter()
            .filter(|e| filters.status.is_none_or(|status| e.status == status))
            .filter(|e| filters.student_id.is_none_or(|id| e.student_id == id))
            .filter(|e| filters.course_group_id.is_none_or(|id| e.course_group_id == id))
            .collect();
        let total = matching.len() as i64;
        let rows = newest_first(&matching, |e| e.enrollment_date);
        let details = page(rows, &filters.pagination)
            .iter()
            .filter_map(|e| tables.detail(e))
            .collect();

        Ok((details, total))
    }

    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<EnrollmentDetail>, AppError> {
        let tables = self.read()?;
        Ok(tables
            .enrollments
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| tables.detail(e)))
    }

    async fn find_by_pair(
        &self,
        student_id: StudentId,
        course_group_id: CourseGroupId,
    ) -> Result<Option<Enrollment>, AppError> {
        Ok(self
            .read()?
            .enrollments
            .iter()
            .find(|e| e.student_id == student_id && e.course_group_id == course_group_id)
            .cloned())
    }

    async fn find_by_students(
        &self,
        student_ids: &[StudentId],
    ) -> Result<Vec<EnrollmentDetail>, AppError> {
        let tables = self.read()?;
        let matching: Vec<&Enrollment> = tables
            .enrollments
            .iter()
            .filter(|e| student_ids.contains(&e.student_id))
            .collect();

        Ok(newest_first(&matching, |e| e.enrollment_date)
            .iter()
            .filter_map(|e| tables.detail(e))
            .collect())
    }

    async fn find_by_course_group(
        &self,
        course_group_id: CourseGroupId,
    ) -> Result<Vec<EnrollmentDetail>, AppError> {
        let tables = self.read()?;
        let matching: Vec<&Enrollment> = tables
            .enrollments
            .iter()
            .filter(|e| e.course_group_id == course_group_id)
            .collect();

        Ok(newest_first(&matching, |e| e.enrollment_date)
            .iter()
            .filter_map(|e| tables.detail(e))
            .collect())
    }

    async fn count_by_course_group(&self, course_group_id: CourseGroupId) -> Result<i64, AppError> {
        Ok(self
            .read()?
            .enrollments
            .iter()
            .filter(|e| e.course_group_id == course_group_id)
            .count() as i64)
    }

    async fn create(&self, enrollment: NewEnrollment) -> Result<Enrollment, AppError> {
        let mut tables = self.write()?;
        if tables.enrollments.iter().any(|e| {
            e.student_id == enrollment.student_id && e.course_group_id == enrollment.course_group_id
        }) {
            return Err(unique_violation("enrollments_student_course_group_key"));
        }
        let student_exists = tables.students.iter().any(|s| s.id == enrollment.student_id);
        let group_exists = tables
            .course_groups
            .iter()
            .any(|g| g.id == enrollment.course_group_id);
        if !student_exists || !group_exists {
            return Err(AppError::database(anyhow!(
                "insert on table \"enrollments\" violates foreign key constraint"
            )));
        }

        let now = Utc::now();
        let enrollment = Enrollment {
            id: EnrollmentId::new(),
            student_id: enrollment.student_id,
            course_group_id: enrollment.course_group_id,
            enrollment_date: now,
            status: EnrollmentStatus::Active,
            created_at: now,
            updated_at: now,
        };
        tables.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn update_status(
        &self,
        id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>, AppError> {
        let mut tables = self.write()?;
        let Some(enrollment) = tables.enrollments.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        enrollment.status = status;
        enrollment.updated_at = Utc::now();
        Ok(Some(enrollment.clone()))
    }

    async fn delete(&self, id: EnrollmentId) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        let before = tables.enrollments.len();
        tables.enrollments.retain(|e| e.id != id);
        Ok(tables.enrollments.len() < before)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_all(&self, filters: &UserFilterParams) -> Result<(Vec<User>, i64), AppError> {
        let tables = self.read()?;
        let matching: Vec<&User> = tables
            .users
            .iter()
            .filter(|u| matches_substring(&u.name, filters.name.as_deref()))
            .filter(|u| {
                filters
                    .email
                    .as_deref()
                    .filter(|e| !e.is_empty())
                    .is_none_or(|email| u.email == email)
            })
            .filter(|u| filters.role.is_none_or(|role| u.role == role))
            .collect();
        let total = matching.len() as i64;
        let rows = newest_first(&matching, |u| u.created_at);

        Ok((page(rows, &filters.pagination), total))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.write()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(unique_violation("users_email_key"));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut tables = self.write()?;
        if let Some(email) = &changes.email {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(unique_violation("users_email_key"));
            }
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student(suffix: &str) -> NewStudent {
        NewStudent {
            name: format!("Aluno {suffix}"),
            email: format!("aluno{suffix}@escola.com"),
            ra: format!("RA{suffix}"),
            cpf: format!("5299822472{suffix}"),
        }
    }

    #[tokio::test]
    async fn test_student_unique_columns_are_enforced() {
        let store = MemoryStore::new();
        StudentRepository::create(&store, new_student("1")).await.unwrap();

        let duplicate = NewStudent {
            email: "outro@escola.com".to_string(),
            ra: "RA9".to_string(),
            ..new_student("1")
        };
        let error = StudentRepository::create(&store, duplicate).await.unwrap_err();
        assert_eq!(error.status.as_u16(), 500);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_paginated() {
        let store = MemoryStore::new();
        for i in 1..=3 {
            StudentRepository::create(&store, new_student(&i.to_string()))
                .await
                .unwrap();
        }

        let filters = StudentFilterParams {
            pagination: PaginationParams::new(1, 2),
            ..Default::default()
        };
        let (students, total) = StudentRepository::find_all(&store, &filters).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].ra, "RA3");
    }

    #[tokio::test]
    async fn test_deleting_student_cascades_to_enrollments() {
        let store = MemoryStore::new();
        let student = StudentRepository::create(&store, new_student("1")).await.unwrap();
        let now = Utc::now();
        let group = CourseGroupRepository::create(
            &store,
            NewCourseGroup {
                name: "Turma A".to_string(),
                description: None,
                start_date: now,
                end_date: now + chrono::Duration::days(30),
                max_students: None,
            },
        )
        .await
        .unwrap();
        EnrollmentRepository::create(
            &store,
            NewEnrollment {
                student_id: student.id,
                course_group_id: group.id,
            },
        )
        .await
        .unwrap();

        assert!(StudentRepository::delete(&store, student.id).await.unwrap());
        assert_eq!(store.count_by_course_group(group.id).await.unwrap(), 0);
    }
}
